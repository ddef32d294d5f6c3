//! FFmpeg CLI backed [`VideoSource`].
//!
//! Frames are decoded by an `ffmpeg` child process writing packed RGB24 to
//! stdout. Seeking restarts the process with an input-side `-ss` just before
//! the target frame, so forward reads are cheap and a seek costs one process
//! start plus decoding from the nearest keyframe.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout};
use tracing::{debug, warn};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;
use crate::source::{RawFrame, StreamInfo, VideoSource, VideoSourceOpener};

/// Running decoder process.
struct Decoder {
    child: Child,
    stdout: BufReader<ChildStdout>,
}

/// Video source decoding through the `ffmpeg` binary.
pub struct FfmpegVideoSource {
    path: PathBuf,
    info: StreamInfo,
    position: u64,
    decoder: Option<Decoder>,
    released: bool,
}

impl FfmpegVideoSource {
    /// Probe `path` and prepare a source positioned at frame 0.
    ///
    /// The decoder process starts lazily on the first read.
    pub async fn open(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        let probe = probe_video(path).await?;

        let info = StreamInfo {
            width: probe.width,
            height: probe.height,
            fps: probe.fps,
            frame_count: probe.frame_count,
        };

        debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            frame_count = info.frame_count,
            "Opened video source"
        );

        Ok(Self::with_info(path, info))
    }

    fn with_info(path: &Path, info: StreamInfo) -> Self {
        Self {
            path: path.to_path_buf(),
            info,
            position: 0,
            decoder: None,
            released: false,
        }
    }

    /// Decoder invocation for the current position.
    ///
    /// Autorotation stays off so frames keep the coded `width x height`
    /// that ffprobe reported and the frame buffers are sized for.
    fn decoder_command(&self) -> FfmpegCommand {
        FfmpegCommand::piped(&self.path)
            .no_autorotate()
            .start_at_frame(self.position, self.info.fps)
            .rawvideo_rgb24()
    }

    fn start_decoder(&mut self) -> MediaResult<()> {
        let mut child = self.decoder_command().spawn_piped()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;

        self.decoder = Some(Decoder {
            child,
            stdout: BufReader::with_capacity(self.info.frame_len().max(8192), stdout),
        });
        Ok(())
    }

    async fn stop_decoder(&mut self) {
        if let Some(mut decoder) = self.decoder.take() {
            if let Err(e) = decoder.child.kill().await {
                warn!(path = %self.path.display(), "Failed to stop FFmpeg decoder: {}", e);
            }
        }
    }
}

#[async_trait]
impl VideoSource for FfmpegVideoSource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn seek(&mut self, frame_index: u64) -> MediaResult<()> {
        if self.released {
            return Err(MediaError::Released);
        }
        if frame_index == self.position && self.decoder.is_some() {
            return Ok(());
        }
        self.stop_decoder().await;
        self.position = frame_index;
        Ok(())
    }

    async fn read_frame(&mut self) -> MediaResult<Option<RawFrame>> {
        if self.released {
            return Err(MediaError::Released);
        }
        if !self.info.has_valid_dimensions() {
            return Err(MediaError::InvalidVideo(format!(
                "invalid dimensions {}x{}",
                self.info.width, self.info.height
            )));
        }
        if self.decoder.is_none() {
            self.start_decoder()?;
        }

        let frame_index = self.position;
        let mut data = vec![0u8; self.info.frame_len()];
        let decoder = self
            .decoder
            .as_mut()
            .ok_or_else(|| MediaError::internal("decoder not running"))?;

        match decoder.stdout.read_exact(&mut data).await {
            Ok(_) => {
                self.position += 1;
                Ok(Some(RawFrame::new(
                    frame_index,
                    self.info.width,
                    self.info.height,
                    data,
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!(frame_index, "End of stream");
                self.stop_decoder().await;
                Ok(None)
            }
            Err(e) => {
                self.stop_decoder().await;
                Err(MediaError::decode_failed(frame_index, e.to_string()))
            }
        }
    }

    async fn release(&mut self) {
        self.stop_decoder().await;
        self.released = true;
    }
}

impl Drop for FfmpegVideoSource {
    fn drop(&mut self) {
        if let Some(decoder) = self.decoder.as_mut() {
            let _ = decoder.child.start_kill();
        }
    }
}

/// Opens [`FfmpegVideoSource`]s.
#[derive(Debug, Clone, Default)]
pub struct FfmpegSourceOpener;

impl FfmpegSourceOpener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VideoSourceOpener for FfmpegSourceOpener {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        Ok(Box::new(FfmpegVideoSource::open(path).await?))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_missing_file() {
        let result = FfmpegSourceOpener::new()
            .open(Path::new("/nonexistent/clip.mp4"))
            .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    fn source(fps: f64) -> FfmpegVideoSource {
        FfmpegVideoSource::with_info(
            Path::new("clip.mp4"),
            StreamInfo {
                width: 1920,
                height: 1080,
                fps,
                frame_count: 10_000,
            },
        )
    }

    #[tokio::test]
    async fn test_seek_restarts_near_target() {
        let mut source = source(30.0);
        source.seek(9000).await.unwrap();
        assert_eq!(source.position(), 9000);

        let args = source.decoder_command().build_args();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        assert!(ss < i);
        assert_eq!(args[ss + 1], format!("{:.6}", 8997.5 / 30.0));
        assert!(args.contains(&"select=gte(n\\,2)".to_string()));
    }

    #[test]
    fn test_decoder_keeps_coded_orientation() {
        let args = source(30.0).decoder_command().build_args();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let flag = args.iter().position(|a| a == "-noautorotate").unwrap();
        assert!(flag < i);
        assert!(!args.contains(&"-ss".to_string()));
    }
}
