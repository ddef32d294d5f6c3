//! FFmpeg command builder for piped raw frame decoding.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Output target meaning "write to stdout".
pub const PIPE_OUTPUT: &str = "-";

/// Frames decoded and discarded after an input-side seek.
pub const SEEK_PREROLL_FRAMES: u64 = 2;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target, a path or `-` for stdout
    output: String,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command writing to `output`.
    pub fn new(input: impl AsRef<Path>, output: impl Into<String>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.into(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Create a command writing to stdout.
    pub fn piped(input: impl AsRef<Path>) -> Self {
        Self::new(input, PIPE_OUTPUT)
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Start decoding output at frame `frame_index` of a `fps` stream.
    ///
    /// Seeks on the input side to just before the target, so only the GOP
    /// leading up to it is decoded, then drops the few preroll frames with
    /// an exact `select`. Streams without a usable frame rate fall back to
    /// selecting from frame 0.
    pub fn start_at_frame(self, frame_index: u64, fps: f64) -> Self {
        if frame_index == 0 {
            return self;
        }

        let preroll = frame_index.min(SEEK_PREROLL_FRAMES);
        let seek_to = frame_index - preroll;
        if seek_to == 0 || !fps.is_finite() || fps <= 0.0 {
            return self.select_from(frame_index);
        }

        // Half a frame early so float rounding never skips `seek_to`
        let seconds = (seek_to as f64 - 0.5) / fps;
        self.input_arg("-ss")
            .input_arg(format!("{:.6}", seconds))
            .select_from(preroll)
    }

    fn select_from(self, frame_index: u64) -> Self {
        self.video_filter(format!("select=gte(n\\,{})", frame_index))
            .output_arg("-vsync")
            .output_arg("0")
    }

    /// Keep frames in coded orientation, matching ffprobe's reported size.
    pub fn no_autorotate(self) -> Self {
        self.input_arg("-noautorotate")
    }

    /// Emit packed RGB24 raw frames.
    pub fn rawvideo_rgb24(self) -> Self {
        self.output_args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24"])
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-v".to_string(),
            self.log_level.clone(),
        ];

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.clone());

        args
    }

    /// Spawn FFmpeg with stdout piped. The process is killed when the
    /// returned handle is dropped.
    pub fn spawn_piped(&self) -> MediaResult<Child> {
        check_ffmpeg()?;

        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None))
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
