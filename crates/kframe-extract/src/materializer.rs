//! Frame materialization.
//!
//! Selected candidates are decoded from a single open [`VideoSource`] in
//! ascending frame order. Short forward gaps are read through; longer gaps
//! and backward jumps seek. Output keeps the caller's (selection) order.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use kframe_media::{encode_jpeg, write_atomic, RawFrame, VideoSource};
use kframe_models::{Candidate, Keyframe};

use crate::error::{frame_error, ExtractResult, ExtractionError};

/// Default forward gap, in frames, read through instead of seeking.
pub const DEFAULT_SEEK_THRESHOLD_FRAMES: u64 = 48;

/// Per-frame progress callback: `(frames_done, frames_total)`.
pub type FrameProgress<'a> = &'a (dyn Fn(usize, usize) + Send + Sync);

/// Decodes, encodes and writes selected frames.
#[derive(Debug, Clone)]
pub struct FrameMaterializer {
    keyframes_dir: PathBuf,
    jpeg_quality: u8,
    seek_threshold_frames: u64,
}

impl FrameMaterializer {
    pub fn new(keyframes_dir: impl Into<PathBuf>, jpeg_quality: u8) -> Self {
        Self {
            keyframes_dir: keyframes_dir.into(),
            jpeg_quality,
            seek_threshold_frames: DEFAULT_SEEK_THRESHOLD_FRAMES,
        }
    }

    /// Forward gaps up to `frames` are decoded through rather than seeked.
    pub fn with_seek_threshold(mut self, frames: u64) -> Self {
        self.seek_threshold_frames = frames;
        self
    }

    pub fn keyframes_dir(&self) -> &Path {
        &self.keyframes_dir
    }

    /// Materialize every candidate. Fails fast on the first frame error.
    ///
    /// The source is left open; releasing it is the caller's job.
    pub async fn materialize(
        &self,
        source: &mut dyn VideoSource,
        selected: &[Candidate],
        progress: Option<FrameProgress<'_>>,
    ) -> ExtractResult<Vec<Keyframe>> {
        let total = selected.len();
        let mut order: Vec<usize> = (0..total).collect();
        order.sort_by_key(|&i| selected[i].frame_index);

        let mut slots: Vec<Option<Keyframe>> = vec![None; total];

        for (done, &slot) in order.iter().enumerate() {
            let candidate = &selected[slot];
            let frame = self.decode_at(source, candidate.frame_index).await?;
            let keyframe = self.persist(candidate, frame).await?;
            slots[slot] = Some(keyframe);

            if let Some(progress) = progress {
                progress(done + 1, total);
            }
        }

        let keyframes: Vec<Keyframe> = slots.into_iter().flatten().collect();
        info!(
            count = keyframes.len(),
            dir = %self.keyframes_dir.display(),
            "Materialized keyframes"
        );
        Ok(keyframes)
    }

    /// Position the source and decode exactly `frame_index`.
    async fn decode_at(&self, source: &mut dyn VideoSource, frame_index: u64) -> ExtractResult<RawFrame> {
        let position = source.position();
        let needs_seek =
            frame_index < position || frame_index - position > self.seek_threshold_frames;

        if needs_seek {
            debug!(from = position, to = frame_index, "Seeking video source");
            source
                .seek(frame_index)
                .await
                .map_err(|e| frame_error(frame_index, e))?;
        }

        loop {
            match source.read_frame().await {
                Ok(Some(frame)) if frame.frame_index == frame_index => return Ok(frame),
                Ok(Some(frame)) if frame.frame_index < frame_index => continue,
                Ok(Some(frame)) => {
                    return Err(ExtractionError::frame(
                        frame_index,
                        format!("decoder returned frame {} past target", frame.frame_index),
                    ))
                }
                Ok(None) => {
                    return Err(ExtractionError::frame(
                        frame_index,
                        format!("Failed to read frame {} from video", frame_index),
                    ))
                }
                Err(e) => return Err(frame_error(frame_index, e)),
            }
        }
    }

    /// Encode and write one frame, returning its keyframe record.
    async fn persist(&self, candidate: &Candidate, frame: RawFrame) -> ExtractResult<Keyframe> {
        let frame_index = candidate.frame_index;
        let quality = self.jpeg_quality;

        let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(&frame, quality))
            .await
            .map_err(|e| ExtractionError::frame(frame_index, format!("encoder task failed: {}", e)))?
            .map_err(|e| frame_error(frame_index, e))?;

        let keyframe = Keyframe::from_candidate(candidate);
        let path = self.keyframes_dir.join(&keyframe.filename);

        write_atomic(&path, &jpeg).await.map_err(|e| {
            ExtractionError::frame(
                frame_index,
                format!("Failed to write frame to {}: {}", path.display(), e),
            )
        })?;

        debug!(frame_index, filename = %keyframe.filename, "Saved keyframe");
        Ok(keyframe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kframe_media::synthetic::SyntheticOpener;
    use kframe_media::VideoSourceOpener;
    use kframe_models::BBox;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn scored(frame_index: u64, score: f64) -> Candidate {
        Candidate {
            frame_index,
            timestamp: frame_index as f64 / 30.0,
            bbox: BBox::new(0.0, 0.0, 4.0, 4.0),
            confidence: 0.9,
            track_id: None,
            score: Some(score),
        }
    }

    #[tokio::test]
    async fn test_output_keeps_selection_order() {
        let temp = TempDir::new().unwrap();
        let opener = SyntheticOpener::new(8, 8, 30.0, 500);
        let mut source = opener.open(Path::new("v.mp4")).await.unwrap();

        let selected = vec![scored(300, 0.9), scored(12, 0.8), scored(40, 0.7)];
        let materializer = FrameMaterializer::new(temp.path(), 90);
        let keyframes = materializer
            .materialize(source.as_mut(), &selected, None)
            .await
            .unwrap();

        let frames: Vec<u64> = keyframes.iter().map(|k| k.frame_index).collect();
        assert_eq!(frames, vec![300, 12, 40]);
        for kf in &keyframes {
            assert!(temp.path().join(&kf.filename).exists());
        }
    }

    #[tokio::test]
    async fn test_short_gaps_read_forward_long_gaps_seek() {
        let temp = TempDir::new().unwrap();
        let opener = SyntheticOpener::new(4, 4, 30.0, 1000);
        let stats = opener.stats();
        let mut source = opener.open(Path::new("v.mp4")).await.unwrap();

        // 5 and 20 are within the threshold from 0; 900 is not.
        let selected = vec![scored(5, 0.5), scored(20, 0.4), scored(900, 0.3)];
        FrameMaterializer::new(temp.path(), 80)
            .with_seek_threshold(48)
            .materialize(source.as_mut(), &selected, None)
            .await
            .unwrap();

        assert_eq!(stats.seeks(), 1);
        assert_eq!(stats.reads(), 21 + 1);
    }

    #[tokio::test]
    async fn test_progress_reports_each_frame() {
        let temp = TempDir::new().unwrap();
        let opener = SyntheticOpener::new(4, 4, 30.0, 100);
        let mut source = opener.open(Path::new("v.mp4")).await.unwrap();

        let calls = Mutex::new(Vec::new());
        let progress = |done: usize, total: usize| calls.lock().unwrap().push((done, total));

        FrameMaterializer::new(temp.path(), 80)
            .materialize(
                source.as_mut(),
                &[scored(50, 0.1), scored(10, 0.2)],
                Some(&progress),
            )
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_fails_fast_on_decode_error() {
        let temp = TempDir::new().unwrap();
        let opener = SyntheticOpener::new(4, 4, 30.0, 100).failing_at(20);
        let mut source = opener.open(Path::new("v.mp4")).await.unwrap();
        let progressed = AtomicUsize::new(0);
        let progress = |_: usize, _: usize| {
            progressed.fetch_add(1, Ordering::SeqCst);
        };

        let err = FrameMaterializer::new(temp.path(), 80)
            .materialize(
                source.as_mut(),
                &[scored(10, 0.9), scored(20, 0.8), scored(30, 0.7)],
                Some(&progress),
            )
            .await
            .unwrap_err();

        assert_eq!(err.frame_index(), Some(20));
        assert_eq!(progressed.load(Ordering::SeqCst), 1);
        assert!(!temp.path().join("frame_00030_t1.00s.jpg").exists());
    }

    #[tokio::test]
    async fn test_frame_past_end_of_stream() {
        let temp = TempDir::new().unwrap();
        let opener = SyntheticOpener::new(4, 4, 30.0, 10);
        let mut source = opener.open(Path::new("v.mp4")).await.unwrap();

        let err = FrameMaterializer::new(temp.path(), 80)
            .materialize(source.as_mut(), &[scored(25, 0.9)], None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to read frame 25 from video"));
    }
}
