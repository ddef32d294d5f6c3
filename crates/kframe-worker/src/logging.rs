//! Structured run logging utilities.

use std::path::Path;
use tracing::{error, info, Span};

use kframe_models::{Stage, VideoId};

/// Run logger with consistent structured fields.
#[derive(Debug, Clone)]
pub struct RunLogger {
    video_id: String,
    video_path: String,
}

impl RunLogger {
    pub fn new(video_id: &VideoId, video_path: &Path) -> Self {
        Self {
            video_id: video_id.to_string(),
            video_path: video_path.display().to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, message: &str) {
        info!(video_id = %self.video_id, video_path = %self.video_path, "Run started: {}", message);
    }

    /// Log entry into a stage.
    pub fn log_stage(&self, stage: Stage, message: &str) {
        info!(video_id = %self.video_id, stage = %stage, "Stage {}: {}", stage, message);
    }

    /// Log a run failure.
    pub fn log_error(&self, stage: Option<Stage>, message: &str) {
        let stage = stage.map(|s| s.as_str()).unwrap_or("none");
        error!(video_id = %self.video_id, stage, "Run failed: {}", message);
    }

    /// Log the completion of a run.
    pub fn log_completion(&self, keyframes: usize, elapsed_secs: f64) {
        info!(
            video_id = %self.video_id,
            keyframes,
            elapsed_secs,
            "Run completed"
        );
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Span wrapping the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            video_id = %self.video_id,
            video_path = %self.video_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new(&VideoId::from("vid-1"), Path::new("/videos/a.mp4"));
        assert_eq!(logger.video_id(), "vid-1");
        logger.log_stage(Stage::Detection, "starting");
        logger.log_error(None, "boom");
    }
}
