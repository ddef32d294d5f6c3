//! Pipeline error types and the stage failure policy.
//!
//! Failures are classified per stage through [`STAGE_FAILURE_POLICY`]:
//! detection failures are normalized to [`ProcessingError`] unless they
//! already are one, extraction failures pass through as
//! [`ExtractionError`]. A missing input video is reported as
//! [`PipelineError::NotFound`] and never wrapped.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

use kframe_extract::ExtractionError;
use kframe_media::MediaError;
use kframe_models::Stage;

pub type PipelineResult<T> = Result<T, PipelineError>;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Generic processing failure, optionally wrapping its cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProcessingError {
    message: String,
    stage: Option<Stage>,
    #[source]
    source: Option<BoxError>,
}

impl ProcessingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: None,
            source: None,
        }
    }

    /// Wrap `source` under `message`.
    pub fn wrap(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            stage: None,
            source: Some(source.into()),
        }
    }

    /// Attribute the failure to `stage` unless it already names one.
    pub fn at_stage(mut self, stage: Stage) -> Self {
        self.stage.get_or_insert(stage);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }
}

/// Errors returned by [`LeadPipeline::process_video`](crate::LeadPipeline::process_video).
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl PipelineError {
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing(ProcessingError::new(message))
    }

    /// Stage at which the failure happened, if it happened inside one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::NotFound(_) => None,
            PipelineError::Processing(e) => e.stage(),
            PipelineError::Extraction(_) => Some(Stage::Extraction),
        }
    }

    /// Label used for failure metrics.
    pub fn failure_label(&self) -> &'static str {
        match (self, self.stage()) {
            (PipelineError::NotFound(_), _) => "validation",
            (_, Some(stage)) => stage.as_str(),
            (_, None) => "pipeline",
        }
    }
}

/// What a detection stage may fail with.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Already a processing failure; passes through unchanged.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How a stage's failures reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Normalize to [`ProcessingError`] unless already one.
    Wrap,
    /// Surface the stage's own error kind unchanged.
    Passthrough,
}

/// Per-stage failure handling.
pub const STAGE_FAILURE_POLICY: &[(Stage, FailurePolicy)] = &[
    (Stage::Detection, FailurePolicy::Wrap),
    (Stage::Extraction, FailurePolicy::Passthrough),
];

/// Policy for `stage`. Stages without an entry wrap.
pub fn policy_for(stage: Stage) -> FailurePolicy {
    STAGE_FAILURE_POLICY
        .iter()
        .find(|(s, _)| *s == stage)
        .map(|(_, policy)| *policy)
        .unwrap_or(FailurePolicy::Wrap)
}

/// A failure raised inside a stage, before policy is applied.
#[derive(Debug)]
pub enum StageFailure {
    Processing(ProcessingError),
    Extraction(ExtractionError),
    Other(BoxError),
}

impl From<DetectionError> for StageFailure {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::Processing(e) => StageFailure::Processing(e),
            DetectionError::Media(e) => StageFailure::Other(Box::new(e)),
            DetectionError::Other(e) => StageFailure::Other(e.into()),
        }
    }
}

impl From<ExtractionError> for StageFailure {
    fn from(err: ExtractionError) -> Self {
        StageFailure::Extraction(err)
    }
}

/// Apply the stage's failure policy.
pub fn resolve_stage_failure(stage: Stage, failure: StageFailure) -> PipelineError {
    let wrap = |source: BoxError| {
        let message = format!("{} stage failed: {}", stage_title(stage), source);
        PipelineError::Processing(ProcessingError::wrap(message, source).at_stage(stage))
    };

    match (policy_for(stage), failure) {
        (_, StageFailure::Processing(e)) => PipelineError::Processing(e.at_stage(stage)),
        (FailurePolicy::Passthrough, StageFailure::Extraction(e)) => PipelineError::Extraction(e),
        (FailurePolicy::Wrap, StageFailure::Extraction(e)) => wrap(Box::new(e)),
        (_, StageFailure::Other(e)) => wrap(e),
    }
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Detection => "Detection",
        Stage::Extraction => "Extraction",
        Stage::Complete => "Completion",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table() {
        assert_eq!(policy_for(Stage::Detection), FailurePolicy::Wrap);
        assert_eq!(policy_for(Stage::Extraction), FailurePolicy::Passthrough);
        assert_eq!(policy_for(Stage::Complete), FailurePolicy::Wrap);
    }

    #[test]
    fn test_detection_media_error_is_wrapped() {
        let failure = StageFailure::from(DetectionError::from(MediaError::InvalidVideo(
            "bad header".to_string(),
        )));
        let err = resolve_stage_failure(Stage::Detection, failure);

        assert!(matches!(err, PipelineError::Processing(_)));
        assert_eq!(
            err.to_string(),
            "Detection stage failed: Invalid video file: bad header"
        );
        assert_eq!(err.stage(), Some(Stage::Detection));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn test_detection_processing_error_passes_through() {
        let typed = ProcessingError::new("Cannot decode video stream");
        let err = resolve_stage_failure(
            Stage::Detection,
            StageFailure::from(DetectionError::Processing(typed)),
        );
        assert_eq!(err.to_string(), "Cannot decode video stream");
        assert_eq!(err.stage(), Some(Stage::Detection));
    }

    #[test]
    fn test_extraction_error_passes_through() {
        let err = resolve_stage_failure(
            Stage::Extraction,
            StageFailure::from(ExtractionError::frame(12, "decode failed")),
        );
        match err {
            PipelineError::Extraction(ExtractionError::Frame { frame_index, .. }) => {
                assert_eq!(frame_index, 12)
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_other_error_is_wrapped() {
        let err = resolve_stage_failure(
            Stage::Detection,
            StageFailure::from(DetectionError::Other(anyhow::anyhow!("model crashed"))),
        );
        assert_eq!(err.to_string(), "Detection stage failed: model crashed");
    }

    #[test]
    fn test_not_found_message_and_label() {
        let err = PipelineError::NotFound(PathBuf::from("/videos/missing.mp4"));
        assert_eq!(err.to_string(), "Video file not found: /videos/missing.mp4");
        assert_eq!(err.stage(), None);
        assert_eq!(err.failure_label(), "validation");
        assert_eq!(PipelineError::processing("x").failure_label(), "pipeline");
    }
}
