//! Error types for keyframe extraction.

use std::path::PathBuf;
use thiserror::Error;

use kframe_media::MediaError;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractionError>;

/// Extraction failures. Any of these aborts the extraction batch.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to extract frame {frame_index}: {reason}")]
    Frame { frame_index: u64, reason: String },

    #[error("{reason}")]
    Source { reason: String },

    #[error("Failed to write metadata to {}: {reason}", path.display())]
    Metadata { path: PathBuf, reason: String },

    #[error("Invalid extraction parameters: {0}")]
    InvalidParams(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// Create a per-frame failure.
    pub fn frame(frame_index: u64, reason: impl Into<String>) -> Self {
        Self::Frame {
            frame_index,
            reason: reason.into(),
        }
    }

    /// Create a video source failure.
    pub fn source(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }

    /// Create a metadata write failure.
    pub fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Frame index the failure is attributed to, if any.
    pub fn frame_index(&self) -> Option<u64> {
        match self {
            ExtractionError::Frame { frame_index, .. } => Some(*frame_index),
            _ => None,
        }
    }
}

/// A candidate that cannot be scored. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCandidate {
    #[error("frame {frame_index}: malformed bbox [{x1}, {y1}, {x2}, {y2}]")]
    MalformedBBox {
        frame_index: u64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    #[error("frame {frame_index}: non-finite {field}")]
    NonFinite {
        frame_index: u64,
        field: &'static str,
    },
}

/// Map a media error raised while working on one frame.
pub(crate) fn frame_error(frame_index: u64, err: MediaError) -> ExtractionError {
    match err {
        MediaError::DecodeFailed { message, .. } => ExtractionError::frame(frame_index, message),
        other => ExtractionError::frame(frame_index, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_message() {
        let err = ExtractionError::frame(42, "Failed to read frame 42 from video");
        assert_eq!(err.frame_index(), Some(42));
        assert_eq!(
            err.to_string(),
            "Failed to extract frame 42: Failed to read frame 42 from video"
        );
    }

    #[test]
    fn test_source_error_is_verbatim() {
        let err = ExtractionError::source("Video file not found: /tmp/x.mp4");
        assert_eq!(err.to_string(), "Video file not found: /tmp/x.mp4");
        assert_eq!(err.frame_index(), None);
    }

    #[test]
    fn test_decode_failure_keeps_message() {
        let err = frame_error(7, MediaError::decode_failed(7, "corrupt packet"));
        assert_eq!(err.to_string(), "Failed to extract frame 7: corrupt packet");
    }
}
