//! Run results and failure records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::ProcessingConfig;
use crate::keyframe::Keyframe;
use crate::progress::Stage;
use crate::video::{RunStatus, VideoId};

/// Aggregate result of one full pipeline run.
///
/// Also the body of the run-level `processing.json` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingResult {
    pub video_id: VideoId,
    pub video_path: PathBuf,
    /// Frame count reported by the video source
    pub total_frames: u64,
    pub total_detections: usize,
    pub keyframes_extracted: usize,
    pub processing_time_seconds: f64,
    /// `<output_dir>/video-<video_id>`
    pub output_dir: PathBuf,
    pub keyframes_dir: PathBuf,
    pub metadata_path: PathBuf,
    /// Resolved configuration the run used
    pub config: ProcessingConfig,
    pub keyframes: Vec<Keyframe>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ProcessingResult {
    /// Compact summary for callers that do not need the keyframe list.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            video_id: self.video_id.clone(),
            total_frames: self.total_frames,
            total_detections: self.total_detections,
            keyframes_extracted: self.keyframes_extracted,
            processing_time_seconds: self.processing_time_seconds,
            output_dir: self.output_dir.clone(),
            metadata_path: self.metadata_path.clone(),
            started_at: self.started_at,
            completed_at: self.completed_at,
        }
    }
}

/// Successful run summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub video_id: VideoId,
    pub total_frames: u64,
    pub total_detections: usize,
    pub keyframes_extracted: usize,
    pub processing_time_seconds: f64,
    pub output_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Result-shaped outcome of a run, for job systems that record failures
/// instead of propagating them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunReport {
    Completed(RunSummary),
    Failed {
        video_id: VideoId,
        error_message: String,
        /// Stage the failure happened in, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stage: Option<Stage>,
    },
}

impl RunReport {
    pub fn failed(video_id: VideoId, error_message: impl Into<String>, stage: Option<Stage>) -> Self {
        RunReport::Failed {
            video_id,
            error_message: error_message.into(),
            stage,
        }
    }

    pub fn status(&self) -> RunStatus {
        match self {
            RunReport::Completed(_) => RunStatus::Completed,
            RunReport::Failed { .. } => RunStatus::Failed,
        }
    }

    pub fn video_id(&self) -> &VideoId {
        match self {
            RunReport::Completed(summary) => &summary.video_id,
            RunReport::Failed { video_id, .. } => video_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunReport::Completed(_))
    }
}
