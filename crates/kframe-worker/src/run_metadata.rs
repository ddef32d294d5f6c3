//! Run-level metadata record (`processing.json`).

use serde::{Deserialize, Serialize};
use std::path::Path;

use kframe_media::write_atomic;
use kframe_models::{ProcessingResult, RunStatus};

use crate::error::ProcessingError;

/// Contents of `processing.json`: the full result plus its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub status: RunStatus,
    #[serde(flatten)]
    pub result: ProcessingResult,
}

/// Write the run-level record for `result` atomically.
pub async fn write_run_metadata(path: &Path, result: &ProcessingResult) -> Result<(), ProcessingError> {
    let record = RunMetadata {
        status: RunStatus::Completed,
        result: result.clone(),
    };
    let json = serde_json::to_vec_pretty(&record).map_err(|e| {
        ProcessingError::wrap(format!("Failed to serialize run metadata: {}", e), e)
    })?;

    write_atomic(path, &json).await.map_err(|e| {
        ProcessingError::wrap(
            format!("Failed to write run metadata to {}: {}", path.display(), e),
            e,
        )
    })?;

    tracing::info!(path = %path.display(), "Run metadata saved");
    Ok(())
}

/// Load a run-level record.
pub async fn read_run_metadata(path: &Path) -> Result<RunMetadata, ProcessingError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ProcessingError::wrap(format!("Cannot read {}: {}", path.display(), e), e)
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProcessingError::wrap(format!("Corrupt {}: {}", path.display(), e), e))
}
