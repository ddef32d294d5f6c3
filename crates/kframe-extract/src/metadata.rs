//! Per-extraction metadata record (`metadata.json`).

use std::path::Path;
use tracing::debug;

use kframe_media::write_atomic;
use kframe_models::keyframe::ExtractionMetadata;

use crate::error::{ExtractResult, ExtractionError};

/// Serialize `metadata` to `path` atomically. Called once per successful
/// extraction, after every frame is on disk.
pub async fn write_metadata(path: &Path, metadata: &ExtractionMetadata) -> ExtractResult<()> {
    let json = serde_json::to_vec_pretty(metadata)
        .map_err(|e| ExtractionError::metadata(path, e.to_string()))?;

    write_atomic(path, &json)
        .await
        .map_err(|e| ExtractionError::metadata(path, e.to_string()))?;

    debug!(
        path = %path.display(),
        total_keyframes = metadata.total_keyframes,
        "Wrote extraction metadata"
    );
    Ok(())
}

/// Load a previously written metadata record.
pub async fn read_metadata(path: &Path) -> ExtractResult<ExtractionMetadata> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| ExtractionError::metadata(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kframe_models::{BBox, ExtractionParams, Keyframe, VideoId};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("video-v1/metadata.json");

        let keyframes = vec![
            Keyframe {
                frame_index: 123,
                timestamp: 4.1,
                score: 0.734,
                bbox: BBox::new(10.0, 20.5, 110.0, 220.25),
                filename: "frame_00123_t4.10s.jpg".to_string(),
                track_id: Some(3),
            },
            Keyframe {
                frame_index: 7,
                timestamp: 0.23,
                score: 0.5,
                bbox: BBox::new(0.0, 0.0, 5.0, 5.0),
                filename: "frame_00007_t0.23s.jpg".to_string(),
                track_id: None,
            },
        ];
        let metadata = ExtractionMetadata::new(
            VideoId::from("v1"),
            "/videos/in.mp4",
            ExtractionParams {
                max_frames: 10,
                time_threshold: 1.0,
                jpeg_quality: 95,
            },
            keyframes,
        );

        write_metadata(&path, &metadata).await.unwrap();
        let back = read_metadata(&path).await.unwrap();

        assert_eq!(back, metadata);
        assert_eq!(back.total_keyframes, 2);
    }

    #[tokio::test]
    async fn test_corrupt_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("metadata.json");
        std::fs::write(&path, b"{not json").unwrap();

        let err = read_metadata(&path).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Metadata { .. }));
    }
}
