//! Materialized keyframes and the per-extraction metadata record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::{BBox, Candidate};
use crate::video::VideoId;

/// Image extension used for materialized keyframes.
pub const KEYFRAME_EXTENSION: &str = "jpg";

/// Deterministic keyframe filename: `frame_{idx:05}_t{ts:.2}s.jpg`.
pub fn keyframe_filename(frame_index: u64, timestamp: f64) -> String {
    format!(
        "frame_{:05}_t{:.2}s.{}",
        frame_index, timestamp, KEYFRAME_EXTENSION
    )
}

/// A selected candidate whose image has been written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Keyframe {
    pub frame_index: u64,
    pub timestamp: f64,
    /// Quality score in [0, 1]
    pub score: f64,
    pub bbox: BBox,
    /// File name inside the run's keyframe directory
    pub filename: String,
    #[serde(default)]
    pub track_id: Option<i64>,
}

impl Keyframe {
    /// Build the keyframe record for a scored candidate.
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            frame_index: candidate.frame_index,
            timestamp: candidate.timestamp,
            score: candidate.score_or_zero(),
            bbox: candidate.bbox,
            filename: keyframe_filename(candidate.frame_index, candidate.timestamp),
            track_id: candidate.track_id,
        }
    }
}

/// Parameters that shaped one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionParams {
    pub max_frames: usize,
    /// Deduplication window in seconds
    pub time_threshold: f64,
    pub jpeg_quality: u8,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionMetadata {
    pub video_id: VideoId,
    pub video_path: String,
    pub total_keyframes: usize,
    pub extraction_params: ExtractionParams,
    pub keyframes: Vec<Keyframe>,
}

impl ExtractionMetadata {
    pub fn new(
        video_id: VideoId,
        video_path: impl Into<String>,
        params: ExtractionParams,
        keyframes: Vec<Keyframe>,
    ) -> Self {
        Self {
            video_id,
            video_path: video_path.into(),
            total_keyframes: keyframes.len(),
            extraction_params: params,
            keyframes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_format() {
        assert_eq!(keyframe_filename(123, 4.10), "frame_00123_t4.10s.jpg");
        assert_eq!(keyframe_filename(0, 0.0), "frame_00000_t0.00s.jpg");
        assert_eq!(keyframe_filename(123456, 61.5), "frame_123456_t61.50s.jpg");
    }

    #[test]
    fn test_keyframe_from_candidate() {
        let c = Candidate {
            frame_index: 42,
            timestamp: 1.4,
            bbox: BBox::new(0.0, 0.0, 10.0, 20.0),
            confidence: 0.8,
            track_id: Some(7),
            score: Some(0.61),
        };
        let kf = Keyframe::from_candidate(&c);
        assert_eq!(kf.filename, "frame_00042_t1.40s.jpg");
        assert_eq!(kf.score, 0.61);
        assert_eq!(kf.track_id, Some(7));
    }

    #[test]
    fn test_metadata_counts_keyframes() {
        let params = ExtractionParams {
            max_frames: 10,
            time_threshold: 1.0,
            jpeg_quality: 95,
        };
        let meta = ExtractionMetadata::new(VideoId::from("v1"), "/tmp/a.mp4", params, vec![]);
        assert_eq!(meta.total_keyframes, 0);

        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["extraction_params"]["jpeg_quality"], 95);
        assert_eq!(json["video_id"], "v1");
    }
}
