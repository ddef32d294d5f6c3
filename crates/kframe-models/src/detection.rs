//! Detection and candidate models.
//!
//! A [`Detection`] is one person observation produced by the external detector.
//! A [`Candidate`] is the same observation normalized for scoring.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
///
/// Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// All coordinates finite with `x1 < x2` and `y1 < y2`.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|v| v.is_finite())
            && self.x2 > self.x1
            && self.y2 > self.y1
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl JsonSchema for BBox {
    fn schema_name() -> String {
        "BBox".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <[f64; 4]>::json_schema(gen)
    }
}

/// One person observation at one video frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Zero-based frame index in the source video
    pub frame_index: u64,
    /// Presentation time in seconds
    pub timestamp: f64,
    pub bbox: BBox,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    /// Tracker identity, when the detector tracks people across frames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<i64>,
}

/// A detection eligible for scoring and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    pub frame_index: u64,
    pub timestamp: f64,
    pub bbox: BBox,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<i64>,
    /// Quality score, assigned by the scorer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Candidate {
    /// Score, treating an unscored candidate as zero.
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

impl From<Detection> for Candidate {
    fn from(d: Detection) -> Self {
        Self {
            frame_index: d.frame_index,
            timestamp: d.timestamp,
            bbox: d.bbox,
            confidence: d.confidence,
            track_id: d.track_id,
            score: None,
        }
    }
}

impl From<&Detection> for Candidate {
    fn from(d: &Detection) -> Self {
        Self::from(d.clone())
    }
}
