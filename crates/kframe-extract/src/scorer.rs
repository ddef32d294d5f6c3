//! Multi-criteria frame quality scoring.
//!
//! Each candidate gets four sub-scores in [0, 1], combined with
//! [`ScoringWeights`]:
//! - size: bbox area relative to the frame, amplified 10x so small people
//!   still register
//! - confidence: detector confidence
//! - centrality: distance of the bbox center from the frame center,
//!   normalized by the half diagonal
//! - stability: a flat bonus for tracked detections

use tracing::{debug, warn};

use kframe_models::{Candidate, ScoringWeights};

use crate::error::InvalidCandidate;

/// Size score multiplier applied to the area ratio.
pub const SIZE_AMPLIFICATION: f64 = 10.0;

/// Stability sub-score of a detection carrying a track id.
pub const TRACKED_STABILITY: f64 = 0.5;

/// Per-criterion sub-scores of one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub size: f64,
    pub confidence: f64,
    pub centrality: f64,
    pub stability: f64,
}

impl ScoreBreakdown {
    /// Weighted sum, clamped to [0, 1].
    pub fn total(&self, weights: &ScoringWeights) -> f64 {
        let score = weights.size * self.size
            + weights.confidence * self.confidence
            + weights.centrality * self.centrality
            + weights.stability * self.stability;
        score.clamp(0.0, 1.0)
    }
}

/// Scores candidates against a fixed frame size.
#[derive(Debug, Clone, Copy)]
pub struct FrameScorer {
    weights: ScoringWeights,
    frame_width: f64,
    frame_height: f64,
}

impl FrameScorer {
    /// Create a scorer for frames of `width` x `height` pixels.
    pub fn new(weights: ScoringWeights, width: u32, height: u32) -> Self {
        Self {
            weights,
            frame_width: f64::from(width),
            frame_height: f64::from(height),
        }
    }

    /// Compute sub-scores of one candidate.
    pub fn breakdown(&self, candidate: &Candidate) -> Result<ScoreBreakdown, InvalidCandidate> {
        validate_candidate(candidate)?;

        let bbox = &candidate.bbox;
        let frame_area = self.frame_width * self.frame_height;

        let size = if frame_area > 0.0 {
            (bbox.area() / frame_area * SIZE_AMPLIFICATION).min(1.0)
        } else {
            0.0
        };

        let (cx, cy) = bbox.center();
        let (fx, fy) = (self.frame_width / 2.0, self.frame_height / 2.0);
        let center_dist = (cx - fx).hypot(cy - fy);
        let max_dist = fx.hypot(fy);
        let centrality = if max_dist > 0.0 {
            1.0 - center_dist / max_dist
        } else {
            0.0
        };

        let stability = if candidate.track_id.is_some() {
            TRACKED_STABILITY
        } else {
            0.0
        };

        Ok(ScoreBreakdown {
            size: size.clamp(0.0, 1.0),
            confidence: candidate.confidence.clamp(0.0, 1.0),
            centrality: centrality.clamp(0.0, 1.0),
            stability,
        })
    }

    /// Score one candidate. Pure.
    pub fn score(&self, candidate: &Candidate) -> Result<f64, InvalidCandidate> {
        Ok(self.breakdown(candidate)?.total(&self.weights))
    }

    /// Score a batch, skipping (and logging) invalid candidates.
    ///
    /// Output keeps input order.
    pub fn score_all(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let total = candidates.len();
        let scored: Vec<Candidate> = candidates
            .into_iter()
            .filter_map(|mut candidate| match self.score(&candidate) {
                Ok(score) => {
                    candidate.score = Some(score);
                    Some(candidate)
                }
                Err(e) => {
                    warn!("Skipping invalid candidate: {}", e);
                    None
                }
            })
            .collect();

        debug!(total, scored = scored.len(), "Scored candidates");
        scored
    }
}

fn validate_candidate(candidate: &Candidate) -> Result<(), InvalidCandidate> {
    let frame_index = candidate.frame_index;
    if !candidate.bbox.is_well_formed() {
        let b = candidate.bbox;
        return Err(InvalidCandidate::MalformedBBox {
            frame_index,
            x1: b.x1,
            y1: b.y1,
            x2: b.x2,
            y2: b.y2,
        });
    }
    if !candidate.timestamp.is_finite() {
        return Err(InvalidCandidate::NonFinite {
            frame_index,
            field: "timestamp",
        });
    }
    if !candidate.confidence.is_finite() {
        return Err(InvalidCandidate::NonFinite {
            frame_index,
            field: "confidence",
        });
    }
    Ok(())
}
