//! Candidate collection.

use kframe_models::{Candidate, Detection};

/// Normalize a detection stream into unscored candidates, preserving order.
pub fn collect_candidates(detections: &[Detection]) -> Vec<Candidate> {
    detections.iter().map(Candidate::from).collect()
}
