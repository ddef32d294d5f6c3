//! Shared data models for the keyframe extraction pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Detections and scorable candidates
//! - Materialized keyframes and extraction parameters
//! - Per-run processing configuration and overrides
//! - Stage progress events
//! - Run results, summaries and failure records
//! - The on-disk output layout of a run

pub mod config;
pub mod detection;
pub mod keyframe;
pub mod layout;
pub mod progress;
pub mod result;
pub mod video;

// Re-export common types
pub use config::{ProcessingConfig, ProcessingOverrides, ScoringWeights};
pub use detection::{BBox, Candidate, Detection};
pub use keyframe::{keyframe_filename, ExtractionParams, Keyframe};
pub use layout::VideoLayout;
pub use progress::{ProgressEvent, Stage};
pub use result::{ProcessingResult, RunReport, RunSummary};
pub use video::{RunStatus, VideoId};
