//! Keyframe pipeline worker.
//!
//! This crate provides:
//! - The lead pipeline orchestrating detection and extraction
//! - The detection stage boundary and a sidecar-file detection stage
//! - Stage failure policy and error types
//! - Progress sinks
//! - Run-level metadata, logging and metrics

pub mod config;
pub mod detection;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod run_metadata;
pub mod selfcheck;
pub mod state;

pub use config::WorkerConfig;
pub use detection::{DetectionParams, DetectionProgress, DetectionStage, SidecarDetectionStage};
pub use error::{
    policy_for, DetectionError, FailurePolicy, PipelineError, PipelineResult, ProcessingError,
};
pub use logging::RunLogger;
pub use pipeline::LeadPipeline;
pub use progress::{ChannelSink, ProgressSink, StageReporter};
pub use run_metadata::{read_run_metadata, RunMetadata};
pub use state::{RunState, RunStateMachine};
