//! Run metrics.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_COMPLETED_TOTAL: &str = "kframe_runs_completed_total";
    pub const RUNS_FAILED_TOTAL: &str = "kframe_runs_failed_total";
    pub const KEYFRAMES_EXTRACTED_TOTAL: &str = "kframe_keyframes_extracted_total";
    pub const RUN_DURATION_SECONDS: &str = "kframe_run_duration_seconds";
}

/// Install a Prometheus recorder. The handle renders the current snapshot.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record a completed run.
pub fn record_run_completed(keyframes: usize, duration_secs: f64) {
    counter!(names::RUNS_COMPLETED_TOTAL).increment(1);
    counter!(names::KEYFRAMES_EXTRACTED_TOTAL).increment(keyframes as u64);
    histogram!(names::RUN_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed run, labelled with where it failed.
pub fn record_run_failed(stage: &'static str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    counter!(names::RUNS_FAILED_TOTAL, &labels).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, &labels).record(duration_secs);
}
