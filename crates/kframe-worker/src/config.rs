//! Worker configuration.

use std::path::PathBuf;
use std::str::FromStr;

use kframe_extract::DEFAULT_SEEK_THRESHOLD_FRAMES;
use kframe_models::ProcessingConfig;

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Root directory for run outputs
    pub output_dir: PathBuf,
    /// Process-wide defaults that per-run overrides merge over
    pub defaults: ProcessingConfig,
    /// Forward gap, in frames, decoded through instead of seeked
    pub seek_threshold_frames: u64,
    /// Install a Prometheus recorder and log a snapshot after each run
    pub metrics_enabled: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            defaults: ProcessingConfig::default(),
            seek_threshold_frames: DEFAULT_SEEK_THRESHOLD_FRAMES,
            metrics_enabled: false,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    ///
    /// Absent or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let defaults = base.defaults;

        Self {
            output_dir: lookup("KFRAME_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(base.output_dir),
            defaults: ProcessingConfig {
                sample_rate: parse(&lookup, "KFRAME_DEFAULT_SAMPLE_RATE")
                    .unwrap_or(defaults.sample_rate),
                max_frames: parse(&lookup, "KFRAME_DEFAULT_MAX_FRAMES")
                    .unwrap_or(defaults.max_frames),
                confidence_threshold: parse(&lookup, "KFRAME_DEFAULT_CONFIDENCE_THRESHOLD")
                    .unwrap_or(defaults.confidence_threshold),
                time_threshold: parse(&lookup, "KFRAME_DEFAULT_TIME_THRESHOLD")
                    .unwrap_or(defaults.time_threshold),
                jpeg_quality: parse(&lookup, "KFRAME_DEFAULT_JPEG_QUALITY")
                    .unwrap_or(defaults.jpeg_quality),
                weights: defaults.weights,
            },
            seek_threshold_frames: parse(&lookup, "KFRAME_SEEK_THRESHOLD_FRAMES")
                .unwrap_or(base.seek_threshold_frames),
            metrics_enabled: lookup("KFRAME_METRICS_ENABLED")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(base.metrics_enabled),
        }
    }
}

fn parse<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = WorkerConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, WorkerConfig::default());
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.seek_threshold_frames, 48);
    }

    #[test]
    fn test_reads_overrides() {
        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("KFRAME_OUTPUT_DIR", "/data/keyframes"),
            ("KFRAME_DEFAULT_MAX_FRAMES", "25"),
            ("KFRAME_DEFAULT_TIME_THRESHOLD", "2.5"),
            ("KFRAME_DEFAULT_JPEG_QUALITY", "80"),
            ("KFRAME_METRICS_ENABLED", "true"),
        ]));
        assert_eq!(config.output_dir, PathBuf::from("/data/keyframes"));
        assert_eq!(config.defaults.max_frames, 25);
        assert_eq!(config.defaults.time_threshold, 2.5);
        assert_eq!(config.defaults.jpeg_quality, 80);
        assert_eq!(config.defaults.sample_rate, 1);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = WorkerConfig::from_lookup(lookup_from(&[
            ("KFRAME_DEFAULT_MAX_FRAMES", "lots"),
            ("KFRAME_DEFAULT_JPEG_QUALITY", "300"),
            ("KFRAME_SEEK_THRESHOLD_FRAMES", "-1"),
        ]));
        assert_eq!(config.defaults.max_frames, 100);
        assert_eq!(config.defaults.jpeg_quality, 95);
        assert_eq!(config.seek_threshold_frames, 48);
    }
}
