//! Per-run processing configuration.
//!
//! A [`ProcessingConfig`] is the fully-resolved parameter set of one run. Callers
//! supply [`ProcessingOverrides`], which are merged field by field over the
//! process-wide defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};


pub const DEFAULT_SAMPLE_RATE: u32 = 1;
pub const DEFAULT_MAX_FRAMES: usize = 100;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;
pub const DEFAULT_TIME_THRESHOLD: f64 = 1.0;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the four scoring criteria. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringWeights {
    pub size: f64,
    pub confidence: f64,
    pub centrality: f64,
    pub stability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            size: 0.4,
            confidence: 0.3,
            centrality: 0.2,
            stability: 0.1,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.size + self.confidence + self.centrality + self.stability
    }

    pub fn validate(&self) -> Result<(), String> {
        let all = [self.size, self.confidence, self.centrality, self.stability];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("scoring weights must be finite and non-negative".to_string());
        }
        if (self.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(format!(
                "scoring weights must sum to 1.0, got {:.6}",
                self.sum()
            ));
        }
        Ok(())
    }
}

/// Resolved run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingConfig {
    /// Analyze every Nth frame (detector concern)
    pub sample_rate: u32,
    /// Upper bound on keyframes per run
    pub max_frames: usize,
    /// Minimum detector confidence (detector concern)
    pub confidence_threshold: f64,
    /// Deduplication window in seconds
    pub time_threshold: f64,
    /// JPEG quality, 0-100
    pub jpeg_quality: u8,
    #[serde(default)]
    pub weights: ScoringWeights,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_frames: DEFAULT_MAX_FRAMES,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            time_threshold: DEFAULT_TIME_THRESHOLD,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            weights: ScoringWeights::default(),
        }
    }
}

impl ProcessingConfig {
    /// Apply caller overrides over `self`. Caller values win per key.
    pub fn merge(&self, overrides: &ProcessingOverrides) -> Self {
        Self {
            sample_rate: overrides.sample_rate.unwrap_or(self.sample_rate),
            max_frames: overrides.max_frames.unwrap_or(self.max_frames),
            confidence_threshold: overrides
                .confidence_threshold
                .unwrap_or(self.confidence_threshold),
            time_threshold: overrides.time_threshold.unwrap_or(self.time_threshold),
            jpeg_quality: overrides.jpeg_quality.unwrap_or(self.jpeg_quality),
            weights: overrides.weights.unwrap_or(self.weights),
        }
    }

    /// Validate the resolved parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample_rate must be at least 1".to_string());
        }
        if self.max_frames == 0 {
            return Err("max_frames must be at least 1".to_string());
        }
        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !self.time_threshold.is_finite() || self.time_threshold <= 0.0 {
            return Err(format!(
                "time_threshold must be a positive number of seconds, got {}",
                self.time_threshold
            ));
        }
        if self.jpeg_quality > 100 {
            return Err(format!(
                "jpeg_quality must be within [0, 100], got {}",
                self.jpeg_quality
            ));
        }
        self.weights.validate()
    }
}

/// Caller-supplied partial configuration. `None` keeps the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frames: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jpeg_quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<ScoringWeights>,
}

impl ProcessingOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ProcessingConfig::default();
        assert_eq!(cfg.sample_rate, 1);
        assert_eq!(cfg.max_frames, 100);
        assert_eq!(cfg.confidence_threshold, 0.5);
        assert_eq!(cfg.time_threshold, 1.0);
        assert_eq!(cfg.jpeg_quality, 95);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_merge_caller_wins_per_key() {
        let defaults = ProcessingConfig::default();
        let overrides = ProcessingOverrides {
            max_frames: Some(5),
            jpeg_quality: Some(80),
            ..Default::default()
        };
        let merged = defaults.merge(&overrides);
        assert_eq!(merged.max_frames, 5);
        assert_eq!(merged.jpeg_quality, 80);
        assert_eq!(merged.time_threshold, defaults.time_threshold);
        assert_eq!(merged.sample_rate, defaults.sample_rate);
        // merge is pure
        assert_eq!(defaults, ProcessingConfig::default());
    }

    #[test]
    fn test_empty_overrides_keep_defaults() {
        let defaults = ProcessingConfig::default();
        assert!(ProcessingOverrides::default().is_empty());
        assert_eq!(defaults.merge(&ProcessingOverrides::default()), defaults);
    }

    #[test]
    fn test_overrides_deserialize_partial() {
        let o: ProcessingOverrides = serde_json::from_str(r#"{"time_threshold":2.5}"#).unwrap();
        assert_eq!(o.time_threshold, Some(2.5));
        assert!(o.max_frames.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = ProcessingConfig::default();
        let cases = [
            ProcessingConfig { sample_rate: 0, ..base },
            ProcessingConfig { max_frames: 0, ..base },
            ProcessingConfig { time_threshold: 0.0, ..base },
            ProcessingConfig { time_threshold: f64::NAN, ..base },
            ProcessingConfig { confidence_threshold: 1.5, ..base },
            ProcessingConfig { jpeg_quality: 101, ..base },
        ];
        for cfg in cases {
            assert!(cfg.validate().is_err(), "expected rejection: {:?}", cfg);
        }
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let w = ScoringWeights {
            size: 0.5,
            ..Default::default()
        };
        assert!(w.validate().is_err());

        let negative = ScoringWeights {
            size: 0.6,
            confidence: 0.5,
            centrality: -0.2,
            stability: 0.1,
        };
        assert!(negative.validate().is_err());
        assert!(ScoringWeights::default().validate().is_ok());
    }
}
