//! Detection stage boundary.
//!
//! Person detection itself runs outside this crate. A [`DetectionStage`]
//! hands the pipeline the detection stream for a video.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use kframe_models::{Detection, ProcessingConfig};

use crate::error::{DetectionError, ProcessingError};

/// Detection progress callback: `(current, total)`.
pub type DetectionProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Detector-side parameters of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Analyze every Nth frame
    pub sample_rate: u32,
    /// Drop detections below this confidence
    pub confidence_threshold: f64,
}

impl From<&ProcessingConfig> for DetectionParams {
    fn from(config: &ProcessingConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            confidence_threshold: config.confidence_threshold,
        }
    }
}

/// Produces the detection stream of a video.
#[async_trait]
pub trait DetectionStage: Send + Sync {
    /// Detect people in `video_path`, returning detections in frame order.
    async fn detect(
        &self,
        video_path: &Path,
        params: DetectionParams,
        progress: Option<DetectionProgress<'_>>,
    ) -> Result<Vec<Detection>, DetectionError>;

    /// Stage name for logging.
    fn name(&self) -> &'static str;
}

/// Suffix of the detections file written next to a video.
pub const SIDECAR_SUFFIX: &str = ".detections.json";

/// Reads detections an external detector wrote as a JSON array of
/// [`Detection`] records.
#[derive(Debug, Clone, Default)]
pub struct SidecarDetectionStage {
    path: Option<PathBuf>,
}

impl SidecarDetectionStage {
    /// Read `<video>.detections.json` next to each video.
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Read detections from a fixed file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Detections file used for `video_path`.
    pub fn sidecar_path(&self, video_path: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => {
                let mut name = video_path.as_os_str().to_owned();
                name.push(SIDECAR_SUFFIX);
                PathBuf::from(name)
            }
        }
    }
}

#[async_trait]
impl DetectionStage for SidecarDetectionStage {
    async fn detect(
        &self,
        video_path: &Path,
        params: DetectionParams,
        progress: Option<DetectionProgress<'_>>,
    ) -> Result<Vec<Detection>, DetectionError> {
        let path = self.sidecar_path(video_path);
        debug!(path = %path.display(), "Reading detections");

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            ProcessingError::wrap(
                format!("Cannot read detections file {}: {}", path.display(), e),
                e,
            )
        })?;

        let records: Vec<Detection> = serde_json::from_slice(&bytes).map_err(|e| {
            ProcessingError::wrap(
                format!("Corrupt detections file {}: {}", path.display(), e),
                e,
            )
        })?;

        let sample_rate = u64::from(params.sample_rate.max(1));
        let total = records.len() as u64;
        let mut detections = Vec::with_capacity(records.len());

        for (i, detection) in records.into_iter().enumerate() {
            if detection.frame_index % sample_rate == 0
                && detection.confidence >= params.confidence_threshold
            {
                detections.push(detection);
            }
            if let Some(progress) = progress {
                progress(i as u64 + 1, total);
            }
        }

        detections.sort_by_key(|d| d.frame_index);

        info!(
            total,
            kept = detections.len(),
            sample_rate,
            confidence_threshold = params.confidence_threshold,
            "Loaded detections"
        );
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "sidecar"
    }
}
