//! Keyframe extraction pipeline.
//!
//! collect -> score -> deduplicate -> select -> materialize -> metadata

use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use kframe_media::{VideoSource, VideoSourceOpener};
use kframe_models::keyframe::ExtractionMetadata;
use kframe_models::{
    Detection, ExtractionParams, Keyframe, ProcessingConfig, ScoringWeights, VideoId, VideoLayout,
};

use crate::candidate::collect_candidates;
use crate::dedup::deduplicate;
use crate::error::{ExtractResult, ExtractionError};
use crate::materializer::{FrameMaterializer, FrameProgress, DEFAULT_SEEK_THRESHOLD_FRAMES};
use crate::metadata::write_metadata;
use crate::scorer::FrameScorer;
use crate::selector::select_top;

/// Parameters of one extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractionSettings {
    pub max_frames: usize,
    pub time_threshold: f64,
    pub jpeg_quality: u8,
    pub weights: ScoringWeights,
    /// Forward gap, in frames, decoded through instead of seeked
    pub seek_threshold_frames: u64,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&ProcessingConfig::default())
    }
}

impl ExtractionSettings {
    /// Take the extraction-relevant fields of a resolved run config.
    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self {
            max_frames: config.max_frames,
            time_threshold: config.time_threshold,
            jpeg_quality: config.jpeg_quality,
            weights: config.weights,
            seek_threshold_frames: DEFAULT_SEEK_THRESHOLD_FRAMES,
        }
    }

    pub fn with_seek_threshold(mut self, frames: u64) -> Self {
        self.seek_threshold_frames = frames;
        self
    }

    pub fn params(&self) -> ExtractionParams {
        ExtractionParams {
            max_frames: self.max_frames,
            time_threshold: self.time_threshold,
            jpeg_quality: self.jpeg_quality,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_frames == 0 {
            return Err("max_frames must be at least 1".to_string());
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

/// Output of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Keyframes in selection order (highest score first)
    pub keyframes: Vec<Keyframe>,
    /// `<output_dir>/video-<video_id>`
    pub output_dir: PathBuf,
    pub keyframes_dir: PathBuf,
    pub metadata_path: PathBuf,
    /// Candidates left after scoring
    pub candidates_scored: usize,
    /// Candidates left after deduplication
    pub candidates_unique: usize,
}

/// Extracts keyframes for one video at a time.
#[derive(Debug, Clone)]
pub struct KeyframeExtractor {
    output_dir: PathBuf,
    settings: ExtractionSettings,
}

impl KeyframeExtractor {
    /// Create an extractor writing under `output_dir`, creating it if needed.
    pub fn new(output_dir: impl Into<PathBuf>, settings: ExtractionSettings) -> ExtractResult<Self> {
        settings.validate().map_err(ExtractionError::InvalidParams)?;
        let output_dir = output_dir.into();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            settings,
        })
    }

    /// Same output directory, different per-run settings.
    pub fn with_settings(&self, settings: ExtractionSettings) -> ExtractResult<Self> {
        settings.validate().map_err(ExtractionError::InvalidParams)?;
        Ok(Self {
            output_dir: self.output_dir.clone(),
            settings,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn settings(&self) -> &ExtractionSettings {
        &self.settings
    }

    /// Run the full extraction for `video_path`.
    ///
    /// The video source is opened once and released on every exit path.
    /// Any frame failure aborts the run before `metadata.json` is written.
    pub async fn extract(
        &self,
        opener: &dyn VideoSourceOpener,
        video_path: &Path,
        detections: &[Detection],
        video_id: &VideoId,
        progress: Option<FrameProgress<'_>>,
    ) -> ExtractResult<ExtractionResult> {
        let start = Instant::now();
        info!(
            video_id = %video_id,
            detections = detections.len(),
            max_frames = self.settings.max_frames,
            "Starting keyframe extraction"
        );

        if !video_path.exists() {
            return Err(ExtractionError::source(format!(
                "Video file not found: {}",
                video_path.display()
            )));
        }

        let mut source = opener.open(video_path).await.map_err(|e| {
            ExtractionError::source(format!("Failed to read video: {}", e))
        })?;

        let result = self
            .extract_with_source(source.as_mut(), video_path, detections, video_id, progress)
            .await;

        source.release().await;

        if let Ok(ref r) = result {
            info!(
                video_id = %video_id,
                keyframes = r.keyframes.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Keyframe extraction complete"
            );
        }
        result
    }

    async fn extract_with_source(
        &self,
        source: &mut dyn VideoSource,
        video_path: &Path,
        detections: &[Detection],
        video_id: &VideoId,
        progress: Option<FrameProgress<'_>>,
    ) -> ExtractResult<ExtractionResult> {
        let info = source.info();
        if !info.has_valid_dimensions() {
            return Err(ExtractionError::source(format!(
                "Invalid video dimensions: {}x{}",
                info.width, info.height
            )));
        }

        let layout = VideoLayout::new(&self.output_dir, video_id);
        let keyframes_dir = layout.keyframes_dir();
        tokio::fs::create_dir_all(&keyframes_dir).await?;

        let candidates = collect_candidates(detections);
        debug!(count = candidates.len(), "Collected candidate frames");

        let (scored_count, unique_count, keyframes) = if candidates.is_empty() {
            warn!(video_id = %video_id, "No candidates found, writing empty keyframe set");
            (0, 0, Vec::new())
        } else {
            let scorer = FrameScorer::new(self.settings.weights, info.width, info.height);
            let scored = scorer.score_all(candidates);
            let scored_count = scored.len();

            let unique = deduplicate(scored, self.settings.time_threshold);
            let unique_count = unique.len();

            let selected = select_top(unique, self.settings.max_frames);
            info!(
                scored = scored_count,
                unique = unique_count,
                selected = selected.len(),
                "Selected keyframes for extraction"
            );

            let materializer = FrameMaterializer::new(&keyframes_dir, self.settings.jpeg_quality)
                .with_seek_threshold(self.settings.seek_threshold_frames);
            let keyframes = materializer.materialize(source, &selected, progress).await?;
            (scored_count, unique_count, keyframes)
        };

        let metadata_path = layout.metadata_path();
        let metadata = ExtractionMetadata::new(
            video_id.clone(),
            video_path.to_string_lossy(),
            self.settings.params(),
            keyframes,
        );
        write_metadata(&metadata_path, &metadata).await?;

        Ok(ExtractionResult {
            keyframes: metadata.keyframes,
            output_dir: layout.root().to_path_buf(),
            keyframes_dir,
            metadata_path,
            candidates_scored: scored_count,
            candidates_unique: unique_count,
        })
    }
}
