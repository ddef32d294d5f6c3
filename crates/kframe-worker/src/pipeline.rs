//! Lead pipeline: sequences detection and extraction for one video.
//!
//! A run validates its input, merges per-run overrides over the process-wide
//! defaults, detects, extracts, aggregates a [`ProcessingResult`], persists
//! the run-level record and finally reports `complete`. Failures follow the
//! stage policy in [`crate::error`].

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use kframe_extract::{ExtractionSettings, KeyframeExtractor};
use kframe_media::{VideoSource, VideoSourceOpener};
use kframe_models::{
    ProcessingConfig, ProcessingOverrides, ProcessingResult, ProgressEvent, RunReport, Stage,
    VideoId, VideoLayout,
};

use crate::config::WorkerConfig;
use crate::detection::{DetectionParams, DetectionStage};
use crate::error::{resolve_stage_failure, PipelineError, PipelineResult, ProcessingError, StageFailure};
use crate::logging::RunLogger;
use crate::metrics;
use crate::progress::{ProgressSink, StageReporter};
use crate::run_metadata::write_run_metadata;
use crate::state::{RunState, RunStateMachine};

/// Orchestrates detection and extraction runs.
///
/// Holds no per-run state; independent runs may execute concurrently.
pub struct LeadPipeline {
    detection: Arc<dyn DetectionStage>,
    opener: Arc<dyn VideoSourceOpener>,
    extractor: KeyframeExtractor,
    defaults: ProcessingConfig,
}

impl LeadPipeline {
    pub fn new(
        detection: Arc<dyn DetectionStage>,
        opener: Arc<dyn VideoSourceOpener>,
        extractor: KeyframeExtractor,
        defaults: ProcessingConfig,
    ) -> Self {
        Self {
            detection,
            opener,
            extractor,
            defaults,
        }
    }

    /// Build a pipeline from worker configuration.
    pub fn from_config(
        config: &WorkerConfig,
        detection: Arc<dyn DetectionStage>,
        opener: Arc<dyn VideoSourceOpener>,
    ) -> PipelineResult<Self> {
        let settings = ExtractionSettings::from_config(&config.defaults)
            .with_seek_threshold(config.seek_threshold_frames);
        let extractor = KeyframeExtractor::new(&config.output_dir, settings)?;
        Ok(Self::new(detection, opener, extractor, config.defaults))
    }

    pub fn defaults(&self) -> &ProcessingConfig {
        &self.defaults
    }

    /// Process one video end to end.
    pub async fn process_video(
        &self,
        video_path: &Path,
        video_id: &VideoId,
        overrides: &ProcessingOverrides,
        progress: Option<&dyn ProgressSink>,
    ) -> PipelineResult<ProcessingResult> {
        let logger = RunLogger::new(video_id, video_path);
        let span = logger.create_span();

        async {
            let clock = Instant::now();
            let mut machine = RunStateMachine::new();
            logger.log_start(self.detection.name());

            let outcome = self
                .run_stages(&mut machine, &logger, video_path, video_id, overrides, progress)
                .await;

            let elapsed = clock.elapsed().as_secs_f64();
            match &outcome {
                Ok(result) => {
                    metrics::record_run_completed(result.keyframes_extracted, elapsed);
                    logger.log_completion(result.keyframes_extracted, elapsed);
                }
                Err(e) => {
                    machine.fail();
                    metrics::record_run_failed(e.failure_label(), elapsed);
                    logger.log_error(e.stage(), &e.to_string());
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Process one video and fold any failure into a [`RunReport`].
    pub async fn run(
        &self,
        video_path: &Path,
        video_id: &VideoId,
        overrides: &ProcessingOverrides,
        progress: Option<&dyn ProgressSink>,
    ) -> RunReport {
        match self
            .process_video(video_path, video_id, overrides, progress)
            .await
        {
            Ok(result) => RunReport::Completed(result.summary()),
            Err(e) => RunReport::failed(video_id.clone(), e.to_string(), e.stage()),
        }
    }

    async fn run_stages(
        &self,
        machine: &mut RunStateMachine,
        logger: &RunLogger,
        video_path: &Path,
        video_id: &VideoId,
        overrides: &ProcessingOverrides,
        progress: Option<&dyn ProgressSink>,
    ) -> PipelineResult<ProcessingResult> {
        let started_at = Utc::now();
        let clock = Instant::now();

        machine.advance(RunState::ValidatingInput)?;
        if !video_path.exists() {
            return Err(PipelineError::NotFound(video_path.to_path_buf()));
        }

        let config = self.defaults.merge(overrides);
        config
            .validate()
            .map_err(|m| ProcessingError::new(format!("Invalid processing config: {}", m)))?;

        let total_frames = self.total_frames(video_path).await?;

        // Detection
        machine.advance(RunState::Detecting)?;
        logger.log_stage(Stage::Detection, self.detection.name());
        let reporter = StageReporter::new(progress, Stage::Detection);
        reporter.start();
        let on_detect = |current: u64, total: u64| reporter.update(current, total);
        let detections = self
            .detection
            .detect(video_path, DetectionParams::from(&config), Some(&on_detect))
            .await
            .map_err(|e| resolve_stage_failure(Stage::Detection, StageFailure::from(e)))?;
        reporter.finish();

        // Extraction
        machine.advance(RunState::Extracting)?;
        logger.log_stage(
            Stage::Extraction,
            &format!("{} detections", detections.len()),
        );
        let reporter = StageReporter::new(progress, Stage::Extraction);
        reporter.start();
        let settings = ExtractionSettings::from_config(&config)
            .with_seek_threshold(self.extractor.settings().seek_threshold_frames);
        let extractor = self
            .extractor
            .with_settings(settings)
            .map_err(|e| resolve_stage_failure(Stage::Extraction, StageFailure::from(e)))?;
        let on_frame = |done: usize, total: usize| reporter.update(done as u64, total as u64);
        let extraction = extractor
            .extract(
                self.opener.as_ref(),
                video_path,
                &detections,
                video_id,
                Some(&on_frame),
            )
            .await
            .map_err(|e| resolve_stage_failure(Stage::Extraction, StageFailure::from(e)))?;
        reporter.finish();

        // Aggregation
        machine.advance(RunState::Aggregating)?;
        let layout = VideoLayout::new(self.extractor.output_dir(), video_id);
        let result = ProcessingResult {
            video_id: video_id.clone(),
            video_path: video_path.to_path_buf(),
            total_frames,
            total_detections: detections.len(),
            keyframes_extracted: extraction.keyframes.len(),
            processing_time_seconds: clock.elapsed().as_secs_f64(),
            output_dir: extraction.output_dir,
            keyframes_dir: extraction.keyframes_dir,
            metadata_path: extraction.metadata_path,
            config,
            keyframes: extraction.keyframes,
            started_at,
            completed_at: Utc::now().max(started_at),
        };
        write_run_metadata(&layout.processing_path(), &result).await?;

        machine.advance(RunState::Complete)?;
        if let Some(sink) = progress {
            sink.emit(ProgressEvent::finished(Stage::Complete));
        }
        Ok(result)
    }

    /// Frame count reported by the video source. Statistics only.
    async fn total_frames(&self, video_path: &Path) -> PipelineResult<u64> {
        let mut source = self.opener.open(video_path).await.map_err(|e| {
            ProcessingError::wrap(
                format!("Cannot open video file: {}: {}", video_path.display(), e),
                e,
            )
        })?;
        let frame_count = source.info().frame_count;
        source.release().await;
        Ok(frame_count)
    }
}
