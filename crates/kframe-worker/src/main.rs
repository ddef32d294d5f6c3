//! Keyframe extraction worker binary.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kframe_media::FfmpegSourceOpener;
use kframe_models::{ProcessingOverrides, ProgressEvent, VideoId};
use kframe_worker::{metrics, LeadPipeline, SidecarDetectionStage, WorkerConfig};

#[derive(Parser, Debug)]
#[command(
    name = "kframe-worker",
    about = "Extract ranked, deduplicated keyframes from a video"
)]
struct Args {
    /// Video file to process
    video_path: PathBuf,

    /// Run identifier (random when omitted)
    #[arg(long)]
    video_id: Option<String>,

    /// Detections file (defaults to <video_path>.detections.json)
    #[arg(long, value_name = "PATH")]
    detections: Option<PathBuf>,

    /// Output root directory
    #[arg(long, value_name = "DIR", env = "KFRAME_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum keyframes to extract
    #[arg(long)]
    max_frames: Option<usize>,

    /// Deduplication window in seconds
    #[arg(long)]
    time_threshold: Option<f64>,

    /// JPEG quality (0-100)
    #[arg(long)]
    jpeg_quality: Option<u8>,

    /// Analyze every Nth frame
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Minimum detection confidence
    #[arg(long)]
    confidence_threshold: Option<f64>,
}

impl Args {
    fn overrides(&self) -> ProcessingOverrides {
        ProcessingOverrides {
            sample_rate: self.sample_rate,
            max_frames: self.max_frames,
            confidence_threshold: self.confidence_threshold,
            time_threshold: self.time_threshold,
            jpeg_quality: self.jpeg_quality,
            weights: None,
        }
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kframe_worker=info,kframe_extract=info,kframe_media=info"));

    // Logs go to stderr; stdout carries the run report
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();

    let mut config = WorkerConfig::from_env();
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    info!("Worker config: {:?}", config);

    let metrics_handle = if config.metrics_enabled {
        match metrics::init_metrics() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    let detection = match &args.detections {
        Some(path) => SidecarDetectionStage::with_path(path),
        None => SidecarDetectionStage::new(),
    };

    let pipeline = match LeadPipeline::from_config(
        &config,
        Arc::new(detection),
        Arc::new(FfmpegSourceOpener::new()),
    ) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create pipeline: {}", e);
            std::process::exit(1);
        }
    };

    let video_id = args
        .video_id
        .clone()
        .map(VideoId::from)
        .unwrap_or_default();

    let on_progress = |event: ProgressEvent| {
        info!(stage = %event.stage, percent = event.percent, "Progress");
    };

    let report = pipeline
        .run(&args.video_path, &video_id, &args.overrides(), Some(&on_progress))
        .await;

    if let Some(handle) = metrics_handle {
        info!("Metrics snapshot:\n{}", handle.render());
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize run report: {}", e),
    }

    if !report.is_success() {
        std::process::exit(1);
    }
}
