//! Video source boundary for the keyframe pipeline.
//!
//! This crate provides:
//! - The [`VideoSource`] / [`VideoSourceOpener`] traits
//! - An FFmpeg CLI backed source decoding packed RGB24 frames
//! - FFprobe video information
//! - JPEG encoding of decoded frames
//! - Atomic file writes

pub mod command;
pub mod encode;
pub mod error;
pub mod ffmpeg_source;
pub mod fs_utils;
pub mod probe;
pub mod source;

#[cfg(any(test, feature = "test-util"))]
pub mod synthetic;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use encode::encode_jpeg;
pub use error::{MediaError, MediaResult};
pub use ffmpeg_source::{FfmpegSourceOpener, FfmpegVideoSource};
pub use fs_utils::write_atomic;
pub use probe::{probe_video, VideoInfo};
pub use source::{RawFrame, StreamInfo, VideoSource, VideoSourceOpener};
