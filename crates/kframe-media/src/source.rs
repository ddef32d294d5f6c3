//! Video source abstraction.
//!
//! A [`VideoSource`] is an exclusively owned, seekable decoder handle for one
//! video file. Handles must be released with [`VideoSource::release`] on every
//! exit path; implementations also release on drop.

use async_trait::async_trait;
use std::path::Path;

use crate::error::MediaResult;

/// Stream properties reported by an open source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub frame_count: u64,
}

impl StreamInfo {
    /// Size in bytes of one packed RGB24 frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn has_valid_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One decoded frame, packed RGB24.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub frame_index: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn new(frame_index: u64, width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            frame_index,
            width,
            height,
            data,
        }
    }

    /// Whether `data` holds exactly `width * height * 3` bytes.
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * 3
    }
}

/// Seekable, single-owner frame decoder.
#[async_trait]
pub trait VideoSource: Send {
    /// Stream properties.
    fn info(&self) -> StreamInfo;

    /// Index of the frame the next [`read_frame`](Self::read_frame) returns.
    fn position(&self) -> u64;

    /// Position the decoder so the next read returns `frame_index`.
    async fn seek(&mut self, frame_index: u64) -> MediaResult<()>;

    /// Decode the frame at the current position and advance by one.
    /// Returns `None` at end of stream.
    async fn read_frame(&mut self) -> MediaResult<Option<RawFrame>>;

    /// Release the decoder. Idempotent.
    async fn release(&mut self);
}

/// Opens [`VideoSource`]s. Shared across runs, each run opens its own source.
#[async_trait]
pub trait VideoSourceOpener: Send + Sync {
    /// Open `path` for decoding.
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
