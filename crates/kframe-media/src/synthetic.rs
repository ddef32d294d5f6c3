//! In-memory synthetic video source for tests.
//!
//! Frame `n` is a solid RGB24 image whose every byte is `n % 256`, so decoded
//! output can be traced back to its frame index.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{MediaError, MediaResult};
use crate::source::{RawFrame, StreamInfo, VideoSource, VideoSourceOpener};

/// Counters shared by every source an opener hands out.
#[derive(Debug, Default)]
pub struct SourceStats {
    pub opened: AtomicUsize,
    pub released: AtomicUsize,
    pub seeks: AtomicUsize,
    pub reads: AtomicUsize,
}

impl SourceStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Opener producing [`SyntheticVideoSource`]s.
#[derive(Debug, Clone)]
pub struct SyntheticOpener {
    info: StreamInfo,
    fail_at_frame: Option<u64>,
    fail_open: bool,
    stats: Arc<SourceStats>,
}

impl SyntheticOpener {
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u64) -> Self {
        Self {
            info: StreamInfo {
                width,
                height,
                fps,
                frame_count,
            },
            fail_at_frame: None,
            fail_open: false,
            stats: Arc::new(SourceStats::default()),
        }
    }

    /// Reading `frame_index` fails with a decode error.
    pub fn failing_at(mut self, frame_index: u64) -> Self {
        self.fail_at_frame = Some(frame_index);
        self
    }

    /// Opening fails with an invalid-video error.
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn stats(&self) -> Arc<SourceStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl VideoSourceOpener for SyntheticOpener {
    async fn open(&self, _path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        if self.fail_open {
            return Err(MediaError::InvalidVideo("synthetic open failure".to_string()));
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SyntheticVideoSource {
            info: self.info,
            fail_at_frame: self.fail_at_frame,
            position: 0,
            released: false,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

/// Deterministic in-memory source.
#[derive(Debug)]
pub struct SyntheticVideoSource {
    info: StreamInfo,
    fail_at_frame: Option<u64>,
    position: u64,
    released: bool,
    stats: Arc<SourceStats>,
}

#[async_trait]
impl VideoSource for SyntheticVideoSource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn position(&self) -> u64 {
        self.position
    }

    async fn seek(&mut self, frame_index: u64) -> MediaResult<()> {
        if self.released {
            return Err(MediaError::Released);
        }
        self.stats.seeks.fetch_add(1, Ordering::SeqCst);
        self.position = frame_index;
        Ok(())
    }

    async fn read_frame(&mut self) -> MediaResult<Option<RawFrame>> {
        if self.released {
            return Err(MediaError::Released);
        }
        let index = self.position;
        if self.fail_at_frame == Some(index) {
            return Err(MediaError::decode_failed(index, "synthetic decode failure"));
        }
        if index >= self.info.frame_count {
            return Ok(None);
        }
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        self.position += 1;
        let data = vec![(index % 256) as u8; self.info.frame_len()];
        Ok(Some(RawFrame::new(
            index,
            self.info.width,
            self.info.height,
            data,
        )))
    }

    async fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticVideoSource {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.stats.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}
