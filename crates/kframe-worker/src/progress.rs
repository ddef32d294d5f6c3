//! Progress sinks and stage-scoped progress reporting.
//!
//! Per stage the reporter emits `0`, then strictly increasing intermediate
//! percentages in `1..=99`, then exactly one `100`.

use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::mpsc::UnboundedSender;

use kframe_models::{ProgressEvent, Stage};

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink(UnboundedSender<ProgressEvent>);

impl ChannelSink {
    pub fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self(tx)
    }
}

impl From<UnboundedSender<ProgressEvent>> for ChannelSink {
    fn from(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self(tx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.0.send(event);
    }
}

/// Reports progress for one stage.
pub struct StageReporter<'a> {
    sink: Option<&'a dyn ProgressSink>,
    stage: Stage,
    last: AtomicU8,
}

impl<'a> StageReporter<'a> {
    pub fn new(sink: Option<&'a dyn ProgressSink>, stage: Stage) -> Self {
        Self {
            sink,
            stage,
            last: AtomicU8::new(0),
        }
    }

    pub fn start(&self) {
        self.send(0);
    }

    /// Report `current` of `total` units done. Only strictly increasing
    /// percentages below 100 are forwarded.
    pub fn update(&self, current: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = ((current.min(total) as u128 * 100) / total as u128).clamp(1, 99) as u8;
        let previous = self.last.fetch_max(percent, Ordering::SeqCst);
        if percent > previous {
            self.send(percent);
        }
    }

    pub fn finish(&self) {
        self.last.store(100, Ordering::SeqCst);
        self.send(100);
    }

    fn send(&self, percent: u8) {
        if let Some(sink) = self.sink {
            sink.emit(ProgressEvent::new(self.stage, percent));
        }
    }
}
