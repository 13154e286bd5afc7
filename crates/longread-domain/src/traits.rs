//! Trait definitions for the callbacks the engine drives
//!
//! These traits are the boundary between orchestration and presentation.
//! Implementations live with the caller (CLI, UI, tests).

use crate::ChunkStatus;

/// Receives the cumulative transcript of a run
///
/// Called once per streamed increment with the running total, not the delta.
pub trait StreamSink {
    /// The transcript so far
    fn on_update(&mut self, total: &str);
}

impl<F> StreamSink for F
where
    F: FnMut(&str),
{
    fn on_update(&mut self, total: &str) {
        self(total)
    }
}

/// Receives per-chunk progress of the digest flow
pub trait ChunkObserver {
    /// A chunk changed status
    fn on_status(&mut self, index: usize, status: ChunkStatus);

    /// A chunk's summary grew; `total` is the summary so far
    fn on_summary(&mut self, _index: usize, _total: &str) {}
}

/// Sink that ignores every callback
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl StreamSink for NoopSink {
    fn on_update(&mut self, _total: &str) {}
}

impl ChunkObserver for NoopSink {
    fn on_status(&mut self, _index: usize, _status: ChunkStatus) {}
}
