//! Push-style auto-flushing event buffer.
//!
//! Owns the flush cadence for live watcher ingestion so the orchestrator
//! does not have to. Bare temp-file bursts that analyze to nothing are held
//! back instead of dropped, giving the write-then-rename pattern a chance to
//! complete before the buffer expires.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::detector::OperationCallback;
use crate::event::FileEvent;
use crate::operation::FileOperation;
use crate::temp::is_temp_file;

/// Analysis function supplied by the orchestrator.
pub type AnalyzeFn = Box<dyn Fn(&[FileEvent]) -> Option<FileOperation> + Send + Sync>;

/// Buffers pushed events and flushes them through an analysis function once
/// the flush window has elapsed.
pub struct AutoFlush {
    window_ms: i64,
    analyze: AnalyzeFn,
    on_complete: Option<OperationCallback>,
    pending: Vec<FileEvent>,
    window_start: Option<DateTime<Utc>>,
}

impl AutoFlush {
    /// Creates a buffer flushing every `window_ms` milliseconds through
    /// `analyze`, reporting completed operations to `on_complete`.
    #[must_use]
    pub fn new(window_ms: i64, analyze: AnalyzeFn, on_complete: Option<OperationCallback>) -> Self {
        Self {
            window_ms,
            analyze,
            on_complete,
            pending: Vec::new(),
            window_start: None,
        }
    }

    /// Buffers `event`, flushing first if the window has elapsed.
    pub fn add_event(&mut self, event: FileEvent) {
        self.add_event_at(event, Utc::now());
    }

    /// [`Self::add_event`] with an injected clock, for tests and replay.
    pub fn add_event_at(&mut self, event: FileEvent, now: DateTime<Utc>) {
        self.pending.push(event);
        let window_start = *self.window_start.get_or_insert(now);
        let elapsed = (now - window_start).num_milliseconds();
        if elapsed < self.window_ms {
            return;
        }

        if let Some(operation) = (self.analyze)(&self.pending) {
            self.complete(&operation);
            self.reset();
            return;
        }

        // A burst of bare temp-file events often precedes the rename that
        // resolves it. Hold the buffer one extra window before giving up.
        if elapsed < self.window_ms * 2 && self.pending.iter().all(is_temp_event) {
            return;
        }

        debug!(pending = self.pending.len(), "discarding unresolved event buffer");
        self.reset();
    }

    /// Forces analysis of whatever is pending, regardless of the window.
    pub fn flush(&mut self) -> Option<FileOperation> {
        if self.pending.is_empty() {
            return None;
        }
        let operation = (self.analyze)(&self.pending);
        if let Some(operation) = &operation {
            self.complete(operation);
        }
        self.reset();
        operation
    }

    /// Number of buffered events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn complete(&self, operation: &FileOperation) {
        if let Some(callback) = &self.on_complete {
            callback(operation);
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.window_start = None;
    }
}

fn is_temp_event(event: &FileEvent) -> bool {
    is_temp_file(&event.path) && event.dest_path.as_deref().is_none_or(is_temp_file)
}
