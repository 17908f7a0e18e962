//! Detector trait and registry.

use std::sync::Arc;

use thiserror::Error;

use crate::event::FileEvent;
use crate::operation::FileOperation;

/// Failure reported by a detector.
///
/// A failing detector is logged and skipped by the orchestrator; it never
/// aborts detection of the surrounding group.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DetectorError {
    /// The detector could not evaluate the group.
    #[error("detector failed: {message}")]
    Failed {
        /// Human-readable description of what went wrong.
        message: String,
    },
}

impl DetectorError {
    /// Creates a failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// A pluggable pattern matcher scoring one group of events against one
/// operation pattern.
///
/// Detectors are expected to be fast, synchronous and pure over the event
/// slice they are handed. `Send + Sync` so an embedding application may wrap
/// the engine in its own lock.
pub trait Detector: Send + Sync {
    /// Name used in logs when this detector fails.
    fn name(&self) -> &str;

    /// Evaluation priority; higher runs earlier. Defaults to `0`.
    fn priority(&self) -> i32 {
        0
    }

    /// Scores the event group, returning a detected operation or `None` when
    /// the pattern does not apply.
    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError>;
}

/// Holds the detectors available to the orchestrator.
///
/// Registration order is preserved; the orchestrator sorts by descending
/// priority with a stable sort, so registration order breaks priority ties.
#[derive(Clone)]
pub struct DetectorRegistry {
    entries: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a detector at the end of the registration order.
    pub fn register(&mut self, detector: Arc<dyn Detector>) {
        self.entries.push(detector);
    }

    /// All registered detectors in registration order.
    #[must_use]
    pub fn detectors(&self) -> &[Arc<dyn Detector>] {
        &self.entries
    }

    /// Number of registered detectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no detectors are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DetectorRegistry {
    /// Registry pre-populated with the built-in detectors.
    fn default() -> Self {
        crate::detectors::builtin_registry()
    }
}

impl std::fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field(
                "detectors",
                &self.entries.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
