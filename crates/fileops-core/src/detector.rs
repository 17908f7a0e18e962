//! Operation detection orchestrator.
//!
//! Runs registered detectors over time-windowed event groups, keeps the
//! best-scoring result per group, and validates that the winner's primary
//! path is a real file rather than a temp artifact.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::autoflush::AutoFlush;
use crate::event::FileEvent;
use crate::grouper::group_events_by_time;
use crate::operation::FileOperation;
use crate::registry::DetectorRegistry;
use crate::temp::{extract_base_name, is_temp_file};

/// Confidence at or above which the detector loop stops early.
///
/// Detectors run in priority order, so a match this strong cannot be
/// displaced by anything later in the loop worth paying for.
pub const HIGH_CONFIDENCE: f32 = 0.95;

/// Callback invoked when a streaming flush completes an operation.
pub type OperationCallback = Arc<dyn Fn(&FileOperation) + Send + Sync>;

/// Configuration for operation detection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Grouping window and streaming flush interval in milliseconds.
    /// Default: 500.
    pub time_window_ms: i64,

    /// Operations scoring below this are discarded. Default: 0.5.
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            time_window_ms: 500,
            min_confidence: 0.5,
        }
    }
}

/// Classifies raw filesystem events into semantic file operations.
///
/// Holds mutable streaming state (pending buffer, last-flush timestamp) with
/// no internal synchronization; the `&mut self` streaming entry points make
/// the caller responsible for serializing access.
pub struct OperationDetector {
    config: DetectorConfig,
    registry: Arc<DetectorRegistry>,
    on_complete: Option<OperationCallback>,
    pending: Vec<FileEvent>,
    last_flush: Option<DateTime<Utc>>,
    auto_flush: AutoFlush,
}

impl OperationDetector {
    /// Creates a detector with the default config, the built-in detector
    /// registry and no completion callback.
    #[must_use]
    pub fn new() -> Self {
        Self::build(DetectorConfig::default(), Arc::new(DetectorRegistry::default()), None)
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(self, config: DetectorConfig) -> Self {
        Self::build(config, self.registry, self.on_complete)
    }

    /// Replaces the detector registry.
    #[must_use]
    pub fn with_registry(self, registry: Arc<DetectorRegistry>) -> Self {
        Self::build(self.config, registry, self.on_complete)
    }

    /// Sets the callback invoked when a streaming flush completes an operation.
    #[must_use]
    pub fn on_operation_complete(self, callback: OperationCallback) -> Self {
        Self::build(self.config, self.registry, Some(callback))
    }

    fn build(
        config: DetectorConfig,
        registry: Arc<DetectorRegistry>,
        on_complete: Option<OperationCallback>,
    ) -> Self {
        let analyze = {
            let registry = Arc::clone(&registry);
            let config = config.clone();
            Box::new(move |events: &[FileEvent]| analyze_event_group(&registry, &config, events))
        };
        let auto_flush = AutoFlush::new(config.time_window_ms, analyze, on_complete.clone());
        Self {
            config,
            registry,
            on_complete,
            pending: Vec::new(),
            last_flush: None,
            auto_flush,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Batch entry point: sorts events by timestamp, groups them by the
    /// configured time window and returns the best operation of each group
    /// that produced one, in group order.
    #[must_use]
    pub fn detect(&self, mut events: Vec<FileEvent>) -> Vec<FileOperation> {
        events.sort_by_key(|e| e.timestamp);
        group_events_by_time(events, self.config.time_window_ms)
            .iter()
            .filter_map(|group| analyze_event_group(&self.registry, &self.config, group))
            .collect()
    }

    /// Pull-style streaming entry point: buffers `event` and, once the flush
    /// window has elapsed, analyzes the whole buffer as one group.
    pub fn detect_streaming(&mut self, event: FileEvent) -> Option<FileOperation> {
        self.detect_streaming_at(event, Utc::now())
    }

    /// [`Self::detect_streaming`] with an injected clock, for tests and replay.
    pub fn detect_streaming_at(
        &mut self,
        event: FileEvent,
        now: DateTime<Utc>,
    ) -> Option<FileOperation> {
        self.pending.push(event);
        let last_flush = *self.last_flush.get_or_insert(now);
        if (now - last_flush).num_milliseconds() >= self.config.time_window_ms {
            return self.flush_pending(now);
        }
        None
    }

    /// Forces analysis of whatever is pending, even mid-window. Returns the
    /// resulting operation as a zero-or-one element list. Used at drain time.
    pub fn flush(&mut self) -> Vec<FileOperation> {
        self.flush_at(Utc::now())
    }

    /// [`Self::flush`] with an injected clock, for tests and replay.
    pub fn flush_at(&mut self, now: DateTime<Utc>) -> Vec<FileOperation> {
        self.flush_pending(now).into_iter().collect()
    }

    /// Push-style streaming entry point: hands `event` to the auto-flush
    /// collaborator, which owns the flush cadence and reports completed
    /// operations through the completion callback.
    pub fn add_event(&mut self, event: FileEvent) {
        self.auto_flush.add_event(event);
    }

    fn flush_pending(&mut self, now: DateTime<Utc>) -> Option<FileOperation> {
        let events = std::mem::take(&mut self.pending);
        self.last_flush = Some(now);
        let operation = analyze_event_group(&self.registry, &self.config, &events)?;
        if let Some(callback) = &self.on_complete {
            callback(&operation);
        }
        Some(operation)
    }
}

impl Default for OperationDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs all registered detectors over one event group and returns the single
/// best operation, if any survives the confidence floor and path validation.
pub fn analyze_event_group(
    registry: &DetectorRegistry,
    config: &DetectorConfig,
    events: &[FileEvent],
) -> Option<FileOperation> {
    if events.is_empty() {
        return None;
    }

    let mut detectors = registry.detectors().to_vec();
    // Stable sort: registration order breaks priority ties.
    detectors.sort_by_key(|d| Reverse(d.priority()));

    let mut best: Option<FileOperation> = None;
    for detector in &detectors {
        match detector.detect(events) {
            Ok(Some(candidate)) => {
                let best_confidence = best.as_ref().map_or(f32::MIN, |b| b.confidence);
                if candidate.confidence > best_confidence {
                    let unambiguous = candidate.confidence >= HIGH_CONFIDENCE;
                    best = Some(candidate);
                    if unambiguous {
                        break;
                    }
                }
            }
            Ok(None) => {}
            Err(error) => {
                warn!(
                    detector = detector.name(),
                    priority = detector.priority(),
                    %error,
                    "detector failed, skipping"
                );
            }
        }
    }

    let best = best?;
    if best.confidence < config.min_confidence {
        debug!(
            kind = %best.kind,
            confidence = best.confidence,
            min_confidence = config.min_confidence,
            "best match below confidence floor"
        );
        return None;
    }

    if !is_temp_file(&best.primary_path) {
        return Some(best);
    }

    // A temp path is never an acceptable primary path. Recover the real file
    // from the operation's own events or drop the operation entirely.
    match find_real_file_from_events(&best.events) {
        Some(real) => Some(best.with_primary_path(real)),
        None => {
            debug!(
                kind = %best.kind,
                path = %best.primary_path.display(),
                "dropping operation with unresolvable temp primary path"
            );
            None
        }
    }
}

/// Finds a plausible non-temp path among `events`.
///
/// Scans most-recent-first, preferring each event's `dest_path` over its
/// `path`: the newest event's destination is the likeliest final resting
/// place of a completed write. When every path is a temp artifact, falls
/// back to reconstructing `parent_dir/base_name` from the artifact's name.
#[must_use]
pub fn find_real_file_from_events(events: &[FileEvent]) -> Option<PathBuf> {
    for event in events.iter().rev() {
        if let Some(dest) = &event.dest_path {
            if !is_temp_file(dest) {
                return Some(dest.clone());
            }
        }
        if !is_temp_file(&event.path) {
            return Some(event.path.clone());
        }
    }

    for event in events {
        let candidate = event.dest_path.as_deref().unwrap_or(&event.path);
        if let Some(base) = extract_base_name(candidate) {
            let differs = candidate
                .file_name()
                .is_none_or(|name| name.to_str() != Some(base.as_str()));
            if differs {
                let parent = candidate.parent().unwrap_or_else(|| Path::new(""));
                return Some(parent.join(base));
            }
        }
    }

    None
}
