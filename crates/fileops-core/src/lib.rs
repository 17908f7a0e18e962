//! File-operation detection engine.
//!
//! Classifies a stream of raw filesystem events into higher-level semantic
//! operations (atomic save, safe write, batch rename) with a confidence
//! score:
//! - Grouping: time-windowed batching anchored at each group's first event
//! - Scoring: pluggable detectors run in priority order with early
//!   termination on high-confidence matches
//! - Path correction: temp-artifact primary paths are recovered from the
//!   operation's own events or the operation is dropped

pub mod autoflush;
pub mod detector;
pub mod detectors;
mod event;
pub mod grouper;
mod operation;
pub mod registry;
pub mod temp;

pub use autoflush::AutoFlush;
pub use detector::{
    DetectorConfig, HIGH_CONFIDENCE, OperationCallback, OperationDetector, analyze_event_group,
    find_real_file_from_events,
};
pub use event::{EventKind, FileEvent};
pub use grouper::group_events_by_time;
pub use operation::{FileOperation, OperationKind};
pub use registry::{Detector, DetectorError, DetectorRegistry};
pub use temp::{extract_base_name, is_temp_file};
