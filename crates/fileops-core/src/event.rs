//! Raw filesystem events from a watcher.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observed filesystem change.
///
/// Events are immutable once constructed. The detection engine's control
/// logic only looks at `timestamp`, `path` and `dest_path`; `kind` and
/// `metadata` are carried through for detectors and downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEvent {
    /// The path the event concerns.
    pub path: PathBuf,
    /// Secondary path for rename/move-style events; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_path: Option<PathBuf>,
    /// When the event was observed.
    pub timestamp: DateTime<Utc>,
    /// The kind of change reported by the watcher.
    pub kind: EventKind,
    /// Optional additional context as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl FileEvent {
    /// Creates an event with no destination path or metadata.
    pub fn new(path: impl Into<PathBuf>, kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            dest_path: None,
            timestamp,
            kind,
            metadata: None,
        }
    }

    /// Creates a rename event with the given destination path.
    pub fn rename(
        path: impl Into<PathBuf>,
        dest_path: impl Into<PathBuf>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            dest_path: Some(dest_path.into()),
            timestamp,
            kind: EventKind::Rename,
            metadata: None,
        }
    }
}

/// The kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A file or directory was created.
    Create,
    /// A file's contents or attributes changed.
    Modify,
    /// A file or directory was removed.
    Delete,
    /// A file or directory was renamed or moved; `dest_path` holds the target.
    Rename,
}

impl EventKind {
    /// String representation for logs and serialized payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::Rename => "rename",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization_roundtrip() {
        let event = FileEvent {
            path: "/src/main.rs".into(),
            dest_path: None,
            timestamp: Utc::now(),
            kind: EventKind::Modify,
            metadata: Some(serde_json::json!({"watcher": "inotify"})),
        };

        let json = serde_json::to_string(&event).unwrap();
        let parsed: FileEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.path, event.path);
        assert_eq!(parsed.kind, EventKind::Modify);
        assert_eq!(parsed.metadata, event.metadata);
    }

    #[test]
    fn rename_event_carries_dest_path() {
        let event = FileEvent::rename("/tmp/a", "/tmp/b", Utc::now());
        assert_eq!(event.kind, EventKind::Rename);
        assert_eq!(event.dest_path.as_deref(), Some(std::path::Path::new("/tmp/b")));
    }

    #[test]
    fn dest_path_omitted_when_absent() {
        let event = FileEvent::new("/tmp/a", EventKind::Create, Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("dest_path"));
    }
}
