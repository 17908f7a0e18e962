//! Detected semantic file operations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::event::FileEvent;

/// A higher-level classification of one or more filesystem events.
///
/// Operations are produced by detectors and are immutable once produced; the
/// engine corrects a temp-file `primary_path` by building a new value with
/// [`FileOperation::with_primary_path`], never by mutating in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileOperation {
    /// The kind of composite operation detected.
    pub kind: OperationKind,
    /// The single path that best represents the file this operation happened to.
    pub primary_path: PathBuf,
    /// Detector-assigned match strength, by convention in `[0.0, 1.0]`.
    ///
    /// The engine treats higher as better and compares against the
    /// high-confidence early-termination threshold, but does not clamp or
    /// validate the range.
    pub confidence: f32,
    /// The ordered events that produced this operation.
    pub events: Vec<FileEvent>,
}

impl FileOperation {
    /// Returns a copy of this operation with `primary_path` replaced.
    #[must_use]
    pub fn with_primary_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            primary_path: path.into(),
            ..self.clone()
        }
    }

    /// The primary path as a borrowed `Path`.
    #[must_use]
    pub fn primary_path(&self) -> &Path {
        &self.primary_path
    }
}

/// The kind of composite file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Editor wrote a temp file and renamed it onto the target in one motion.
    AtomicSave,
    /// Temp write promoted over the target, leaving a backup artifact.
    SafeWrite,
    /// Several files renamed together (e.g. a refactor or bulk tool run).
    BatchRename,
    /// A single plain rename or move.
    Rename,
    /// An in-place modification.
    Modify,
}

impl OperationKind {
    /// String representation for logs and serialized payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AtomicSave => "atomic_save",
            Self::SafeWrite => "safe_write",
            Self::BatchRename => "batch_rename",
            Self::Rename => "rename",
            Self::Modify => "modify",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
