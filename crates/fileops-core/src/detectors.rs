//! Built-in operation detectors.
//!
//! Each detector scores one event group against one write pattern. They are
//! registered through the same [`Detector`] seam as external detectors; the
//! orchestrator gives them no special treatment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::event::{EventKind, FileEvent};
use crate::operation::{FileOperation, OperationKind};
use crate::registry::{Detector, DetectorError, DetectorRegistry};
use crate::temp::{extract_base_name, is_temp_file};

/// Registry holding the built-in detectors in priority order.
#[must_use]
pub fn builtin_registry() -> DetectorRegistry {
    let mut registry = DetectorRegistry::empty();
    registry.register(Arc::new(AtomicSaveDetector));
    registry.register(Arc::new(SafeWriteDetector));
    registry.register(Arc::new(BatchRenameDetector));
    registry.register(Arc::new(RenameDetector));
    registry.register(Arc::new(ModifyDetector));
    registry
}

/// Finds the last rename that promotes a temp artifact onto a real path.
fn promotion_rename(events: &[FileEvent]) -> Option<&FileEvent> {
    events.iter().rev().find(|e| {
        e.kind == EventKind::Rename
            && is_temp_file(&e.path)
            && e.dest_path.as_deref().is_some_and(|d| !is_temp_file(d))
    })
}

/// Returns true if `artifact` is a backup of `target` (same base name).
fn is_backup_of(artifact: &Path, target: &Path) -> bool {
    if !is_temp_file(artifact) {
        return false;
    }
    match (extract_base_name(artifact), target.file_name()) {
        (Some(base), Some(name)) => name.to_str() == Some(base.as_str()),
        _ => false,
    }
}

/// Write-temp-then-rename saves, as performed by most editors.
pub struct AtomicSaveDetector;

impl Detector for AtomicSaveDetector {
    fn name(&self) -> &str {
        "atomic_save"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError> {
        let Some(promotion) = promotion_rename(events) else {
            return Ok(None);
        };
        let dest = promotion.dest_path.clone().unwrap_or_else(|| promotion.path.clone());

        // The full pattern also shows the temp file being written before the
        // rename; a bare promotion rename scores lower.
        let wrote_temp = events.iter().any(|e| {
            matches!(e.kind, EventKind::Create | EventKind::Modify) && e.path == promotion.path
        });
        let confidence = if wrote_temp { 0.95 } else { 0.9 };

        Ok(Some(FileOperation {
            kind: OperationKind::AtomicSave,
            primary_path: dest,
            confidence,
            events: events.to_vec(),
        }))
    }
}

/// Safe writes that keep a backup of the original alongside the promotion.
pub struct SafeWriteDetector;

impl Detector for SafeWriteDetector {
    fn name(&self) -> &str {
        "safe_write"
    }

    fn priority(&self) -> i32 {
        90
    }

    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError> {
        let Some(promotion) = promotion_rename(events) else {
            return Ok(None);
        };
        let Some(target) = promotion.dest_path.clone() else {
            return Ok(None);
        };

        let left_backup = events.iter().any(|e| {
            e.path != promotion.path
                && (is_backup_of(&e.path, &target)
                    || e.dest_path.as_deref().is_some_and(|d| is_backup_of(d, &target)))
        });
        if !left_backup {
            return Ok(None);
        }

        Ok(Some(FileOperation {
            kind: OperationKind::SafeWrite,
            primary_path: target,
            confidence: 0.92,
            events: events.to_vec(),
        }))
    }
}

/// Three or more plain renames in one window, e.g. a refactor or bulk tool.
pub struct BatchRenameDetector;

impl Detector for BatchRenameDetector {
    fn name(&self) -> &str {
        "batch_rename"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError> {
        let renames: Vec<&FileEvent> = events
            .iter()
            .filter(|e| {
                e.kind == EventKind::Rename
                    && !is_temp_file(&e.path)
                    && e.dest_path.as_deref().is_some_and(|d| !is_temp_file(d))
            })
            .collect();
        if renames.len() < 3 || renames.len() < events.len() {
            return Ok(None);
        }

        // Scale with batch size but stay below the early-termination band.
        #[allow(clippy::cast_precision_loss)]
        let confidence = (0.6 + 0.05 * (renames.len() as f32 - 3.0)).min(0.9);
        let primary: PathBuf = renames[0]
            .dest_path
            .clone()
            .unwrap_or_else(|| renames[0].path.clone());

        Ok(Some(FileOperation {
            kind: OperationKind::BatchRename,
            primary_path: primary,
            confidence,
            events: events.to_vec(),
        }))
    }
}

/// A single plain rename with no temp artifacts involved.
pub struct RenameDetector;

impl Detector for RenameDetector {
    fn name(&self) -> &str {
        "rename"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError> {
        let [event] = events else {
            return Ok(None);
        };
        let (EventKind::Rename, Some(dest)) = (event.kind, event.dest_path.as_deref()) else {
            return Ok(None);
        };
        if is_temp_file(&event.path) || is_temp_file(dest) {
            return Ok(None);
        }

        Ok(Some(FileOperation {
            kind: OperationKind::Rename,
            primary_path: dest.to_path_buf(),
            confidence: 0.7,
            events: events.to_vec(),
        }))
    }
}

/// In-place modification of one real file.
pub struct ModifyDetector;

impl Detector for ModifyDetector {
    fn name(&self) -> &str {
        "modify"
    }

    fn detect(&self, events: &[FileEvent]) -> Result<Option<FileOperation>, DetectorError> {
        let Some(first) = events.first() else {
            return Ok(None);
        };
        let same_file = events
            .iter()
            .all(|e| e.kind == EventKind::Modify && e.path == first.path);
        if !same_file || is_temp_file(&first.path) {
            return Ok(None);
        }

        Ok(Some(FileOperation {
            kind: OperationKind::Modify,
            primary_path: first.path.clone(),
            confidence: 0.55,
            events: events.to_vec(),
        }))
    }
}
