//! Temp-file artifact recognition.
//!
//! Editors and tools rarely write files in place: they write a temporary
//! artifact and promote it. These helpers recognize the common artifact
//! naming conventions and, where the convention encodes it, recover the
//! probable real file name.

use std::path::Path;

/// Extensions that mark a transient write artifact.
const TEMP_EXTENSIONS: &[&str] = &[
    "tmp",
    "temp",
    "swp",
    "swo",
    "swx",
    "bak",
    "orig",
    "part",
    "partial",
    "crdownload",
];

/// Returns true if the path looks like a temporary write artifact.
///
/// A temp path is never an acceptable `primary_path` for a detected
/// operation; see the orchestrator's path-correction step.
#[must_use]
pub fn is_temp_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    // Backup suffix: file~
    if name.ends_with('~') {
        return true;
    }

    // Office lock/owner files: ~$document.docx
    if name.starts_with("~$") {
        return true;
    }

    // Emacs autosave and lock files: #file#, .#file
    if name.starts_with(".#") || (name.starts_with('#') && name.ends_with('#')) {
        return true;
    }

    // GIO safe-write streams: .goutputstream-XXXXXX
    if name.starts_with(".goutputstream-") {
        return true;
    }

    // mkstemp-style names: tmpXXXXXX, .tmpXXXXXX
    if name.starts_with("tmp") || name.starts_with(".tmp") {
        return true;
    }

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if TEMP_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return true;
        }
    }

    false
}

/// Recovers the probable real file name encoded in a temp artifact's name.
///
/// Returns `None` when the convention carries no target name (e.g. random
/// mkstemp or GIO stream names) or when stripping the decoration would leave
/// nothing.
#[must_use]
pub fn extract_base_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;

    // Backup suffix: file.txt~ -> file.txt
    if let Some(base) = name.strip_suffix('~') {
        return non_empty(base);
    }

    // Office lock/owner files: ~$report.docx -> report.docx
    if let Some(base) = name.strip_prefix("~$") {
        return non_empty(base);
    }

    // Emacs lock: .#file -> file
    if let Some(base) = name.strip_prefix(".#") {
        return non_empty(base);
    }

    // Emacs autosave: #file# -> file
    if name.starts_with('#') && name.ends_with('#') && name.len() > 2 {
        return non_empty(&name[1..name.len() - 1]);
    }

    // Random stream names carry no target.
    if name.starts_with(".goutputstream-") {
        return None;
    }

    // Hidden artifacts wrapping the real name: .file.swp -> file, .file.tmp -> file
    if let Some(hidden) = name.strip_prefix('.') {
        if let Some((base, ext)) = hidden.rsplit_once('.') {
            if TEMP_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
                return non_empty(base);
            }
        }
    }

    // Appended temp extension: file.txt.part -> file.txt, notes.tmp -> notes
    if let Some((base, ext)) = name.rsplit_once('.') {
        if TEMP_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return non_empty(base);
        }
    }

    None
}

fn non_empty(base: &str) -> Option<String> {
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}
