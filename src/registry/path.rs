//! Path canonicalization and registry name normalization

use crate::error::PrologueError;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a path so two handles on the same file compare equal
///
/// Resolves symlinks, `..` and `.` via `dunce` (which avoids UNC prefixes on
/// Windows) and normalizes the result to Unicode NFC.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, PrologueError> {
    let canonical = dunce::canonicalize(path).map_err(|e| {
        PrologueError::Registry(format!(
            "Failed to canonicalize path {}: {}",
            path.display(),
            e
        ))
    })?;
    let normalized: String = canonical.to_string_lossy().nfc().collect();
    Ok(PathBuf::from(normalized))
}

/// Normalize a registry entry name (NFC, no trailing separators)
pub fn normalize_name(name: &str) -> String {
    let mut result: String = name.nfc().collect();
    while result.len() > 1 && (result.ends_with('/') || result.ends_with('\\')) {
        result.pop();
    }
    result
}

/// Final component of a path as a normalized registry name
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| normalize_name(&name.to_string_lossy()))
        .unwrap_or_else(|| normalize_name(&path.to_string_lossy()))
}

/// Split a relative lookup path into normalized segments.
///
/// `.` segments are dropped; `..` or root/prefix components are rejected.
pub fn segments(path: &Path) -> Option<Vec<String>> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(normalize_name(&part.to_string_lossy())),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(parts)
}
