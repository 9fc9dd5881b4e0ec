//! Registered files and folders

use super::path::{canonicalize_path, entry_name, segments};
use crate::error::PrologueError;
use crate::line::Line;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared handle on a registered file
pub type FileRef = Arc<RegistryFile>;

/// A concrete file available to the preprocessor
///
/// Contents are read from disk on every access and never cached, so the file
/// handle is only held open for the duration of a single read.
pub struct RegistryFile {
    path: PathBuf,
    canonical: PathBuf,
}

impl RegistryFile {
    /// Wrap a path, checking that it exists and is a file
    pub fn open(path: impl AsRef<Path>) -> Result<FileRef, PrologueError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(PrologueError::Registry(format!(
                "File does not exist at path {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(PrologueError::Registry(format!(
                "Path provided is not a file {}",
                path.display()
            )));
        }
        let canonical = canonicalize_path(&path)?;
        Ok(Arc::new(Self { path, canonical }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name under which the file is registered
    pub fn filename(&self) -> String {
        entry_name(&self.path)
    }

    /// Whether two handles refer to the same file on disk
    pub fn same_file(&self, other: &RegistryFile) -> bool {
        std::ptr::eq(self, other) || self.canonical == other.canonical
    }

    /// Read the file, producing one line per physical line (trailing whitespace removed)
    pub fn contents(self: &Arc<Self>) -> Result<Vec<Line>, PrologueError> {
        let text = self.read()?;
        Ok(text
            .lines()
            .enumerate()
            .map(|(idx, line)| Line::new(line.trim_end(), Arc::clone(self), (idx + 1) as u32))
            .collect())
    }

    /// Extract lines around `line`, the target marked with `>>`
    pub fn snippet(
        &self,
        line: u32,
        before: u32,
        after: u32,
    ) -> Result<Vec<String>, PrologueError> {
        let text = self.read()?;
        let first = line.saturating_sub(before);
        let last = line.saturating_add(after);
        Ok(text
            .lines()
            .enumerate()
            .map(|(idx, content)| ((idx + 1) as u32, content.trim_end()))
            .skip_while(|(number, _)| *number < first)
            .take_while(|(number, _)| *number <= last)
            .map(|(number, content)| {
                let marker = if number == line { ">>" } else { "  " };
                format!("{:4} {} {}", number, marker, content)
            })
            .collect())
    }

    fn read(&self) -> Result<String, PrologueError> {
        let bytes = std::fs::read(&self.path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl PartialEq for RegistryFile {
    fn eq(&self, other: &Self) -> bool {
        self.same_file(other)
    }
}

impl Eq for RegistryFile {}

impl fmt::Debug for RegistryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryFile")
            .field("path", &self.path)
            .finish()
    }
}

/// A folder whose files can be resolved by relative path
#[derive(Debug, Clone)]
pub struct RegistryFolder {
    path: PathBuf,
}

impl RegistryFolder {
    /// Wrap a path, checking that it exists and is a folder
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrologueError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(PrologueError::Registry(format!(
                "Folder does not exist at path {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(PrologueError::Registry(format!(
                "Path provided is not a folder {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name under which the folder is registered
    pub fn folder(&self) -> String {
        entry_name(&self.path)
    }

    /// Resolve a path relative to this folder to a file
    pub fn resolve(&self, relative: &Path) -> Result<FileRef, PrologueError> {
        if relative.is_absolute() {
            return Err(PrologueError::Registry(format!(
                "Attempted to resolve absolute path {}",
                relative.display()
            )));
        }
        let parts = segments(relative).ok_or_else(|| {
            PrologueError::Registry(format!(
                "Failed to resolve {} within {}",
                relative.display(),
                self.path.display()
            ))
        })?;
        let mut folder = self.clone();
        for (idx, part) in parts.iter().enumerate() {
            if idx + 1 == parts.len() {
                return RegistryFile::open(folder.path.join(part));
            }
            folder = RegistryFolder::open(folder.path.join(part))?;
        }
        Err(PrologueError::Registry(format!(
            "Failed to resolve {} to a file",
            relative.display()
        )))
    }
}
