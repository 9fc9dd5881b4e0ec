//! File Registry
//!
//! Namespace of files and folders available to `include` and `import`. Entries
//! are registered once during setup and only read during evaluation.

pub mod file;
pub mod path;
pub mod walker;

pub use file::{FileRef, RegistryFile, RegistryFolder};

use crate::error::PrologueError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walker::{Walker, WalkerConfig};

/// A registered file or folder
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    File(FileRef),
    Folder(RegistryFolder),
}

impl RegistryEntry {
    /// Top-level name of the entry
    pub fn name(&self) -> String {
        match self {
            RegistryEntry::File(file) => file.filename(),
            RegistryEntry::Folder(folder) => folder.folder(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            RegistryEntry::File(file) => file.path(),
            RegistryEntry::Folder(folder) => folder.path(),
        }
    }
}

/// Registry of files available for inclusion
#[derive(Debug, Default)]
pub struct Registry {
    flat: bool,
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that flattens every added folder into its files
    pub fn flat() -> Self {
        Self {
            flat: true,
            entries: BTreeMap::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Insert an entry, rejecting name collisions unless `ignore_duplicate` is set
    pub fn insert_entry(
        &mut self,
        entry: RegistryEntry,
        ignore_duplicate: bool,
    ) -> Result<(), PrologueError> {
        let name = entry.name();
        if self.entries.contains_key(&name) {
            if ignore_duplicate {
                return Ok(());
            }
            return Err(PrologueError::Registry(format!(
                "Entry already exists in registry with name {}",
                name
            )));
        }
        debug!(entry = %name, path = %entry.path().display(), "Adding entry to registry");
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn list_entries(&self) -> Vec<&RegistryEntry> {
        self.entries.values().collect()
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register a single file
    pub fn add_file(
        &mut self,
        path: impl AsRef<Path>,
        ignore_duplicate: bool,
    ) -> Result<(), PrologueError> {
        let file = RegistryFile::open(path)?;
        self.insert_entry(RegistryEntry::File(file), ignore_duplicate)
    }

    /// Register a folder.
    ///
    /// - neither `search_for` nor `recursive`: the folder itself becomes one entry
    /// - only `recursive`: the folder and every subfolder become separate entries
    /// - `search_for` given (or a flat registry): every matching file is added at
    ///   the registry root, descending into subfolders when `recursive` (or flat)
    pub fn add_folder(
        &mut self,
        path: impl AsRef<Path>,
        search_for: Option<&str>,
        recursive: bool,
        ignore_duplicate: bool,
    ) -> Result<(), PrologueError> {
        let folder = RegistryFolder::open(path)?;
        debug!(
            path = %folder.path().display(),
            search_for = ?search_for,
            recursive,
            flat = self.flat,
            "Adding folder to registry"
        );

        match (self.flat, search_for, recursive) {
            (false, None, false) => {
                self.insert_entry(RegistryEntry::Folder(folder), ignore_duplicate)
            }
            (false, None, true) => {
                let walker = Walker::with_config(
                    folder.path().to_path_buf(),
                    WalkerConfig {
                        include_root: true,
                        ..Default::default()
                    },
                );
                for subfolder in walker.folders()? {
                    self.insert_entry(
                        RegistryEntry::Folder(RegistryFolder::open(subfolder)?),
                        ignore_duplicate,
                    )?;
                }
                Ok(())
            }
            (flat, search_for, recursive) => {
                let suffix = search_for.unwrap_or("");
                let walker = Walker::with_config(
                    folder.path().to_path_buf(),
                    WalkerConfig {
                        max_depth: if flat || recursive { None } else { Some(1) },
                        ..Default::default()
                    },
                );
                for file in walker.files_matching(suffix)? {
                    let entry = RegistryEntry::File(RegistryFile::open(file)?);
                    self.insert_entry(entry, ignore_duplicate)?;
                }
                Ok(())
            }
        }
    }

    /// Resolve a lookup path to a file.
    ///
    /// Absolute paths bypass the registry. Relative paths start with a
    /// registered name and descend into registered folders.
    pub fn resolve(&self, path: &str) -> Result<FileRef, PrologueError> {
        let trimmed = path.trim();
        let lookup = PathBuf::from(trimmed);
        if lookup.is_absolute() {
            return RegistryFile::open(&lookup);
        }

        let parts = path::segments(&lookup).filter(|p| !p.is_empty()).ok_or_else(|| {
            PrologueError::Registry(format!("No entry is known for path {}", trimmed))
        })?;
        let entry = self.entries.get(&parts[0]).ok_or_else(|| {
            PrologueError::Registry(format!("No entry is known for path {}", trimmed))
        })?;

        match entry {
            RegistryEntry::File(file) if parts.len() == 1 => Ok(file.clone()),
            RegistryEntry::File(_) => Err(PrologueError::Registry(format!(
                "Only a file is registered for path {}",
                parts[0]
            ))),
            RegistryEntry::Folder(_) if parts.len() == 1 => Err(PrologueError::Registry(format!(
                "Failed to resolve {} to a file",
                trimmed
            ))),
            RegistryEntry::Folder(folder) => {
                let rest: PathBuf = parts[1..].iter().collect();
                folder.resolve(&rest)
            }
        }
    }
}
