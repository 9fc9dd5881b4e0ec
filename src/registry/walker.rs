//! Folder walker used when registering folders

use crate::error::PrologueError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Filesystem entry types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { path: PathBuf },
    Directory { path: PathBuf },
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::File { path } | Entry::Directory { path } => path,
        }
    }
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Directory names that are never descended into
    pub ignore_patterns: Vec<String>,
    /// Maximum depth to traverse (None = unlimited, Some(1) = direct children)
    pub max_depth: Option<usize>,
    /// Include the root folder itself in the results
    pub include_root: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: vec![".git".to_string()],
            max_depth: None,
            include_root: false,
        }
    }
}

/// Folder walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the folder and collect all entries, sorted by path
    pub fn walk(&self) -> Result<Vec<Entry>, PrologueError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX));

        let ignore = &self.config.ignore_patterns;
        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_ignored(ignore, e))
        {
            let entry = entry.map_err(|e| {
                PrologueError::Registry(format!(
                    "Failed to walk folder {}: {}",
                    self.root.display(),
                    e
                ))
            })?;

            if entry.depth() == 0 && !self.config.include_root {
                continue;
            }

            let path = entry.path().to_path_buf();
            let file_type = entry.file_type();
            if file_type.is_file() {
                entries.push(Entry::File { path });
            } else if file_type.is_dir() {
                entries.push(Entry::Directory { path });
            } else if self.config.follow_symlinks && path.is_file() {
                entries.push(Entry::File { path });
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(entries)
    }

    /// Walk and keep only files whose name ends with `suffix`
    pub fn files_matching(&self, suffix: &str) -> Result<Vec<PathBuf>, PrologueError> {
        Ok(self
            .walk()?
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::File { path } => Some(path),
                Entry::Directory { .. } => None,
            })
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().ends_with(suffix))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Walk and keep only folders
    pub fn folders(&self) -> Result<Vec<PathBuf>, PrologueError> {
        Ok(self
            .walk()?
            .into_iter()
            .filter_map(|entry| match entry {
                Entry::Directory { path } => Some(path),
                Entry::File { .. } => None,
            })
            .collect())
    }

    fn is_ignored(patterns: &[String], entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        patterns.iter().any(|pattern| name == pattern.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walker_collects_files_and_folders() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::write(root.join("dir1").join("file.txt"), "content").unwrap();
        fs::write(root.join("top.txt"), "content").unwrap();

        let entries = Walker::new(root.clone()).walk().unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&Entry::Directory {
            path: root.join("dir1")
        }));
        assert!(entries.contains(&Entry::File {
            path: root.join("top.txt")
        }));
    }

    #[test]
    fn test_walker_ignores_patterns() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::write(root.join("file.txt"), "content").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git").join("config"), "git config").unwrap();

        let entries = Walker::new(root).walk().unwrap();
        assert!(!entries
            .iter()
            .any(|e| e.path().to_string_lossy().contains(".git")));
        assert!(entries.iter().any(|e| e.path().ends_with("file.txt")));
    }

    #[test]
    fn test_files_matching_respects_depth() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();

        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("a.h"), "").unwrap();
        fs::write(root.join("b.c"), "").unwrap();
        fs::write(root.join("nested").join("c.h"), "").unwrap();

        let shallow = Walker::with_config(
            root.clone(),
            WalkerConfig {
                max_depth: Some(1),
                ..Default::default()
            },
        )
        .files_matching(".h")
        .unwrap();
        assert_eq!(shallow, vec![root.join("a.h")]);

        let deep = Walker::new(root.clone()).files_matching(".h").unwrap();
        assert_eq!(deep, vec![root.join("a.h"), root.join("nested").join("c.h")]);
    }

    #[test]
    fn test_folders_can_include_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        fs::create_dir(root.join("sub")).unwrap();

        let folders = Walker::with_config(
            root.clone(),
            WalkerConfig {
                include_root: true,
                ..Default::default()
            },
        )
        .folders()
        .unwrap();
        assert_eq!(folders, vec![root.clone(), root.join("sub")]);
    }
}
