//! Layered configuration loading

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::PrologueConfig;
use crate::error::PrologueError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};

/// Loads [`PrologueConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global file, then `<workspace_root>/prologue.toml`,
    /// then `PROLOGUE_*` environment variables
    pub fn load(workspace_root: &Path) -> Result<PrologueConfig, PrologueError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: PrologueConfig = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus one explicit file
    pub fn load_from_file(path: &Path) -> Result<PrologueConfig, PrologueError> {
        if !path.is_file() {
            return Err(PrologueError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let config: PrologueConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).format(FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
