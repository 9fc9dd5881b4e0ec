//! Global config file source: $XDG_CONFIG_HOME/prologue/config.toml,
//! else ~/.config/prologue/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::PathBuf;
use tracing::debug;

/// Path to the global config file, whether or not it exists
pub fn global_config_path() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg).join("prologue").join("config.toml"));
    }
    let home = std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()))?;
    Some(home.join(".config").join("prologue").join("config.toml"))
}

/// Add the global config file to the builder if it exists
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.is_file() {
            debug!(config_path = %path.display(), "Loading global configuration");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }
    }
    Ok(builder)
}
