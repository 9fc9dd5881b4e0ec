//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key; tables merge rather than
//! replace, so a workspace file can change `delimiter` without restating
//! `logging`.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};

/// Environment variable prefix; `PROLOGUE_LOGGING__LEVEL` maps to `logging.level`
pub const ENV_PREFIX: &str = "PROLOGUE";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("delimiter", "#")?
        .set_default("implicit_sub", true)?
        .set_default("lenient_eval", true)?
        .set_default("max_depth", 64)?
        .set_default("undefined", "strict")?
        .set_default("explicit_style.prefix", "$(")?
        .set_default("explicit_style.suffix", ")")
}

/// Environment overrides, applied last
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
