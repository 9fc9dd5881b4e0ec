//! Configuration System
//!
//! Construction options for the preprocessor, dialect presets, and layered
//! loading (defaults, global file, workspace file, environment). Tests included.

use crate::context::{ContextOptions, Undefined};
use crate::error::PrologueError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Bracketing of an explicit substitution, e.g. `$(` … `)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplicitStyle {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Empty means the prefix is followed directly by an identifier
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

fn default_prefix() -> String {
    "$(".to_string()
}

fn default_suffix() -> String {
    ")".to_string()
}

impl Default for ExplicitStyle {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            suffix: default_suffix(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrologueConfig {
    /// Marker introducing a directive tag
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Single-line comment marker, stripped before directive matching
    #[serde(default)]
    pub comment: Option<String>,

    /// Unknown tags are plain text rather than errors
    #[serde(default)]
    pub shared_delimiter: bool,

    /// Replace bare identifiers that name a define
    #[serde(default = "default_true")]
    pub implicit_sub: bool,

    #[serde(default)]
    pub explicit_style: ExplicitStyle,

    /// Redefinition warns instead of failing
    #[serde(default)]
    pub allow_redefine: bool,

    #[serde(default)]
    pub undefined: Undefined,

    /// Failed expression evaluation yields the flattened text
    #[serde(default = "default_true")]
    pub lenient_eval: bool,

    /// Collapse added folders into their files
    #[serde(default)]
    pub flat_registry: bool,

    /// Recursion limit when flattening nested defines
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_delimiter() -> String {
    "#".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    64
}

impl Default for PrologueConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            comment: None,
            shared_delimiter: false,
            implicit_sub: true,
            explicit_style: ExplicitStyle::default(),
            allow_redefine: false,
            undefined: Undefined::Strict,
            lenient_eval: true,
            flat_registry: false,
            max_depth: default_max_depth(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PrologueConfig {
    /// Configuration preset for a source dialect
    pub fn dialect(dialect: Dialect) -> Self {
        let mut config = Self::default();
        dialect.apply(&mut config);
        config
    }

    /// Check every construction option
    pub fn validate(&self) -> Result<(), PrologueError> {
        if self.delimiter.is_empty() {
            return Err(PrologueError::Config(
                "Delimiter should be at least one character".to_string(),
            ));
        }
        if self.delimiter.chars().any(char::is_whitespace) {
            return Err(PrologueError::Config(
                "Delimiter should not contain whitespace".to_string(),
            ));
        }
        if let Some(comment) = &self.comment {
            if comment.is_empty() {
                return Err(PrologueError::Config(
                    "Comment marker should be at least one character".to_string(),
                ));
            }
            if comment.chars().any(char::is_whitespace) {
                return Err(PrologueError::Config(
                    "Comment marker should not contain whitespace".to_string(),
                ));
            }
        }
        if self.explicit_style.prefix.is_empty() {
            return Err(PrologueError::Config(
                "Explicit substitution prefix should be at least one character".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(PrologueError::Config(
                "Maximum flatten depth should be at least one".to_string(),
            ));
        }
        Ok(())
    }

    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            explicit_style: (
                self.explicit_style.prefix.clone(),
                self.explicit_style.suffix.clone(),
            ),
            implicit_sub: self.implicit_sub,
            undefined: self.undefined,
            lenient_eval: self.lenient_eval,
            max_depth: self.max_depth,
        }
    }
}

/// Source dialects with preset syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `#define`, `// comments`, `$(EXPR)` and bare identifiers
    C,
    /// `` `define ``, `// comments`, `` `NAME `` macros, unknown tags kept as text
    Verilog,
}

impl Dialect {
    /// Overwrite the syntax options of `config`, keeping everything else
    pub fn apply(self, config: &mut PrologueConfig) {
        match self {
            Dialect::C => {
                config.delimiter = "#".to_string();
                config.comment = Some("//".to_string());
                config.shared_delimiter = false;
                config.implicit_sub = true;
                config.explicit_style = ExplicitStyle::default();
                config.undefined = Undefined::Strict;
            }
            Dialect::Verilog => {
                config.delimiter = "`".to_string();
                config.comment = Some("//".to_string());
                config.shared_delimiter = true;
                config.implicit_sub = false;
                config.explicit_style = ExplicitStyle {
                    prefix: "`".to_string(),
                    suffix: String::new(),
                };
                config.undefined = Undefined::Permissive;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Serialize access to process environment across tests
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = PrologueConfig::default();
        assert_eq!(config.delimiter, "#");
        assert!(config.implicit_sub);
        assert!(config.lenient_eval);
        assert_eq!(config.explicit_style.prefix, "$(");
        assert_eq!(config.undefined, Undefined::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delimiter_validation() {
        let mut config = PrologueConfig {
            delimiter: String::new(),
            ..Default::default()
        };
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Delimiter should be at least one character"
        );
        config.delimiter = "# ".to_string();
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Delimiter should not contain whitespace"
        );
        config.delimiter = "#".to_string();
        config.comment = Some("/ /".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_dialect_presets() {
        let verilog = PrologueConfig::dialect(Dialect::Verilog);
        assert_eq!(verilog.delimiter, "`");
        assert!(verilog.shared_delimiter);
        assert!(!verilog.implicit_sub);
        assert_eq!(verilog.explicit_style.suffix, "");
        assert_eq!(verilog.undefined, Undefined::Permissive);
        assert!(verilog.validate().is_ok());

        let c = PrologueConfig::dialect(Dialect::C);
        assert_eq!(c.comment.as_deref(), Some("//"));
        assert!(c.implicit_sub);
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("prologue.toml");
        std::fs::write(
            &config_file,
            r#"
delimiter = "@"
allow_redefine = true
undefined = "permissive"

[explicit_style]
prefix = "${"
suffix = "}"

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&config_file).unwrap();
        assert_eq!(config.delimiter, "@");
        assert!(config.allow_redefine);
        assert_eq!(config.undefined, Undefined::Permissive);
        assert_eq!(config.explicit_style.prefix, "${");
        assert_eq!(config.logging.level, "debug");
        assert!(config.implicit_sub);
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_workspace_config_overrides_global_config() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let original_home = std::env::var("HOME").ok();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();

        let mock_home = temp_dir.path().join("home");
        let global_dir = mock_home.join(".config").join("prologue");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            "delimiter = \"%\"\nallow_redefine = true\n",
        )
        .unwrap();
        std::env::set_var("HOME", &mock_home);
        std::env::remove_var("XDG_CONFIG_HOME");

        let workspace = temp_dir.path().join("workspace");
        std::fs::create_dir_all(&workspace).unwrap();

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.delimiter, "%");
        assert!(config.allow_redefine);

        std::fs::write(workspace.join("prologue.toml"), "delimiter = \"!\"\n").unwrap();
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.delimiter, "!");
        assert!(config.allow_redefine);

        match original_home {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        if let Some(xdg) = original_xdg {
            std::env::set_var("XDG_CONFIG_HOME", xdg);
        }
    }

    #[test]
    fn test_load_without_any_files() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let temp_dir = TempDir::new().unwrap();
        let original_home = std::env::var("HOME").ok();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("HOME", temp_dir.path());
        std::env::remove_var("XDG_CONFIG_HOME");

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert_eq!(config, PrologueConfig::default());

        match original_home {
            Some(home) => std::env::set_var("HOME", home),
            None => std::env::remove_var("HOME"),
        }
        if let Some(xdg) = original_xdg {
            std::env::set_var("XDG_CONFIG_HOME", xdg);
        }
    }
}
