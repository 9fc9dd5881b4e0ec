//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::cli::command_name;
use crate::cli::parse::{Commands, InputArgs, LookupFormat};
use crate::cli::presentation::{
    format_lookup_json, format_lookup_text, format_resolved_json, format_resolved_text,
};
use crate::config::{ConfigLoader, PrologueConfig};
use crate::context::Value;
use crate::engine::{Output, Prologue};
use crate::error::PrologueError;
use crate::registry::path::canonicalize_path;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: PrologueConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
    ) -> Result<Self, PrologueError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &PrologueConfig {
        &self.config
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, PrologueError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Run {
                input,
                output,
                lookup,
            } => self.handle_run(input, output.as_deref(), *lookup),
            Commands::Resolve {
                input,
                line,
                before,
                after,
                format,
            } => self.handle_resolve(input, *line, *before, *after, format),
            Commands::Config { dialect } => {
                let mut config = self.config.clone();
                if let Some(dialect) = dialect {
                    dialect.apply(&mut config);
                }
                toml::to_string_pretty(&config).map_err(|e| {
                    PrologueError::Config(format!("Failed to serialize configuration: {}", e))
                })
            }
        }
    }

    fn handle_run(
        &self,
        input: &InputArgs,
        output: Option<&Path>,
        lookup: Option<LookupFormat>,
    ) -> Result<String, PrologueError> {
        let rendered = self.render(input)?;
        let table = match lookup {
            Some(LookupFormat::Text) => Some(format_lookup_text(&rendered.lookup)),
            Some(LookupFormat::Json) => Some(format_lookup_json(&rendered.lookup)?),
            None => None,
        };
        match output {
            Some(path) => {
                let mut text = rendered.lines.join("\n");
                if !rendered.lines.is_empty() {
                    text.push('\n');
                }
                std::fs::write(path, text)?;
                info!(path = %path.display(), lines = rendered.lines.len(), "Wrote output");
                Ok(table.unwrap_or_else(|| {
                    format!("Wrote {} lines to {}", rendered.lines.len(), path.display())
                }))
            }
            None => {
                let mut text = rendered.lines.join("\n");
                if let Some(table) = table {
                    text.push_str("\n\n");
                    text.push_str(&table);
                }
                Ok(text)
            }
        }
    }

    fn handle_resolve(
        &self,
        input: &InputArgs,
        line: usize,
        before: u32,
        after: u32,
        format: &str,
    ) -> Result<String, PrologueError> {
        let rendered = self.render(input)?;
        let resolved = Prologue::resolve(&rendered.lookup, line, before, after)?;
        if format == "json" {
            format_resolved_json(&resolved)
        } else {
            Ok(format_resolved_text(&resolved))
        }
    }

    /// Build a preprocessor from the inputs and evaluate the top-level file
    fn render(&self, input: &InputArgs) -> Result<Output, PrologueError> {
        let mut config = self.config.clone();
        if let Some(dialect) = input.dialect {
            dialect.apply(&mut config);
        }
        let mut pro = Prologue::new(config)?;
        for dir in &input.dirs {
            pro.add_folder(dir, input.ext.as_deref(), input.recursive)?;
        }
        for file in &input.files {
            pro.add_file(file)?;
        }

        // An existing path that is not a registry name is evaluated directly
        let top = Path::new(&input.top);
        let top = if !pro.registry().has_entry(&input.top) && top.is_file() {
            canonicalize_path(top)?.display().to_string()
        } else {
            input.top.clone()
        };
        debug!(top = %top, entries = pro.registry().len(), "Evaluating");

        let defines = input
            .defines
            .iter()
            .map(|define| parse_define(define))
            .collect::<Result<Vec<_>, _>>()?;
        pro.render_with(&top, defines)
    }
}

/// Split `NAME[=VALUE]`; a bare name defines `true`
pub fn parse_define(define: &str) -> Result<(String, Value), PrologueError> {
    let (name, value) = match define.split_once('=') {
        Some((name, value)) => (name.trim(), Value::Str(value.trim().to_string())),
        None => (define.trim(), Value::Bool(true)),
    };
    if name.is_empty() {
        return Err(PrologueError::Config(format!(
            "Invalid define '{}', expected NAME or NAME=VALUE",
            define
        )));
    }
    Ok((name.to_string(), value))
}
