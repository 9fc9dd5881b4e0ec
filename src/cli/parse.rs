//! CLI parse: clap types for Prologue. No behavior; definitions only.

use crate::config::Dialect;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prologue CLI - directive-driven text preprocessor
#[derive(Parser)]
#[command(name = "prologue")]
#[command(about = "Expand directives and substitutions across a tree of source files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (searched for prologue.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a file and write the expanded lines
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Write expanded lines to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Also print the output-to-source lookup table
        #[arg(long, value_enum)]
        lookup: Option<LookupFormat>,
    },
    /// Map an output line back to the source line it came from
    Resolve {
        #[command(flatten)]
        input: InputArgs,

        /// 1-based output line number
        line: usize,

        /// Source lines shown before the match
        #[arg(long, default_value = "2")]
        before: u32,

        /// Source lines shown after the match
        #[arg(long, default_value = "2")]
        after: u32,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Apply a dialect preset before printing
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,
    },
}

/// Files to register and the top-level file to evaluate
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Registry name or path of the top-level file
    pub top: String,

    /// Register a folder (repeatable)
    #[arg(long = "dir")]
    pub dirs: Vec<PathBuf>,

    /// Register a single file (repeatable)
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// Only register files with this extension from each folder
    #[arg(long)]
    pub ext: Option<String>,

    /// Descend into subfolders of each folder
    #[arg(long)]
    pub recursive: bool,

    /// Initial define, NAME or NAME=VALUE (repeatable)
    #[arg(short = 'D', long = "define", value_name = "NAME[=VALUE]")]
    pub defines: Vec<String>,

    /// Syntax preset for the source dialect
    #[arg(long, value_enum)]
    pub dialect: Option<Dialect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupFormat {
    Text,
    Json,
}
