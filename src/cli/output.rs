//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::PrologueError;
use owo_colors::OwoColorize;

/// Map preprocessor errors to a string for CLI output.
pub fn map_error(e: &PrologueError) -> String {
    format!("{} {}", "error:".red().bold(), e)
}
