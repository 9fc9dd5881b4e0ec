//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Command name recorded on the command span (e.g. "run", "resolve").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run { .. } => "run",
        Commands::Resolve { .. } => "resolve",
        Commands::Config { .. } => "config",
    }
}
