//! CLI domain: parse, route, help, output, and presentation only.
//! No preprocessing logic; single route table dispatches to the engine.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, InputArgs, LookupFormat};
pub use presentation::{
    format_lookup_json, format_lookup_text, format_resolved_json, format_resolved_text,
    LookupRow,
};
pub use route::{parse_define, RunContext};
