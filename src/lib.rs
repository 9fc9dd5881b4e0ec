//! Prologue: Directive-Driven Text Preprocessor
//!
//! Expands conditionals, loops, file inclusion, defines and diagnostic
//! messages across a registry of source files, producing output lines along
//! with the source location each one came from.

pub mod block;
pub mod cli;
pub mod config;
pub mod context;
pub mod directives;
pub mod engine;
pub mod error;
pub mod line;
pub mod logging;
pub mod registry;

pub use config::{Dialect, PrologueConfig};
pub use context::{Context, Value};
pub use engine::{Evaluation, Level, Output, Prologue, Report, Resolved};
pub use error::PrologueError;
pub use line::{Line, Source};
pub use registry::{FileRef, Registry};
