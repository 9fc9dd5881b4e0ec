//! Configuration file sources, lowest precedence first

pub mod global_file;
pub mod workspace_file;
