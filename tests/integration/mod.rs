//! Integration tests for the Prologue preprocessor

mod config_integration;
mod dialects;
mod inclusion;
mod lookup;
mod scenarios;
mod test_utils;
