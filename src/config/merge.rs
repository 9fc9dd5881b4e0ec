//! Merge rules for layered configuration

pub mod merge_policy;
