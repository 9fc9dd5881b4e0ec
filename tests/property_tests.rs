//! Property-based tests entry point
//!
//! Includes the property test modules from the property/ subdirectory.

mod property;
