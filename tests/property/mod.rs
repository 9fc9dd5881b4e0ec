//! Property-based tests for expansion invariants

mod expansion;
