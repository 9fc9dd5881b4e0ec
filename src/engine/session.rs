//! Per-pull view of an evaluation

use super::message::{Level, Report};
use super::Prologue;
use crate::context::Context;
use crate::error::PrologueError;
use crate::line::Source;

/// What a stream or directive may touch while it is pulled
pub struct Session<'a> {
    pub pro: &'a Prologue,
    pub context: &'a mut Context,
}

impl<'a> Session<'a> {
    pub fn new(pro: &'a Prologue, context: &'a mut Context) -> Self {
        Self { pro, context }
    }

    /// Route a message to the preprocessor's handler for `level`
    pub fn report(
        &self,
        level: Level,
        text: impl Into<String>,
        source: Option<&Source>,
    ) -> Result<(), PrologueError> {
        self.pro.report(&Report {
            level,
            text: text.into(),
            source: source.cloned(),
        })
    }
}
