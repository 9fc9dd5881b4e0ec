//! Diagnostic messages: `info`, `warn`/`warning`/`todo`/`fixme`, `error`/`danger`/`fatal`

use super::LineBehavior;
use crate::engine::{Level, Session, Stream};
use crate::error::PrologueError;
use crate::line::{Line, Source};

pub const INFO: &[&str] = &["info"];
pub const WARNING: &[&str] = &["warn", "warning", "todo", "fixme"];
pub const ERROR: &[&str] = &["error", "danger", "fatal"];

/// Routes its text to the message handler for its level
#[derive(Debug)]
pub struct Message {
    level: Level,
    text: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            level: Level::Info,
            text: String::new(),
        }
    }
}

impl LineBehavior for Message {
    fn invoke(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        self.level = if INFO.contains(&tag) {
            Level::Info
        } else if WARNING.contains(&tag) {
            Level::Warning
        } else if ERROR.contains(&tag) {
            Level::Error
        } else {
            return Err(PrologueError::Directive(format!(
                "Unrecognised message type {}",
                tag
            )));
        };
        self.text = arguments.trim().to_string();
        Ok(())
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        let line = Line::located(self.text.clone(), source.clone());
        let text = session.context.substitute(&line)?.into_text();
        session.report(self.level, text, Some(source))?;
        Ok(None)
    }
}
