//! `define` and `undef`

use super::LineBehavior;
use crate::context::{Collision, Value};
use crate::engine::{Level, Session, Stream};
use crate::error::PrologueError;
use crate::line::Source;

/// `define NAME [VALUE]`; a missing value defines `true`
#[derive(Debug, Default)]
pub struct Define {
    name: String,
    value: Option<String>,
}

impl LineBehavior for Define {
    fn invoke(&mut self, _tag: &str, arguments: &str) -> Result<(), PrologueError> {
        let arguments = arguments.trim();
        let mut parts = arguments.splitn(2, char::is_whitespace);
        match parts.next() {
            Some(name) if !name.is_empty() => self.name = name.to_string(),
            _ => {
                return Err(PrologueError::Directive(format!(
                    "Invalid form used for #define {}",
                    arguments
                )))
            }
        }
        self.value = parts
            .next()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(())
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        let collision = if session.pro.config().allow_redefine {
            Collision::Warn
        } else {
            Collision::Error
        };
        let value = match &self.value {
            Some(text) => Value::Str(text.clone()),
            None => Value::Bool(true),
        };
        if let Some(previous) = session.context.set_define(&self.name, value, collision)? {
            session.report(
                Level::Warning,
                format!(
                    "Value already defined for key {} (previously {})",
                    self.name, previous
                ),
                Some(source),
            )?;
        }
        Ok(None)
    }
}

/// `undef NAME`
#[derive(Debug, Default)]
pub struct Undefine {
    name: String,
}

impl LineBehavior for Undefine {
    fn invoke(&mut self, _tag: &str, arguments: &str) -> Result<(), PrologueError> {
        let parts: Vec<&str> = arguments.split_whitespace().collect();
        match parts.as_slice() {
            [name] => {
                self.name = name.to_string();
                Ok(())
            }
            _ => Err(PrologueError::Directive(format!(
                "Invalid form used for #undef {}",
                arguments.trim()
            ))),
        }
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        _source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        if !session.context.has_define(&self.name) {
            return Err(PrologueError::Expression(format!(
                "No variable defined for '{}'",
                self.name
            )));
        }
        session.context.clear_define(&self.name)?;
        Ok(None)
    }
}
