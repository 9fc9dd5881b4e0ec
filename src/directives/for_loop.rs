//! `for VAR in ITERABLE` … `endfor`

use super::BlockBehavior;
use crate::block::{Block, Entry};
use crate::context::{Undefined, Value};
use crate::engine::{Frame, Pull, Session, Stream};
use crate::error::PrologueError;
use crate::line::Source;
use std::vec::IntoIter;

/// Repeats its body once per value of the iterable
#[derive(Default)]
pub struct ForLoop {
    variable: String,
    iterable: String,
    body: Block,
}

impl ForLoop {
    /// Split `VAR in ITERABLE` on the first standalone `in`
    fn parse(condition: &str) -> Option<(String, String)> {
        let condition = condition.trim();
        let mut parts = condition.splitn(2, char::is_whitespace);
        let variable = parts.next()?.trim();
        let rest = parts.next()?.trim_start();
        let iterable = rest.strip_prefix("in")?;
        if !iterable.starts_with(|c: char| c.is_whitespace() || c == '[' || c == '(') {
            return None;
        }
        let iterable = iterable.trim();
        if variable.is_empty() || iterable.is_empty() {
            return None;
        }
        Some((variable.to_string(), iterable.to_string()))
    }

    fn values(&self, session: &Session<'_>) -> Result<Vec<Value>, PrologueError> {
        // bare words in a literal list are items, not variable references
        let value = if self.iterable.starts_with('[') && self.iterable.ends_with(']') {
            session
                .context
                .evaluate_with(&self.iterable, Undefined::Permissive)?
        } else {
            session.context.evaluate(&self.iterable)?
        };
        value.iterate()
    }
}

impl BlockBehavior for ForLoop {
    fn open(&mut self, _tag: &str, arguments: &str) -> Result<(), PrologueError> {
        let (variable, iterable) = Self::parse(arguments).ok_or_else(|| {
            PrologueError::Directive(format!(
                "Incorrectly formed loop condition '{}'",
                arguments.trim()
            ))
        })?;
        self.variable = variable;
        self.iterable = iterable;
        Ok(())
    }

    fn transition(&mut self, _tag: &str, _arguments: &str) -> Result<(), PrologueError> {
        Err(PrologueError::Directive(
            "For loop does not support transitions".to_string(),
        ))
    }

    fn append(&mut self, entry: Entry) {
        self.body.append(entry);
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        _source: &Source,
    ) -> Result<Box<dyn Stream>, PrologueError> {
        let values = self.values(session)?;
        Ok(Box::new(Iterations {
            variable: self.variable.clone(),
            values: values.into_iter(),
            body: self.body.clone(),
            forked: false,
        }))
    }
}

/// Streams the body once per value inside one forked scope
struct Iterations {
    variable: String,
    values: IntoIter<Value>,
    body: Block,
    forked: bool,
}

impl Stream for Iterations {
    fn pull(&mut self, session: &mut Session<'_>) -> Result<Pull, PrologueError> {
        if !self.forked {
            session.context.fork();
            self.forked = true;
        }
        match self.values.next() {
            Some(value) => {
                session.context.rebind(&self.variable, value)?;
                Ok(Pull::Enter(Frame::new(self.body.stream())))
            }
            None => {
                session.context.discard()?;
                Ok(Pull::Done)
            }
        }
    }
}
