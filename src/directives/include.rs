//! `include` and `import`

use super::{unquote, LineBehavior};
use crate::engine::{FileStream, Session, Stream};
use crate::error::PrologueError;
use crate::line::Source;
use tracing::debug;

fn single_path(tag: &str, arguments: &str) -> Result<String, PrologueError> {
    let path = unquote(arguments);
    if path.is_empty() || path.chars().any(char::is_whitespace) {
        return Err(PrologueError::Directive(format!(
            "Invalid form used for #{} {}",
            tag,
            arguments.trim()
        )));
    }
    Ok(path.to_string())
}

/// Inserts a registered file each time it is used
#[derive(Debug, Default)]
pub struct Include {
    path: String,
}

impl LineBehavior for Include {
    fn yields(&self) -> bool {
        true
    }

    fn invoke(&mut self, _tag: &str, arguments: &str) -> Result<(), PrologueError> {
        self.path = single_path("include", arguments)?;
        Ok(())
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        _source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        let stream = FileStream::open(session, &self.path)?;
        Ok(Some(Box::new(stream)))
    }
}

/// Inserts a registered file only if it has not been entered before
#[derive(Debug, Default)]
pub struct Import {
    path: String,
}

impl LineBehavior for Import {
    fn yields(&self) -> bool {
        true
    }

    fn invoke(&mut self, _tag: &str, arguments: &str) -> Result<(), PrologueError> {
        self.path = single_path("import", arguments)?;
        Ok(())
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        let file = session.pro.registry().resolve(&self.path)?;
        if session.context.in_trace(&file) {
            debug!(location = %source, file = %file.path().display(), "Skipping repeated import");
            return Ok(None);
        }
        let stream = FileStream::enter(session, file)?;
        Ok(Some(Box::new(stream)))
    }
}
