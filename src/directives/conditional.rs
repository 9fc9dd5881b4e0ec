//! `if` / `ifdef` / `ifndef` … `elif` … `else` … `endif`

use super::BlockBehavior;
use crate::block::{Block, Entry};
use crate::engine::{EntriesStream, Scoped, Session, Stream};
use crate::error::PrologueError;
use crate::line::Source;
use tracing::debug;

struct Section {
    tag: String,
    condition: String,
    body: Block,
}

/// Ordered guarded sections; only the first truthy one is ever evaluated
#[derive(Default)]
pub struct Conditional {
    sections: Vec<Section>,
    has_else: bool,
}

impl Conditional {
    fn section(&mut self, tag: &str, condition: &str) {
        self.sections.push(Section {
            tag: tag.to_string(),
            condition: condition.trim().to_string(),
            body: Block::new(),
        });
    }

    fn holds(section: &Section, session: &Session<'_>) -> Result<bool, PrologueError> {
        Ok(match section.tag.as_str() {
            "ifdef" => session.context.has_define(&section.condition),
            "ifndef" => !session.context.has_define(&section.condition),
            "else" => true,
            _ => session.context.evaluate(&section.condition)?.truthy(),
        })
    }
}

impl BlockBehavior for Conditional {
    fn open(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        if !matches!(tag, "if" | "ifdef" | "ifndef") {
            return Err(PrologueError::Directive(format!(
                "Conditional opening invoked with '{}'",
                tag
            )));
        }
        if matches!(tag, "ifdef" | "ifndef") && arguments.split_whitespace().count() != 1 {
            return Err(PrologueError::Directive(format!(
                "Invalid form used for #{} {}",
                tag,
                arguments.trim()
            )));
        }
        if arguments.trim().is_empty() {
            return Err(PrologueError::Directive(format!(
                "Missing condition for #{}",
                tag
            )));
        }
        self.section(tag, arguments);
        Ok(())
    }

    fn transition(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        if !matches!(tag, "elif" | "else") {
            return Err(PrologueError::Directive(format!(
                "Conditional transition invoked with '{}'",
                tag
            )));
        }
        if self.has_else {
            return Err(PrologueError::Directive(format!(
                "Transition '{}' detected after 'else' clause",
                tag
            )));
        }
        if tag == "elif" && arguments.trim().is_empty() {
            return Err(PrologueError::Directive("Missing condition for #elif".to_string()));
        }
        self.has_else = tag == "else";
        self.section(tag, arguments);
        Ok(())
    }

    fn close(&mut self, tag: &str, _arguments: &str) -> Result<(), PrologueError> {
        if tag != "endif" {
            return Err(PrologueError::Directive(format!(
                "Conditional close invoked with '{}'",
                tag
            )));
        }
        Ok(())
    }

    fn append(&mut self, entry: Entry) {
        if let Some(section) = self.sections.last_mut() {
            section.body.append(entry);
        }
    }

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Box<dyn Stream>, PrologueError> {
        for (index, section) in self.sections.iter().enumerate() {
            if Self::holds(section, session)? {
                debug!(
                    location = %source,
                    section = index,
                    tag = %section.tag,
                    "Conditional section selected"
                );
                return Ok(Box::new(Scoped::join(section.body.stream())));
            }
        }
        Ok(Box::new(EntriesStream::empty()))
    }
}
