//! Directive Framework
//!
//! A directive is either a *line* directive, invoked once and evaluated, or a
//! *block* directive with an explicit lifecycle:
//!
//! ```text
//! Unopened --open--> Opened --transition*--> Opened --close--> Closed
//! ```
//!
//! Concrete directives implement [`LineBehavior`] or [`BlockBehavior`]. The
//! wrappers here own the lifecycle state and reject out-of-order calls, so
//! behaviors only deal with their own arguments and content.

pub mod conditional;
pub mod define;
pub mod for_loop;
pub mod include;
pub mod message;
pub mod wrap;

pub use wrap::{DirectiveWrap, Factory, TagRole, TagSets};

use crate::block::Entry;
use crate::engine::{Session, Stream};
use crate::error::PrologueError;
use crate::line::Source;
use std::rc::Rc;

/// Behavior of a single-line directive
pub trait LineBehavior {
    /// Whether evaluation produces output lines
    fn yields(&self) -> bool {
        false
    }

    /// Parse the tag and arguments
    fn invoke(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError>;

    /// Perform the directive, optionally returning a stream of output
    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError>;
}

/// Behavior of a block directive
pub trait BlockBehavior {
    fn yields(&self) -> bool {
        true
    }

    fn open(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError>;

    fn transition(&mut self, tag: &str, _arguments: &str) -> Result<(), PrologueError> {
        Err(PrologueError::Directive(format!(
            "Transition '{}' is not supported by this directive",
            tag
        )))
    }

    fn close(&mut self, _tag: &str, _arguments: &str) -> Result<(), PrologueError> {
        Ok(())
    }

    /// Add a line or nested directive to the active section
    fn append(&mut self, entry: Entry);

    fn evaluate(
        &self,
        session: &mut Session<'_>,
        source: &Source,
    ) -> Result<Box<dyn Stream>, PrologueError>;
}

/// A directive occurrence in the source
pub enum Directive {
    Line(LineDirective),
    Block(BlockDirective),
}

impl Directive {
    pub fn name(&self) -> &str {
        match self {
            Directive::Line(line) => &line.name,
            Directive::Block(block) => &block.name,
        }
    }

    pub fn source(&self) -> &Source {
        match self {
            Directive::Line(line) => &line.source,
            Directive::Block(block) => &block.source,
        }
    }

    pub fn yields(&self) -> bool {
        match self {
            Directive::Line(line) => line.behavior.yields(),
            Directive::Block(block) => block.behavior.yields(),
        }
    }

    pub fn evaluate(
        &self,
        session: &mut Session<'_>,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        match self {
            Directive::Line(line) => line.evaluate(session),
            Directive::Block(block) => block.evaluate(session).map(Some),
        }
    }
}

/// A line directive instance
pub struct LineDirective {
    name: String,
    behavior: Box<dyn LineBehavior>,
    source: Source,
    invoked: bool,
}

impl LineDirective {
    pub fn new(name: impl Into<String>, behavior: Box<dyn LineBehavior>, source: Source) -> Self {
        Self {
            name: name.into(),
            behavior,
            source,
            invoked: false,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn yields(&self) -> bool {
        self.behavior.yields()
    }

    pub fn invoke(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        if self.invoked {
            return Err(PrologueError::Lifecycle(format!(
                "Directive {} has already been invoked",
                self.name
            )));
        }
        self.behavior.invoke(tag, arguments)?;
        self.invoked = true;
        Ok(())
    }

    pub fn evaluate(
        &self,
        session: &mut Session<'_>,
    ) -> Result<Option<Box<dyn Stream>>, PrologueError> {
        if !self.invoked {
            return Err(PrologueError::Lifecycle(format!(
                "Directive {} evaluated before being invoked",
                self.name
            )));
        }
        self.behavior.evaluate(session, &self.source)
    }
}

/// Lifecycle state of a block directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Unopened,
    Opened,
    Closed,
}

/// A block directive instance
pub struct BlockDirective {
    name: String,
    tags: Rc<TagSets>,
    behavior: Box<dyn BlockBehavior>,
    source: Source,
    state: BlockState,
    opened_with: Option<String>,
}

impl BlockDirective {
    pub fn new(
        name: impl Into<String>,
        tags: Rc<TagSets>,
        behavior: Box<dyn BlockBehavior>,
        source: Source,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            behavior,
            source,
            state: BlockState::Unopened,
            opened_with: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Tag that opened the block
    pub fn opened_with(&self) -> Option<&str> {
        self.opened_with.as_deref()
    }

    /// Whether `tag` plays `role` for this directive
    pub fn accepts(&self, tag: &str, role: TagRole) -> bool {
        self.tags.role(tag) == Some(role)
    }

    pub fn open(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        if self.state != BlockState::Unopened {
            return Err(PrologueError::Lifecycle(
                "Multiple opening statements for block detected".to_string(),
            ));
        }
        self.expect_role(tag, TagRole::Opening)?;
        self.behavior.open(tag, arguments)?;
        self.state = BlockState::Opened;
        self.opened_with = Some(tag.to_string());
        Ok(())
    }

    pub fn transition(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        match self.state {
            BlockState::Unopened => {
                return Err(PrologueError::Lifecycle(format!(
                    "Transition '{}' used before opening directive",
                    tag
                )))
            }
            BlockState::Closed => {
                return Err(PrologueError::Lifecycle(format!(
                    "Transition '{}' used after closing directive",
                    tag
                )))
            }
            BlockState::Opened => {}
        }
        self.expect_role(tag, TagRole::Transition)?;
        self.behavior.transition(tag, arguments)
    }

    pub fn close(&mut self, tag: &str, arguments: &str) -> Result<(), PrologueError> {
        match self.state {
            BlockState::Unopened => {
                return Err(PrologueError::Lifecycle(format!(
                    "Closing '{}' used before opening directive",
                    tag
                )))
            }
            BlockState::Closed => {
                return Err(PrologueError::Lifecycle(
                    "Multiple closing statements for block detected".to_string(),
                ))
            }
            BlockState::Opened => {}
        }
        self.expect_role(tag, TagRole::Closing)?;
        self.behavior.close(tag, arguments)?;
        self.state = BlockState::Closed;
        Ok(())
    }

    pub fn append(&mut self, entry: Entry) -> Result<(), PrologueError> {
        match self.state {
            BlockState::Unopened => Err(PrologueError::Lifecycle(
                "Trying to append a line to an unopened directive".to_string(),
            )),
            BlockState::Closed => Err(PrologueError::Lifecycle(
                "Trying to append a line to a closed directive".to_string(),
            )),
            BlockState::Opened => {
                self.behavior.append(entry);
                Ok(())
            }
        }
    }

    pub fn evaluate(&self, session: &mut Session<'_>) -> Result<Box<dyn Stream>, PrologueError> {
        if self.state != BlockState::Closed {
            return Err(PrologueError::Lifecycle(format!(
                "Block directive {} evaluated before being closed",
                self.name
            )));
        }
        self.behavior.evaluate(session, &self.source)
    }

    fn expect_role(&self, tag: &str, role: TagRole) -> Result<(), PrologueError> {
        match self.tags.role(tag) {
            Some(found) if found == role => Ok(()),
            _ => Err(PrologueError::Directive(format!(
                "Tag '{}' cannot be used as {} tag of {}",
                tag, role, self.name
            ))),
        }
    }
}

/// The directives every preprocessor starts with
pub fn prime_directives() -> Result<Vec<DirectiveWrap>, PrologueError> {
    let messages: Vec<&str> = message::INFO
        .iter()
        .chain(message::WARNING)
        .chain(message::ERROR)
        .copied()
        .collect();
    Ok(vec![
        DirectiveWrap::line("Define", &["define"], || {
            Box::<define::Define>::default()
        })?,
        DirectiveWrap::line("Undefine", &["undef"], || {
            Box::<define::Undefine>::default()
        })?,
        DirectiveWrap::block(
            "Conditional",
            &["if", "ifdef", "ifndef"],
            &["elif", "else"],
            &["endif"],
            || Box::<conditional::Conditional>::default(),
        )?,
        DirectiveWrap::block("ForLoop", &["for"], &[], &["endfor"], || {
            Box::<for_loop::ForLoop>::default()
        })?,
        DirectiveWrap::line("Include", &["include"], || {
            Box::<include::Include>::default()
        })?,
        DirectiveWrap::line("Import", &["import"], || {
            Box::<include::Import>::default()
        })?,
        DirectiveWrap::line("Message", &messages, || {
            Box::<message::Message>::default()
        })?,
    ])
}

/// Strip one pair of enclosing quotes (`"…"` or `<…>`) from an argument
pub(crate) fn unquote(argument: &str) -> &str {
    let trimmed = argument.trim();
    for (open, close) in [('"', '"'), ('<', '>'), ('\'', '\'')] {
        if trimmed.len() >= 2 && trimmed.starts_with(open) && trimmed.ends_with(close) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
