//! Pull-based streams
//!
//! Every source of output lines (a file, a block body, a loop) is a
//! [`Stream`]. Streams never call each other: a stream that needs another
//! stream's lines hands it back as [`Pull::Enter`], and the evaluation loop
//! pushes it as a new frame. Nesting depth lives on the heap, not the call
//! stack.

use super::session::Session;
use crate::block::Entry;
use crate::error::PrologueError;
use crate::line::Line;
use std::rc::Rc;

/// Result of pulling once from a stream
pub enum Pull {
    /// A raw line, still to be substituted
    Line(Line),
    /// Descend into a nested stream until it is done
    Enter(Frame),
    /// The stream is exhausted
    Done,
}

/// A stream pushed onto the evaluation stack
pub struct Frame {
    pub stream: Box<dyn Stream>,
    /// Lines produced while this frame is active are dropped
    pub silent: bool,
}

impl Frame {
    pub fn new(stream: Box<dyn Stream>) -> Self {
        Self {
            stream,
            silent: false,
        }
    }

    pub fn silent(stream: Box<dyn Stream>) -> Self {
        Self {
            stream,
            silent: true,
        }
    }
}

/// A lazily evaluated source of lines
pub trait Stream {
    fn pull(&mut self, session: &mut Session<'_>) -> Result<Pull, PrologueError>;
}

/// Stream over the entries of a block.
///
/// Lines are produced as-is; directives are evaluated when reached, in the
/// current context.
pub struct EntriesStream {
    entries: Rc<Vec<Entry>>,
    index: usize,
}

impl EntriesStream {
    pub fn new(entries: Rc<Vec<Entry>>) -> Self {
        Self { entries, index: 0 }
    }

    pub fn empty() -> Self {
        Self::new(Rc::new(Vec::new()))
    }

    pub fn single(entry: Entry) -> Self {
        Self::new(Rc::new(vec![entry]))
    }
}

impl Stream for EntriesStream {
    fn pull(&mut self, session: &mut Session<'_>) -> Result<Pull, PrologueError> {
        while let Some(entry) = self.entries.get(self.index).cloned() {
            self.index += 1;
            match entry {
                Entry::Line(line) => return Ok(Pull::Line(line)),
                Entry::Directive(directive) => {
                    let stream = directive
                        .evaluate(session)
                        .map_err(|e| e.at(directive.source()))?;
                    if let Some(stream) = stream {
                        return Ok(Pull::Enter(if directive.yields() {
                            Frame::new(stream)
                        } else {
                            Frame::silent(stream)
                        }));
                    }
                }
            }
        }
        Ok(Pull::Done)
    }
}

/// Runs an inner stream inside a forked scope.
///
/// The scope opens on the first pull and is joined into (or discarded from)
/// the enclosing scope once the inner stream is exhausted.
pub struct Scoped {
    inner: Option<Box<dyn Stream>>,
    merge: bool,
}

impl Scoped {
    /// Defines made by `inner` survive into the enclosing scope
    pub fn join(inner: Box<dyn Stream>) -> Self {
        Self {
            inner: Some(inner),
            merge: true,
        }
    }

    /// Defines made by `inner` are dropped
    pub fn discard(inner: Box<dyn Stream>) -> Self {
        Self {
            inner: Some(inner),
            merge: false,
        }
    }
}

impl Stream for Scoped {
    fn pull(&mut self, session: &mut Session<'_>) -> Result<Pull, PrologueError> {
        if let Some(inner) = self.inner.take() {
            session.context.fork();
            return Ok(Pull::Enter(Frame::new(inner)));
        }
        if self.merge {
            session.context.join()?;
        } else {
            session.context.discard()?;
        }
        Ok(Pull::Done)
    }
}
