//! Blocks of deferred content

use crate::directives::Directive;
use crate::engine::{EntriesStream, Stream};
use crate::line::Line;
use std::rc::Rc;

/// One item of a block: a plain line or a nested directive
#[derive(Clone)]
pub enum Entry {
    Line(Line),
    Directive(Rc<Directive>),
}

impl Entry {
    pub fn directive(directive: Directive) -> Self {
        Entry::Directive(Rc::new(directive))
    }
}

impl From<Line> for Entry {
    fn from(line: Line) -> Self {
        Entry::Line(line)
    }
}

/// An ordered sequence of entries, evaluated lazily.
///
/// Entries are shared so a body can be streamed repeatedly (once per loop
/// iteration) without copying.
#[derive(Clone, Default)]
pub struct Block {
    entries: Rc<Vec<Entry>>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: impl Into<Entry>) {
        Rc::make_mut(&mut self.entries).push(entry.into());
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stream the block's content in the current context
    pub fn stream(&self) -> Box<dyn Stream> {
        Box::new(EntriesStream::new(Rc::clone(&self.entries)))
    }
}
