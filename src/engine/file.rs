//! Scanning a registered file into a stream of lines and directives

use super::scan::Scanned;
use super::session::Session;
use super::stream::{EntriesStream, Frame, Pull, Scoped, Stream};
use crate::block::Entry;
use crate::directives::{BlockDirective, Directive, DirectiveWrap, TagRole};
use crate::error::PrologueError;
use crate::line::Line;
use crate::registry::FileRef;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::IntoIter;
use tracing::debug;

/// Stream over one file on the inclusion stack.
///
/// Physical lines are read when the file is entered. Each pull classifies
/// lines until something is ready: plain text outside any block is produced
/// directly, directives outside any block are handed back as frames to be
/// evaluated in place, and everything inside an open block is collected
/// until the block closes.
pub struct FileStream {
    file: FileRef,
    lines: IntoIter<Line>,
    pending: VecDeque<Pull>,
    carry: Option<Line>,
    open: Vec<BlockDirective>,
    finished: bool,
}

impl FileStream {
    /// Resolve `name` through the registry and enter it
    pub fn open(session: &mut Session<'_>, name: &str) -> Result<Self, PrologueError> {
        let file = session.pro.registry().resolve(name)?;
        Self::enter(session, file)
    }

    /// Push `file` onto the inclusion stack and read its lines
    pub fn enter(session: &mut Session<'_>, file: FileRef) -> Result<Self, PrologueError> {
        if session.context.in_stack(&file) {
            let stack: Vec<String> = session
                .context
                .stack()
                .iter()
                .map(|entry| entry.filename())
                .collect();
            return Err(PrologueError::Recursion {
                file: file.filename(),
                stack: stack.join(", "),
            });
        }
        let lines = file.contents()?;
        debug!(file = %file.path().display(), lines = lines.len(), "Entering file");
        session.context.stack_push(file.clone());
        Ok(Self {
            file,
            lines: lines.into_iter(),
            pending: VecDeque::new(),
            carry: None,
            open: Vec::new(),
            finished: false,
        })
    }

    fn process(&mut self, session: &mut Session<'_>, line: Line) -> Result<(), PrologueError> {
        let scanned = match session.pro.scan(line.text()) {
            Some(scanned) => scanned,
            None => return self.text(line),
        };
        let wrap = match session.pro.get_directive(&scanned.tag) {
            Some(wrap) => wrap,
            None if session.pro.config().shared_delimiter => return self.text(line),
            None => {
                return Err(PrologueError::Directive(format!(
                    "No directive known for tag '{}'",
                    scanned.tag
                )))
            }
        };
        if wrap.is_block() && scanned.is_floating() {
            return Err(PrologueError::Directive(format!(
                "The directive '{}' can only be used with an anchored delimiter as it is a block directive",
                scanned.tag
            )));
        }
        match wrap.role(&scanned.tag)? {
            TagRole::Opening => self.opening(&wrap, &scanned, line),
            TagRole::Transition => {
                let block = self
                    .open
                    .last_mut()
                    .filter(|block| block.accepts(&scanned.tag, TagRole::Transition))
                    .ok_or_else(|| {
                        PrologueError::Directive(format!(
                            "Transition tag '{}' was not expected",
                            scanned.tag
                        ))
                    })?;
                block.transition(&scanned.tag, &scanned.arguments)
            }
            TagRole::Closing => {
                let accepted = self
                    .open
                    .last()
                    .is_some_and(|block| block.accepts(&scanned.tag, TagRole::Closing));
                let mut block = match self.open.pop() {
                    Some(block) if accepted => block,
                    _ => {
                        return Err(PrologueError::Directive(format!(
                            "Closing tag '{}' was not expected",
                            scanned.tag
                        )))
                    }
                };
                block.close(&scanned.tag, &scanned.arguments)?;
                debug!(directive = block.name(), location = %block.source(), "Closed block");
                match self.open.last_mut() {
                    Some(parent) => parent.append(Entry::directive(Directive::Block(block))),
                    None => {
                        let body = EntriesStream::single(Entry::directive(Directive::Block(block)));
                        let scoped = Scoped::join(Box::new(body));
                        self.pending.push_back(Pull::Enter(Frame::new(Box::new(scoped))));
                        Ok(())
                    }
                }
            }
        }
    }

    fn opening(
        &mut self,
        wrap: &Rc<DirectiveWrap>,
        scanned: &Scanned,
        line: Line,
    ) -> Result<(), PrologueError> {
        match wrap.create(line.source().clone()) {
            Directive::Line(mut directive) => {
                if let Some(end) = scanned.prefix {
                    let leading = line.slice(0..end).trim_end();
                    if !leading.text().is_empty() {
                        self.text(leading)?;
                    }
                }
                directive.invoke(&scanned.tag, &scanned.arguments)?;
                let entry = Entry::directive(Directive::Line(directive));
                match self.open.last_mut() {
                    Some(block) => block.append(entry),
                    None => {
                        let single = EntriesStream::single(entry);
                        self.pending.push_back(Pull::Enter(Frame::new(Box::new(single))));
                        Ok(())
                    }
                }
            }
            Directive::Block(mut block) => {
                block.open(&scanned.tag, &scanned.arguments)?;
                debug!(directive = block.name(), location = %block.source(), "Opened block");
                self.open.push(block);
                Ok(())
            }
        }
    }

    fn text(&mut self, line: Line) -> Result<(), PrologueError> {
        match self.open.last_mut() {
            Some(block) => block.append(Entry::Line(line)),
            None => {
                self.pending.push_back(Pull::Line(line));
                Ok(())
            }
        }
    }

    fn finish(&mut self, session: &mut Session<'_>) -> Result<(), PrologueError> {
        if let Some(block) = self.open.last() {
            let tag = block.opened_with().unwrap_or_else(|| block.name());
            return Err(PrologueError::Unclosed {
                directive: format!("{}{}", session.pro.config().delimiter, tag),
                location: block.source().clone(),
                snippet: block.source().snippet(2, 2).join("\n"),
            });
        }
        let popped = session.context.stack_pop()?;
        if !popped.same_file(&self.file) {
            return Err(PrologueError::Corrupted(format!(
                "Expected {} at top of file stack, found {}",
                self.file.filename(),
                popped.filename()
            )));
        }
        debug!(file = %self.file.path().display(), "Leaving file");
        self.finished = true;
        Ok(())
    }
}

impl Stream for FileStream {
    fn pull(&mut self, session: &mut Session<'_>) -> Result<Pull, PrologueError> {
        loop {
            if let Some(next) = self.pending.pop_front() {
                return Ok(next);
            }
            if self.finished {
                return Ok(Pull::Done);
            }
            match self.lines.next() {
                Some(line) => {
                    let line = match self.carry.take() {
                        Some(carried) => carried.concat(line.text()),
                        None => line,
                    };
                    if let Some(stripped) = line.text().strip_suffix('\\') {
                        self.carry = Some(line.encase(stripped));
                        continue;
                    }
                    let source = line.source().clone();
                    self.process(session, line).map_err(|e| e.at(&source))?;
                }
                None => match self.carry.take() {
                    Some(line) => {
                        let source = line.source().clone();
                        self.process(session, line).map_err(|e| e.at(&source))?;
                    }
                    None => self.finish(session)?,
                },
            }
        }
    }
}
