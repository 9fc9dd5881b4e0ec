//! The flattening loop

use super::file::FileStream;
use super::session::Session;
use super::stream::{Frame, Pull};
use super::Prologue;
use crate::context::{Context, Value};
use crate::error::PrologueError;
use crate::line::Source;
use crate::registry::FileRef;
use std::collections::BTreeMap;

/// A lazy, non-restartable evaluation of one top-level file.
///
/// Each call to `next` pulls from the innermost frame until a line is
/// produced, substitutes it in the current context and records where it came
/// from. The first error ends the evaluation.
pub struct Evaluation<'p> {
    pro: &'p Prologue,
    context: Context,
    root: Option<String>,
    stack: Vec<Frame>,
    silent: usize,
    lookup: Vec<Source>,
    done: bool,
}

impl<'p> Evaluation<'p> {
    pub(crate) fn new(pro: &'p Prologue, filename: &str, context: Context) -> Self {
        Self {
            pro,
            context,
            root: Some(filename.to_string()),
            stack: Vec::new(),
            silent: 0,
            lookup: Vec::new(),
            done: false,
        }
    }

    /// Source of every line produced so far, in output order
    pub fn lookup(&self) -> &[Source] {
        &self.lookup
    }

    pub fn into_lookup(self) -> Vec<Source> {
        self.lookup
    }

    /// Every file entered so far
    pub fn included(&self) -> &[FileRef] {
        self.context.trace()
    }

    /// Defines visible at the current point of evaluation
    pub fn defines(&self) -> BTreeMap<String, Value> {
        self.context.defines()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    fn push(&mut self, frame: Frame) {
        if frame.silent {
            self.silent += 1;
        }
        self.stack.push(frame);
    }

    fn advance(&mut self) -> Result<Option<String>, PrologueError> {
        if let Some(root) = self.root.take() {
            let mut session = Session::new(self.pro, &mut self.context);
            let stream = FileStream::open(&mut session, &root)?;
            self.push(Frame::new(Box::new(stream)));
        }
        loop {
            let pulled = match self.stack.last_mut() {
                Some(frame) => {
                    let mut session = Session::new(self.pro, &mut self.context);
                    frame.stream.pull(&mut session)?
                }
                None => return Ok(None),
            };
            match pulled {
                Pull::Line(line) => {
                    if self.silent > 0 {
                        continue;
                    }
                    let line = self
                        .context
                        .substitute(&line)
                        .map_err(|e| e.at(line.source()))?;
                    self.lookup.push(line.source().clone());
                    return Ok(Some(line.into_text()));
                }
                Pull::Enter(frame) => self.push(frame),
                Pull::Done => {
                    if let Some(frame) = self.stack.pop() {
                        if frame.silent {
                            self.silent -= 1;
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for Evaluation<'_> {
    type Item = Result<String, PrologueError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(text)) => Some(Ok(text)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
