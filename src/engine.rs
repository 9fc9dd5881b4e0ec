//! Evaluation Engine
//!
//! [`Prologue`] owns everything fixed for the lifetime of a preprocessor: the
//! validated configuration, the file registry, the directive table and the
//! message handlers. Each call to [`Prologue::evaluate`] starts a fresh
//! [`Evaluation`] with its own context.

mod evaluation;
mod file;
mod message;
mod scan;
mod session;
mod stream;

pub use evaluation::Evaluation;
pub use file::FileStream;
pub use message::{Handler, Level, Report};
pub use scan::{Scanned, Scanner};
pub use session::Session;
pub use stream::{EntriesStream, Frame, Pull, Scoped, Stream};

use crate::config::PrologueConfig;
use crate::context::{Collision, Context, Value};
use crate::directives::{prime_directives, DirectiveWrap};
use crate::error::PrologueError;
use crate::line::Source;
use crate::registry::{FileRef, Registry};
use message::Handlers;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// A configured preprocessor
pub struct Prologue {
    config: PrologueConfig,
    registry: Registry,
    scanner: Scanner,
    directives: HashMap<String, Rc<DirectiveWrap>>,
    handlers: Handlers,
}

/// A fully collected evaluation
#[derive(Debug)]
pub struct Output {
    pub lines: Vec<String>,
    /// Source of each output line, index-aligned with `lines`
    pub lookup: Vec<Source>,
    /// Every file entered, in first-entry order
    pub included: Vec<FileRef>,
}

/// An output line mapped back to its source
#[derive(Debug, Clone, Serialize)]
pub struct Resolved {
    pub file: String,
    pub line: u32,
    pub snippet: Vec<String>,
}

impl Prologue {
    /// Build a preprocessor with the prime directives registered
    pub fn new(config: PrologueConfig) -> Result<Self, PrologueError> {
        config.validate()?;
        let scanner = Scanner::new(&config.delimiter, config.comment.as_deref())?;
        let registry = if config.flat_registry {
            Registry::flat()
        } else {
            Registry::new()
        };
        let mut pro = Self {
            config,
            registry,
            scanner,
            directives: HashMap::new(),
            handlers: Handlers::default(),
        };
        for wrap in prime_directives()? {
            pro.register_directive(wrap)?;
        }
        Ok(pro)
    }

    pub fn config(&self) -> &PrologueConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<(), PrologueError> {
        self.registry.add_file(path, false)
    }

    pub fn add_folder(
        &mut self,
        path: impl AsRef<Path>,
        search_for: Option<&str>,
        recursive: bool,
    ) -> Result<(), PrologueError> {
        self.registry.add_folder(path, search_for, recursive, false)
    }

    /// Bind every tag of `wrap`; fails without side effects if any tag is taken
    pub fn register_directive(&mut self, wrap: DirectiveWrap) -> Result<(), PrologueError> {
        if let Some(taken) = wrap.tags().all().find(|tag| self.directives.contains_key(*tag)) {
            return Err(PrologueError::Registration(format!(
                "Directive already registered for tag '{}'",
                taken
            )));
        }
        debug!(directive = wrap.name(), "Registering directive");
        let wrap = Rc::new(wrap);
        for tag in wrap.tags().all() {
            self.directives.insert(tag.clone(), Rc::clone(&wrap));
        }
        Ok(())
    }

    /// Directive bound to `tag`, matched case-insensitively
    pub fn get_directive(&self, tag: &str) -> Option<Rc<DirectiveWrap>> {
        self.directives.get(&tag.to_lowercase()).cloned()
    }

    /// Every registered tag, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn scan(&self, text: &str) -> Option<Scanned> {
        self.scanner.scan(text)
    }

    /// Replace the handler for messages of `level`
    pub fn on_message<F>(&mut self, level: Level, handler: F)
    where
        F: Fn(&Report) -> Result<(), PrologueError> + 'static,
    {
        self.handlers.set(level, Box::new(handler));
    }

    pub fn report(&self, report: &Report) -> Result<(), PrologueError> {
        self.handlers.dispatch(report)
    }

    /// Lazily evaluate `filename` with no initial defines
    pub fn evaluate(&self, filename: &str) -> Evaluation<'_> {
        Evaluation::new(self, filename, Context::new(self.config.context_options()))
    }

    /// Lazily evaluate `filename` with the root context seeded by `defines`
    pub fn evaluate_with<I, K, V>(
        &self,
        filename: &str,
        defines: I,
    ) -> Result<Evaluation<'_>, PrologueError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut context = Context::new(self.config.context_options());
        for (key, value) in defines {
            context.set_define(key.as_ref(), value, Collision::Error)?;
        }
        Ok(Evaluation::new(self, filename, context))
    }

    /// Evaluate `filename` to completion
    pub fn render(&self, filename: &str) -> Result<Output, PrologueError> {
        collect(self.evaluate(filename))
    }

    pub fn render_with<I, K, V>(&self, filename: &str, defines: I) -> Result<Output, PrologueError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        collect(self.evaluate_with(filename, defines)?)
    }

    /// Map a 1-based output line number back to its source
    pub fn resolve(
        lookup: &[Source],
        line: usize,
        before: u32,
        after: u32,
    ) -> Result<Resolved, PrologueError> {
        let source = line
            .checked_sub(1)
            .and_then(|index| lookup.get(index))
            .ok_or_else(|| {
                PrologueError::Lookup(format!(
                    "Line {} is out of valid range 1-{}",
                    line,
                    lookup.len()
                ))
            })?;
        let file = source.file.as_ref().ok_or_else(|| {
            PrologueError::Lookup(format!("Line {} has no source file", line))
        })?;
        Ok(Resolved {
            file: file.path().display().to_string(),
            line: source.line,
            snippet: file.snippet(source.line, before, after)?,
        })
    }
}

fn collect(mut evaluation: Evaluation<'_>) -> Result<Output, PrologueError> {
    let mut lines = Vec::new();
    for line in evaluation.by_ref() {
        lines.push(line?);
    }
    let included = evaluation.included().to_vec();
    Ok(Output {
        lines,
        lookup: evaluation.into_lookup(),
        included,
    })
}
