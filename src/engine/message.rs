//! Diagnostic message routing

use crate::error::PrologueError;
use crate::line::Source;
use std::fmt;
use tracing::{debug, info, warn};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A message raised during evaluation
#[derive(Debug, Clone)]
pub struct Report {
    pub level: Level,
    pub text: String,
    pub source: Option<Source>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PROLOGUE:{}] {}", self.level, self.text)
    }
}

/// Callback receiving messages of one level; an `Err` aborts evaluation
pub type Handler = Box<dyn Fn(&Report) -> Result<(), PrologueError>>;

/// Per-level message callbacks
pub struct Handlers {
    debug: Handler,
    info: Handler,
    warning: Handler,
    error: Handler,
}

impl Handlers {
    pub fn set(&mut self, level: Level, handler: Handler) {
        match level {
            Level::Debug => self.debug = handler,
            Level::Info => self.info = handler,
            Level::Warning => self.warning = handler,
            Level::Error => self.error = handler,
        }
    }

    pub fn dispatch(&self, report: &Report) -> Result<(), PrologueError> {
        let handler = match report.level {
            Level::Debug => &self.debug,
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error => &self.error,
        };
        handler(report)
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self {
            debug: Box::new(default_log),
            info: Box::new(default_log),
            warning: Box::new(default_log),
            error: Box::new(|report| Err(PrologueError::Message(report.text.clone()))),
        }
    }
}

fn default_log(report: &Report) -> Result<(), PrologueError> {
    let location = report
        .source
        .as_ref()
        .map(|source| source.to_string())
        .unwrap_or_default();
    match report.level {
        Level::Debug => debug!(location = %location, "{}", report),
        Level::Info => info!(location = %location, "{}", report),
        _ => warn!(location = %location, "{}", report),
    }
    Ok(())
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handlers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn report(level: Level, text: &str) -> Report {
        Report {
            level,
            text: text.to_string(),
            source: None,
        }
    }

    #[test]
    fn test_default_error_aborts() {
        let handlers = Handlers::default();
        assert!(handlers.dispatch(&report(Level::Info, "fine")).is_ok());
        assert!(handlers.dispatch(&report(Level::Warning, "hmm")).is_ok());
        let err = handlers.dispatch(&report(Level::Error, "stop")).unwrap_err();
        assert!(matches!(err, PrologueError::Message(ref text) if text == "stop"));
    }

    #[test]
    fn test_replaced_handler_receives_reports() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut handlers = Handlers::default();
        handlers.set(
            Level::Error,
            Box::new(move |report| {
                sink.borrow_mut().push(report.to_string());
                Ok(())
            }),
        );
        handlers.dispatch(&report(Level::Error, "recoverable")).unwrap();
        assert_eq!(*seen.borrow(), vec!["[PROLOGUE:ERROR] recoverable"]);
    }
}
