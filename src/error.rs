//! Error types for the Prologue preprocessor.
//!
//! A single error type is used throughout the crate. Variants partition the
//! failure conditions so callers can match on the broad category, while the
//! `Display` form of every variant is the human-readable message itself.

use crate::line::Source;
use thiserror::Error;

/// Preprocessor errors
#[derive(Debug, Error)]
pub enum PrologueError {
    /// Invalid construction options (delimiter, flags, styles)
    #[error("{0}")]
    Config(String),

    /// Missing path, wrong path kind, name collision or failed lookup
    #[error("{0}")]
    Registry(String),

    /// Tag collision, malformed tag or capability/tag-shape mismatch
    #[error("{0}")]
    Registration(String),

    /// Open/transition/close/append called out of order
    #[error("{0}")]
    Lifecycle(String),

    /// Malformed directive arguments or unknown tags
    #[error("{0}")]
    Directive(String),

    /// Failure while flattening or evaluating an expression
    #[error("{0}")]
    Expression(String),

    /// Expression result exceeding a size limit; never replaced by flattened text
    #[error("{0}")]
    Limit(String),

    /// File already present on the inclusion stack
    #[error("Detected infinite recursion when including file '{file}' - file stack: {stack}")]
    Recursion { file: String, stack: String },

    /// Block directive still open at end of file
    #[error("Unmatched {directive} block directive in {location}:\n{snippet}")]
    Unclosed {
        directive: String,
        location: Source,
        snippet: String,
    },

    /// Internal consistency failure of the file stack
    #[error("File stack has been corrupted: {0}")]
    Corrupted(String),

    /// Raised by an error-class message directive
    #[error("{0}")]
    Message(String),

    /// Output line lookup failure
    #[error("{0}")]
    Lookup(String),

    /// Error attributed to a source location
    #[error("{message}\n  --> {location}\n{snippet}")]
    Located {
        message: String,
        location: Source,
        snippet: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrologueError {
    /// Attribute the error to a source location.
    ///
    /// Errors that already carry a location, or that are raised by the engine
    /// itself with a complete message, pass through unchanged.
    pub fn at(self, source: &Source) -> Self {
        match self {
            PrologueError::Located { .. }
            | PrologueError::Recursion { .. }
            | PrologueError::Unclosed { .. }
            | PrologueError::Corrupted(_)
            | PrologueError::Message(_) => self,
            other => PrologueError::Located {
                message: other.to_string(),
                snippet: source.snippet(2, 2).join("\n"),
                location: source.clone(),
            },
        }
    }

    /// Message of the underlying failure, without any location decoration
    pub fn message(&self) -> String {
        match self {
            PrologueError::Located { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<config::ConfigError> for PrologueError {
    fn from(err: config::ConfigError) -> Self {
        PrologueError::Config(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T, E = PrologueError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_wraps_plain_errors() {
        let err = PrologueError::Directive("Invalid form used for #undef".to_string());
        let wrapped = err.at(&Source::detached(7));
        match &wrapped {
            PrologueError::Located { message, location, .. } => {
                assert_eq!(message, "Invalid form used for #undef");
                assert_eq!(location.line, 7);
            }
            other => panic!("expected located error, got {:?}", other),
        }
        assert_eq!(wrapped.message(), "Invalid form used for #undef");
    }

    #[test]
    fn test_at_passes_engine_errors_through() {
        let err = PrologueError::Recursion {
            file: "a.txt".to_string(),
            stack: "a.txt, b.txt".to_string(),
        };
        let wrapped = err.at(&Source::detached(1));
        assert!(matches!(wrapped, PrologueError::Recursion { .. }));
        assert!(wrapped.to_string().contains("a.txt, b.txt"));
    }
}
