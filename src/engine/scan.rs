//! Directive recognition for physical lines

use crate::error::PrologueError;
use regex::Regex;

/// A directive found on a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned {
    /// Lowercased tag following the delimiter
    pub tag: String,
    /// Remaining text, trimmed, with one trailing `:` removed
    pub arguments: String,
    /// Byte length of the text preceding a floating directive
    pub prefix: Option<usize>,
}

impl Scanned {
    pub fn is_floating(&self) -> bool {
        self.prefix.is_some()
    }
}

/// Anchored and floating directive patterns for one delimiter
#[derive(Debug, Clone)]
pub struct Scanner {
    anchored: Regex,
    floating: Regex,
    comment: Option<String>,
}

impl Scanner {
    pub fn new(delimiter: &str, comment: Option<&str>) -> Result<Self, PrologueError> {
        let escaped = regex::escape(delimiter);
        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                PrologueError::Config(format!("Failed to build directive pattern: {}", e))
            })
        };
        Ok(Self {
            anchored: compile(format!(r"^\s*{}(\w+)(.*)$", escaped))?,
            floating: compile(format!(r"^(.*?){}(\w+)(.*)$", escaped))?,
            comment: comment
                .filter(|marker| *marker != delimiter)
                .map(str::to_string),
        })
    }

    /// Text considered for directive matching, with any trailing comment removed
    fn visible<'t>(&self, text: &'t str) -> &'t str {
        match &self.comment {
            Some(marker) => text.find(marker.as_str()).map_or(text, |at| &text[..at]),
            None => text,
        }
    }

    /// Match an anchored directive, else a floating one
    pub fn scan(&self, text: &str) -> Option<Scanned> {
        let visible = self.visible(text);
        if let Some(caps) = self.anchored.captures(visible) {
            return Some(Scanned {
                tag: caps[1].to_lowercase(),
                arguments: arguments(&caps[2]),
                prefix: None,
            });
        }
        let caps = self.floating.captures(visible)?;
        Some(Scanned {
            tag: caps[2].to_lowercase(),
            arguments: arguments(&caps[3]),
            prefix: Some(caps[1].len()),
        })
    }
}

fn arguments(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_suffix(':')
        .unwrap_or(trimmed)
        .trim_end()
        .to_string()
}
