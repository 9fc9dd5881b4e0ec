//! Provenance-tagged lines
//!
//! Every piece of text flowing through the preprocessor carries the file and
//! 1-based line number it came from. Slicing, splitting, stripping and
//! concatenation all produce new values with the same provenance.

use crate::registry::FileRef;
use std::fmt;
use std::ops::Range;

/// Location of a line within a registered file
#[derive(Clone)]
pub struct Source {
    pub file: Option<FileRef>,
    pub line: u32,
}

impl Source {
    pub fn new(file: FileRef, line: u32) -> Self {
        Self {
            file: Some(file),
            line: line.max(1),
        }
    }

    /// A location with no backing file (text built in memory)
    pub fn detached(line: u32) -> Self {
        Self {
            file: None,
            line: line.max(1),
        }
    }

    /// Surrounding source lines, or nothing if the file cannot be read
    pub fn snippet(&self, before: u32, after: u32) -> Vec<String> {
        match &self.file {
            Some(file) => file.snippet(self.line, before, after).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.path().display(), self.line),
            None => write!(f, "<memory>:{}", self.line),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A line of text along with the file and line number it originated from
#[derive(Clone)]
pub struct Line {
    text: String,
    source: Source,
}

impl Line {
    pub fn new(text: impl Into<String>, file: FileRef, number: u32) -> Self {
        Self {
            text: text.into(),
            source: Source::new(file, number),
        }
    }

    pub fn detached(text: impl Into<String>, number: u32) -> Self {
        Self {
            text: text.into(),
            source: Source::detached(number),
        }
    }

    pub fn located(text: impl Into<String>, source: Source) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn file(&self) -> Option<&FileRef> {
        self.source.file.as_ref()
    }

    pub fn number(&self) -> u32 {
        self.source.line
    }

    /// Wrap other text with this line's provenance
    pub fn encase(&self, text: impl Into<String>) -> Line {
        Line {
            text: text.into(),
            source: self.source.clone(),
        }
    }

    /// Byte-range slice keeping provenance
    pub fn slice(&self, range: Range<usize>) -> Line {
        self.encase(&self.text[range])
    }

    pub fn trim(&self) -> Line {
        self.encase(self.text.trim())
    }

    pub fn trim_end(&self) -> Line {
        self.encase(self.text.trim_end())
    }

    pub fn split_whitespace(&self) -> Vec<Line> {
        self.text
            .split_whitespace()
            .map(|part| self.encase(part))
            .collect()
    }

    /// Concatenate, keeping the provenance of `self` (the initial line)
    pub fn concat(&self, other: &str) -> Line {
        let mut text = String::with_capacity(self.text.len() + other.len());
        text.push_str(&self.text);
        text.push_str(other);
        self.encase(text)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source.file {
            Some(file) => write!(f, "{}@{}: {}", file.filename(), self.source.line, self.text),
            None => write!(f, "<memory>@{}: {}", self.source.line, self.text),
        }
    }
}

impl PartialEq<str> for Line {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for Line {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}
