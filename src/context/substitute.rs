//! Flattening, evaluation and line substitution

use super::expr;
use super::{Context, Undefined, Value};
use crate::error::PrologueError;
use crate::line::Line;
use std::ops::Range;

/// Words the expression grammar reserves; never looked up as defines
const RESERVED: &[&str] = &[
    "and", "or", "not", "true", "false", "True", "False", "range", "len",
];

impl Context {
    /// Replace every defined identifier in `expr` with its value.
    ///
    /// String values are flattened recursively. Identifiers inside quoted
    /// literals are left alone.
    pub fn flatten(&self, expr: &str) -> Result<String, PrologueError> {
        self.flatten_with(expr, self.options.undefined)
    }

    pub fn flatten_with(&self, expr: &str, policy: Undefined) -> Result<String, PrologueError> {
        self.flatten_inner(expr, policy, 0)
    }

    fn flatten_inner(
        &self,
        expr: &str,
        policy: Undefined,
        depth: usize,
    ) -> Result<String, PrologueError> {
        if depth > self.options.max_depth {
            return Err(PrologueError::Expression(format!(
                "Exceeded maximum depth of {} while flattening '{}'",
                self.options.max_depth, expr
            )));
        }
        let mut flat = String::with_capacity(expr.len());
        let mut last = 0;
        for span in identifiers(expr, true) {
            let name = &expr[span.clone()];
            flat.push_str(&expr[last..span.start]);
            last = span.end;
            if RESERVED.contains(&name) {
                flat.push_str(name);
                continue;
            }
            match self.lookup(name) {
                Some(Value::Str(text)) => {
                    flat.push_str(&self.flatten_inner(text, Undefined::Permissive, depth + 1)?)
                }
                Some(value) => flat.push_str(&value.to_expression()),
                None if depth == 0 && policy == Undefined::Strict => {
                    return Err(PrologueError::Expression(format!(
                        "Reference to undefined variable '{}' in expression '{}'",
                        name,
                        expr.trim()
                    )));
                }
                None => flat.push_str(name),
            }
        }
        flat.push_str(&expr[last..]);
        Ok(flat)
    }

    /// Flatten then evaluate an expression
    pub fn evaluate(&self, expr: &str) -> Result<Value, PrologueError> {
        self.evaluate_with(expr, self.options.undefined)
    }

    pub fn evaluate_with(&self, expr: &str, policy: Undefined) -> Result<Value, PrologueError> {
        let flat = self.flatten_with(expr, policy)?;
        match expr::evaluate(&flat) {
            Ok(value) => Ok(value),
            Err(err @ PrologueError::Limit(_)) => Err(err),
            Err(_) if self.options.lenient_eval => Ok(Value::Str(flat.trim().to_string())),
            Err(err) => Err(err),
        }
    }

    /// Apply explicit then implicit substitution to a line
    pub fn substitute(&self, line: &Line) -> Result<Line, PrologueError> {
        let mut text = line.text().to_string();

        let matches = self.explicit_matches(&text);
        for (span, inner) in matches.into_iter().rev() {
            let replacement = self.explicit_replacement(&text[span.clone()], &inner)?;
            text.replace_range(span, &replacement);
        }

        if self.options.implicit_sub {
            let spans: Vec<Range<usize>> = identifiers(&text, false)
                .into_iter()
                .filter(|span| self.has_define(&text[span.clone()]))
                .collect();
            for span in spans.into_iter().rev() {
                let replacement = self.evaluate(&text[span.clone()])?.to_string();
                text.replace_range(span, &replacement);
            }
        }

        Ok(line.encase(text))
    }

    fn explicit_replacement(&self, matched: &str, inner: &str) -> Result<String, PrologueError> {
        let name = inner.trim();
        if self.options.undefined == Undefined::Permissive
            && is_identifier(name)
            && !self.has_define(name)
        {
            return Ok(matched.to_string());
        }
        Ok(self.evaluate(inner)?.to_string())
    }

    /// Explicit substitution spans with their inner expression, left to right
    fn explicit_matches(&self, text: &str) -> Vec<(Range<usize>, String)> {
        let (prefix, suffix) = &self.options.explicit_style;
        let mut matches = Vec::new();
        if prefix.is_empty() {
            return matches;
        }
        let balanced = prefix.ends_with('(') && suffix == ")";
        let mut pos = 0;
        while let Some(offset) = text[pos..].find(prefix.as_str()) {
            let start = pos + offset;
            let body = start + prefix.len();
            let end = if suffix.is_empty() {
                identifier_at(text, body).map(|end| (end, end))
            } else if balanced {
                balanced_close(text, body).map(|close| (close, close + 1))
            } else {
                text[body..]
                    .find(suffix.as_str())
                    .map(|found| (body + found, body + found + suffix.len()))
            };
            match end {
                Some((inner_end, end)) => {
                    matches.push((start..end, text[body..inner_end].to_string()));
                    pos = end;
                }
                None => pos = body,
            }
        }
        matches
    }
}

/// Byte spans of identifiers in `text`.
///
/// Digit runs are consumed whole so `1e5` or `0x1F` are not split into
/// identifiers; with `skip_strings`, quoted literals are passed over.
fn identifiers(text: &str, skip_strings: bool) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if skip_strings && (c == '"' || c == '\'') {
            for (_, next) in chars.by_ref() {
                if next == c {
                    break;
                }
            }
        } else if c.is_alphabetic() || c == '_' {
            let mut end = idx + c.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !(next.is_alphanumeric() || next == '_') {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            spans.push(idx..end);
        } else if c.is_ascii_digit() {
            while let Some(&(_, next)) = chars.peek() {
                if !(next.is_alphanumeric() || next == '_' || next == '.') {
                    break;
                }
                chars.next();
            }
        }
    }
    spans
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// End of the identifier starting at `start`, if one starts there
fn identifier_at(text: &str, start: usize) -> Option<usize> {
    let rest = &text[start..];
    let mut chars = rest.char_indices();
    match chars.next() {
        Some((_, first)) if first.is_alphabetic() || first == '_' => {}
        _ => return None,
    }
    let len = chars
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    Some(start + len)
}

/// Index of the `)` closing a group whose `(` precedes `start`
fn balanced_close(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, c) in text[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + idx);
                }
            }
            _ => {}
        }
    }
    None
}
