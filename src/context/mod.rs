//! Evaluation Context
//!
//! Scoped variable definitions plus the file inclusion stack and trace for
//! one evaluation session. Forking pushes a new scope onto an explicit stack;
//! joining pops it and merges its defines and removals into the parent, while
//! discarding drops it. The file stack and trace are owned once per session
//! and shared by every scope.

pub mod expr;
pub mod substitute;
pub mod value;

pub use value::Value;

use crate::error::PrologueError;
use crate::registry::FileRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// How identifiers with no definition are treated while flattening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undefined {
    /// Unknown identifiers in an expression are an error
    #[default]
    Strict,
    /// Unknown identifiers pass through as their own name
    Permissive,
}

/// Behaviour when a define collides with a visible definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Error,
    Warn,
    Silent,
}

/// Substitution and evaluation options for a context
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Prefix and suffix bracketing an explicit substitution
    pub explicit_style: (String, String),
    pub implicit_sub: bool,
    pub undefined: Undefined,
    /// Fall back to the flattened text when evaluation fails
    pub lenient_eval: bool,
    /// Recursion limit for flattening nested definitions
    pub max_depth: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            explicit_style: ("$(".to_string(), ")".to_string()),
            implicit_sub: true,
            undefined: Undefined::Strict,
            lenient_eval: true,
            max_depth: 64,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Scope {
    defines: HashMap<String, Value>,
    removed: HashSet<String>,
}

/// Scoped evaluation state for one session
#[derive(Debug)]
pub struct Context {
    options: ContextOptions,
    scopes: Vec<Scope>,
    files: Vec<FileRef>,
    trace: Vec<FileRef>,
}

impl Context {
    pub fn new(options: ContextOptions) -> Self {
        Self {
            options,
            scopes: vec![Scope::default()],
            files: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    /// Number of forked scopes above the root
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    // ----------------------------------------------------------------------
    // Scopes
    // ----------------------------------------------------------------------

    /// Open a child scope
    pub fn fork(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope, merging its removals then its defines into the parent
    pub fn join(&mut self) -> Result<(), PrologueError> {
        let child = self.pop_scope("join")?;
        for key in child.removed {
            if let Some(parent) = self.scopes.last_mut() {
                parent.defines.remove(&key);
            }
            if self.has_define(&key) {
                if let Some(parent) = self.scopes.last_mut() {
                    parent.removed.insert(key);
                }
            }
        }
        if let Some(parent) = self.scopes.last_mut() {
            for (key, value) in child.defines {
                parent.removed.remove(&key);
                parent.defines.insert(key, value);
            }
        }
        Ok(())
    }

    /// Close the innermost scope, dropping everything defined in it
    pub fn discard(&mut self) -> Result<(), PrologueError> {
        self.pop_scope("discard").map(|_| ())
    }

    fn pop_scope(&mut self, action: &str) -> Result<Scope, PrologueError> {
        if self.scopes.len() > 1 {
            if let Some(scope) = self.scopes.pop() {
                return Ok(scope);
            }
        }
        Err(PrologueError::Lifecycle(format!(
            "Cannot {} the root context",
            action
        )))
    }

    // ----------------------------------------------------------------------
    // Defines
    // ----------------------------------------------------------------------

    fn lookup(&self, key: &str) -> Option<&Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.defines.get(key) {
                return Some(value);
            }
            if scope.removed.contains(key) {
                return None;
            }
        }
        None
    }

    pub fn has_define(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    pub fn get_define(&self, key: &str) -> Result<&Value, PrologueError> {
        self.lookup(key).ok_or_else(|| {
            PrologueError::Expression(format!("No value has been defined for key '{}'", key))
        })
    }

    /// Define `key` in the innermost scope.
    ///
    /// String values that parse as integers are stored as integers. Returns
    /// the value that was replaced when `on_collision` is `Warn`, so the
    /// caller can report it.
    pub fn set_define(
        &mut self,
        key: &str,
        value: impl Into<Value>,
        on_collision: Collision,
    ) -> Result<Option<Value>, PrologueError> {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(PrologueError::Expression(format!(
                "Key must not contain whitespace and must be at least one character in length: '{}'",
                key
            )));
        }
        let value = match value.into() {
            Value::Str(text) => Value::coerce(text),
            other => other,
        };
        let previous = self.lookup(key).cloned();
        if let (Some(existing), Collision::Error) = (&previous, on_collision) {
            return Err(PrologueError::Expression(format!(
                "Variable already defined for '{}' with value {}",
                key, existing
            )));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.removed.remove(key);
            scope.defines.insert(key.to_string(), value);
        }
        Ok(match on_collision {
            Collision::Warn => previous,
            _ => None,
        })
    }

    /// Bind a loop variable, replacing any visible value without complaint
    pub fn rebind(&mut self, key: &str, value: Value) -> Result<(), PrologueError> {
        self.set_define(key, value, Collision::Silent).map(|_| ())
    }

    /// Remove `key`, masking it if an enclosing scope still defines it
    pub fn clear_define(&mut self, key: &str) -> Result<(), PrologueError> {
        if !self.has_define(key) {
            return Err(PrologueError::Expression(format!(
                "No value has been defined for key '{}'",
                key
            )));
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.defines.remove(key);
        }
        if self.has_define(key) {
            if let Some(scope) = self.scopes.last_mut() {
                scope.removed.insert(key.to_string());
            }
        }
        Ok(())
    }

    /// Merged view of every visible define
    pub fn defines(&self) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        for scope in &self.scopes {
            for key in &scope.removed {
                merged.remove(key);
            }
            for (key, value) in &scope.defines {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    // ----------------------------------------------------------------------
    // File stack
    // ----------------------------------------------------------------------

    /// Enter a file, recording it in the trace
    pub fn stack_push(&mut self, file: FileRef) {
        if !self.in_trace(&file) {
            self.trace.push(file.clone());
        }
        self.files.push(file);
    }

    pub fn stack_pop(&mut self) -> Result<FileRef, PrologueError> {
        self.files.pop().ok_or_else(|| {
            PrologueError::Corrupted("Trying to pop file from empty stack".to_string())
        })
    }

    pub fn stack_top(&self) -> Option<&FileRef> {
        self.files.last()
    }

    pub fn stack(&self) -> &[FileRef] {
        &self.files
    }

    pub fn in_stack(&self, file: &FileRef) -> bool {
        self.files.iter().any(|entry| entry.same_file(file))
    }

    /// Every file entered during the session, in first-entry order
    pub fn trace(&self) -> &[FileRef] {
        &self.trace
    }

    pub fn in_trace(&self, file: &FileRef) -> bool {
        self.trace.iter().any(|entry| entry.same_file(file))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextOptions::default())
    }
}
