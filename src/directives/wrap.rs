//! Directive registration metadata

use super::{BlockBehavior, BlockDirective, Directive, LineBehavior, LineDirective};
use crate::error::PrologueError;
use crate::line::Source;
use std::fmt;
use std::rc::Rc;

/// Role a tag plays for the directive that claims it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagRole {
    Opening,
    Transition,
    Closing,
}

impl fmt::Display for TagRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagRole::Opening => "opening",
            TagRole::Transition => "transition",
            TagRole::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// Tags claimed by a directive, lowercased
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSets {
    pub opening: Vec<String>,
    pub transition: Vec<String>,
    pub closing: Vec<String>,
}

impl TagSets {
    pub fn new(opening: &[&str], transition: &[&str], closing: &[&str]) -> Self {
        let lower =
            |tags: &[&str]| -> Vec<String> { tags.iter().map(|t| t.to_lowercase()).collect() };
        Self {
            opening: lower(opening),
            transition: lower(transition),
            closing: lower(closing),
        }
    }

    pub fn role(&self, tag: &str) -> Option<TagRole> {
        let tag = tag.to_lowercase();
        if self.opening.contains(&tag) {
            Some(TagRole::Opening)
        } else if self.transition.contains(&tag) {
            Some(TagRole::Transition)
        } else if self.closing.contains(&tag) {
            Some(TagRole::Closing)
        } else {
            None
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.opening
            .iter()
            .chain(self.transition.iter())
            .chain(self.closing.iter())
    }
}

/// Constructor for fresh directive behavior
pub enum Factory {
    Line(Box<dyn Fn() -> Box<dyn LineBehavior>>),
    Block(Box<dyn Fn() -> Box<dyn BlockBehavior>>),
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Factory::Line(_) => f.write_str("Factory::Line"),
            Factory::Block(_) => f.write_str("Factory::Block"),
        }
    }
}

/// A directive implementation bound to the tags that trigger it
#[derive(Debug)]
pub struct DirectiveWrap {
    name: String,
    factory: Factory,
    tags: Rc<TagSets>,
}

impl DirectiveWrap {
    /// Bind a factory to a set of tags, validating their shape
    pub fn new(
        name: impl Into<String>,
        factory: Factory,
        tags: TagSets,
    ) -> Result<Self, PrologueError> {
        for tag in tags.all() {
            if tag.is_empty() || tag.chars().any(char::is_whitespace) {
                return Err(PrologueError::Registration(format!(
                    "Tag must be at least one character and contain no whitespace: '{}'",
                    tag
                )));
            }
        }
        if tags.opening.is_empty() {
            return Err(PrologueError::Registration(
                "At least one opening tag must be specified".to_string(),
            ));
        }
        match &factory {
            Factory::Block(_) if tags.closing.is_empty() => {
                return Err(PrologueError::Registration(
                    "At least one closing tag must be specified".to_string(),
                ))
            }
            Factory::Line(_) if !tags.closing.is_empty() => {
                return Err(PrologueError::Registration(
                    "Only a block directive can have closing tags".to_string(),
                ))
            }
            Factory::Line(_) if !tags.transition.is_empty() => {
                return Err(PrologueError::Registration(
                    "Only a block directive can have transition tags".to_string(),
                ))
            }
            _ => {}
        }
        Ok(Self {
            name: name.into(),
            factory,
            tags: Rc::new(tags),
        })
    }

    /// Line directive triggered by any of `tags`
    pub fn line<F>(
        name: impl Into<String>,
        tags: &[&str],
        factory: F,
    ) -> Result<Self, PrologueError>
    where
        F: Fn() -> Box<dyn LineBehavior> + 'static,
    {
        Self::new(name, Factory::Line(Box::new(factory)), TagSets::new(tags, &[], &[]))
    }

    /// Block directive with opening, transition and closing tags
    pub fn block<F>(
        name: impl Into<String>,
        opening: &[&str],
        transition: &[&str],
        closing: &[&str],
        factory: F,
    ) -> Result<Self, PrologueError>
    where
        F: Fn() -> Box<dyn BlockBehavior> + 'static,
    {
        Self::new(
            name,
            Factory::Block(Box::new(factory)),
            TagSets::new(opening, transition, closing),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &TagSets {
        &self.tags
    }

    pub fn is_block(&self) -> bool {
        matches!(self.factory, Factory::Block(_))
    }

    pub fn role(&self, tag: &str) -> Result<TagRole, PrologueError> {
        self.tags.role(tag).ok_or_else(|| {
            PrologueError::Directive(format!("Tag is not known by directive: {}", tag))
        })
    }

    /// Create a fresh, uninvoked instance of the directive
    pub fn create(&self, source: Source) -> Directive {
        match &self.factory {
            Factory::Line(factory) => {
                Directive::Line(LineDirective::new(self.name.clone(), factory(), source))
            }
            Factory::Block(factory) => Directive::Block(BlockDirective::new(
                self.name.clone(),
                Rc::clone(&self.tags),
                factory(),
                source,
            )),
        }
    }
}
