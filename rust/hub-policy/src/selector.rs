//! Property selectors used by rule assertions.
//!
//! A selector such as `context:currentUser.privileges` names a root object
//! (`context` or `entity`) and a dot path into it. Roots expose their fields
//! through the [`Lookup`] trait, which walks the path explicitly and yields
//! `None` as soon as a segment is missing.

use serde_json::Value;

use crate::{Context, Entity};

/// Root object a selector starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Context,
    Entity,
}

impl Root {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "context" => Some(Root::Context),
            "entity" => Some(Root::Entity),
            _ => None,
        }
    }
}

/// Parsed `<root>:<dot.path>` property reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath<'a> {
    pub root: Root,
    pub segments: Vec<&'a str>,
}

impl<'a> PropertyPath<'a> {
    /// Parse a selector, splitting on the first `:` only. Returns `None` for
    /// an unrecognized root or an empty path.
    pub fn parse(selector: &'a str) -> Option<Self> {
        let (root, path) = selector.split_once(':')?;
        let root = Root::parse(root)?;
        if path.is_empty() {
            return None;
        }
        Some(Self {
            root,
            segments: path.split('.').collect(),
        })
    }

    /// Resolve this path against the given roots. A missing entity resolves
    /// nothing.
    pub fn resolve(&self, context: &Context, entity: Option<&Entity>) -> Option<Value> {
        match self.root {
            Root::Context => context.lookup(&self.segments),
            Root::Entity => entity?.lookup(&self.segments),
        }
    }
}

/// Explicit field access by dot path.
pub trait Lookup {
    /// Value at `path`, or `None` when any segment does not exist. An empty
    /// path yields the whole object.
    fn lookup(&self, path: &[&str]) -> Option<Value>;
}

impl Lookup for Value {
    fn lookup(&self, path: &[&str]) -> Option<Value> {
        let mut current = self;
        for segment in path {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current.clone())
    }
}

/// Resolve `selector` against the roots, returning `None` for malformed
/// selectors as well as missing values.
pub fn select(selector: &str, context: &Context, entity: Option<&Entity>) -> Option<Value> {
    PropertyPath::parse(selector)?.resolve(context, entity)
}

/// Shorthand for leaf fields: the value itself when the path is exhausted,
/// nothing otherwise.
pub(crate) fn leaf(value: Value, rest: &[&str]) -> Option<Value> {
    if rest.is_empty() { Some(value) } else { None }
}
