//! Read-only adapter over the DOM type this engine queries.
//!
//! The evaluator never matches on `serde_json::Value` directly; it goes
//! through [`Node`] so the pseudo-class logic in `eval` stays expressed in
//! terms of the §3/§6 collaborator contract (tag query, scalar extraction)
//! rather than `serde_json`'s own enum shape. Child iteration for traversal
//! is handled separately by [`children`], since it needs to pair each value
//! with its key (or lack of one) rather than just read a scalar off it.
//! `serde_json::Value` (built with the `preserve_order` feature, so object
//! entries iterate in insertion order) is the only DOM type the crate ships
//! an implementation for.

use serde_json::Value;

use crate::ast::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

/// Minimal read-only view the evaluator needs over a DOM node.
pub(crate) trait Node {
    fn tag(&self) -> Tag;

    /// Number of entries for an object or array, `None` for scalars.
    fn container_len(&self) -> Option<usize>;

    fn as_str(&self) -> Option<&str>;
    fn as_f64(&self) -> Option<f64>;
    fn as_bool(&self) -> Option<bool>;

    /// `:val(literal)` comparison; mismatched types silently fail.
    fn equals_literal(&self, literal: &Literal) -> bool;
}

impl Node for Value {
    fn tag(&self) -> Tag {
        match self {
            Value::Object(_) => Tag::Object,
            Value::Array(_) => Tag::Array,
            Value::String(_) => Tag::String,
            Value::Number(_) => Tag::Number,
            Value::Bool(_) => Tag::Boolean,
            Value::Null => Tag::Null,
        }
    }

    fn container_len(&self) -> Option<usize> {
        match self {
            Value::Object(map) => Some(map.len()),
            Value::Array(a) => Some(a.len()),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_f64(&self) -> Option<f64> {
        Value::as_f64(self)
    }

    fn as_bool(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn equals_literal(&self, literal: &Literal) -> bool {
        match literal {
            Literal::Str(s) => self.as_str() == Some(s.as_str()),
            Literal::Num(n) => self.as_f64() == Some(*n),
            Literal::Bool(b) => self.as_bool() == Some(*b),
        }
    }
}

/// Children of `value` in document order, each paired with its key when the
/// parent is an object (`None` for array elements).
pub(crate) fn children(value: &Value) -> Vec<(Option<&str>, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
        Value::Array(arr) => arr.iter().map(|v| (None, v)).collect(),
        _ => Vec::new(),
    }
}
