//! The text sink expressions render into.
//!
//! [`ExpressionFormatter`] is deliberately small: a buffer, one policy flag
//! and a few hooks with inline-literal defaults. Dialects extend it with
//! identifier quoting and parameter binding (see
//! [`SqlFormatter`](crate::sql::SqlFormatter)).
//!
//! ```rust
//! use strata_query::{Argument, InlineFormatter, PropertyPath};
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! let expr = age.gt(18).and(age.lt(65));
//!
//! let mut formatter = InlineFormatter::new();
//! expr.format(&mut formatter, false);
//! assert_eq!(formatter.into_string(), "age > 18 AND age < 65");
//! ```

use std::fmt::Write;

use crate::value::Value;

/// A minimal text-rendering sink.
pub trait ExpressionFormatter {
    /// The buffer rendered text is appended to.
    fn buffer(&mut self) -> &mut String;

    /// Whether negated conjunctions are rewritten with De Morgan's law before
    /// rendering, rather than rendered as `NOT (...)`.
    fn resolve_negative_conjunctions(&self) -> bool;

    /// Write a property path.
    fn write_path(&mut self, path: &str) {
        self.buffer().push_str(path);
    }

    /// Write a literal value.
    fn write_value(&mut self, value: &Value) {
        let _ = write!(self.buffer(), "{}", value);
    }

    /// Write a boolean constant.
    fn write_constant(&mut self, value: bool) {
        self.buffer().push_str(if value { "TRUE" } else { "FALSE" });
    }

    /// Write the ` ESCAPE '<c>'` clause of a `LIKE`. The character is inlined
    /// as a string literal, never bound.
    fn write_like_escape(&mut self, escape: char) {
        let buffer = self.buffer();
        buffer.push_str(" ESCAPE '");
        if escape == '\'' {
            buffer.push('\'');
        }
        buffer.push(escape);
        buffer.push('\'');
    }
}

/// Renders expressions with literals inlined.
///
/// Used for diagnostics and `Display`; never for text sent to a store.
#[derive(Debug, Clone, Default)]
pub struct InlineFormatter {
    buffer: String,
    resolve_negative_conjunctions: bool,
}

impl InlineFormatter {
    /// Create an empty formatter that renders negated conjunctions as `NOT (...)`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the negated-conjunction policy.
    pub fn with_negation_resolution(mut self, resolve: bool) -> Self {
        self.resolve_negative_conjunctions = resolve;
        self
    }

    /// Consume the formatter, returning the rendered text.
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl ExpressionFormatter for InlineFormatter {
    fn buffer(&mut self) -> &mut String {
        &mut self.buffer
    }

    fn resolve_negative_conjunctions(&self) -> bool {
        self.resolve_negative_conjunctions
    }
}
