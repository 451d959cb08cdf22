//! Boolean predicate trees.
//!
//! An [`Expression`] is one of three variants:
//!
//! - [`ConstantExpression`]: `TRUE` or `FALSE`
//! - [`SingleExpression`]: `left <operator> right`
//! - [`ConjunctionExpression`]: children joined by `AND` or `OR`
//!
//! Constructors fold as they build. A predicate over two literals becomes a
//! constant, identity elements disappear from conjunctions, absorbing elements
//! swallow them, and nested conjunctions of the same kind are flattened.
//!
//! The same tree is evaluated in memory ([`Expression::evaluate`],
//! [`Expression::evaluate_with`]) and rendered as text
//! ([`Expression::format`]).
//!
//! ```rust
//! use strata_query::{Argument, Expression, PropertyPath};
//!
//! let age = Argument::of(PropertyPath::<i64>::bound("age", || Ok(30)));
//! let adult = age.between(18, 65);
//! assert!(adult.evaluate().unwrap());
//! assert!(!adult.negate().evaluate().unwrap());
//!
//! // Fully literal predicates fold at construction time.
//! let folded = Argument::literal(3).gt(2);
//! assert_eq!(folded, Expression::TRUE);
//! ```

mod conjunction;
mod constant;
mod single;

pub use conjunction::{Conjunction, ConjunctionExpression};
pub use constant::ConstantExpression;
pub use single::SingleExpression;

use std::fmt;

use crate::error::QueryResult;
use crate::formatter::{ExpressionFormatter, InlineFormatter};
use crate::path::PropertyResolver;

/// Where path operands get their values from during evaluation.
#[derive(Clone, Copy)]
pub(crate) enum Scope<'a> {
    /// Each path resolves through its own binding.
    Bound,
    /// Paths resolve by name against a row.
    Row(&'a dyn PropertyResolver),
}

/// A boolean-valued predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A fixed truth value.
    Constant(ConstantExpression),
    /// A binary predicate.
    Single(SingleExpression),
    /// A combination of predicates.
    Conjunction(ConjunctionExpression),
}

impl Expression {
    /// The constant `TRUE` expression.
    pub const TRUE: Expression = Expression::Constant(ConstantExpression::TRUE);
    /// The constant `FALSE` expression.
    pub const FALSE: Expression = Expression::Constant(ConstantExpression::FALSE);

    /// The constant expression for `value`.
    pub const fn constant(value: bool) -> Self {
        Expression::Constant(ConstantExpression::value_of(value))
    }

    /// The logical negation of this expression.
    pub fn negate(&self) -> Expression {
        match self {
            Self::Constant(c) => Self::Constant(c.negate()),
            Self::Single(s) => Self::Single(s.negate()),
            Self::Conjunction(c) => Self::Conjunction(c.negate()),
        }
    }

    /// Combine this expression with `others` under `conjunction`.
    pub fn combine(
        self,
        conjunction: Conjunction,
        others: impl IntoIterator<Item = Expression>,
    ) -> Expression {
        ConjunctionExpression::value_of(conjunction, std::iter::once(self).chain(others))
    }

    /// `self AND other`.
    pub fn and(self, other: impl Into<Expression>) -> Expression {
        self.combine(Conjunction::And, [other.into()])
    }

    /// `self OR other`.
    pub fn or(self, other: impl Into<Expression>) -> Expression {
        self.combine(Conjunction::Or, [other.into()])
    }

    /// Evaluate with every path resolved through its own binding.
    pub fn evaluate(&self) -> QueryResult<bool> {
        self.eval(Scope::Bound)
    }

    /// Evaluate with every path resolved by name through `resolver`.
    pub fn evaluate_with(&self, resolver: &dyn PropertyResolver) -> QueryResult<bool> {
        self.eval(Scope::Row(resolver))
    }

    pub(crate) fn eval(&self, scope: Scope<'_>) -> QueryResult<bool> {
        match self {
            Self::Constant(c) => Ok(c.value()),
            Self::Single(s) => s.eval(scope),
            Self::Conjunction(c) => c.eval(scope),
        }
    }

    /// Whether the subtree references no property path.
    pub fn is_constant(&self) -> bool {
        match self {
            Self::Constant(_) => true,
            Self::Single(s) => s.is_constant(),
            Self::Conjunction(c) => c.is_constant(),
        }
    }

    /// The folded truth value, if this is a constant.
    pub fn as_constant(&self) -> Option<bool> {
        match self {
            Self::Constant(c) => Some(c.value()),
            _ => None,
        }
    }

    /// Whether this is the constant `TRUE`, i.e. filters nothing.
    pub fn is_true(&self) -> bool {
        self.as_constant() == Some(true)
    }

    /// Write this expression into `formatter`.
    ///
    /// With `bracketing`, a conjunction wraps itself in parentheses so it can
    /// be inlined inside another conjunction.
    pub fn format<F: ExpressionFormatter + ?Sized>(&self, formatter: &mut F, bracketing: bool) {
        match self {
            Self::Constant(c) => c.format(formatter),
            Self::Single(s) => s.format(formatter),
            Self::Conjunction(c) => c.format(formatter, bracketing),
        }
    }
}

impl Default for Expression {
    fn default() -> Self {
        Self::TRUE
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl From<ConstantExpression> for Expression {
    fn from(c: ConstantExpression) -> Self {
        Self::Constant(c)
    }
}

impl From<SingleExpression> for Expression {
    fn from(s: SingleExpression) -> Self {
        Self::Single(s)
    }
}

impl From<ConjunctionExpression> for Expression {
    fn from(c: ConjunctionExpression) -> Self {
        Self::Conjunction(c)
    }
}

impl std::ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        self.negate()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = InlineFormatter::new();
        self.format(&mut formatter, false);
        f.write_str(&formatter.into_string())
    }
}

/// Combine expressions with `AND`.
pub fn and(expressions: impl IntoIterator<Item = Expression>) -> Expression {
    ConjunctionExpression::value_of(Conjunction::And, expressions)
}

/// Combine expressions with `OR`.
pub fn or(expressions: impl IntoIterator<Item = Expression>) -> Expression {
    ConjunctionExpression::value_of(Conjunction::Or, expressions)
}

/// Negate an expression.
pub fn not(expression: Expression) -> Expression {
    expression.negate()
}
