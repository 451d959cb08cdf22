use std::fmt;

use super::{ConstantExpression, Expression, Scope};
use crate::error::QueryResult;
use crate::formatter::ExpressionFormatter;

/// How the children of a [`ConjunctionExpression`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conjunction {
    /// All children must hold.
    And,
    /// At least one child must hold.
    Or,
}

impl Conjunction {
    /// The dual conjunction.
    pub const fn flip(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }

    /// The constant that leaves a combination unchanged.
    pub const fn identity(self) -> bool {
        matches!(self, Self::And)
    }

    /// The constant that decides a combination on its own.
    pub const fn absorbing(self) -> bool {
        !self.identity()
    }

    /// SQL keyword.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Children combined by `AND` or `OR`.
///
/// Always holds at least two children, none of them constant and none of them
/// a conjunction of the same kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ConjunctionExpression {
    conjunction: Conjunction,
    expressions: Vec<Expression>,
    /// Set when this node is the De Morgan rewrite of a negated conjunction.
    /// The children already carry the negation; the flag only lets a formatter
    /// render `NOT (<original>)` instead.
    negated: bool,
}

impl ConjunctionExpression {
    /// Combine `expressions` under `conjunction`.
    ///
    /// Same-kind conjunctions are flattened, identity constants dropped and an
    /// absorbing constant short-circuits the whole combination. An empty
    /// combination is the identity; a single child is returned as is.
    pub fn value_of(
        conjunction: Conjunction,
        expressions: impl IntoIterator<Item = Expression>,
    ) -> Expression {
        let absorbing = conjunction.absorbing();
        let mut children = Vec::new();

        for expression in expressions {
            match expression {
                Expression::Constant(c) if c.value() == absorbing => {
                    return Expression::Constant(c);
                }
                Expression::Constant(_) => {}
                Expression::Conjunction(inner) if inner.conjunction == conjunction => {
                    children.extend(inner.expressions);
                }
                other => children.push(other),
            }
        }

        match children.len() {
            0 => Expression::Constant(ConstantExpression::value_of(conjunction.identity())),
            1 => children.pop().unwrap_or(Expression::TRUE),
            _ => Expression::Conjunction(Self {
                conjunction,
                expressions: children,
                negated: false,
            }),
        }
    }

    /// How the children combine.
    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    /// The children, in order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    /// Whether this node was produced by negating a conjunction.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// The negation, by De Morgan's law: the conjunction kind flips and every
    /// child is negated.
    pub fn negate(&self) -> ConjunctionExpression {
        Self {
            conjunction: self.conjunction.flip(),
            expressions: self.expressions.iter().map(Expression::negate).collect(),
            negated: !self.negated,
        }
    }

    /// Whether no child references a property path.
    pub fn is_constant(&self) -> bool {
        self.expressions.iter().all(Expression::is_constant)
    }

    pub(crate) fn eval(&self, scope: Scope<'_>) -> QueryResult<bool> {
        let absorbing = self.conjunction.absorbing();
        for expression in &self.expressions {
            if expression.eval(scope)? == absorbing {
                return Ok(absorbing);
            }
        }
        Ok(self.conjunction.identity())
    }

    pub(crate) fn format<F: ExpressionFormatter + ?Sized>(&self, formatter: &mut F, bracketing: bool) {
        if self.negated && !formatter.resolve_negative_conjunctions() {
            formatter.buffer().push_str("NOT (");
            self.negate().format_children(formatter);
            formatter.buffer().push(')');
            return;
        }

        if bracketing {
            formatter.buffer().push('(');
        }
        self.format_children(formatter);
        if bracketing {
            formatter.buffer().push(')');
        }
    }

    fn format_children<F: ExpressionFormatter + ?Sized>(&self, formatter: &mut F) {
        for (i, expression) in self.expressions.iter().enumerate() {
            if i > 0 {
                formatter.buffer().push(' ');
                formatter.buffer().push_str(self.conjunction.as_sql());
                formatter.buffer().push(' ');
            }
            expression.format(formatter, true);
        }
    }
}
