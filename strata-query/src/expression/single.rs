use super::{Expression, Scope};
use crate::argument::Argument;
use crate::error::QueryResult;
use crate::formatter::ExpressionFormatter;
use crate::operator::SqlOperator;
use crate::path::Operand;
use crate::value::{SqlType, Value};

/// A binary predicate: `left <operator> right`.
///
/// Immutable once built. Operators without an inverse (`like`) are negated by
/// setting the `negated` flag, which renders as `NOT (...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleExpression {
    left: Operand,
    operator: SqlOperator,
    right: Operand,
    negated: bool,
}

impl SingleExpression {
    /// Build a predicate over two arguments.
    ///
    /// When both arguments are literals the operator is applied immediately
    /// and the resulting constant is returned instead.
    pub fn value_of<L: SqlType, R: SqlType>(
        left: &Argument<L>,
        operator: SqlOperator,
        right: &Argument<R>,
    ) -> Expression {
        Self::from_operands(left.to_operand(), operator, right.to_operand())
    }

    pub(crate) fn from_operands(left: Operand, operator: SqlOperator, right: Operand) -> Expression {
        match (&left, &right) {
            (Operand::Literal(l), Operand::Literal(r)) => {
                Expression::constant(operator.evaluate(l, r))
            }
            // The right side of a unary operator never takes part.
            (Operand::Literal(l), _) if operator.is_unary() => {
                Expression::constant(operator.evaluate(l, &Value::Null))
            }
            _ => Expression::Single(Self {
                left,
                operator,
                right,
                negated: false,
            }),
        }
    }

    /// The operator.
    pub fn operator(&self) -> SqlOperator {
        self.operator
    }

    /// Whether the predicate is wrapped in a `NOT`.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Name of the left path, if the left side is a path.
    pub fn left_path(&self) -> Option<&str> {
        operand_path(&self.left)
    }

    /// The left literal, if the left side is a literal.
    pub fn left_value(&self) -> Option<&Value> {
        operand_value(&self.left)
    }

    /// Name of the right path, if the right side is a path.
    pub fn right_path(&self) -> Option<&str> {
        operand_path(&self.right)
    }

    /// The right literal, if the right side is a literal.
    pub fn right_value(&self) -> Option<&Value> {
        operand_value(&self.right)
    }

    /// The logical negation, as a new predicate.
    pub fn negate(&self) -> SingleExpression {
        match self.operator.negate() {
            Some(operator) => Self {
                operator,
                ..self.clone()
            },
            None => Self {
                negated: !self.negated,
                ..self.clone()
            },
        }
    }

    /// Whether neither side is a path.
    pub fn is_constant(&self) -> bool {
        self.left.is_constant() && self.right.is_constant()
    }

    pub(crate) fn eval(&self, scope: Scope<'_>) -> QueryResult<bool> {
        let (left, right) = match scope {
            Scope::Bound => (self.left.resolve_bound()?, self.resolve_right(Operand::resolve_bound)?),
            Scope::Row(resolver) => (
                self.left.resolve_with(resolver)?,
                self.resolve_right(|o| o.resolve_with(resolver))?,
            ),
        };
        Ok(self.operator.evaluate(&left, &right) != self.negated)
    }

    fn resolve_right(&self, resolve: impl Fn(&Operand) -> QueryResult<Value>) -> QueryResult<Value> {
        if self.operator.is_unary() {
            Ok(Value::Null)
        } else {
            resolve(&self.right)
        }
    }

    pub(crate) fn format<F: ExpressionFormatter + ?Sized>(&self, formatter: &mut F) {
        if self.negated {
            formatter.buffer().push_str("NOT (");
            self.format_predicate(formatter);
            formatter.buffer().push(')');
        } else {
            self.format_predicate(formatter);
        }
    }

    fn format_predicate<F: ExpressionFormatter + ?Sized>(&self, formatter: &mut F) {
        let op = self.operator;

        // Comparing against a null literal means a null check.
        if let Operand::Literal(Value::Null) = self.right {
            let null_check = match op {
                SqlOperator::Eq => Some(SqlOperator::IsNull),
                SqlOperator::Neq => Some(SqlOperator::IsNotNull),
                _ => None,
            };
            if let Some(check) = null_check {
                write_operand(formatter, &self.left);
                formatter.buffer().push(' ');
                formatter.buffer().push_str(check.as_sql());
                return;
            }
        }

        if op.is_unary() {
            write_operand(formatter, &self.left);
            formatter.buffer().push(' ');
            formatter.buffer().push_str(op.as_sql());
            return;
        }

        match (op, &self.right) {
            (SqlOperator::In | SqlOperator::NotIn, Operand::Literal(Value::List(items))) => {
                if items.is_empty() {
                    formatter.write_constant(op == SqlOperator::NotIn);
                    return;
                }
                write_operand(formatter, &self.left);
                formatter.buffer().push(' ');
                formatter.buffer().push_str(op.as_sql());
                formatter.buffer().push_str(" (");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        formatter.buffer().push_str(", ");
                    }
                    formatter.write_value(item);
                }
                formatter.buffer().push(')');
            }
            (SqlOperator::In | SqlOperator::NotIn, right) => {
                write_operand(formatter, &self.left);
                formatter.buffer().push(' ');
                formatter.buffer().push_str(op.as_sql());
                formatter.buffer().push_str(" (");
                write_operand(formatter, right);
                formatter.buffer().push(')');
            }
            (SqlOperator::Like { escape }, right) => {
                write_operand(formatter, &self.left);
                formatter.buffer().push_str(" LIKE ");
                write_operand(formatter, right);
                if let Some(c) = escape {
                    formatter.write_like_escape(c);
                }
            }
            (_, right) => {
                write_operand(formatter, &self.left);
                formatter.buffer().push(' ');
                formatter.buffer().push_str(op.as_sql());
                formatter.buffer().push(' ');
                write_operand(formatter, right);
            }
        }
    }
}

fn write_operand<F: ExpressionFormatter + ?Sized>(formatter: &mut F, operand: &Operand) {
    match operand {
        Operand::Literal(value) => formatter.write_value(value),
        Operand::Path(path) => formatter.write_path(path.name()),
    }
}

fn operand_path(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Path(path) => Some(path.name()),
        Operand::Literal(_) => None,
    }
}

fn operand_value(operand: &Operand) -> Option<&Value> {
    match operand {
        Operand::Literal(value) => Some(value),
        Operand::Path(_) => None,
    }
}
