use super::{Conjunction, ConjunctionExpression, Expression};
use crate::formatter::ExpressionFormatter;

/// A fixed truth value.
///
/// There are exactly two: [`ConstantExpression::TRUE`] and
/// [`ConstantExpression::FALSE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstantExpression(bool);

impl ConstantExpression {
    /// Always true.
    pub const TRUE: ConstantExpression = ConstantExpression(true);
    /// Always false.
    pub const FALSE: ConstantExpression = ConstantExpression(false);

    /// The shared constant for `value`.
    pub const fn value_of(value: bool) -> Self {
        if value { Self::TRUE } else { Self::FALSE }
    }

    /// The truth value.
    pub const fn value(self) -> bool {
        self.0
    }

    /// The other constant.
    pub const fn negate(self) -> Self {
        Self::value_of(!self.0)
    }

    /// Combine with `others` under `conjunction`.
    pub fn combine(
        self,
        conjunction: Conjunction,
        others: impl IntoIterator<Item = Expression>,
    ) -> Expression {
        ConjunctionExpression::value_of(
            conjunction,
            std::iter::once(Expression::Constant(self)).chain(others),
        )
    }

    pub(crate) fn format<F: ExpressionFormatter + ?Sized>(self, formatter: &mut F) {
        formatter.write_constant(self.0);
    }
}
