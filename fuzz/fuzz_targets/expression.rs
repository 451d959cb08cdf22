//! Fuzz target for expression construction, negation and rendering.
//!
//! Builds arbitrary expression trees over a small entity and checks that
//! double negation evaluates like the original and that rendering never
//! panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_expression
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use strata_query::expression::{and, or};
use strata_query::{
    Argument, DatabaseType, Expression, InlineFormatter, PropertyPath, SqlFormatter, impl_entity,
};

#[derive(Debug, Clone, Default, Arbitrary)]
struct Row {
    qty: i64,
    limit: Option<i64>,
    label: String,
}

impl_entity!(Row, "rows" { qty, limit, label });

/// A fuzzable predicate over `Row`.
#[derive(Debug, Arbitrary)]
enum FuzzPredicate {
    QtyEq(i64),
    QtyNeq(i64),
    QtyLt(i64),
    QtyGeq(i64),
    QtyBetween(i64, i64),
    QtyIn(Vec<i64>),
    QtyVsLimit,
    LimitIsNull,
    LabelLike(String),
    LabelStartsWith(String),
    LabelContains(String),
    Literal(bool),
}

/// A fuzzable expression tree.
#[derive(Debug, Arbitrary)]
enum FuzzExpression {
    Predicate(FuzzPredicate),
    And(Vec<FuzzExpression>),
    Or(Vec<FuzzExpression>),
    Not(Box<FuzzExpression>),
}

fn qty() -> Argument<i64> {
    Argument::of(PropertyPath::new("qty"))
}

fn label() -> Argument<String> {
    Argument::of(PropertyPath::new("label"))
}

impl FuzzPredicate {
    fn build(self) -> Expression {
        match self {
            FuzzPredicate::QtyEq(v) => qty().eq(v),
            FuzzPredicate::QtyNeq(v) => qty().neq(v),
            FuzzPredicate::QtyLt(v) => qty().lt(v),
            FuzzPredicate::QtyGeq(v) => qty().geq(v),
            FuzzPredicate::QtyBetween(lo, hi) => qty().between(lo, hi),
            FuzzPredicate::QtyIn(values) => {
                qty().is_in(values.into_iter().take(16).collect::<Vec<_>>())
            }
            FuzzPredicate::QtyVsLimit => qty().leq(PropertyPath::<i64>::new("limit")),
            FuzzPredicate::LimitIsNull => {
                Argument::of(PropertyPath::<i64>::new("limit")).is_null()
            }
            FuzzPredicate::LabelLike(pattern) => label().like(pattern),
            FuzzPredicate::LabelStartsWith(text) => label().starts_with(&text),
            FuzzPredicate::LabelContains(text) => label().contains(&text),
            FuzzPredicate::Literal(b) => Expression::from(b),
        }
    }
}

impl FuzzExpression {
    fn build(self, depth: usize) -> Expression {
        // Limit recursion depth to prevent stack overflow
        if depth > 8 {
            return Expression::from(true);
        }

        match self {
            FuzzExpression::Predicate(p) => p.build(),
            FuzzExpression::And(children) => {
                and(children.into_iter().take(8).map(|c| c.build(depth + 1)))
            }
            FuzzExpression::Or(children) => {
                or(children.into_iter().take(8).map(|c| c.build(depth + 1)))
            }
            FuzzExpression::Not(child) => child.build(depth + 1).negate(),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    expression: FuzzExpression,
    row: Row,
    resolve_negations: bool,
}

fuzz_target!(|input: Input| {
    let expr = input.expression.build(0);
    let twice = expr.negate().negate();

    let direct = expr.evaluate_with(&input.row);
    let round_trip = twice.evaluate_with(&input.row);
    if let (Ok(a), Ok(b)) = (&direct, &round_trip) {
        assert_eq!(a, b, "double negation changed the result of {expr}");
    }

    let _ = expr.to_string();

    let mut inline = InlineFormatter::new().with_negation_resolution(input.resolve_negations);
    expr.format(&mut inline, false);
    let _ = inline.into_string();

    for db in [DatabaseType::PostgreSQL, DatabaseType::MySQL, DatabaseType::SQLite] {
        let mut formatter = SqlFormatter::new(db).with_negation_resolution(input.resolve_negations);
        expr.negate().format(&mut formatter, false);
        let _ = formatter.build();
    }
});
