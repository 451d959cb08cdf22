//! Typed operands: a literal value or a path to one.
//!
//! [`Argument`] is where predicates start. Every comparison method binds the
//! argument as the left operand of a [`SingleExpression`] and wraps whatever is
//! passed in as the right operand. Which methods exist depends on the value
//! type: ordering only for numbers, `like` only for strings, emptiness only for
//! collections. Misuse does not compile.
//!
//! ```rust
//! use strata_query::{Argument, PropertyPath};
//!
//! let age = PropertyPath::<i64>::bound("age", || Ok(18));
//! let name = PropertyPath::<String>::bound("name", || Ok("John".to_string()));
//!
//! let expr = Argument::of(age).between(18, 65)
//!     .and(Argument::of(name).like("J%n"));
//! assert!(expr.evaluate().unwrap());
//! ```
//!
//! ```compile_fail
//! use strata_query::{Argument, PropertyPath};
//!
//! // Strings have no ordering operators.
//! let name = Argument::of(PropertyPath::<String>::new("name"));
//! let _ = name.gt("J");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::QueryResult;
use crate::expression::{Expression, SingleExpression};
use crate::operator::{SqlOperator, escape_like};
use crate::path::{Operand, Path, PropertyPath};
use crate::value::{SqlNumber, SqlType, Value};

/// Escape character used by the `contains`/`starts_with`/`ends_with` helpers.
const LIKE_ESCAPE: char = '\\';

/// A literal value or a path to a value.
///
/// Holds at most one of the two. Holding neither is a literal null.
pub struct Argument<V> {
    value_path: Option<Arc<dyn Path<V>>>,
    value: Option<V>,
}

/// An argument over a numeric type.
pub type NumberArgument<V> = Argument<V>;
/// An argument over a string.
pub type StringArgument = Argument<String>;
/// An argument over an ordered collection.
pub type CollectionArgument<E> = Argument<Vec<E>>;
/// An argument over a set.
pub type SetArgument<E> = Argument<BTreeSet<E>>;
/// An argument over a map.
pub type MapArgument<K, V> = Argument<BTreeMap<K, V>>;

impl<V: SqlType> Argument<V> {
    /// A literal argument.
    pub fn literal(value: V) -> Self {
        Self {
            value_path: None,
            value: Some(value),
        }
    }

    /// A literal null.
    pub fn null() -> Self {
        Self {
            value_path: None,
            value: None,
        }
    }

    /// An argument resolved through `path`.
    pub fn of(path: impl Path<V> + 'static) -> Self {
        Self::from_path(Arc::new(path))
    }

    /// An argument resolved through a shared path.
    pub fn from_path(path: Arc<dyn Path<V>>) -> Self {
        Self {
            value_path: Some(path),
            value: None,
        }
    }

    /// The path, if this argument is not a literal.
    pub fn value_path(&self) -> Option<&dyn Path<V>> {
        self.value_path.as_deref()
    }

    /// The literal, if this argument is a non-null literal.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Whether this argument is a literal (possibly null).
    pub fn is_constant(&self) -> bool {
        self.value_path.is_none()
    }

    /// The current value: the literal, or whatever the path resolves to.
    pub fn evaluate(&self) -> QueryResult<Option<V>> {
        match &self.value_path {
            Some(path) => path.get_value().map(Some),
            None => Ok(self.value.clone()),
        }
    }

    pub(crate) fn to_operand(&self) -> Operand {
        match &self.value_path {
            Some(path) => Operand::path(Arc::clone(path)),
            None => Operand::Literal(self.value.as_ref().map_or(Value::Null, SqlType::to_value)),
        }
    }

    fn compare(&self, operator: SqlOperator, other: impl Into<Argument<V>>) -> Expression {
        SingleExpression::value_of(self, operator, &other.into())
    }

    fn check(&self, operator: SqlOperator) -> Expression {
        SingleExpression::value_of(self, operator, &Argument::<V>::null())
    }

    /// `self = other`. Comparing with a null literal renders `IS NULL`.
    pub fn eq(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Eq, other)
    }

    /// `self <> other`.
    pub fn neq(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Neq, other)
    }

    /// `self IS NULL`.
    pub fn is_null(&self) -> Expression {
        self.check(SqlOperator::IsNull)
    }

    /// `self IS NOT NULL`.
    pub fn is_not_null(&self) -> Expression {
        self.check(SqlOperator::IsNotNull)
    }

    /// `self IN (values)`.
    ///
    /// An empty literal list never matches and renders as `FALSE`.
    pub fn is_in(&self, values: impl Into<Argument<Vec<V>>>) -> Expression {
        SingleExpression::value_of(self, SqlOperator::In, &values.into())
    }

    /// `self NOT IN (values)`.
    pub fn not_in(&self, values: impl Into<Argument<Vec<V>>>) -> Expression {
        SingleExpression::value_of(self, SqlOperator::NotIn, &values.into())
    }
}

impl<V: SqlNumber> Argument<V> {
    /// `self > other`.
    pub fn gt(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Gt, other)
    }

    /// `self >= other`.
    pub fn geq(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Geq, other)
    }

    /// `self < other`.
    pub fn lt(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Lt, other)
    }

    /// `self <= other`.
    pub fn leq(&self, other: impl Into<Argument<V>>) -> Expression {
        self.compare(SqlOperator::Leq, other)
    }

    /// `min <= self AND self <= max`; both bounds inclusive.
    pub fn between(&self, min: impl Into<Argument<V>>, max: impl Into<Argument<V>>) -> Expression {
        self.geq(min).and(self.leq(max))
    }
}

impl Argument<String> {
    /// `self LIKE pattern`, where `%` matches any run of characters and `_`
    /// exactly one.
    pub fn like(&self, pattern: impl Into<Argument<String>>) -> Expression {
        self.compare(SqlOperator::Like { escape: None }, pattern)
    }

    /// `self LIKE pattern ESCAPE escape`; `escape` before a wildcard makes it
    /// literal.
    pub fn like_escape(&self, pattern: impl Into<Argument<String>>, escape: char) -> Expression {
        self.compare(SqlOperator::Like { escape: Some(escape) }, pattern)
    }

    /// Matches strings containing `text` literally.
    pub fn contains(&self, text: &str) -> Expression {
        let pattern = format!("%{}%", escape_like(text, LIKE_ESCAPE));
        self.like_escape(pattern, LIKE_ESCAPE)
    }

    /// Matches strings starting with `text` literally.
    pub fn starts_with(&self, text: &str) -> Expression {
        let pattern = format!("{}%", escape_like(text, LIKE_ESCAPE));
        self.like_escape(pattern, LIKE_ESCAPE)
    }

    /// Matches strings ending with `text` literally.
    pub fn ends_with(&self, text: &str) -> Expression {
        let pattern = format!("%{}", escape_like(text, LIKE_ESCAPE));
        self.like_escape(pattern, LIKE_ESCAPE)
    }
}

impl<T: SqlType> Argument<Vec<T>> {
    /// `self IS EMPTY`. A null collection counts as empty.
    pub fn is_empty(&self) -> Expression {
        self.check(SqlOperator::IsEmpty)
    }

    /// `self IS NOT EMPTY`.
    pub fn is_not_empty(&self) -> Expression {
        self.check(SqlOperator::IsNotEmpty)
    }
}

impl<T: SqlType + Ord> Argument<BTreeSet<T>> {
    /// `self IS EMPTY`. A null set counts as empty.
    pub fn is_empty(&self) -> Expression {
        self.check(SqlOperator::IsEmpty)
    }

    /// `self IS NOT EMPTY`.
    pub fn is_not_empty(&self) -> Expression {
        self.check(SqlOperator::IsNotEmpty)
    }
}

impl<V: Clone> Clone for Argument<V> {
    fn clone(&self) -> Self {
        Self {
            value_path: self.value_path.clone(),
            value: self.value.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Argument<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value_path {
            Some(path) => f.debug_tuple("Argument::Path").field(&path.name()).finish(),
            None => f.debug_tuple("Argument::Literal").field(&self.value).finish(),
        }
    }
}

macro_rules! impl_literal_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument<$ty> {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::literal(value)
                }
            }
        )*
    };
}

impl_literal_argument!(i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, String, Value);

impl From<&str> for Argument<String> {
    fn from(value: &str) -> Self {
        Self::literal(value.to_string())
    }
}

impl<T: SqlType> From<Vec<T>> for Argument<Vec<T>> {
    fn from(values: Vec<T>) -> Self {
        Self::literal(values)
    }
}

impl<T: SqlType, const N: usize> From<[T; N]> for Argument<Vec<T>> {
    fn from(values: [T; N]) -> Self {
        Self::literal(values.into())
    }
}

impl<const N: usize> From<[&str; N]> for Argument<Vec<String>> {
    fn from(values: [&str; N]) -> Self {
        Self::literal(values.iter().map(|s| s.to_string()).collect())
    }
}

impl<T: SqlType + Ord> From<BTreeSet<T>> for Argument<BTreeSet<T>> {
    fn from(values: BTreeSet<T>) -> Self {
        Self::literal(values)
    }
}

impl<K: SqlType + Ord, V: SqlType> From<BTreeMap<K, V>> for Argument<BTreeMap<K, V>> {
    fn from(entries: BTreeMap<K, V>) -> Self {
        Self::literal(entries)
    }
}

impl<V: SqlType> From<Option<V>> for Argument<V> {
    fn from(value: Option<V>) -> Self {
        Self {
            value_path: None,
            value,
        }
    }
}

impl<V: SqlType> From<PropertyPath<V>> for Argument<V> {
    fn from(path: PropertyPath<V>) -> Self {
        Self::of(path)
    }
}

impl<V: SqlType> From<&PropertyPath<V>> for Argument<V> {
    fn from(path: &PropertyPath<V>) -> Self {
        Self::of(path.clone())
    }
}

impl<V: SqlType> From<&Argument<V>> for Argument<V> {
    fn from(argument: &Argument<V>) -> Self {
        argument.clone()
    }
}
