//! Runtime values shared by the evaluator and the SQL renderer.
//!
//! Every literal held by an [`Argument`](crate::argument::Argument) and every
//! value resolved from a [`Path`](crate::path::Path) collapses into a [`Value`]
//! before an operator looks at it. The same [`Value`] is what a SQL formatter
//! binds as a query parameter.
//!
//! ```rust
//! use strata_query::Value;
//!
//! let val: Value = 42.into();
//! assert!(matches!(val, Value::Int(42)));
//!
//! let val: Value = "hello".into();
//! assert!(matches!(val, Value::String(_)));
//!
//! let val: Value = None::<i64>.into();
//! assert!(val.is_null());
//! ```

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value that can be compared, matched and bound as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// Ordered collection of values (lists and sets).
    List(Vec<Value>),
    /// Key/value pairs, in key order.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Check if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this value is an empty collection.
    ///
    /// Null counts as empty; strings, lists and maps are empty when they
    /// hold nothing. Scalars are never empty.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => false,
        }
    }

    /// Compare two values for ordering.
    ///
    /// Numbers compare across integer and float, strings lexicographically and
    /// booleans with `false < true`. Null and mismatched shapes are
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting rows.
    ///
    /// Agrees with [`compare`](Self::compare) wherever that is defined. NaN
    /// sorts above every other number, and values of different shapes order
    /// by shape: null, bool, number, string, list, map.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => cmp_float(*a, *b),
            (Self::Int(a), Self::Float(b)) => cmp_float(*a as f64, *b),
            (Self::Float(a), Self::Int(b)) => cmp_float(*a, *b as f64),
            (Self::List(a), Self::List(b)) => cmp_seq(a.iter(), b.iter(), Value::sort_cmp),
            (Self::Map(a), Self::Map(b)) => cmp_seq(a.iter(), b.iter(), |(ak, av), (bk, bv)| {
                ak.sort_cmp(bk).then_with(|| av.sort_cmp(bv))
            }),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.shape_rank().cmp(&other.shape_rank())),
        }
    }

    fn shape_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::String(_) => 3,
            Self::List(_) => 4,
            Self::Map(_) => 5,
        }
    }

    /// Equality used by the evaluator.
    ///
    /// Unlike `PartialEq`, integers and floats holding the same number are
    /// equal.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Int(_), Self::Float(_)) | (Self::Float(_), Self::Int(_)) => {
                self.compare(other) == Some(Ordering::Equal)
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
            }
            _ => self == other,
        }
    }
}

/// Floats by value with every NaN equal and above all numbers. Zeroes of
/// either sign are equal.
fn cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn cmp_seq<'a, T: 'a>(
    a: impl Iterator<Item = &'a T>,
    mut b: impl Iterator<Item = &'a T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    for x in a {
        let Some(y) = b.next() else {
            return Ordering::Greater;
        };
        let ordering = cmp(x, y);
        if ordering.is_ne() {
            return ordering;
        }
    }
    if b.next().is_some() { Ordering::Less } else { Ordering::Equal }
}

impl Default for Value {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A Rust type that can sit behind an [`Argument`](crate::argument::Argument).
pub trait SqlType: Clone + Send + Sync + 'static {
    /// Convert to the runtime value.
    fn to_value(&self) -> Value;
}

/// Numeric types, which gain the ordering operators.
pub trait SqlNumber: SqlType {}

macro_rules! impl_sql_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SqlType for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::Int(*self as i64)
                }
            }

            impl SqlNumber for $ty {}

            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_sql_int!(i8, i16, i32, i64, u8, u16, u32);

impl SqlType for f32 {
    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }
}

impl SqlNumber for f32 {}

impl SqlType for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl SqlNumber for f64 {}

impl SqlType for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl SqlType for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl<T: SqlType> SqlType for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: SqlType> SqlType for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(SqlType::to_value).collect())
    }
}

impl<T: SqlType + Ord> SqlType for BTreeSet<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(SqlType::to_value).collect())
    }
}

impl<K: SqlType + Ord, V: SqlType> SqlType for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl SqlType for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(Value::Int(2).compare(&Value::Float(1.5)), Some(Ordering::Greater));
        assert_eq!(Value::Float(2.0).compare(&Value::Int(2)), Some(Ordering::Equal));
        assert!(Value::Int(2).matches(&Value::Float(2.0)));
    }

    #[test]
    fn test_compare_incomparable() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::String("a".into()).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_sort_cmp_is_total() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan.sort_cmp(&Value::Float(f64::INFINITY)), Ordering::Greater);
        assert_eq!(Value::Int(i64::MAX).sort_cmp(&nan), Ordering::Less);
        assert_eq!(nan.sort_cmp(&Value::Float(f64::NAN)), Ordering::Equal);
        assert_eq!(Value::Int(2).sort_cmp(&Value::Float(1.5)), Ordering::Greater);
        assert_eq!(Value::Float(-0.0).sort_cmp(&Value::Int(0)), Ordering::Equal);

        // Mixed shapes order by shape.
        assert_eq!(Value::Bool(true).sort_cmp(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::from("a").sort_cmp(&Value::Int(9)), Ordering::Greater);
        assert_eq!(
            Value::List(vec![Value::Int(1)]).sort_cmp(&Value::List(vec![Value::Int(1), Value::Int(0)])),
            Ordering::Less
        );

        let mut values = vec![
            Value::from("b"),
            Value::Float(f64::NAN),
            Value::Int(3),
            Value::Bool(false),
            Value::Float(1.5),
            Value::from("a"),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(values[0], Value::Bool(false));
        assert_eq!(values[1], Value::Float(1.5));
        assert_eq!(values[2], Value::Int(3));
        assert!(matches!(values[3], Value::Float(f) if f.is_nan()));
        assert_eq!(values[4..], [Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_empty_collection() {
        assert!(Value::Null.is_empty_collection());
        assert!(Value::List(vec![]).is_empty_collection());
        assert!(!Value::List(vec![Value::Int(1)]).is_empty_collection());
        assert!(!Value::Int(0).is_empty_collection());
    }

    #[test]
    fn test_set_and_map_are_ordered() {
        let set: BTreeSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(
            set.to_value(),
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );

        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2i64);
        map.insert("a".to_string(), 1i64);
        assert_eq!(
            map.to_value(),
            Value::Map(vec![
                (Value::String("a".into()), Value::Int(1)),
                (Value::String("b".into()), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn test_display_escapes_strings() {
        assert_eq!(Value::from("O'Brien").to_string(), "'O''Brien'");
        assert_eq!(Value::from(vec![1i64, 2]).to_string(), "(1, 2)");
    }
}
