//! Entity binding: how statements read and write the rows they work on.
//!
//! An [`Entity`] names its table and exposes its properties by name as
//! [`Value`]s. Statements are built from a prototype entity; the in-memory
//! dialect also clones the prototype to materialize inserted rows.
//!
//! The [`impl_entity!`](crate::impl_entity) macro implements the trait for
//! plain structs:
//!
//! ```rust
//! use strata_query::{impl_entity, Entity, Value};
//!
//! #[derive(Debug, Clone, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     nickname: Option<String>,
//! }
//!
//! impl_entity!(User, "users" { id, name, nickname });
//!
//! let mut user = User::default();
//! user.set_property("name", Value::from("John")).unwrap();
//! assert_eq!(user.table_name(), "users");
//! assert_eq!(user.property("name"), Some(Value::from("John")));
//! assert_eq!(user.property("nickname"), Some(Value::Null));
//! assert!(user.set_property("id", Value::from("x")).is_err());
//! ```

use std::any::type_name;
use std::collections::BTreeSet;

use crate::error::{QueryError, QueryResult};
use crate::path::PropertyResolver;
use crate::value::Value;

/// A row type statements can be bound to.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name of the table (or collection) backing this entity.
    fn table_name(&self) -> &str;

    /// Current value of the property at `path`, or `None` if there is no such
    /// property.
    fn property(&self, path: &str) -> Option<Value>;

    /// Overwrite the property at `path`.
    ///
    /// Fails with `UnresolvedPath` for unknown properties and `TypeMismatch`
    /// when `value` has the wrong shape.
    fn set_property(&mut self, path: &str, value: Value) -> QueryResult<()>;
}

impl<E: Entity> PropertyResolver for E {
    fn resolve(&self, path: &str) -> QueryResult<Value> {
        self.property(path).ok_or_else(|| unknown_property(self.table_name(), path))
    }
}

/// The error for a property an entity does not have.
pub fn unknown_property(table: &str, path: &str) -> QueryError {
    QueryError::unresolved_path(path, format!("no such property on {}", table)).with_model(table)
}

/// Conversion back from a [`Value`] into a property type.
pub trait FromValue: Sized {
    /// Convert, or `None` if the value has the wrong shape.
    fn from_value(value: Value) -> Option<Self>;
}

/// Convert `value` for the property `field`, failing with `TypeMismatch`.
pub fn extract<T: FromValue>(field: &str, value: Value) -> QueryResult<T> {
    let found = value.kind();
    T::from_value(value).ok_or_else(|| QueryError::type_mismatch(field, type_name::<T>(), found))
}

macro_rules! impl_from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

/// Implement [`Entity`] for a struct whose listed fields are all
/// [`SqlType`](crate::SqlType) + [`FromValue`].
///
/// # Syntax
///
/// - `impl_entity!(Type, "table" { field, ... })`
#[macro_export]
macro_rules! impl_entity {
    ($ty:ty, $table:literal { $($field:ident),* $(,)? }) => {
        impl $crate::Entity for $ty {
            fn table_name(&self) -> &str {
                $table
            }

            fn property(&self, path: &str) -> ::std::option::Option<$crate::Value> {
                match path {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::SqlType::to_value(&self.$field),
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn set_property(&mut self, path: &str, value: $crate::Value) -> $crate::QueryResult<()> {
                match path {
                    $(stringify!($field) => {
                        self.$field = $crate::entity::extract(path, value)?;
                        ::std::result::Result::Ok(())
                    })*
                    _ => ::std::result::Result::Err($crate::entity::unknown_property($table, path)),
                }
            }
        }
    };
}
