//! Property paths: opaque handles to a value living on some object.
//!
//! A [`Path`] has a dotted name, used when a statement is rendered, and can
//! resolve its current value. [`PropertyPath`] is the stock implementation: a
//! name plus an optional getter bound to a live object.
//!
//! ```rust
//! use strata_query::{Path, PropertyPath};
//!
//! let age = PropertyPath::<i64>::bound("age", || Ok(42));
//! assert_eq!(age.name(), "age");
//! assert_eq!(age.get_value().unwrap(), 42);
//!
//! let unbound = PropertyPath::<i64>::new("age");
//! assert!(unbound.get_value().is_err());
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::{QueryError, QueryResult};
use crate::value::{SqlType, Value};

/// A reference to a property whose current value can be resolved.
pub trait Path<V>: Send + Sync {
    /// Dotted property name, e.g. `address.city`.
    fn name(&self) -> &str;

    /// Resolve the current value.
    ///
    /// Fails with [`ErrorCode::UnresolvedPath`](crate::ErrorCode::UnresolvedPath)
    /// when the property cannot be reached, e.g. through a null intermediate.
    fn get_value(&self) -> QueryResult<V>;
}

/// Resolves property paths by name against some row.
pub trait PropertyResolver {
    /// Resolve the value stored under `path`.
    fn resolve(&self, path: &str) -> QueryResult<Value>;
}

type Getter<V> = Arc<dyn Fn() -> QueryResult<V> + Send + Sync>;

/// A named property with an optional getter bound to a live object.
pub struct PropertyPath<V> {
    name: SmolStr,
    getter: Option<Getter<V>>,
}

impl<V> PropertyPath<V> {
    /// Create an unbound path. It renders but cannot resolve on its own.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            getter: None,
        }
    }

    /// Create a path bound to a getter.
    pub fn bound<F>(name: impl Into<SmolStr>, getter: F) -> Self
    where
        F: Fn() -> QueryResult<V> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            getter: Some(Arc::new(getter)),
        }
    }

    /// Bind this path to a getter, replacing any previous binding.
    pub fn bind<F>(mut self, getter: F) -> Self
    where
        F: Fn() -> QueryResult<V> + Send + Sync + 'static,
    {
        self.getter = Some(Arc::new(getter));
        self
    }

    /// Whether a getter is bound.
    pub fn is_bound(&self) -> bool {
        self.getter.is_some()
    }
}

impl<V> Clone for PropertyPath<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            getter: self.getter.clone(),
        }
    }
}

impl<V> fmt::Debug for PropertyPath<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyPath")
            .field("name", &self.name)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<V> AsRef<str> for PropertyPath<V> {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl<V: Send + Sync> Path<V> for PropertyPath<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_value(&self) -> QueryResult<V> {
        match &self.getter {
            Some(getter) => getter(),
            None => Err(QueryError::unresolved_path(
                self.name.as_str(),
                "path is not bound to an object",
            )),
        }
    }
}

/// A path with its value type erased, as stored inside an expression.
pub(crate) trait ErasedPath: Send + Sync {
    fn name(&self) -> &str;
    fn resolve(&self) -> QueryResult<Value>;
}

struct TypedPath<V> {
    inner: Arc<dyn Path<V>>,
    _value: PhantomData<fn() -> V>,
}

impl<V: SqlType> ErasedPath for TypedPath<V> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn resolve(&self) -> QueryResult<Value> {
        self.inner.get_value().map(|v| v.to_value())
    }
}

/// One side of a binary predicate: a literal or a path.
#[derive(Clone)]
pub(crate) enum Operand {
    Literal(Value),
    Path(Arc<dyn ErasedPath>),
}

impl Operand {
    pub(crate) fn path<V: SqlType>(path: Arc<dyn Path<V>>) -> Self {
        Self::Path(Arc::new(TypedPath {
            inner: path,
            _value: PhantomData,
        }))
    }

    pub(crate) fn is_constant(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Resolve through the path's own binding.
    pub(crate) fn resolve_bound(&self) -> QueryResult<Value> {
        match self {
            Self::Literal(v) => Ok(v.clone()),
            Self::Path(p) => p.resolve(),
        }
    }

    /// Resolve paths by name through `resolver`.
    pub(crate) fn resolve_with(&self, resolver: &dyn PropertyResolver) -> QueryResult<Value> {
        match self {
            Self::Literal(v) => Ok(v.clone()),
            Self::Path(p) => resolver.resolve(p.name()),
        }
    }
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => a == b,
            (Self::Path(a), Self::Path(b)) => a.name() == b.name(),
            _ => false,
        }
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Path(p) => f.debug_tuple("Path").field(&p.name()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_bound_path_resolves() {
        let path = PropertyPath::<String>::bound("name", || Ok("John".to_string()));
        assert!(path.is_bound());
        assert_eq!(path.get_value().unwrap(), "John");
    }

    #[test]
    fn test_unbound_path_fails() {
        let err = PropertyPath::<i64>::new("age").get_value().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnresolvedPath);
        assert_eq!(err.context.field.as_deref(), Some("age"));
    }

    #[test]
    fn test_erased_operand_resolves_value() {
        let path: Arc<dyn Path<i32>> = Arc::new(PropertyPath::bound("age", || Ok(30)));
        let operand = Operand::path(path);
        assert!(!operand.is_constant());
        assert_eq!(operand.resolve_bound().unwrap(), Value::Int(30));
    }

    #[test]
    fn test_operand_equality_by_name() {
        let a = Operand::path::<i32>(Arc::new(PropertyPath::new("age")));
        let b = Operand::path::<i32>(Arc::new(PropertyPath::bound("age", || Ok(1))));
        assert_eq!(a, b);
        assert_ne!(a, Operand::Literal(Value::Int(1)));
    }
}
