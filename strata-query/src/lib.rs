//! # strata-query
//!
//! Typed predicate expressions and statement builders for the Strata query
//! layer.
//!
//! This crate provides:
//! - Typed operands ([`Argument`]) whose available operators depend on the
//!   value type
//! - A boolean expression algebra that folds constants, flattens conjunctions
//!   and negates by De Morgan
//! - In-memory evaluation of expressions and SQL rendering with bound
//!   parameters
//! - Typestate statement builders (`SELECT`, `INSERT`, `UPDATE`, `DELETE`)
//!   where each clause is only available on the kinds that support it
//! - Pluggable dialects: a SQL dialect over any driver and an in-memory store
//!
//! ## Expressions
//!
//! ```rust
//! use strata_query::{Argument, Expression, PropertyPath};
//!
//! let age = Argument::of(PropertyPath::<i64>::bound("age", || Ok(42)));
//! let name = Argument::of(PropertyPath::<String>::bound("name", || Ok("John".into())));
//!
//! let expr = age.geq(18).and(name.starts_with("Jo"));
//! assert!(expr.evaluate().unwrap());
//! assert_eq!(expr.to_string(), "age >= 18 AND name LIKE 'Jo%' ESCAPE '\\'");
//!
//! // Negation pushes through conjunctions.
//! assert!(!expr.negate().evaluate().unwrap());
//!
//! // Literal-only predicates fold away.
//! assert_eq!(Argument::literal(1).eq(1).or(age.lt(0)), Expression::TRUE);
//! ```
//!
//! ## Statements
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { id: i64, age: i64 }
//! impl_entity!(User, "users" { id, age });
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! let statement = MemoryDialect::new()
//!     .update(User::default())
//!     .set(&PropertyPath::<i64>::new("age"), 0)?
//!     .r#where(age.lt(0))
//!     .limit(100);
//!
//! let (sql, _) = statement.to_sql(&DialectConfig::mysql());
//! assert_eq!(sql, "UPDATE users SET age = ? WHERE age < ? LIMIT 100");
//! # Ok::<(), QueryError>(())
//! ```
//!
//! ## Logging
//!
//! Events are emitted through `tracing`; see [`logging`] for the
//! `STRATA_DEBUG` switches.

pub mod argument;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod expression;
pub mod formatter;
pub mod logging;
pub mod operator;
pub mod pagination;
pub mod path;
pub mod sql;
pub mod statement;
pub mod types;
pub mod value;

pub use argument::{
    Argument, CollectionArgument, MapArgument, NumberArgument, SetArgument, StringArgument,
};
pub use config::{DialectConfig, DialectConfigBuilder};
pub use dialect::{Dialect, MemoryDialect, SqlDialect, SqlEngine, SqlRequest};
pub use entity::{Entity, FromValue};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use expression::{
    Conjunction, ConjunctionExpression, ConstantExpression, Expression, SingleExpression,
};
pub use formatter::{ExpressionFormatter, InlineFormatter};
pub use operator::{SqlOperator, escape_like, like_match};
pub use pagination::Pagination;
pub use path::{Path, PropertyPath, PropertyResolver};
pub use sql::{DatabaseType, SqlFormatter};
pub use statement::{
    Assignment, Delete, Fetch, GroupBy, Insert, Kind, Limit, Modify, OrderBy, Paging, Select, Set,
    Statement, StatementKind, Update, Where,
};
pub use types::{FetchMode, FetchSpec, NullsOrder, OrderByField, SortOrder};
pub use value::{SqlNumber, SqlType, Value};

// Re-export logging utilities
pub use logging::{
    LogFormat, get_log_format, get_log_level, init as init_logging, init_with_level, is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::argument::Argument;
    pub use crate::config::DialectConfig;
    pub use crate::dialect::{Dialect, MemoryDialect, SqlDialect, SqlEngine};
    pub use crate::entity::Entity;
    pub use crate::error::{ErrorCode, QueryError, QueryResult};
    pub use crate::expression::{Expression, and, not, or};
    pub use crate::impl_entity;
    pub use crate::pagination::Pagination;
    pub use crate::path::{Path, PropertyPath};
    pub use crate::statement::Statement;
    pub use crate::types::{FetchSpec, NullsOrder, OrderByField, SortOrder};
    pub use crate::value::Value;
}
