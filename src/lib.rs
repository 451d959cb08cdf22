//! # Strata
//!
//! Typed predicate expressions and statement builders over pluggable
//! dialects.
//!
//! Strata provides:
//! - Typed arguments whose operators depend on the value type
//! - A boolean expression algebra with folding and De Morgan negation
//! - Statement builders where each clause only exists on the statement kinds
//!   that support it
//! - A SQL dialect for PostgreSQL, MySQL and SQLite, and an in-memory dialect
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct User {
//!     pub id: i64,
//!     pub email: String,
//!     pub age: i64,
//! }
//!
//! impl_entity!(User, "users" { id, email, age });
//!
//! # futures::executor::block_on(async {
//! let db = MemoryDialect::new();
//! let email = PropertyPath::<String>::new("email");
//! let age = PropertyPath::<i64>::new("age");
//!
//! db.insert(User { id: 1, ..User::default() })
//!     .set(&email, "john@example.com")?
//!     .set(&age, 42)?
//!     .execute()
//!     .await?;
//!
//! let users = db
//!     .select(User::default())
//!     .r#where(Argument::of(email.clone()).ends_with("@example.com"))
//!     .fetch()
//!     .await?;
//! assert_eq!(users.len(), 1);
//! # Ok::<(), QueryError>(())
//! # }).unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Expressions, statements and dialects.
pub mod query {
    pub use strata_query::*;
}

// Re-export macros
pub use strata_query::{impl_entity, query_error, strata_debug, strata_trace};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use strata_query::prelude::*;
}

// Re-export key types at the crate root
pub use strata_query::{
    Argument, DatabaseType, Dialect, DialectConfig, Entity, Expression, ExpressionFormatter,
    InlineFormatter, MemoryDialect, Pagination, Path, PropertyPath, PropertyResolver, QueryError,
    QueryResult, SqlDialect, SqlEngine, SqlFormatter, Statement, Value,
};
