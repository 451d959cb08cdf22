//! Dialects: the pluggable backends statements execute against.
//!
//! A [`Dialect`] receives a fully built statement and decides how to run it.
//! Two implementations ship with the crate:
//!
//! - [`SqlDialect`] renders the statement to parameterized SQL and hands it to
//!   an [`SqlEngine`] (the database driver).
//! - [`MemoryDialect`] keeps rows in process and evaluates statements
//!   directly.
//!
//! Statements are started from a dialect:
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { id: i64 }
//! impl_entity!(User, "users" { id });
//!
//! let db = MemoryDialect::new();
//! let statement = db.delete(User::default());
//! assert_eq!(statement.table(), "users");
//! ```

mod memory;
mod sql;

pub use memory::MemoryDialect;
pub use sql::{SqlDialect, SqlEngine, SqlRequest};

use futures::future::BoxFuture;

use crate::entity::Entity;
use crate::error::QueryResult;
use crate::statement::{Delete, Insert, Modify, Select, Statement, Update};

/// A backend that executes statements.
///
/// Terminal operations on [`Statement`] delegate here after their own
/// checks, so implementations receive statements that are ready to run.
pub trait Dialect: Clone + Send + Sync + 'static {
    /// Rows matching a select.
    fn fetch<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>>;

    /// Number of rows (or groups) matching a select, ignoring paging.
    fn fetch_count<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<u64>>;

    /// Run a modifying statement and return the affected row count.
    fn execute<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<u64>>;

    /// Run a modifying statement and return the affected rows.
    fn execute_returning<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>>;

    /// Start a select over `prototype`'s table.
    fn select<E: Entity>(&self, prototype: E) -> Statement<E, Self, Select> {
        Statement::select(prototype, self.clone())
    }

    /// Start an insert of a row built from `prototype`.
    fn insert<E: Entity>(&self, prototype: E) -> Statement<E, Self, Insert> {
        Statement::insert(prototype, self.clone())
    }

    /// Start an update of `prototype`'s table.
    fn update<E: Entity>(&self, prototype: E) -> Statement<E, Self, Update> {
        Statement::update(prototype, self.clone())
    }

    /// Start a delete from `prototype`'s table.
    fn delete<E: Entity>(&self, prototype: E) -> Statement<E, Self, Delete> {
        Statement::delete(prototype, self.clone())
    }
}
