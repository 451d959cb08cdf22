//! Statement builders.
//!
//! A [`Statement`] is bound to one entity prototype and one dialect, and has a
//! fixed kind: [`Select`], [`Insert`], [`Update`] or [`Delete`]. Clauses are
//! attached through feature methods, and each feature is available only on
//! the kinds that declare it:
//!
//! | Kind   | Where | OrderBy | GroupBy | Fetch | Paging | Limit | Modify | Set |
//! |--------|-------|---------|---------|-------|--------|-------|--------|-----|
//! | Select | ✓     | ✓       | ✓       | ✓     | ✓      |       |        |     |
//! | Insert |       |         |         |       |        |       | ✓      | ✓   |
//! | Update | ✓     |         |         |       |        | ✓     | ✓      | ✓   |
//! | Delete | ✓     |         |         |       |        | ✓     | ✓      |     |
//!
//! Calling a feature method on a kind without it does not compile. Terminal
//! operations (`fetch*`, `execute*`) consume the statement.
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl_entity!(User, "users" { name, age });
//!
//! # futures::executor::block_on(async {
//! let db = MemoryDialect::new();
//! let name = PropertyPath::<String>::new("name");
//! let age = PropertyPath::<i64>::new("age");
//!
//! db.insert(User::default())
//!     .set(&name, "John")?
//!     .set(&age, 42)?
//!     .execute()
//!     .await?;
//!
//! let adults = db
//!     .select(User::default())
//!     .r#where(Argument::of(age.clone()).geq(18))
//!     .order_by(OrderByField::asc(&name))
//!     .fetch()
//!     .await?;
//! assert_eq!(adults.len(), 1);
//! assert_eq!(adults[0].name, "John");
//! # Ok::<(), QueryError>(())
//! # }).unwrap();
//! ```

mod feature;
mod modify;
mod render;
mod select;

pub use feature::{Fetch, GroupBy, Limit, Modify, OrderBy, Paging, Set, Where};
pub use modify::Assignment;

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;
use smallvec::SmallVec;
use smol_str::SmolStr;
use tracing::debug;

use crate::entity::Entity;
use crate::expression::Expression;
use crate::pagination::Pagination;
use crate::types::{FetchSpec, OrderByField};

/// The four statement kinds, as a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Reads rows.
    Select,
    /// Adds a row.
    Insert,
    /// Changes rows.
    Update,
    /// Removes rows.
    Delete,
}

impl StatementKind {
    /// SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Select {}
    impl Sealed for super::Insert {}
    impl Sealed for super::Update {}
    impl Sealed for super::Delete {}
}

/// Type-level statement kind.
pub trait Kind: sealed::Sealed + Send + Sync + 'static {
    /// The runtime kind.
    const KIND: StatementKind;
}

/// `SELECT` statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Select;

/// `INSERT` statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insert;

/// `UPDATE` statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update;

/// `DELETE` statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delete;

impl Kind for Select {
    const KIND: StatementKind = StatementKind::Select;
}

impl Kind for Insert {
    const KIND: StatementKind = StatementKind::Insert;
}

impl Kind for Update {
    const KIND: StatementKind = StatementKind::Update;
}

impl Kind for Delete {
    const KIND: StatementKind = StatementKind::Delete;
}

/// A statement under construction.
///
/// Built fluently by value; consumed by exactly one terminal operation.
pub struct Statement<E, D, K> {
    prototype: E,
    dialect: D,
    filter: Expression,
    order_by: Vec<OrderByField>,
    group_by: SmallVec<[SmolStr; 4]>,
    fetches: Vec<FetchSpec>,
    pagination: Option<Pagination>,
    assignments: IndexMap<SmolStr, Assignment>,
    _kind: PhantomData<K>,
}

impl<E: Entity, D, K: Kind> Statement<E, D, K> {
    fn new(prototype: E, dialect: D) -> Self {
        debug!(table = %prototype.table_name(), kind = %K::KIND, "Building statement");
        Self {
            prototype,
            dialect,
            filter: Expression::TRUE,
            order_by: Vec::new(),
            group_by: SmallVec::new(),
            fetches: Vec::new(),
            pagination: None,
            assignments: IndexMap::new(),
            _kind: PhantomData,
        }
    }

    /// The statement kind.
    pub fn kind(&self) -> StatementKind {
        K::KIND
    }

    /// The table named by the prototype.
    pub fn table(&self) -> &str {
        self.prototype.table_name()
    }

    /// The entity prototype.
    pub fn prototype(&self) -> &E {
        &self.prototype
    }

    /// The dialect executing this statement.
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// The accumulated filter; `TRUE` when no `where` was attached.
    pub fn filter(&self) -> &Expression {
        &self.filter
    }

    /// Ordering, in priority order.
    pub fn ordering(&self) -> &[OrderByField] {
        &self.order_by
    }

    /// Grouping paths, in order.
    pub fn grouping(&self) -> &[SmolStr] {
        &self.group_by
    }

    /// Relations to load eagerly.
    pub fn fetches(&self) -> &[FetchSpec] {
        &self.fetches
    }

    /// The paging or limit window, if one was set.
    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Assignments, in the order they were made.
    pub fn assignments(&self) -> &IndexMap<SmolStr, Assignment> {
        &self.assignments
    }
}

impl<E: Entity, D> Statement<E, D, Select> {
    /// Start a `SELECT` over the prototype's table.
    pub fn select(prototype: E, dialect: D) -> Self {
        Self::new(prototype, dialect)
    }
}

impl<E: Entity, D> Statement<E, D, Insert> {
    /// Start an `INSERT` of a row built from the prototype.
    pub fn insert(prototype: E, dialect: D) -> Self {
        Self::new(prototype, dialect)
    }
}

impl<E: Entity, D> Statement<E, D, Update> {
    /// Start an `UPDATE` of the prototype's table.
    pub fn update(prototype: E, dialect: D) -> Self {
        Self::new(prototype, dialect)
    }
}

impl<E: Entity, D> Statement<E, D, Delete> {
    /// Start a `DELETE` from the prototype's table.
    pub fn delete(prototype: E, dialect: D) -> Self {
        Self::new(prototype, dialect)
    }
}

impl<E: Entity, D, K: Kind> fmt::Debug for Statement<E, D, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("kind", &K::KIND)
            .field("table", &self.table())
            .field("filter", &self.filter)
            .field("order_by", &self.order_by)
            .field("group_by", &self.group_by)
            .field("fetches", &self.fetches)
            .field("pagination", &self.pagination)
            .field("assignments", &self.assignments)
            .finish()
    }
}
