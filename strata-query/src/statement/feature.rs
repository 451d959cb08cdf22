//! Feature markers and the clause methods they unlock.
//!
//! Each feature is a marker trait implemented by exactly the statement kinds
//! that support it. The clause methods live in impl blocks bounded by the
//! marker, so using a feature on the wrong kind is a compile error:
//!
//! ```compile_fail
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { age: i64 }
//! impl_entity!(User, "users" { age });
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! // Insert has no Where feature.
//! let _ = MemoryDialect::new().insert(User::default()).r#where(age.gt(18));
//! ```
//!
//! ```compile_fail
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { age: i64 }
//! impl_entity!(User, "users" { age });
//!
//! // Delete has no Set feature.
//! let age = PropertyPath::<i64>::new("age");
//! let _ = MemoryDialect::new().delete(User::default()).set(&age, 1);
//! ```
//!
//! ```compile_fail
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { age: i64 }
//! impl_entity!(User, "users" { age });
//!
//! // Select pages with skip/take; limit belongs to Update and Delete.
//! let _ = MemoryDialect::new().select(User::default()).limit(10);
//! ```
//!
//! Every Select feature combines:
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { age: i64, city: String }
//! impl_entity!(User, "users" { age, city });
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! let statement = MemoryDialect::new()
//!     .select(User::default())
//!     .r#where(age.gt(18))
//!     .order_by(OrderByField::desc("age"))
//!     .group_by("city")
//!     .join_fetch("address")
//!     .skip(10)
//!     .take(5);
//!
//! assert_eq!(statement.filter(), &age.gt(18));
//! assert_eq!(statement.ordering(), &[OrderByField::desc("age")]);
//! assert_eq!(statement.grouping(), &["city"]);
//! assert_eq!(statement.fetches(), &[FetchSpec::inner("address")]);
//! assert_eq!(statement.pagination().and_then(|p| p.limit()), Some(5));
//! ```

use smol_str::SmolStr;
use tracing::warn;

use super::{Assignment, Delete, Insert, Kind, Select, Statement, Update};
use crate::argument::Argument;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::expression::Expression;
use crate::pagination::Pagination;
use crate::path::Path;
use crate::types::{FetchSpec, OrderByField};
use crate::value::SqlType;

/// Statements that filter rows.
pub trait Where: Kind {}
/// Statements that order their result.
pub trait OrderBy: Kind {}
/// Statements that group their result.
pub trait GroupBy: Kind {}
/// Statements that load relations eagerly.
pub trait Fetch: Kind {}
/// Statements that page through their result.
pub trait Paging: Kind {}
/// Statements that cap the number of rows they touch.
pub trait Limit: Kind {}
/// Statements that change rows and report how many.
pub trait Modify: Kind {}
/// Statements that assign property values.
pub trait Set: Kind {}

impl Where for Select {}
impl OrderBy for Select {}
impl GroupBy for Select {}
impl Fetch for Select {}
impl Paging for Select {}

impl Modify for Insert {}
impl Set for Insert {}

impl Where for Update {}
impl Limit for Update {}
impl Modify for Update {}
impl Set for Update {}

impl Where for Delete {}
impl Limit for Delete {}
impl Modify for Delete {}

impl<E: Entity, D, K: Where> Statement<E, D, K> {
    /// Add a filter. Repeated calls are combined with `AND`.
    pub fn r#where(mut self, expression: impl Into<Expression>) -> Self {
        let filter = std::mem::take(&mut self.filter);
        self.filter = filter.and(expression);
        self
    }
}

impl<E: Entity, D, K: OrderBy> Statement<E, D, K> {
    /// Append an ordering; earlier orderings take priority.
    pub fn order_by(mut self, field: OrderByField) -> Self {
        self.order_by.push(field);
        self
    }

    /// Append an ascending ordering on `path`.
    pub fn order_by_asc(self, path: impl AsRef<str>) -> Self {
        self.order_by(OrderByField::asc(path))
    }

    /// Append a descending ordering on `path`.
    pub fn order_by_desc(self, path: impl AsRef<str>) -> Self {
        self.order_by(OrderByField::desc(path))
    }
}

impl<E: Entity, D, K: GroupBy> Statement<E, D, K> {
    /// Append a grouping path. A path already grouped on is ignored.
    pub fn group_by(mut self, path: impl AsRef<str>) -> Self {
        let path = SmolStr::new(path);
        if !self.group_by.contains(&path) {
            self.group_by.push(path);
        }
        self
    }
}

impl<E: Entity, D, K: Fetch> Statement<E, D, K> {
    /// Load the relation at `path` with an inner join.
    pub fn join_fetch(mut self, path: impl AsRef<str>) -> Self {
        self.fetches.push(FetchSpec::inner(path));
        self
    }

    /// Load the relation at `path` with a left join.
    pub fn left_join_fetch(mut self, path: impl AsRef<str>) -> Self {
        self.fetches.push(FetchSpec::left(path));
        self
    }
}

impl<E: Entity, D, K: Paging> Statement<E, D, K> {
    /// Skip `n` rows.
    pub fn skip(mut self, n: u64) -> Self {
        self.pagination = Some(self.pagination.unwrap_or_default().skip(n));
        self
    }

    /// Return at most `n` rows. Zero removes the maximum.
    pub fn take(mut self, n: u64) -> Self {
        self.pagination = Some(self.pagination.unwrap_or_default().take(n));
        self
    }

    /// Set the whole window at once.
    pub fn paging(mut self, offset: u64, max: u64) -> Self {
        self.pagination = Some(Pagination::new().skip(offset).take(max));
        self
    }

    /// Select page `page` (1-indexed) of `page_size` rows.
    pub fn page(mut self, page: u64, page_size: u64) -> QueryResult<Self> {
        self.pagination = Some(Pagination::page(page, page_size)?);
        Ok(self)
    }
}

impl<E: Entity, D, K: Limit> Statement<E, D, K> {
    /// Touch at most `max` rows, starting from the first. Zero removes the cap.
    pub fn limit(mut self, max: u64) -> Self {
        self.pagination = Some(Pagination::first(max));
        self
    }
}

impl<E: Entity, D, K: Set> Statement<E, D, K> {
    /// Assign `value` to `path`.
    ///
    /// The value may be a literal or another path. Each path can be assigned
    /// once per statement; a second assignment fails with
    /// `DuplicateAssignment`.
    pub fn set<V, P>(self, path: &P, value: impl Into<Argument<V>>) -> QueryResult<Self>
    where
        V: SqlType,
        P: Path<V> + ?Sized,
    {
        let assignment = Assignment::from_argument(&value.into());
        self.assign(path.name(), assignment)
    }

    /// Assign the truth value of `expression` to `path`.
    pub fn set_expression<P>(self, path: &P, expression: impl Into<Expression>) -> QueryResult<Self>
    where
        P: Path<bool> + ?Sized,
    {
        self.assign(path.name(), Assignment::Expression(expression.into()))
    }

    fn assign(mut self, path: &str, assignment: Assignment) -> QueryResult<Self> {
        if self.assignments.contains_key(path) {
            warn!(table = %self.table(), field = %path, "Duplicate assignment");
            return Err(QueryError::duplicate_assignment(self.table(), path)
                .with_context(format!("{} {}", K::KIND, self.table())));
        }
        self.assignments.insert(SmolStr::new(path), assignment);
        Ok(self)
    }
}
