//! Offset/limit windows for statements.
//!
//! ```rust
//! use strata_query::Pagination;
//!
//! // Skip 10, take 20
//! let pagination = Pagination::new().skip(10).take(20);
//! assert_eq!(pagination.skip, 10);
//! assert_eq!(pagination.limit(), Some(20));
//! assert_eq!(pagination.to_sql(), "LIMIT 20 OFFSET 10");
//!
//! // A zero maximum means no maximum.
//! assert_eq!(Pagination::new().take(0).limit(), None);
//!
//! // Page-based pagination (1-indexed)
//! let page_3 = Pagination::page(3, 25).unwrap();
//! assert_eq!(page_3.skip, 50);
//! assert_eq!(page_3.limit(), Some(25));
//! ```

use std::fmt::Write;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::sql::DatabaseType;

/// A window over the result rows: an offset plus an optional maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of rows to skip.
    pub skip: u64,
    /// Maximum number of rows to return.
    pub take: Option<NonZeroU64>,
}

impl Pagination {
    /// No offset and no maximum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of rows to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    /// Set the maximum number of rows. Zero clears the maximum.
    pub fn take(mut self, take: u64) -> Self {
        self.take = NonZeroU64::new(take);
        self
    }

    /// The first `n` rows.
    pub fn first(n: u64) -> Self {
        Self::new().take(n)
    }

    /// Page `page` (1-indexed) of `page_size` rows.
    pub fn page(page: u64, page_size: u64) -> QueryResult<Self> {
        if page == 0 {
            return Err(QueryError::invalid_pagination("page numbers start at 1"));
        }
        let skip = (page - 1).checked_mul(page_size).ok_or_else(|| {
            QueryError::invalid_pagination(format!(
                "page {} of size {} overflows the row offset",
                page, page_size
            ))
        })?;
        Ok(Self::new().skip(skip).take(page_size))
    }

    /// The maximum as a plain number.
    pub fn limit(&self) -> Option<u64> {
        self.take.map(NonZeroU64::get)
    }

    /// Whether the window selects every row.
    pub fn is_empty(&self) -> bool {
        self.skip == 0 && self.take.is_none()
    }

    /// Apply the window to an in-memory row list.
    pub fn apply<T>(&self, rows: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .limit()
            .map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
        rows.into_iter().skip(skip).take(take).collect()
    }

    /// Generate the SQL LIMIT/OFFSET clause in PostgreSQL form.
    pub fn to_sql(&self) -> String {
        self.to_sql_for(DatabaseType::PostgreSQL)
    }

    /// Generate the SQL LIMIT/OFFSET clause for `db_type`.
    pub fn to_sql_for(&self, db_type: DatabaseType) -> String {
        let mut sql = String::with_capacity(32);
        self.write_sql(db_type, &mut sql);
        sql
    }

    /// Write the SQL LIMIT/OFFSET clause directly to a buffer.
    ///
    /// A zero offset is omitted. An offset with no maximum gets the
    /// database's unbounded `LIMIT` where a bare `OFFSET` is rejected.
    pub fn write_sql(&self, db_type: DatabaseType, buffer: &mut String) {
        let limit = match (self.take, db_type.unbounded_limit()) {
            (Some(take), _) => Some(take.to_string()),
            (None, Some(all)) if self.skip > 0 => Some(all.to_string()),
            _ => None,
        };
        if let Some(limit) = &limit {
            let _ = write!(buffer, "LIMIT {}", limit);
        }

        if self.skip > 0 {
            if limit.is_some() {
                buffer.push(' ');
            }
            let _ = write!(buffer, "OFFSET {}", self.skip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_pagination_sql() {
        assert_eq!(Pagination::new().to_sql(), "");
        assert_eq!(Pagination::first(10).to_sql(), "LIMIT 10");
        assert_eq!(Pagination::new().skip(5).to_sql(), "OFFSET 5");
        assert_eq!(Pagination::new().skip(5).take(10).to_sql(), "LIMIT 10 OFFSET 5");
    }

    #[test]
    fn test_offset_without_limit_per_database() {
        let window = Pagination::new().skip(5);
        assert_eq!(window.to_sql_for(DatabaseType::PostgreSQL), "OFFSET 5");
        assert_eq!(
            window.to_sql_for(DatabaseType::MySQL),
            "LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(window.to_sql_for(DatabaseType::SQLite), "LIMIT -1 OFFSET 5");

        let bounded = window.take(10);
        assert_eq!(bounded.to_sql_for(DatabaseType::SQLite), "LIMIT 10 OFFSET 5");
        assert_eq!(Pagination::new().to_sql_for(DatabaseType::MySQL), "");
    }

    #[test]
    fn test_zero_take_clears_limit() {
        let pagination = Pagination::first(10).take(0);
        assert_eq!(pagination.limit(), None);
        assert!(pagination.is_empty());
    }

    #[test]
    fn test_page() {
        let first = Pagination::page(1, 20).unwrap();
        assert_eq!(first.skip, 0);
        assert_eq!(first.limit(), Some(20));

        let err = Pagination::page(0, 20).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPagination);
        assert!(err.is_build_error());

        assert!(Pagination::page(u64::MAX, 2).is_err());
    }

    #[test]
    fn test_apply() {
        let rows: Vec<u32> = (0..10).collect();
        assert_eq!(Pagination::new().skip(2).take(3).apply(rows.clone()), vec![2, 3, 4]);
        assert_eq!(Pagination::new().skip(8).apply(rows.clone()), vec![8, 9]);
        assert_eq!(Pagination::new().skip(20).take(5).apply(rows), Vec::<u32>::new());
    }
}
