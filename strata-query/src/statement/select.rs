//! Terminal operations of `SELECT` statements.

use tracing::debug;

use super::{Select, Statement};
use crate::dialect::Dialect;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::pagination::Pagination;

impl<E: Entity, D: Dialect> Statement<E, D, Select> {
    /// Run the query and return every matching row.
    pub async fn fetch(self) -> QueryResult<Vec<E>> {
        debug!(table = %self.table(), "Fetching rows");
        let rows = self.dialect.fetch(&self).await?;
        debug!(table = %self.table(), count = rows.len(), "Rows fetched");
        Ok(rows)
    }

    /// Run the query and return the first row, if any.
    pub async fn fetch_first(mut self) -> QueryResult<Option<E>> {
        self.pagination = Some(self.pagination.unwrap_or_default().take(1));
        Ok(self.fetch().await?.into_iter().next())
    }

    /// Run the query and return its single row.
    ///
    /// Fails with `RecordNotFound` when nothing matches and `NotUnique` when
    /// more than one row does. A skip still applies; any `take` is replaced,
    /// since up to two rows are needed to detect a duplicate.
    pub async fn fetch_one(mut self) -> QueryResult<E> {
        let table = self.table().to_string();
        let skip = self.pagination.map_or(0, |window| window.skip);
        self.pagination = Some(Pagination::first(2).skip(skip));

        let mut rows = self.fetch().await?;
        match rows.len() {
            0 => Err(QueryError::not_found(&table)),
            1 => Ok(rows.remove(0)),
            _ => Err(QueryError::not_unique(&table)),
        }
    }

    /// Count the matching rows. Paging does not apply to the count.
    pub async fn fetch_count(self) -> QueryResult<u64> {
        debug!(table = %self.table(), "Counting rows");
        self.dialect.fetch_count(&self).await
    }
}
