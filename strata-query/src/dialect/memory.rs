//! In-process dialect: rows live in memory and statements run directly.
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct Task { id: i64, done: bool }
//! impl_entity!(Task, "tasks" { id, done });
//!
//! # futures::executor::block_on(async {
//! let db = MemoryDialect::new();
//! db.insert_rows((1..=3).map(|id| Task { id, done: id == 2 }))?;
//!
//! let done = Argument::of(PropertyPath::<bool>::new("done"));
//! let removed = db.delete(Task::default()).r#where(done.eq(true)).execute().await?;
//! assert_eq!(removed, 1);
//! assert_eq!(db.len("tasks"), 2);
//! # Ok::<(), QueryError>(())
//! # }).unwrap();
//! ```

use std::any::Any;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::RwLock;
use tracing::debug;

use super::Dialect;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::expression::Expression;
use crate::path::PropertyResolver;
use crate::strata_debug;
use crate::statement::{Kind, Modify, Select, Statement, StatementKind};
use crate::types::{NullsOrder, OrderByField, SortOrder};
use crate::value::Value;

type Table = Box<dyn Rows>;

/// A dialect backed by in-process tables.
///
/// Each table holds the rows of one entity type, keyed by the entity's table
/// name. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryDialect {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl MemoryDialect {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `rows` as they are, bypassing statements.
    pub fn insert_rows<E: Entity>(&self, rows: impl IntoIterator<Item = E>) -> QueryResult<()> {
        let mut tables = self.tables.write();
        for row in rows {
            table_mut::<E>(&mut tables, row.table_name())?.push(row);
        }
        Ok(())
    }

    /// A snapshot of every row in `table`.
    pub fn rows<E: Entity>(&self, table: &str) -> QueryResult<Vec<E>> {
        self.read(table, |rows: &[E]| Ok(rows.to_vec()))
    }

    /// Number of rows in `table`; zero for unknown tables.
    pub fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .get(table)
            .map_or(0, |rows| rows.len())
    }

    /// Whether every table is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.read().values().all(|rows| rows.len() == 0)
    }

    /// Drop every table.
    pub fn clear(&self) {
        self.tables.write().clear();
    }

    fn read<E: Entity, T>(
        &self,
        table: &str,
        f: impl FnOnce(&[E]) -> QueryResult<T>,
    ) -> QueryResult<T> {
        let tables = self.tables.read();
        match tables.get(table) {
            Some(rows) => {
                let rows = rows
                    .as_any()
                    .downcast_ref::<Vec<E>>()
                    .ok_or_else(|| foreign_rows::<E>(table))?;
                f(rows)
            }
            None => f(&[]),
        }
    }

    fn write<E: Entity, T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Vec<E>) -> QueryResult<T>,
    ) -> QueryResult<T> {
        let mut tables = self.tables.write();
        f(table_mut::<E>(&mut tables, table)?)
    }

    fn select_rows<E: Entity>(&self, statement: &Statement<E, Self, Select>) -> QueryResult<Vec<E>> {
        let mut rows = self.read(statement.table(), |rows: &[E]| {
            matching(rows, statement.filter())
        })?;

        if !statement.grouping().is_empty() {
            rows = group(rows, statement.grouping())?;
        }
        if !statement.ordering().is_empty() {
            rows = sort(rows, statement.ordering())?;
        }
        if let Some(pagination) = statement.pagination() {
            rows = pagination.apply(rows);
        }

        debug!(table = %statement.table(), rows = rows.len(), "Memory select");
        Ok(rows)
    }

    fn count_rows<E: Entity>(&self, statement: &Statement<E, Self, Select>) -> QueryResult<u64> {
        let mut rows = self.read(statement.table(), |rows: &[E]| {
            matching(rows, statement.filter())
        })?;
        if !statement.grouping().is_empty() {
            rows = group(rows, statement.grouping())?;
        }
        Ok(rows.len() as u64)
    }

    /// Apply a modifying statement and return the affected rows.
    fn modify_rows<E: Entity, K: Modify>(
        &self,
        statement: &Statement<E, Self, K>,
    ) -> QueryResult<Vec<E>> {
        let limit = statement.pagination().and_then(|p| p.limit());
        let affected = match K::KIND {
            StatementKind::Insert => {
                let row = assign(statement.prototype().clone(), statement)?;
                self.write(statement.table(), |rows: &mut Vec<E>| {
                    rows.push(row.clone());
                    Ok(vec![row])
                })?
            }
            StatementKind::Update => self.write(statement.table(), |rows: &mut Vec<E>| {
                let targets = matching_indices(rows, statement.filter(), limit)?;
                // Every row is rebuilt before any is written back so a
                // failing assignment leaves the table untouched.
                let updated = targets
                    .iter()
                    .map(|&i| assign(rows[i].clone(), statement))
                    .collect::<QueryResult<Vec<E>>>()?;
                for (&i, row) in targets.iter().zip(&updated) {
                    rows[i] = row.clone();
                }
                Ok(updated)
            })?,
            _ => self.write(statement.table(), |rows: &mut Vec<E>| {
                let targets = matching_indices(rows, statement.filter(), limit)?;
                let mut removed = Vec::with_capacity(targets.len());
                for &i in targets.iter().rev() {
                    removed.push(rows.remove(i));
                }
                removed.reverse();
                Ok(removed)
            })?,
        };

        debug!(
            table = %statement.table(),
            kind = %K::KIND,
            affected = affected.len(),
            "Memory statement applied"
        );
        Ok(affected)
    }
}

impl fmt::Debug for MemoryDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.read();
        let mut names: Vec<&String> = tables.keys().collect();
        names.sort();
        f.debug_struct("MemoryDialect").field("tables", &names).finish()
    }
}

impl Dialect for MemoryDialect {
    fn fetch<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>> {
        future::ready(self.select_rows(statement)).boxed()
    }

    fn fetch_count<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<u64>> {
        future::ready(self.count_rows(statement)).boxed()
    }

    fn execute<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<u64>> {
        let affected = self.modify_rows(statement).map(|rows| rows.len() as u64);
        future::ready(affected).boxed()
    }

    fn execute_returning<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>> {
        future::ready(self.modify_rows(statement)).boxed()
    }
}

fn table_mut<'t, E: Entity>(
    tables: &'t mut HashMap<String, Table>,
    table: &str,
) -> QueryResult<&'t mut Vec<E>> {
    if !tables.contains_key(table) {
        strata_debug!(
            table = %table,
            row_type = std::any::type_name::<E>(),
            "Creating memory table"
        );
    }
    tables
        .entry(table.to_string())
        .or_insert_with(|| Box::new(Vec::<E>::new()) as Table)
        .as_any_mut()
        .downcast_mut::<Vec<E>>()
        .ok_or_else(|| foreign_rows::<E>(table))
}

fn foreign_rows<E>(table: &str) -> QueryError {
    QueryError::internal(format!(
        "table {} holds rows of another type than {}",
        table,
        std::any::type_name::<E>()
    ))
    .with_model(table)
}

/// A table with its row type erased.
trait Rows: Send + Sync {
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<E: Entity> Rows for Vec<E> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Rows of `rows` for which `filter` holds.
fn matching<E: Entity>(rows: &[E], filter: &Expression) -> QueryResult<Vec<E>> {
    Ok(matching_indices(rows, filter, None)?
        .into_iter()
        .map(|i| rows[i].clone())
        .collect())
}

fn matching_indices<E: Entity>(
    rows: &[E],
    filter: &Expression,
    limit: Option<u64>,
) -> QueryResult<Vec<usize>> {
    let limit = limit.map_or(usize::MAX, |n| usize::try_from(n).unwrap_or(usize::MAX));
    let mut indices = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if indices.len() >= limit {
            break;
        }
        if filter.evaluate_with(row)? {
            indices.push(i);
        }
    }
    Ok(indices)
}

/// Keep the first row of each group, in first-seen order.
fn group<E: Entity>(rows: Vec<E>, paths: &[smol_str::SmolStr]) -> QueryResult<Vec<E>> {
    let mut seen: Vec<Vec<Value>> = Vec::new();
    let mut grouped = Vec::new();
    for row in rows {
        let key = keys(&row, paths)?;
        let duplicate = seen
            .iter()
            .any(|other| other.iter().zip(&key).all(|(a, b)| a.matches(b)));
        if !duplicate {
            seen.push(key);
            grouped.push(row);
        }
    }
    Ok(grouped)
}

fn sort<E: Entity>(rows: Vec<E>, ordering: &[OrderByField]) -> QueryResult<Vec<E>> {
    let paths: Vec<_> = ordering.iter().map(|field| field.path.clone()).collect();
    let mut keyed = rows
        .into_iter()
        .map(|row| Ok((keys(&row, &paths)?, row)))
        .collect::<QueryResult<Vec<(Vec<Value>, E)>>>()?;

    keyed.sort_by(|(a, _), (b, _)| {
        ordering
            .iter()
            .zip(a.iter().zip(b))
            .map(|(field, (x, y))| compare_for_sort(field, x, y))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Nulls sort after every value unless the field says otherwise, so they come
/// last ascending and first descending.
fn compare_for_sort(field: &OrderByField, x: &Value, y: &Value) -> Ordering {
    let nulls_first = match field.nulls {
        Some(NullsOrder::First) => true,
        Some(NullsOrder::Last) => false,
        None => field.order == SortOrder::Desc,
    };
    match (x.is_null(), y.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if nulls_first => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if nulls_first => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = x.sort_cmp(y);
            match field.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        }
    }
}

fn keys<E: Entity>(row: &E, paths: &[smol_str::SmolStr]) -> QueryResult<Vec<Value>> {
    paths.iter().map(|path| row.resolve(path)).collect()
}

/// Apply the statement's assignments to `row`. Right-hand sides read the row
/// as it was before any assignment.
fn assign<E: Entity, D, K: Kind>(row: E, statement: &Statement<E, D, K>) -> QueryResult<E> {
    let values = statement
        .assignments()
        .iter()
        .map(|(path, assignment)| Ok((path, assignment.resolve(&row)?)))
        .collect::<QueryResult<Vec<_>>>()?;

    let mut row = row;
    for (path, value) in values {
        row.set_property(path, value)?;
    }
    Ok(row)
}
