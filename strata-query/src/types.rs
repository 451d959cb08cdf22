//! Clause types shared by statements and dialects.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

use crate::sql::SqlFormatter;

/// Sort order for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Ascending order (A-Z, 0-9, oldest first).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first).
    Desc,
}

impl SortOrder {
    /// Get the SQL keyword for this sort order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// Null handling in sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullsOrder {
    /// Nulls appear first in the results.
    First,
    /// Nulls appear last in the results.
    Last,
}

impl NullsOrder {
    /// Get the SQL clause for this null order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// Order by specification for a single property path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByField {
    /// The property path to order by.
    pub path: SmolStr,
    /// The sort order.
    pub order: SortOrder,
    /// Null handling (optional). Without it nulls compare as larger than any
    /// value in memory and follow the database default in SQL.
    pub nulls: Option<NullsOrder>,
}

impl OrderByField {
    /// Create a new order by field.
    pub fn new(path: impl AsRef<str>, order: SortOrder) -> Self {
        Self {
            path: SmolStr::new(path),
            order,
            nulls: None,
        }
    }

    /// Set null handling.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Create an ascending order.
    pub fn asc(path: impl AsRef<str>) -> Self {
        Self::new(path, SortOrder::Asc)
    }

    /// Create a descending order.
    pub fn desc(path: impl AsRef<str>) -> Self {
        Self::new(path, SortOrder::Desc)
    }

    /// Write the SQL for this field through `formatter`.
    ///
    /// ```rust
    /// use strata_query::{OrderByField, NullsOrder, SqlFormatter};
    ///
    /// let mut formatter = SqlFormatter::postgres();
    /// OrderByField::desc("created_at").nulls(NullsOrder::Last).write_sql(&mut formatter);
    /// assert_eq!(formatter.sql(), "created_at DESC NULLS LAST");
    /// ```
    pub fn write_sql(&self, formatter: &mut SqlFormatter) {
        formatter.push_identifier(&self.path);
        formatter.push(" ");
        formatter.push(self.order.as_sql());
        if let Some(nulls) = self.nulls {
            formatter.push(" ");
            formatter.push(nulls.as_sql());
        }
    }
}

/// How a fetched relation is joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FetchMode {
    /// Only rows with a related row are kept.
    #[default]
    Inner,
    /// Rows without a related row are kept with the relation empty.
    Left,
}

impl FetchMode {
    /// Get the SQL join keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

/// A relation to load eagerly together with the selected rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchSpec {
    /// Property path of the relation.
    pub path: SmolStr,
    /// Join mode.
    pub mode: FetchMode,
}

impl FetchSpec {
    /// Create a fetch spec.
    pub fn new(path: impl AsRef<str>, mode: FetchMode) -> Self {
        Self {
            path: SmolStr::new(path),
            mode,
        }
    }

    /// Fetch through an inner join.
    pub fn inner(path: impl AsRef<str>) -> Self {
        Self::new(path, FetchMode::Inner)
    }

    /// Fetch through a left join.
    pub fn left(path: impl AsRef<str>) -> Self {
        Self::new(path, FetchMode::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::Asc.as_sql(), "ASC");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
        assert_eq!(SortOrder::default(), SortOrder::Asc);
    }

    #[test]
    fn test_order_by_field_sql() {
        let mut formatter = SqlFormatter::postgres();
        OrderByField::asc("order").write_sql(&mut formatter);
        assert_eq!(formatter.sql(), "\"order\" ASC");
    }

    #[test]
    fn test_fetch_spec() {
        let spec = FetchSpec::left("author");
        assert_eq!(spec.path, "author");
        assert_eq!(spec.mode.as_sql(), "LEFT JOIN");
        assert_eq!(FetchSpec::inner("tags").mode, FetchMode::Inner);
    }
}
