//! SQL rendering of statements.
//!
//! ```rust
//! use strata_query::prelude::*;
//!
//! #[derive(Debug, Clone, Default)]
//! struct User { name: String, age: i64 }
//! impl_entity!(User, "users" { name, age });
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! let statement = MemoryDialect::new()
//!     .select(User::default())
//!     .r#where(age.geq(18))
//!     .order_by(OrderByField::desc("age"))
//!     .take(10);
//!
//! let (sql, params) = statement.to_sql(&DialectConfig::postgres());
//! assert_eq!(sql, "SELECT * FROM users WHERE age >= $1 ORDER BY age DESC LIMIT 10");
//! assert_eq!(params, vec![Value::Int(18)]);
//! ```

use tracing::{trace, warn};

use super::{Assignment, Kind, Modify, Select, Statement, StatementKind};
use crate::config::DialectConfig;
use crate::entity::Entity;
use crate::sql::SqlFormatter;
use crate::value::Value;

impl<E: Entity, D, K: Kind> Statement<E, D, K> {
    /// Render the statement for the database `config` describes.
    pub fn to_sql(&self, config: &DialectConfig) -> (String, Vec<Value>) {
        let mut formatter = config.formatter();
        match K::KIND {
            StatementKind::Select => self.write_select(&mut formatter),
            StatementKind::Insert => self.write_insert(&mut formatter),
            StatementKind::Update => self.write_update(&mut formatter),
            StatementKind::Delete => self.write_delete(&mut formatter),
        }
        finish(formatter)
    }

    fn write_select(&self, f: &mut SqlFormatter) {
        f.push("SELECT * FROM ").push_identifier(self.table());
        self.write_where(f);
        self.write_group_by(f);

        if !self.order_by.is_empty() {
            f.push(" ORDER BY ");
            for (i, field) in self.order_by.iter().enumerate() {
                if i > 0 {
                    f.push(", ");
                }
                field.write_sql(f);
            }
        }

        if let Some(pagination) = self.pagination.filter(|p| !p.is_empty()) {
            let clause = pagination.to_sql_for(f.db_type());
            f.push(" ").push(&clause);
        }
    }

    fn write_insert(&self, f: &mut SqlFormatter) {
        f.push("INSERT INTO ").push_identifier(self.table()).push(" (");
        for (i, path) in self.assignments.keys().enumerate() {
            if i > 0 {
                f.push(", ");
            }
            f.push_identifier(path);
        }
        f.push(") VALUES (");
        for (i, assignment) in self.assignments.values().enumerate() {
            if i > 0 {
                f.push(", ");
            }
            // The inserted row starts as the prototype, so paths read from it.
            // `execute` rejects assignments the prototype cannot resolve.
            match assignment.resolve(&self.prototype) {
                Ok(value) => {
                    f.push_param(value);
                }
                Err(error) => {
                    warn!(
                        table = %self.table(),
                        error = %error,
                        "Insert value not resolvable from prototype"
                    );
                    write_assignment(f, assignment);
                }
            }
        }
        f.push(")");
    }

    fn write_update(&self, f: &mut SqlFormatter) {
        f.push("UPDATE ").push_identifier(self.table()).push(" SET ");
        for (i, (path, assignment)) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.push(", ");
            }
            f.push_identifier(path).push(" = ");
            write_assignment(f, assignment);
        }
        self.write_limited_where(f);
    }

    fn write_delete(&self, f: &mut SqlFormatter) {
        f.push("DELETE FROM ").push_identifier(self.table());
        self.write_limited_where(f);
    }

    fn write_where(&self, f: &mut SqlFormatter) {
        if !self.filter.is_true() {
            f.push(" WHERE ");
            self.filter.format(f, false);
        }
    }

    fn write_group_by(&self, f: &mut SqlFormatter) {
        if !self.group_by.is_empty() {
            f.push(" GROUP BY ");
            for (i, path) in self.group_by.iter().enumerate() {
                if i > 0 {
                    f.push(", ");
                }
                f.push_identifier(path);
            }
        }
    }

    /// WHERE plus the row cap of Update and Delete.
    ///
    /// PostgreSQL has no `LIMIT` on these statements, so the cap moves into a
    /// `ctid` subquery there.
    fn write_limited_where(&self, f: &mut SqlFormatter) {
        let Some(limit) = self.pagination.and_then(|p| p.limit()) else {
            self.write_where(f);
            return;
        };

        if f.db_type().supports_modify_limit() {
            self.write_where(f);
            f.push(&format!(" LIMIT {}", limit));
        } else {
            f.push(" WHERE ctid IN (SELECT ctid FROM ").push_identifier(self.table());
            self.write_where(f);
            f.push(&format!(" LIMIT {})", limit));
        }
    }
}

impl<E: Entity, D> Statement<E, D, Select> {
    /// Render the `COUNT(*)` form of this query. Ordering and paging are
    /// dropped; grouping counts groups.
    pub fn to_count_sql(&self, config: &DialectConfig) -> (String, Vec<Value>) {
        let mut f = config.formatter();
        if self.group_by.is_empty() {
            f.push("SELECT COUNT(*) FROM ").push_identifier(self.table());
            self.write_where(&mut f);
        } else {
            f.push("SELECT COUNT(*) FROM (SELECT 1 FROM ").push_identifier(self.table());
            self.write_where(&mut f);
            self.write_group_by(&mut f);
            f.push(") AS grouped");
        }
        finish(f)
    }
}

impl<E: Entity, D, K: Modify> Statement<E, D, K> {
    /// Render the statement with `RETURNING *` appended.
    pub fn to_returning_sql(&self, config: &DialectConfig) -> (String, Vec<Value>) {
        let mut f = config.formatter();
        match K::KIND {
            StatementKind::Insert => self.write_insert(&mut f),
            StatementKind::Update => self.write_update(&mut f),
            _ => self.write_delete(&mut f),
        }
        f.push(" RETURNING *");
        finish(f)
    }
}

fn write_assignment(f: &mut SqlFormatter, assignment: &Assignment) {
    match assignment {
        Assignment::Value(value) => {
            f.push_param(value.clone());
        }
        Assignment::Path(path) => {
            f.push_identifier(path);
        }
        Assignment::Expression(expression) => {
            f.push("(");
            expression.format(f, false);
            f.push(")");
        }
    }
}

fn finish(formatter: SqlFormatter) -> (String, Vec<Value>) {
    let (sql, params) = formatter.build();
    trace!(sql = %sql, params = params.len(), "Rendered statement");
    (sql, params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::config::DialectConfig;
    use crate::dialect::{Dialect, MemoryDialect};
    use crate::statement::tests::{User, age, name};
    use crate::types::{NullsOrder, OrderByField};
    use crate::value::Value;

    fn db() -> MemoryDialect {
        MemoryDialect::new()
    }

    #[test]
    fn test_select_sql() {
        let (sql, params) = db().select(User::default()).to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT * FROM users");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_with_every_clause() {
        let statement = db()
            .select(User::default())
            .r#where(age().gt(18).and(name().like("J%")))
            .group_by("city")
            .order_by(OrderByField::asc("name"))
            .order_by(OrderByField::desc("age").nulls(NullsOrder::Last))
            .skip(20)
            .take(10);

        let (sql, params) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE age > $1 AND name LIKE $2 GROUP BY city \
             ORDER BY name ASC, age DESC NULLS LAST LIMIT 10 OFFSET 20"
        );
        assert_eq!(params, vec![Value::Int(18), Value::from("J%")]);
    }

    #[test]
    fn test_select_placeholders_per_database() {
        let statement = db().select(User::default()).r#where(age().between(18, 65));

        let (sql, _) = statement.to_sql(&DialectConfig::mysql());
        assert_eq!(sql, "SELECT * FROM users WHERE age >= ? AND age <= ?");

        let (sql, _) = statement.to_sql(&DialectConfig::sqlite());
        assert_eq!(sql, "SELECT * FROM users WHERE age >= ?1 AND age <= ?2");
    }

    #[test]
    fn test_false_filter_is_rendered() {
        let statement = db().select(User::default()).r#where(false);
        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT * FROM users WHERE FALSE");
    }

    #[test]
    fn test_negated_conjunction_follows_config() {
        let statement = db()
            .select(User::default())
            .r#where(age().gt(18).and(age().lt(65)).negate());

        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT * FROM users WHERE NOT (age > $1 AND age < $2)");

        let config = DialectConfig::builder().resolve_negative_conjunctions(true).build();
        let (sql, _) = statement.to_sql(&config);
        assert_eq!(sql, "SELECT * FROM users WHERE age <= $1 OR age >= $2");
    }

    #[test]
    fn test_like_escape_is_inline() {
        let statement = db().select(User::default()).r#where(name().contains("50%"));
        let (sql, params) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT * FROM users WHERE name LIKE $1 ESCAPE '\\'");
        assert_eq!(params, vec![Value::from("%50\\%%")]);
    }

    #[test]
    fn test_like_escape_per_database() {
        let statement = db().select(User::default()).r#where(name().starts_with("a_b"));

        let (sql, params) = statement.to_sql(&DialectConfig::mysql());
        assert_eq!(sql, "SELECT * FROM users WHERE name LIKE ? ESCAPE '\\\\'");
        assert_eq!(params, vec![Value::from("a\\_b%")]);

        let (sql, _) = statement.to_sql(&DialectConfig::sqlite());
        assert_eq!(sql, "SELECT * FROM users WHERE name LIKE ?1 ESCAPE '\\'");
    }

    #[test]
    fn test_skip_without_take_per_database() {
        let statement = db()
            .select(User::default())
            .order_by(OrderByField::asc("id"))
            .skip(5);

        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT * FROM users ORDER BY id ASC OFFSET 5");

        let (sql, _) = statement.to_sql(&DialectConfig::mysql());
        assert_eq!(sql, "SELECT * FROM users ORDER BY id ASC LIMIT 18446744073709551615 OFFSET 5");

        let (sql, _) = statement.to_sql(&DialectConfig::sqlite());
        assert_eq!(sql, "SELECT * FROM users ORDER BY id ASC LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_count_sql() {
        let statement = db()
            .select(User::default())
            .r#where(age().gt(18))
            .order_by(OrderByField::asc("name"))
            .take(5);
        let (sql, params) = statement.to_count_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT COUNT(*) FROM users WHERE age > $1");
        assert_eq!(params.len(), 1);

        let grouped = db().select(User::default()).group_by("city");
        let (sql, _) = grouped.to_count_sql(&DialectConfig::postgres());
        assert_eq!(sql, "SELECT COUNT(*) FROM (SELECT 1 FROM users GROUP BY city) AS grouped");
    }

    #[test]
    fn test_insert_sql() {
        let statement = db()
            .insert(User::default())
            .set(&name_path(), "John")
            .unwrap()
            .set(&age_path(), 42)
            .unwrap();

        let (sql, params) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "INSERT INTO users (name, age) VALUES ($1, $2)");
        assert_eq!(params, vec![Value::from("John"), Value::Int(42)]);

        let (sql, _) = statement.to_returning_sql(&DialectConfig::postgres());
        assert_eq!(sql, "INSERT INTO users (name, age) VALUES ($1, $2) RETURNING *");
    }

    #[test]
    fn test_insert_path_reads_prototype() {
        let prototype = User {
            age: 30,
            ..User::default()
        };
        let statement = db()
            .insert(prototype)
            .set(&crate::path::PropertyPath::<i64>::new("score"), age())
            .unwrap();

        let (sql, params) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "INSERT INTO users (score) VALUES ($1)");
        assert_eq!(params, vec![Value::Int(30)]);
    }

    #[test]
    fn test_update_sql() {
        let statement = db()
            .update(User::default())
            .set(&name_path(), "Jane")
            .unwrap()
            .set(&crate::path::PropertyPath::<i64>::new("score"), age())
            .unwrap()
            .r#where(age().geq(18));

        let (sql, params) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "UPDATE users SET name = $1, score = age WHERE age >= $2");
        assert_eq!(params, vec![Value::from("Jane"), Value::Int(18)]);
    }

    #[test]
    fn test_update_expression_assignment() {
        let adult = crate::path::PropertyPath::<bool>::new("adult");
        let statement = db()
            .update(User::default())
            .set_expression(&adult, age().geq(18))
            .unwrap();

        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "UPDATE users SET adult = (age >= $1)");
    }

    #[test]
    fn test_delete_sql() {
        let statement = db().delete(User::default()).r#where(age().lt(18));
        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "DELETE FROM users WHERE age < $1");

        let (sql, _) = statement.to_returning_sql(&DialectConfig::postgres());
        assert_eq!(sql, "DELETE FROM users WHERE age < $1 RETURNING *");
    }

    #[test]
    fn test_limit_per_database() {
        let statement = db().delete(User::default()).r#where(age().lt(18)).limit(5);

        let (sql, _) = statement.to_sql(&DialectConfig::mysql());
        assert_eq!(sql, "DELETE FROM users WHERE age < ? LIMIT 5");

        let (sql, _) = statement.to_sql(&DialectConfig::postgres());
        assert_eq!(
            sql,
            "DELETE FROM users WHERE ctid IN (SELECT ctid FROM users WHERE age < $1 LIMIT 5)"
        );

        let unfiltered = db().delete(User::default()).limit(1);
        let (sql, _) = unfiltered.to_sql(&DialectConfig::postgres());
        assert_eq!(sql, "DELETE FROM users WHERE ctid IN (SELECT ctid FROM users LIMIT 1)");
    }

    #[test]
    fn test_reserved_identifiers_are_quoted() {
        let statement = db()
            .select(User::default())
            .order_by(OrderByField::asc("order"));

        let (sql, _) = statement.to_sql(&DialectConfig::mysql());
        assert_eq!(sql, "SELECT * FROM users ORDER BY `order` ASC");
    }

    fn name_path() -> crate::path::PropertyPath<String> {
        crate::path::PropertyPath::new("name")
    }

    fn age_path() -> crate::path::PropertyPath<i64> {
        crate::path::PropertyPath::new("age")
    }
}
