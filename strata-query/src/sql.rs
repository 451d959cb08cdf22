//! SQL generation utilities.
//!
//! [`SqlFormatter`] is the dialect-aware [`ExpressionFormatter`]: literals are
//! bound as parameters with the right placeholder syntax and property paths are
//! quoted when they collide with a keyword.
//!
//! ```rust
//! use strata_query::{Argument, PropertyPath, SqlFormatter, Value};
//!
//! let age = Argument::of(PropertyPath::<i64>::new("age"));
//! let name = Argument::of(PropertyPath::<String>::new("user.name"));
//!
//! let mut formatter = SqlFormatter::postgres();
//! age.between(18, 65).and(name.like("J%n")).format(&mut formatter, false);
//!
//! let (sql, params) = formatter.build();
//! assert_eq!(sql, "age >= $1 AND age <= $2 AND \"user\".name LIKE $3");
//! assert_eq!(params, vec![Value::Int(18), Value::Int(65), Value::from("J%n")]);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};
use crate::formatter::ExpressionFormatter;
use crate::value::Value;

const RESERVED: &[&str] = &[
    "user", "order", "group", "select", "from", "where", "table", "index", "key", "primary",
    "foreign", "check", "default", "null", "not", "and", "or", "in", "is", "like", "between",
    "case", "when", "then", "else", "end", "as", "on", "join", "left", "right", "inner", "outer",
    "cross", "natural", "using", "limit", "offset", "union", "intersect", "except", "all",
    "distinct", "having", "create", "alter", "drop", "insert", "update", "delete", "into",
    "values", "set", "returning", "escape", "empty",
];

/// Target database, which decides placeholder and quoting syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// PostgreSQL uses $1, $2, etc.
    #[default]
    #[serde(alias = "postgres")]
    PostgreSQL,
    /// MySQL uses ?, ?, etc.
    MySQL,
    /// SQLite uses ?1, ?2, etc.
    SQLite,
}

impl DatabaseType {
    /// Get the parameter placeholder for this database type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::PostgreSQL => format!("${}", index),
            Self::MySQL => "?".to_string(),
            Self::SQLite => format!("?{}", index),
        }
    }

    /// Character used to quote identifiers.
    pub fn quote_char(&self) -> char {
        match self {
            Self::MySQL => '`',
            Self::PostgreSQL | Self::SQLite => '"',
        }
    }

    /// Whether `UPDATE`/`DELETE` accept a trailing `LIMIT`.
    pub fn supports_modify_limit(&self) -> bool {
        !matches!(self, Self::PostgreSQL)
    }

    /// Whether a backslash escapes the next character inside string literals
    /// (MySQL's default `sql_mode`).
    pub fn backslash_escapes(&self) -> bool {
        matches!(self, Self::MySQL)
    }

    /// `LIMIT` value meaning "every row", for an `OFFSET` without a maximum.
    ///
    /// PostgreSQL accepts a bare `OFFSET`; MySQL and SQLite need a `LIMIT`.
    pub fn unbounded_limit(&self) -> Option<&'static str> {
        match self {
            Self::PostgreSQL => None,
            Self::MySQL => Some("18446744073709551615"),
            Self::SQLite => Some("-1"),
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "postgresql",
            Self::MySQL => "mysql",
            Self::SQLite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatabaseType {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::PostgreSQL),
            "mysql" | "mariadb" => Ok(Self::MySQL),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            other => Err(QueryError::invalid_configuration(
                "database",
                format!("unknown database type '{}'", other),
            )
            .with_suggestion("Use one of: postgres, mysql, sqlite")),
        }
    }
}

/// Check if an identifier segment needs quoting.
pub fn needs_quoting(name: &str) -> bool {
    // Reserved keywords or names with special characters need quoting
    if RESERVED.contains(&name.to_lowercase().as_str()) {
        return true;
    }
    name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Quote an identifier segment unconditionally, doubling embedded quotes.
pub fn escape_identifier(name: &str, db_type: DatabaseType) -> String {
    let quote = db_type.quote_char();
    let mut escaped = String::with_capacity(name.len() + 2);
    escaped.push(quote);
    for c in name.chars() {
        if c == quote {
            escaped.push(quote);
        }
        escaped.push(c);
    }
    escaped.push(quote);
    escaped
}

/// Quote a dotted identifier, segment by segment, where needed.
pub fn quote_identifier(name: &str, db_type: DatabaseType) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, segment) in name.split('.').enumerate() {
        if i > 0 {
            out.push('.');
        }
        if needs_quoting(segment) {
            out.push_str(&escape_identifier(segment, db_type));
        } else {
            out.push_str(segment);
        }
    }
    out
}

/// Renders SQL text with bound parameters.
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    db_type: DatabaseType,
    quote_identifiers: bool,
    resolve_negative_conjunctions: bool,
    sql: String,
    params: Vec<Value>,
}

impl SqlFormatter {
    /// Create a formatter for `db_type`.
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            quote_identifiers: true,
            resolve_negative_conjunctions: false,
            sql: String::with_capacity(128),
            params: Vec::new(),
        }
    }

    /// Create a PostgreSQL formatter.
    pub fn postgres() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }

    /// Create a MySQL formatter.
    pub fn mysql() -> Self {
        Self::new(DatabaseType::MySQL)
    }

    /// Create a SQLite formatter.
    pub fn sqlite() -> Self {
        Self::new(DatabaseType::SQLite)
    }

    /// Whether identifiers that need it are quoted.
    pub fn with_quoting(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    /// Set the negated-conjunction policy.
    pub fn with_negation_resolution(mut self, resolve: bool) -> Self {
        self.resolve_negative_conjunctions = resolve;
        self
    }

    /// The target database.
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Push a literal SQL string.
    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    /// Push a placeholder and bind `value` to it.
    pub fn push_param(&mut self, value: Value) -> &mut Self {
        self.params.push(value);
        let placeholder = self.db_type.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
        self
    }

    /// Push an identifier, quoted if needed.
    pub fn push_identifier(&mut self, name: &str) -> &mut Self {
        if self.quote_identifiers {
            let quoted = quote_identifier(name, self.db_type);
            self.sql.push_str(&quoted);
        } else {
            self.sql.push_str(name);
        }
        self
    }

    /// The SQL rendered so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The parameters bound so far.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Get the next parameter index.
    pub fn next_param_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Consume the formatter, returning the SQL and its parameters.
    pub fn build(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl Default for SqlFormatter {
    fn default() -> Self {
        Self::postgres()
    }
}

impl ExpressionFormatter for SqlFormatter {
    fn buffer(&mut self) -> &mut String {
        &mut self.sql
    }

    fn resolve_negative_conjunctions(&self) -> bool {
        self.resolve_negative_conjunctions
    }

    fn write_path(&mut self, path: &str) {
        self.push_identifier(path);
    }

    fn write_value(&mut self, value: &Value) {
        self.push_param(value.clone());
    }

    fn write_like_escape(&mut self, escape: char) {
        self.sql.push_str(" ESCAPE '");
        match escape {
            '\'' => self.sql.push_str("''"),
            '\\' if self.db_type.backslash_escapes() => self.sql.push_str("\\\\"),
            c => self.sql.push(c),
        }
        self.sql.push('\'');
    }
}
