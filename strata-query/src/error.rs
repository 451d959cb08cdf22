//! Error types for building, evaluating and executing statements.
//!
//! Errors carry an [`ErrorCode`] for programmatic handling plus an
//! [`ErrorContext`] with the model, field, SQL and suggestions involved.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Query and evaluation errors (not found, unresolved path, ...)
//! - 2xxx: Build-time misuse (duplicate assignment, invalid pagination)
//! - 5xxx: Execution errors reported by a dialect
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use strata_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::not_found("User");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! assert!(err.to_string().contains("User"));
//!
//! let err = QueryError::duplicate_assignment("users", "email");
//! assert!(err.is_build_error());
//! ```

use std::fmt::{self, Write};
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Query errors (1xxx)
    /// Record not found (S1001).
    RecordNotFound = 1001,
    /// Multiple records found when expecting one (S1002).
    NotUnique = 1002,
    /// Invalid filter expression (S1003).
    InvalidFilter = 1003,
    /// A property path could not be resolved (S1004).
    UnresolvedPath = 1004,
    /// A value had the wrong shape for the property (S1005).
    TypeMismatch = 1005,

    // Build errors (2xxx)
    /// The same path was assigned twice in one statement (S2001).
    DuplicateAssignment = 2001,
    /// An insert or update statement has nothing to assign (S2002).
    EmptyAssignment = 2002,
    /// Invalid paging or limit window (S2003).
    InvalidPagination = 2003,

    // Execution errors (5xxx)
    /// Query timeout (S5001).
    QueryTimeout = 5001,
    /// SQL syntax error (S5002).
    SqlSyntax = 5002,
    /// General database error (S5005).
    DatabaseError = 5005,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "Record not found",
            Self::NotUnique => "Multiple records found",
            Self::InvalidFilter => "Invalid filter expression",
            Self::UnresolvedPath => "Unresolved property path",
            Self::TypeMismatch => "Type mismatch",
            Self::DuplicateAssignment => "Duplicate assignment",
            Self::EmptyAssignment => "Nothing to assign",
            Self::InvalidPagination => "Invalid pagination",
            Self::QueryTimeout => "Query timeout",
            Self::SqlSyntax => "SQL syntax error",
            Self::DatabaseError => "Database error",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The model (table) involved.
    pub model: Option<String>,
    /// The field (property path) involved.
    pub field: Option<String>,
    /// The SQL query (if available).
    pub sql: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building, evaluating or executing statements.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context
            .suggestions
            .push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the SQL query.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.context.sql = Some(sql.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a not found error.
    pub fn not_found(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("No {} record found matching the query", model),
        )
        .with_model(&model)
        .with_code_suggestion(
            "Use fetch_first() to get None instead of an error",
            "Statement::select(prototype, dialect).r#where(...).fetch_first().await",
        )
    }

    /// Create a not unique error.
    pub fn not_unique(model: impl Into<String>) -> Self {
        let model = model.into();
        Self::new(
            ErrorCode::NotUnique,
            format!("Expected a single {} record but found several", model),
        )
        .with_model(&model)
        .with_suggestion("Add more specific filters to narrow down to a single record")
        .with_suggestion("Use fetch() if you expect multiple results")
    }

    /// Create an unresolved path error.
    pub fn unresolved_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        let reason = reason.into();
        Self::new(
            ErrorCode::UnresolvedPath,
            format!("Cannot resolve property path '{}': {}", path, reason),
        )
        .with_field(&path)
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::TypeMismatch,
            format!(
                "Expected {} for '{}' but found {}",
                expected.into(),
                field,
                found.into()
            ),
        )
        .with_field(&field)
    }

    /// Create a duplicate assignment error.
    pub fn duplicate_assignment(model: impl Into<String>, field: impl Into<String>) -> Self {
        let model = model.into();
        let field = field.into();
        Self::new(
            ErrorCode::DuplicateAssignment,
            format!("Property '{}' is assigned more than once on {}", field, model),
        )
        .with_model(&model)
        .with_field(&field)
        .with_suggestion(format!("Assign '{}' exactly once per statement", field))
    }

    /// Create an empty assignment error.
    pub fn empty_assignment(model: impl Into<String>, operation: impl Into<String>) -> Self {
        let model = model.into();
        let operation = operation.into();
        Self::new(
            ErrorCode::EmptyAssignment,
            format!("{} on {} has no assignments", operation, model),
        )
        .with_model(&model)
        .with_context(&operation)
        .with_suggestion("Call set() at least once before execute()")
    }

    /// Create an invalid pagination error.
    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidPagination,
            format!("Invalid pagination: {}", message.into()),
        )
        .with_suggestion("Pages are numbered from 1")
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("Invalid configuration for {}: {}", key, message.into()),
        )
        .with_field(&key)
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::new(
            ErrorCode::QueryTimeout,
            format!("Query timed out after {}ms", duration_ms),
        )
    }

    /// Create an SQL syntax error.
    pub fn sql_syntax(message: impl Into<String>, sql: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SqlSyntax,
            format!("SQL syntax error: {}", message.into()),
        )
        .with_sql(sql)
    }

    /// Create a general database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message.into()))
    }

    // ============== Error Checks ==============

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if this error was raised while building a statement.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::DuplicateAssignment
                | ErrorCode::EmptyAssignment
                | ErrorCode::InvalidPagination
        )
    }

    /// Check if this error came from resolving a property path.
    pub fn is_evaluation_error(&self) -> bool {
        matches!(self.code, ErrorCode::UnresolvedPath | ErrorCode::TypeMismatch)
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut out = format!("Error [{}]: {}\n", self.code.code(), self.message);
        let ctx = &self.context;

        let lines = [
            ("While", &ctx.operation),
            ("Model", &ctx.model),
            ("Field", &ctx.field),
        ];
        for (label, value) in lines {
            if let Some(value) = value {
                let _ = writeln!(out, "  → {}: {}", label, value);
            }
        }
        if let Some(sql) = &ctx.sql {
            let _ = writeln!(out, "  → SQL: {}", truncate_sql(sql));
        }

        if !ctx.suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for (i, suggestion) in ctx.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, suggestion.text);
                if let Some(code) = &suggestion.code {
                    let _ = writeln!(out, "     ```\n     {}\n     ```", code.replace('\n', "\n     "));
                }
            }
        }

        if let Some(help) = &ctx.help {
            let _ = writeln!(out, "\nHelp: {}", help);
        }
        out
    }
}

/// Long statements are cut to their first 200 characters.
fn truncate_sql(sql: &str) -> std::borrow::Cow<'_, str> {
    match sql.char_indices().nth(200) {
        Some((end, _)) => format!("{}...", &sql[..end]).into(),
        None => sql.into(),
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
