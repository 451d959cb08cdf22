//! Dialect configuration.
//!
//! ```rust
//! use strata_query::{DatabaseType, DialectConfig};
//!
//! let config = DialectConfig::builder()
//!     .database(DatabaseType::MySQL)
//!     .resolve_negative_conjunctions(true)
//!     .build();
//!
//! let formatter = config.formatter();
//! assert_eq!(formatter.db_type(), DatabaseType::MySQL);
//! ```

use std::env;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{QueryError, QueryResult};
use crate::sql::{DatabaseType, SqlFormatter};

/// Environment variable selecting the database type.
pub const ENV_DATABASE: &str = "STRATA_DATABASE";
/// Environment variable enabling De Morgan resolution of negated conjunctions.
pub const ENV_RESOLVE_NEGATIONS: &str = "STRATA_RESOLVE_NEGATIONS";
/// Environment variable controlling identifier quoting.
pub const ENV_QUOTE_IDENTIFIERS: &str = "STRATA_QUOTE_IDENTIFIERS";

/// How a SQL dialect renders statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    /// Target database.
    pub database: DatabaseType,
    /// Rewrite negated conjunctions with De Morgan's law instead of rendering
    /// `NOT (...)`.
    pub resolve_negative_conjunctions: bool,
    /// Quote identifiers that collide with keywords or contain special
    /// characters.
    pub quote_identifiers: bool,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            database: DatabaseType::default(),
            resolve_negative_conjunctions: false,
            quote_identifiers: true,
        }
    }
}

impl DialectConfig {
    /// Create a configuration builder.
    pub fn builder() -> DialectConfigBuilder {
        DialectConfigBuilder::default()
    }

    /// Default configuration for PostgreSQL.
    pub fn postgres() -> Self {
        Self::builder().database(DatabaseType::PostgreSQL).build()
    }

    /// Default configuration for MySQL.
    pub fn mysql() -> Self {
        Self::builder().database(DatabaseType::MySQL).build()
    }

    /// Default configuration for SQLite.
    pub fn sqlite() -> Self {
        Self::builder().database(DatabaseType::SQLite).build()
    }

    /// Load configuration from `STRATA_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> QueryResult<Self> {
        let mut config = Self::default();

        if let Ok(database) = env::var(ENV_DATABASE) {
            config.database = database.parse()?;
        }
        if let Ok(value) = env::var(ENV_RESOLVE_NEGATIONS) {
            config.resolve_negative_conjunctions = parse_flag(ENV_RESOLVE_NEGATIONS, &value)?;
        }
        if let Ok(value) = env::var(ENV_QUOTE_IDENTIFIERS) {
            config.quote_identifiers = parse_flag(ENV_QUOTE_IDENTIFIERS, &value)?;
        }

        info!(
            database = %config.database,
            resolve_negative_conjunctions = config.resolve_negative_conjunctions,
            quote_identifiers = config.quote_identifiers,
            "DialectConfig loaded from environment"
        );

        Ok(config)
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            QueryError::invalid_configuration("dialect", e.to_string()).with_source(e)
        })
    }

    /// A fresh formatter rendering with this configuration.
    pub fn formatter(&self) -> SqlFormatter {
        SqlFormatter::new(self.database)
            .with_quoting(self.quote_identifiers)
            .with_negation_resolution(self.resolve_negative_conjunctions)
    }
}

fn parse_flag(key: &str, value: &str) -> QueryResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(QueryError::invalid_configuration(
            key,
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

/// Builder for [`DialectConfig`].
#[derive(Debug, Clone, Default)]
pub struct DialectConfigBuilder {
    config: DialectConfig,
}

impl DialectConfigBuilder {
    /// Set the target database.
    pub fn database(mut self, database: DatabaseType) -> Self {
        self.config.database = database;
        self
    }

    /// Set the negated-conjunction policy.
    pub fn resolve_negative_conjunctions(mut self, resolve: bool) -> Self {
        self.config.resolve_negative_conjunctions = resolve;
        self
    }

    /// Enable or disable identifier quoting.
    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.config.quote_identifiers = quote;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DialectConfig {
        self.config
    }
}
