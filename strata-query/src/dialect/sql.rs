//! The SQL dialect: render, then hand off to a driver.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use super::Dialect;
use crate::config::DialectConfig;
use crate::entity::Entity;
use crate::error::{QueryError, QueryResult};
use crate::statement::{Kind, Modify, Select, Statement};
use crate::strata_trace;
use crate::types::FetchSpec;
use crate::value::Value;

/// A rendered query that produces rows.
#[derive(Debug, Clone)]
pub struct SqlRequest<E> {
    /// The SQL text.
    pub sql: String,
    /// Bound parameters, in placeholder order.
    pub params: Vec<Value>,
    /// Prototype to clone for each result row before setting its columns.
    pub prototype: E,
    /// Relations to load eagerly.
    pub fetches: Vec<FetchSpec>,
}

impl<E: Entity> SqlRequest<E> {
    fn new<D, K: Kind>(statement: &Statement<E, D, K>, (sql, params): (String, Vec<Value>)) -> Self {
        Self {
            sql,
            params,
            prototype: statement.prototype().clone(),
            fetches: statement.fetches().to_vec(),
        }
    }
}

/// A database driver that runs rendered SQL.
pub trait SqlEngine: Send + Sync + 'static {
    /// Run a query and map each result row onto a clone of the prototype.
    fn query_many<E: Entity>(&self, request: SqlRequest<E>) -> BoxFuture<'_, QueryResult<Vec<E>>>;

    /// Run a `COUNT(*)` query.
    fn query_count(&self, sql: &str, params: Vec<Value>) -> BoxFuture<'_, QueryResult<u64>>;

    /// Run a statement and return the affected row count.
    fn execute(&self, sql: &str, params: Vec<Value>) -> BoxFuture<'_, QueryResult<u64>>;

    /// Run a statement with `RETURNING *` and map the returned rows.
    fn execute_returning<E: Entity>(
        &self,
        request: SqlRequest<E>,
    ) -> BoxFuture<'_, QueryResult<Vec<E>>>;
}

/// A dialect that renders statements to SQL and runs them on an [`SqlEngine`].
///
/// ```rust,ignore
/// let db = SqlDialect::new(PgEngine::connect(url).await?, DialectConfig::from_env()?);
/// let users = db.select(User::default()).r#where(age.gt(18)).fetch().await?;
/// ```
pub struct SqlDialect<X> {
    engine: Arc<X>,
    config: DialectConfig,
}

impl<X: SqlEngine> SqlDialect<X> {
    /// Wrap `engine`, rendering per `config`.
    pub fn new(engine: X, config: DialectConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            config,
        }
    }

    /// Wrap an engine that is already shared.
    pub fn from_shared(engine: Arc<X>, config: DialectConfig) -> Self {
        Self { engine, config }
    }

    /// The driver.
    pub fn engine(&self) -> &X {
        &self.engine
    }

    /// The rendering configuration.
    pub fn config(&self) -> &DialectConfig {
        &self.config
    }
}

impl<X> Clone for SqlDialect<X> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config,
        }
    }
}

impl<X> fmt::Debug for SqlDialect<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlDialect").field("config", &self.config).finish()
    }
}

/// Errors from the driver keep their own SQL context if they set one.
fn with_sql(error: QueryError, sql: &str) -> QueryError {
    if error.context.sql.is_some() {
        error
    } else {
        error.with_sql(sql)
    }
}

impl<X: SqlEngine> Dialect for SqlDialect<X> {
    fn fetch<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>> {
        let request = SqlRequest::new(statement, statement.to_sql(&self.config));
        debug!(sql = %request.sql, params = request.params.len(), "Running select");
        strata_trace!(params = ?request.params, "Bound parameters");
        Box::pin(async move {
            let sql = request.sql.clone();
            self.engine.query_many(request).await.map_err(|e| with_sql(e, &sql))
        })
    }

    fn fetch_count<'a, E: Entity>(
        &'a self,
        statement: &'a Statement<E, Self, Select>,
    ) -> BoxFuture<'a, QueryResult<u64>> {
        let (sql, params) = statement.to_count_sql(&self.config);
        debug!(sql = %sql, params = params.len(), "Running count");
        Box::pin(async move {
            self.engine.query_count(&sql, params).await.map_err(|e| with_sql(e, &sql))
        })
    }

    fn execute<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<u64>> {
        let (sql, params) = statement.to_sql(&self.config);
        debug!(sql = %sql, params = params.len(), "Running statement");
        strata_trace!(params = ?params, "Bound parameters");
        Box::pin(async move {
            self.engine.execute(&sql, params).await.map_err(|e| with_sql(e, &sql))
        })
    }

    fn execute_returning<'a, E: Entity, K: Modify>(
        &'a self,
        statement: &'a Statement<E, Self, K>,
    ) -> BoxFuture<'a, QueryResult<Vec<E>>> {
        let request = SqlRequest::new(statement, statement.to_returning_sql(&self.config));
        debug!(sql = %request.sql, params = request.params.len(), "Running statement");
        Box::pin(async move {
            let sql = request.sql.clone();
            self.engine
                .execute_returning(request)
                .await
                .map_err(|e| with_sql(e, &sql))
        })
    }
}
