//! Execution boundary: hands compiled SQL and parameters to a Postgres client.

use crate::error::{DbError, DbResult};
use crate::qb::{Compiled, QueryBuilder};
use std::borrow::Cow;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Row, Statement};

/// A trait that unifies database clients and transactions.
///
/// Anything implementing it can run a [`Compiled`] statement, so the same builder code works
/// against a plain connection, a pooled one, or a transaction.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row.
    ///
    /// Returns [`DbError::NotFound`] if no rows are returned; extra rows are ignored.
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| DbError::not_found("Expected one row, got none"))
        }
    }

    /// Execute a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<u64>> + Send;

    /// Return a cancellation token for the underlying connection, if supported.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }

    /// Whether this client supports prepared statement APIs.
    fn supports_prepared_statements(&self) -> bool {
        false
    }

    /// Prepare a statement on this connection.
    ///
    /// Prepared statements are per-connection and must not be used across connections.
    fn prepare_statement(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = DbResult<Statement>> + Send {
        let _ = sql;
        async { Err(DbError::Connection(UNSUPPORTED_PREPARED.to_string())) }
    }

    /// Execute a prepared statement and return all rows.
    fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send {
        let _ = (stmt, params);
        async { Err(DbError::Connection(UNSUPPORTED_PREPARED.to_string())) }
    }

    /// Execute a prepared statement and return affected row count.
    fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<u64>> + Send {
        let _ = (stmt, params);
        async { Err(DbError::Connection(UNSUPPORTED_PREPARED.to_string())) }
    }
}

const UNSUPPORTED_PREPARED: &str = "prepared statements are not supported by this client";

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(DbError::from_db_error)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    async fn prepare_statement(&self, sql: &str) -> DbResult<Statement> {
        tokio_postgres::Client::prepare(self, sql)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        tokio_postgres::Client::query(self, stmt, params)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<u64> {
        tokio_postgres::Client::execute(self, stmt, params)
            .await
            .map_err(DbError::from_db_error)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(DbError::from_db_error)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }

    fn supports_prepared_statements(&self) -> bool {
        true
    }

    async fn prepare_statement(&self, sql: &str) -> DbResult<Statement> {
        tokio_postgres::Transaction::prepare(self, sql)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, stmt, params)
            .await
            .map_err(DbError::from_db_error)
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<u64> {
        tokio_postgres::Transaction::execute(self, stmt, params)
            .await
            .map_err(DbError::from_db_error)
    }
}

// ===== deadpool-postgres support =====

/// Delegates every call to the deref target.
#[cfg(feature = "pool")]
macro_rules! impl_generic_client_via_deref {
    ($($ty:ty),* $(,)?) => {
        $(
            impl GenericClient for $ty {
                async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
                    GenericClient::query(&**self, sql, params).await
                }

                async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
                    GenericClient::execute(&**self, sql, params).await
                }

                fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
                    GenericClient::cancel_token(&**self)
                }

                fn supports_prepared_statements(&self) -> bool {
                    GenericClient::supports_prepared_statements(&**self)
                }

                async fn prepare_statement(&self, sql: &str) -> DbResult<Statement> {
                    GenericClient::prepare_statement(&**self, sql).await
                }

                async fn query_prepared(
                    &self,
                    stmt: &Statement,
                    params: &[&(dyn ToSql + Sync)],
                ) -> DbResult<Vec<Row>> {
                    GenericClient::query_prepared(&**self, stmt, params).await
                }

                async fn execute_prepared(
                    &self,
                    stmt: &Statement,
                    params: &[&(dyn ToSql + Sync)],
                ) -> DbResult<u64> {
                    GenericClient::execute_prepared(&**self, stmt, params).await
                }
            }
        )*
    };
}

#[cfg(feature = "pool")]
impl_generic_client_via_deref!(
    deadpool_postgres::Client,
    deadpool_postgres::ClientWrapper,
    deadpool_postgres::Transaction<'_>,
);

// ===== Running compiled statements =====

/// Cut SQL down to `max_len` characters for log output.
#[cfg_attr(not(any(feature = "tracing", test)), allow(dead_code))]
pub(crate) fn truncate_sql(sql: &str, max_len: Option<usize>) -> Cow<'_, str> {
    match max_len {
        Some(max) if sql.chars().count() > max => {
            let cut: String = sql.chars().take(max).collect();
            Cow::Owned(format!("{cut}..."))
        }
        _ => Cow::Borrowed(sql),
    }
}

/// Emit the `querykit.sql` event. Parameter values are never logged, only their count.
pub(crate) fn log_query(sql: &str, param_count: usize, max_len: Option<usize>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        target: "querykit.sql",
        sql = %truncate_sql(sql, max_len),
        param_count,
        "executing query"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (sql, param_count, max_len);
}

impl Compiled {
    /// Run the statement and return all rows.
    pub async fn fetch_all(&self, client: &impl GenericClient) -> DbResult<Vec<Row>> {
        client.query(self.sql(), &self.params_ref()).await
    }

    /// Run the statement and return the first row ([`DbError::NotFound`] if none).
    pub async fn fetch_one(&self, client: &impl GenericClient) -> DbResult<Row> {
        client.query_one(self.sql(), &self.params_ref()).await
    }

    /// Run the statement and return the first row, if any.
    pub async fn fetch_opt(&self, client: &impl GenericClient) -> DbResult<Option<Row>> {
        client.query_opt(self.sql(), &self.params_ref()).await
    }

    /// Run the statement and return the number of affected rows.
    pub async fn execute(&self, client: &impl GenericClient) -> DbResult<u64> {
        client.execute(self.sql(), &self.params_ref()).await
    }
}

// Compile first: build errors surface as `DbError::Build` before any I/O.
impl QueryBuilder {
    pub async fn fetch_all(&self, client: &impl GenericClient) -> DbResult<Vec<Row>> {
        self.compile()?.fetch_all(client).await
    }

    pub async fn fetch_one(&self, client: &impl GenericClient) -> DbResult<Row> {
        self.compile()?.fetch_one(client).await
    }

    pub async fn fetch_opt(&self, client: &impl GenericClient) -> DbResult<Option<Row>> {
        self.compile()?.fetch_opt(client).await
    }

    pub async fn execute(&self, client: &impl GenericClient) -> DbResult<u64> {
        self.compile()?.execute(client).await
    }
}
