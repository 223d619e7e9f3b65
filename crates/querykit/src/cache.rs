//! Client wrapper with a per-connection prepared statement cache.
//!
//! Compiled statements that differ only in bound values share their SQL text, so its
//! fingerprint is the cache key. A cached plan invalidated by a schema change is evicted and
//! re-prepared once.

use crate::client::{GenericClient, log_query};
use crate::config::ClientConfig;
use crate::error::{DbError, DbResult};
use crate::qb::sql_fingerprint;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Row, Statement};

/// Running counters for a [`CachedClient`]'s statement cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to prepare.
    pub misses: u64,
    /// Statements dropped to stay within capacity.
    pub evictions: u64,
    /// Statements discarded after the server reported a stale plan.
    pub invalidations: u64,
}

/// Bounded map from statement fingerprint to prepared statement, evicting the least recently
/// used entry. The SQL text is kept beside each statement so a fingerprint collision reads as
/// a miss instead of handing back the wrong statement.
#[derive(Debug)]
pub(crate) struct StatementCache<S = Statement> {
    capacity: usize,
    state: Mutex<CacheState<S>>,
}

#[derive(Debug)]
struct CacheState<S> {
    slots: HashMap<u64, Slot<S>>,
    tick: u64,
    stats: CacheStats,
}

#[derive(Debug)]
struct Slot<S> {
    sql: String,
    stmt: S,
    last_used: u64,
}

impl<S> CacheState<S> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn matching(&mut self, key: u64, sql: &str) -> Option<&mut Slot<S>> {
        self.slots.get_mut(&key).filter(|slot| slot.sql == sql)
    }
}

impl<S: Clone> StatementCache<S> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState {
                slots: HashMap::with_capacity(capacity),
                tick: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn lookup(&self, sql: &str) -> Option<S> {
        let mut state = self.state();
        let tick = state.next_tick();
        let found = state.matching(sql_fingerprint(sql), sql).map(|slot| {
            slot.last_used = tick;
            slot.stmt.clone()
        });
        if found.is_some() {
            state.stats.hits += 1;
        } else {
            state.stats.misses += 1;
        }
        found
    }

    /// Cache `stmt` for `sql` and return the statement now cached. When a concurrent caller
    /// stored the same SQL first, its statement wins.
    pub(crate) fn store(&self, sql: &str, stmt: S) -> S {
        let key = sql_fingerprint(sql);
        let mut state = self.state();
        let tick = state.next_tick();
        if let Some(slot) = state.matching(key, sql) {
            slot.last_used = tick;
            return slot.stmt.clone();
        }

        state.slots.insert(
            key,
            Slot {
                sql: sql.to_owned(),
                stmt: stmt.clone(),
                last_used: tick,
            },
        );
        while state.slots.len() > self.capacity {
            let Some(oldest) = state
                .slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            let evicted = state.slots.remove(&oldest);
            state.stats.evictions += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                target: "querykit.cache",
                sql = evicted.as_ref().map_or("", |slot| slot.sql.as_str()),
                "evicted prepared statement"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = evicted;
        }
        stmt
    }

    /// Drop the statement for `sql` after the server rejected it.
    pub(crate) fn invalidate(&self, sql: &str) -> bool {
        let key = sql_fingerprint(sql);
        let mut state = self.state();
        if state.matching(key, sql).is_none() {
            return false;
        }
        state.slots.remove(&key);
        state.stats.invalidations += 1;
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.state().slots.len()
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.state().stats
    }
}

/// Whether a failure on a cached statement should be retried with a fresh prepare.
pub(crate) fn is_retryable_prepared_error(err: &DbError) -> bool {
    let DbError::Query(e) = err else {
        return false;
    };
    let Some(db_err) = e.as_db_error() else {
        return false;
    };

    match db_err.code().code() {
        // feature_not_supported, raised after the plan's result type changed
        "0A000" => db_err
            .message()
            .to_ascii_lowercase()
            .contains("cached plan must not change result type"),
        // invalid_sql_statement_name
        "26000" => true,
        _ => false,
    }
}

/// Wraps any [`GenericClient`] with statement caching, SQL logging and a query timeout.
///
/// # Example
/// ```ignore
/// use querykit::prelude::*;
///
/// let client = CachedClient::with_config(pool.get().await?, ClientConfig::new().statement_cache(128));
/// let rows = select_from("users").where_eq("active", true).fetch_all(&client).await?;
/// ```
pub struct CachedClient<C> {
    client: C,
    config: ClientConfig,
    cache: Option<StatementCache>,
}

impl<C: GenericClient> CachedClient<C> {
    /// Wrap a client with the default configuration.
    pub fn new(client: C) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    pub fn with_config(client: C, config: ClientConfig) -> Self {
        let cache = (config.statement_cache_capacity > 0)
            .then(|| StatementCache::new(config.statement_cache_capacity));
        Self {
            client,
            config,
            cache,
        }
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of statements currently cached.
    pub fn cached_statements(&self) -> usize {
        self.cache.as_ref().map_or(0, StatementCache::len)
    }

    /// Hit, miss and eviction counters; all zero when caching is disabled.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache
            .as_ref()
            .map(StatementCache::stats)
            .unwrap_or_default()
    }

    fn log(&self, sql: &str, param_count: usize) {
        if self.config.log_sql {
            log_query(sql, param_count, self.config.max_logged_sql_len);
        }
    }

    /// Run `future` under the configured timeout, cancelling the server-side query on expiry.
    async fn with_timeout<T, F>(&self, future: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>> + Send,
    {
        let Some(timeout) = self.config.query_timeout else {
            return future.await;
        };
        match tokio::time::timeout(timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                if let Some(cancel_token) = self.client.cancel_token() {
                    tokio::spawn(async move {
                        let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                    });
                }
                Err(DbError::Timeout(timeout))
            }
        }
    }

    fn statement_cache(&self) -> Option<&StatementCache> {
        self.cache
            .as_ref()
            .filter(|_| self.client.supports_prepared_statements())
    }

    async fn prepare_cached(&self, cache: &StatementCache, sql: &str) -> DbResult<Statement> {
        if let Some(stmt) = cache.lookup(sql) {
            return Ok(stmt);
        }
        let stmt = self.with_timeout(self.client.prepare_statement(sql)).await?;
        Ok(cache.store(sql, stmt))
    }

    /// Run `op` against the cached statement for `sql`, re-preparing once if the plan went stale.
    async fn run_prepared<T, F, Fut>(&self, cache: &StatementCache, sql: &str, op: F) -> DbResult<T>
    where
        F: Fn(Statement) -> Fut,
        Fut: Future<Output = DbResult<T>> + Send,
    {
        let stmt = self.prepare_cached(cache, sql).await?;
        match self.with_timeout(op(stmt)).await {
            Err(err) if is_retryable_prepared_error(&err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "querykit.cache", error = %err, "re-preparing stale statement");
                cache.invalidate(sql);
                let stmt = self.prepare_cached(cache, sql).await?;
                self.with_timeout(op(stmt)).await
            }
            result => result,
        }
    }
}

impl<C: GenericClient> GenericClient for CachedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.log(sql, params.len());
        match self.statement_cache() {
            Some(cache) => {
                self.run_prepared(cache, sql, |stmt| async move {
                    self.client.query_prepared(&stmt, params).await
                })
                .await
            }
            None => self.with_timeout(self.client.query(sql, params)).await,
        }
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<u64> {
        self.log(sql, params.len());
        match self.statement_cache() {
            Some(cache) => {
                self.run_prepared(cache, sql, |stmt| async move {
                    self.client.execute_prepared(&stmt, params).await
                })
                .await
            }
            None => self.with_timeout(self.client.execute(sql, params)).await,
        }
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.client.cancel_token()
    }

    fn supports_prepared_statements(&self) -> bool {
        self.client.supports_prepared_statements()
    }

    async fn prepare_statement(&self, sql: &str) -> DbResult<Statement> {
        self.client.prepare_statement(sql).await
    }

    async fn query_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        self.with_timeout(self.client.query_prepared(stmt, params))
            .await
    }

    async fn execute_prepared(
        &self,
        stmt: &Statement,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<u64> {
        self.with_timeout(self.client.execute_prepared(stmt, params))
            .await
    }
}
