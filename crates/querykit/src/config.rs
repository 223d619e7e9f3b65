//! Execution-side configuration.

use std::time::Duration;

/// Default number of prepared statements kept per connection.
pub const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 64;

/// Default cap on SQL text length in log events.
pub const DEFAULT_MAX_LOGGED_SQL_LEN: usize = 200;

/// Configuration for [`CachedClient`](crate::CachedClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prepared statements kept per connection (LRU). `0` disables caching.
    pub statement_cache_capacity: usize,
    /// Emit a `querykit.sql` debug event per statement.
    pub log_sql: bool,
    /// Truncate logged SQL to this many characters. `None` logs it whole.
    pub max_logged_sql_len: Option<usize>,
    /// Per-statement timeout.
    pub query_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            statement_cache_capacity: DEFAULT_STATEMENT_CACHE_CAPACITY,
            log_sql: true,
            max_logged_sql_len: Some(DEFAULT_MAX_LOGGED_SQL_LEN),
            query_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statement cache capacity.
    pub fn statement_cache(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    /// Disable the statement cache; every call goes through the unprepared path.
    pub fn no_statement_cache(self) -> Self {
        self.statement_cache(0)
    }

    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    pub fn max_logged_sql_len(mut self, len: Option<usize>) -> Self {
        self.max_logged_sql_len = len;
        self
    }

    /// Set query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.statement_cache_capacity, 64);
        assert!(config.log_sql);
        assert_eq!(config.max_logged_sql_len, Some(200));
        assert_eq!(config.query_timeout, None);
    }

    #[test]
    fn builder_methods() {
        let config = ClientConfig::new()
            .no_statement_cache()
            .log_sql(false)
            .max_logged_sql_len(None)
            .timeout(Duration::from_secs(5));
        assert_eq!(config.statement_cache_capacity, 0);
        assert!(!config.log_sql);
        assert_eq!(config.max_logged_sql_len, None);
        assert_eq!(config.query_timeout, Some(Duration::from_secs(5)));
    }
}
