//! Configuration for a [`Storm`](crate::Storm) instance.

/// Configuration for `Storm`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StormConfig {
    /// Maximum number of pooled connections (used by `Storm::open`).
    pub max_pool_size: usize,
    /// Whether to emit issued SQL on the `storm.sql` tracing target.
    pub log_sql: bool,
    /// Truncate logged SQL (in bytes). `None` means no truncation.
    pub max_logged_sql_len: Option<usize>,
}

impl Default for StormConfig {
    fn default() -> Self {
        Self {
            max_pool_size: 16,
            log_sql: true,
            max_logged_sql_len: Some(200),
        }
    }
}

impl StormConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum pool size (clamped to at least 1).
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size.max(1);
        self
    }

    /// Enable or disable SQL logging.
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_logged_sql_len(mut self, len: usize) -> Self {
        self.max_logged_sql_len = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_len = None;
        self
    }
}
