//! Database connection pool management.

use std::str::FromStr;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use dissoc_core::{Error, Result};

/// Default maximum number of connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

const LEGACY_SCHEME: &str = "postgres://";
const SCHEME: &str = "postgresql://";

/// Pool configuration options.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain once the pool is in use.
    pub min_connections: u32,
    /// Connection acquire timeout.
    pub connect_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Maximum connection lifetime.
    pub max_lifetime: Option<Duration>,
    /// Ping pooled connections before handing them out, replacing stale ones.
    pub test_before_acquire: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 0,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(1800)), // 30 minutes
            test_before_acquire: true,
        }
    }
}

impl PoolConfig {
    /// Create a new pool configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the minimum number of connections.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    /// Set the acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime.
    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    fn pool_options(&self) -> PgPoolOptions {
        let mut options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .test_before_acquire(self.test_before_acquire);

        if let Some(max_lifetime) = self.max_lifetime {
            options = options.max_lifetime(max_lifetime);
        }
        options
    }
}

/// Rewrite the legacy `postgres://` scheme to `postgresql://`.
///
/// Hosted providers still hand out `postgres://` URLs; every other URL is
/// returned unchanged.
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix(LEGACY_SCHEME) {
        Some(rest) => format!("{}{}", SCHEME, rest),
        None => url.to_string(),
    }
}

fn connect_options(database_url: &str) -> Result<PgConnectOptions> {
    let url = normalize_database_url(database_url);
    PgConnectOptions::from_str(&url).map_err(Error::Database)
}

/// Create a pool that opens no connection until the first query.
///
/// Startup never blocks on the database; an unreachable store surfaces as a
/// per-request error instead.
pub fn create_lazy_pool(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let options = connect_options(database_url)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "create_lazy",
        max_connections = config.max_connections,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        test_before_acquire = config.test_before_acquire,
        "Creating lazy database connection pool"
    );

    Ok(config.pool_options().connect_lazy_with(options))
}

/// Create a pool and establish its first connection immediately.
pub async fn create_pool(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let options = connect_options(database_url)?;

    let pool = config
        .pool_options()
        .connect_with(options)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Log current pool health metrics.
///
/// Warns when no idle connection is left while the pool is in use.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "database",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        "Pool health check"
    );

    if idle == 0 && size > 0 {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = size,
            "Connection pool has no idle connections, potential exhaustion"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_legacy_scheme() {
        assert_eq!(
            normalize_database_url("postgres://u:p@db.example.com:5432/ns"),
            "postgresql://u:p@db.example.com:5432/ns"
        );
    }

    #[test]
    fn test_normalize_leaves_current_scheme() {
        let url = "postgresql://u:p@localhost/ns";
        assert_eq!(normalize_database_url(url), url);
    }

    #[test]
    fn test_normalize_only_touches_prefix() {
        let url = "postgresql://postgres://weird@localhost/db";
        assert_eq!(normalize_database_url(url), url);
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.min_connections, 0);
        assert!(config.test_before_acquire);
    }

    #[test]
    fn test_pool_config_builder() {
        let config = PoolConfig::new()
            .max_connections(20)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(60))
            .max_lifetime(None);

        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 5);
        assert_eq!(config.connect_timeout, Duration::from_secs(60));
        assert_eq!(config.max_lifetime, None);
    }

    #[test]
    fn test_invalid_url_is_database_error() {
        let err = connect_options("not a url").unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    // connect_lazy_with spawns no connection but needs a Tokio runtime
    #[tokio::test]
    async fn test_lazy_pool_opens_no_connection() {
        let pool = create_lazy_pool("postgres://u:p@localhost:1/ns", PoolConfig::default())
            .expect("lazy pool");
        assert_eq!(pool.size(), 0);
    }
}
