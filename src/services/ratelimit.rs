use crate::config::AppConfig;
use crate::database::DatabaseService;
use log::{debug, info};
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Backend holding one request window per host.
pub trait RateLimitStore: Send + Sync + fmt::Debug {
    /// Counts one request from `host` at `now` and returns the number of
    /// requests in the host's current window, this one included. A window
    /// older than `window_length` seconds is replaced by a fresh one.
    fn record(&self, host: &str, now: i64, window_length: i64)
    -> Result<i64, diesel::result::Error>;
}

#[derive(Debug)]
struct Window {
    start: i64,
    requests: AtomicI64,
}

impl Window {
    fn open(now: i64) -> Self {
        Self {
            start: now,
            requests: AtomicI64::new(1),
        }
    }
}

/// In-process backend. Entries expire on their own once a window has passed.
#[derive(Debug)]
pub struct CacheRateLimitStore {
    windows: Cache<String, Arc<Window>>,
}

impl CacheRateLimitStore {
    pub fn new(window_length: i64) -> Self {
        let windows = Cache::builder()
            .time_to_live(Duration::from_secs(window_length.max(1) as u64))
            .build();

        Self { windows }
    }
}

impl RateLimitStore for CacheRateLimitStore {
    fn record(
        &self,
        host: &str,
        now: i64,
        window_length: i64,
    ) -> Result<i64, diesel::result::Error> {
        let entry = self
            .windows
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Window::open(now)));
        if entry.is_fresh() {
            return Ok(1);
        }

        let window = entry.into_value();
        if now - window.start >= window_length {
            self.windows
                .insert(host.to_string(), Arc::new(Window::open(now)));
            return Ok(1);
        }

        Ok(window.requests.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Backend persisting windows in the `api_rate_limit` table.
#[derive(Debug)]
pub struct DatabaseRateLimitStore {
    database: Arc<DatabaseService>,
}

impl DatabaseRateLimitStore {
    pub fn new(database: Arc<DatabaseService>) -> Self {
        Self { database }
    }
}

impl RateLimitStore for DatabaseRateLimitStore {
    fn record(
        &self,
        host: &str,
        now: i64,
        window_length: i64,
    ) -> Result<i64, diesel::result::Error> {
        let requests = self.database.record_request(host, now, window_length)?;
        Ok(i64::from(requests))
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    store: Box<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(store: Box<dyn RateLimitStore>) -> Self {
        Self { store }
    }

    /// Picks the backend named by `ratelimit_cache`.
    pub fn from_config(config: &AppConfig, database: Arc<DatabaseService>) -> Self {
        if config.ratelimit_cache {
            info!("Rate limiting requests with the in-process cache");
            Self::new(Box::new(CacheRateLimitStore::new(
                config.ratelimit_window_length,
            )))
        } else {
            info!("Rate limiting requests with the database");
            Self::new(Box::new(DatabaseRateLimitStore::new(database)))
        }
    }

    /// Counts a request from `host`; true when the host is over its limit.
    pub fn check(&self, host: &str, config: &AppConfig) -> Result<bool, diesel::result::Error> {
        self.check_at(host, config, chrono::Utc::now().timestamp())
    }

    pub fn check_at(
        &self,
        host: &str,
        config: &AppConfig,
        now: i64,
    ) -> Result<bool, diesel::result::Error> {
        let requests = self
            .store
            .record(host, now, config.ratelimit_window_length)?;

        let exceeded = requests > config.ratelimit_request_limit;
        if exceeded {
            debug!("{} has exceeded the ratelimit ({} requests)", host, requests);
        }
        Ok(exceeded)
    }
}
