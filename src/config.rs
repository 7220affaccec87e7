use log::info;
use std::env;
use std::str::FromStr;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub max_rpc_results: i64,
    pub snapshot_uri: String,
    pub ratelimit_request_limit: i64,
    pub ratelimit_window_length: i64,
    pub ratelimit_cache: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "127.0.0.1".to_string(),
            database_url: "./data/aurweb.db".to_string(),
            max_rpc_results: 5000,
            snapshot_uri: "/cgit/aur.git/snapshot/%s.tar.gz".to_string(),
            ratelimit_request_limit: 4000,
            ratelimit_window_length: 86400, // one day
            ratelimit_cache: true,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env_or("AURWEB_PORT", defaults.port);
        let host = env::var("AURWEB_HOST").unwrap_or(defaults.host);
        let database_url = env::var("AURWEB_DATABASE_URL").unwrap_or(defaults.database_url);
        let max_rpc_results = env_or("AURWEB_MAX_RPC_RESULTS", defaults.max_rpc_results);
        let snapshot_uri = env::var("AURWEB_SNAPSHOT_URI").unwrap_or(defaults.snapshot_uri);
        let ratelimit_request_limit =
            env_or("AURWEB_RATELIMIT_REQUEST_LIMIT", defaults.ratelimit_request_limit);
        let ratelimit_window_length =
            env_or("AURWEB_RATELIMIT_WINDOW_LENGTH", defaults.ratelimit_window_length);
        let ratelimit_cache = env_or("AURWEB_RATELIMIT_CACHE", defaults.ratelimit_cache);

        info!("Configuration loaded:");
        info!("  Host: {host}");
        info!("  Port: {port}");
        info!("  Database URL: {database_url}");
        info!("  Max RPC results: {max_rpc_results}");
        info!("  Snapshot URI: {snapshot_uri}");
        info!("  Rate limit: {ratelimit_request_limit} requests / {ratelimit_window_length}s");
        info!(
            "  Rate limit backend: {}",
            if ratelimit_cache { "cache" } else { "database" }
        );

        Self {
            port,
            host,
            database_url,
            max_rpc_results,
            snapshot_uri,
            ratelimit_request_limit,
            ratelimit_window_length,
            ratelimit_cache,
        }
    }

    /// Snapshot URL of a package base, `%s` replaced with its name.
    pub fn snapshot_path(&self, package_base: &str) -> String {
        self.snapshot_uri.replace("%s", package_base)
    }
}

/// Live configuration shared by all request handlers.
///
/// Each request works on a [`SharedConfig::snapshot`] so that a concurrent
/// [`SharedConfig::reload`] never changes settings halfway through a request.
#[derive(Debug)]
pub struct SharedConfig {
    current: RwLock<AppConfig>,
}

impl SharedConfig {
    pub fn new(config: AppConfig) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    pub fn snapshot(&self) -> AppConfig {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, config: AppConfig) {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = config;
    }

    /// Re-reads the environment and installs the result.
    pub fn reload(&self) -> AppConfig {
        let config = AppConfig::from_env();
        self.replace(config.clone());
        info!("Configuration reloaded");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.max_rpc_results, 5000);
        assert_eq!(config.ratelimit_request_limit, 4000);
        assert_eq!(config.ratelimit_window_length, 86400);
        assert!(config.ratelimit_cache);
    }

    #[test]
    fn test_snapshot_path() {
        let config = AppConfig::default();
        assert_eq!(
            config.snapshot_path("pkg"),
            "/cgit/aur.git/snapshot/pkg.tar.gz"
        );
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        unsafe {
            env::set_var("AURWEB_TEST_GARBAGE_PORT", "not-a-port");
        }
        assert_eq!(env_or("AURWEB_TEST_GARBAGE_PORT", 8000u16), 8000);
        assert_eq!(env_or("AURWEB_TEST_UNSET_VARIABLE", 42i64), 42);
        unsafe {
            env::remove_var("AURWEB_TEST_GARBAGE_PORT");
        }
    }

    #[test]
    fn test_shared_config_replace() {
        let shared = SharedConfig::new(AppConfig::default());
        let mut updated = AppConfig::default();
        updated.max_rpc_results = 1;
        shared.replace(updated);
        assert_eq!(shared.snapshot().max_rpc_results, 1);
    }
}
