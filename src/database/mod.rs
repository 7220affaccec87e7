//! Database access for the RPC engine
//!
//! - `connection`: pool setup, migrations and conflict retries
//! - `sql`: composer for the raw projection and extra-info statements
//! - `packages`: package projection and name-prefix lookups
//! - `extra_info`: batched per-package list loader
//! - `rate_limit`: persistent request counters
//! - `service`: `DatabaseService`, the unified entry point

pub mod connection;
pub mod extra_info;
pub mod packages;
pub mod rate_limit;
pub mod service;
pub mod sql;

pub use connection::{DbConnection, DbPool, MIGRATIONS};
pub use service::DatabaseService;

pub use extra_info::ExtraInfoOperations;
pub use packages::PackageOperations;
pub use rate_limit::RateLimitOperations;
