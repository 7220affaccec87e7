pub mod ratelimit;

pub use ratelimit::{CacheRateLimitStore, DatabaseRateLimitStore, RateLimitStore, RateLimiter};
