use crate::schema::api_rate_limit;
use diesel::prelude::*;

/// Per-host request counter of the database rate limit backend.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = api_rate_limit)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApiRateLimit {
    pub ip: String,
    pub requests: i32,
    pub window_start: i64,
}

impl ApiRateLimit {
    /// A fresh window opened at `now`, counting the current request.
    pub fn open(ip: &str, now: i64) -> Self {
        Self {
            ip: ip.to_string(),
            requests: 1,
            window_start: now,
        }
    }

    pub fn is_expired(&self, now: i64, window_length: i64) -> bool {
        now - self.window_start >= window_length
    }
}
