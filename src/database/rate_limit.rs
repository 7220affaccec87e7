use super::connection::{DbPool, checkout, retry_on_conflict};
use crate::models::ApiRateLimit;
use crate::schema::api_rate_limit;
use diesel::prelude::*;

/// Persistent per-host request counters
pub struct RateLimitOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> RateLimitOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Counts one request from `ip` and returns the number of requests in its
    /// current window. Expired windows of all hosts are purged first.
    pub fn record_request(
        &self,
        ip: &str,
        now: i64,
        window_length: i64,
    ) -> Result<i32, diesel::result::Error> {
        let mut conn = checkout(self.pool)?;
        let cutoff = now - window_length;

        retry_on_conflict(|| {
            diesel::delete(api_rate_limit::table.filter(api_rate_limit::window_start.le(cutoff)))
                .execute(&mut conn)
        })?;

        let record = retry_on_conflict(|| {
            conn.immediate_transaction(|conn| {
                let existing = api_rate_limit::table
                    .find(ip)
                    .first::<ApiRateLimit>(conn)
                    .optional()?;

                match existing {
                    Some(window) if window.is_expired(now, window_length) => {
                        diesel::update(api_rate_limit::table.find(ip))
                            .set((
                                api_rate_limit::requests.eq(1),
                                api_rate_limit::window_start.eq(now),
                            ))
                            .execute(conn)?;
                    }
                    Some(_) => {
                        diesel::update(api_rate_limit::table.find(ip))
                            .set(api_rate_limit::requests.eq(api_rate_limit::requests + 1))
                            .execute(conn)?;
                    }
                    None => {
                        diesel::insert_into(api_rate_limit::table)
                            .values(&ApiRateLimit::open(ip, now))
                            .execute(conn)?;
                    }
                }

                api_rate_limit::table.find(ip).first::<ApiRateLimit>(conn)
            })
        })?;

        Ok(record.requests)
    }

    pub fn get(&self, ip: &str) -> Result<Option<ApiRateLimit>, diesel::result::Error> {
        let mut conn = checkout(self.pool)?;
        api_rate_limit::table
            .find(ip)
            .first::<ApiRateLimit>(&mut conn)
            .optional()
    }
}

#[cfg(test)]
mod tests {
    use crate::database::DatabaseService;
    use tempfile::TempDir;

    fn database(temp_dir: &TempDir) -> DatabaseService {
        let url = temp_dir.path().join("ratelimit.db");
        DatabaseService::new(&url.to_string_lossy()).expect("database")
    }

    #[test]
    fn test_window_resets_after_length() {
        let temp_dir = TempDir::new().unwrap();
        let db = database(&temp_dir);
        let now = 1_700_000_000;

        assert_eq!(db.record_request("h", now, 60).unwrap(), 1);
        assert_eq!(db.record_request("h", now + 10, 60).unwrap(), 2);
        assert_eq!(db.record_request("h", now + 60, 60).unwrap(), 1);
        assert_eq!(db.record_request("h", now + 61, 60).unwrap(), 2);

        let window = db.get_rate_limit("h").unwrap().unwrap();
        assert_eq!(window.window_start, now + 60);
        assert_eq!(window.requests, 2);
    }

    #[test]
    fn test_expired_windows_of_other_hosts_are_purged() {
        let temp_dir = TempDir::new().unwrap();
        let db = database(&temp_dir);
        let now = 1_700_000_000;

        db.record_request("stale", now, 60).unwrap();
        db.record_request("fresh", now + 30, 60).unwrap();
        db.record_request("h", now + 60, 60).unwrap();

        assert!(db.get_rate_limit("stale").unwrap().is_none());
        assert_eq!(db.get_rate_limit("fresh").unwrap().unwrap().requests, 1);
    }
}
