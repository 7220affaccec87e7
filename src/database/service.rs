use super::connection::{DbConnection, DbPool, create_pool, get_connection_with_retry};
use super::extra_info::ExtraInfoOperations;
use super::packages::PackageOperations;
use super::rate_limit::RateLimitOperations;
use crate::models::{ApiRateLimit, ExtraInfoRecord, PackageRow};
use crate::rpc::query::PackageQuery;
use crate::rpc::store::PackageStore;
use std::collections::BTreeSet;

/// Main database service that provides a unified interface to all database operations
#[derive(Debug)]
pub struct DatabaseService {
    pub pool: DbPool,
}

impl DatabaseService {
    /// Creates a new DatabaseService with an initialized connection pool
    pub fn new(database_url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = create_pool(database_url)?;
        Ok(Self { pool })
    }

    /// Gets a connection from the pool with retry logic
    pub fn get_connection(&self) -> Result<DbConnection, diesel::r2d2::Error> {
        get_connection_with_retry(&self.pool)
    }

    // Package operations
    pub fn load_packages(
        &self,
        query: &PackageQuery,
    ) -> Result<Vec<PackageRow>, diesel::result::Error> {
        let ops = PackageOperations::new(&self.pool);
        ops.load_packages(query)
    }

    pub fn load_extra_info(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<ExtraInfoRecord>, diesel::result::Error> {
        let ops = ExtraInfoOperations::new(&self.pool);
        ops.load(ids)
    }

    // Rate limit operations
    pub fn record_request(
        &self,
        ip: &str,
        now: i64,
        window_length: i64,
    ) -> Result<i32, diesel::result::Error> {
        let ops = RateLimitOperations::new(&self.pool);
        ops.record_request(ip, now, window_length)
    }

    pub fn get_rate_limit(&self, ip: &str) -> Result<Option<ApiRateLimit>, diesel::result::Error> {
        let ops = RateLimitOperations::new(&self.pool);
        ops.get(ip)
    }
}

impl PackageStore for DatabaseService {
    fn packages(&self, query: &PackageQuery) -> Result<Vec<PackageRow>, diesel::result::Error> {
        self.load_packages(query)
    }

    fn extra_info(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<ExtraInfoRecord>, diesel::result::Error> {
        self.load_extra_info(ids)
    }

    fn package_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        PackageOperations::new(&self.pool).package_names_with_prefix(prefix, limit)
    }

    fn package_base_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        PackageOperations::new(&self.pool).package_base_names_with_prefix(prefix, limit)
    }
}
