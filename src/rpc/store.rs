use super::query::PackageQuery;
use crate::models::{ExtraInfoRecord, PackageRow};
use std::collections::BTreeSet;

/// Read access the RPC engine needs from package storage.
pub trait PackageStore {
    /// Rows matching `query`, ordered by package name.
    fn packages(&self, query: &PackageQuery) -> Result<Vec<PackageRow>, diesel::result::Error>;

    /// Per-package list entries for every id in `ids`, ordered by entry name.
    fn extra_info(&self, ids: &BTreeSet<i32>)
    -> Result<Vec<ExtraInfoRecord>, diesel::result::Error>;

    /// Package names starting with `prefix`, ascending, at most `limit`.
    fn package_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error>;

    /// Package base names starting with `prefix`, ascending, at most `limit`.
    fn package_base_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error>;
}
