use crate::schema::{package_bases, packages};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Nullable, Text};

// Package base model - the source-control unit owning one or more packages
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = package_bases)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PackageBase {
    pub id: i32,
    pub name: String,
    pub num_votes: i32,
    pub popularity: f64,
    pub popularity_updated: i64,
    pub out_of_date_ts: Option<i64>,
    pub submitted_ts: i64,
    pub modified_ts: i64,
    pub submitter_uid: Option<i32>,
    pub maintainer_uid: Option<i32>,
    pub packager_uid: Option<i32>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_bases)]
pub struct NewPackageBase {
    pub name: String,
    pub num_votes: i32,
    pub popularity: f64,
    pub popularity_updated: i64,
    pub out_of_date_ts: Option<i64>,
    pub submitted_ts: i64,
    pub modified_ts: i64,
    pub submitter_uid: Option<i32>,
    pub maintainer_uid: Option<i32>,
    pub packager_uid: Option<i32>,
}

impl NewPackageBase {
    pub fn new(name: &str, maintainer_uid: Option<i32>, submitter_uid: Option<i32>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            name: name.to_string(),
            num_votes: 0,
            popularity: 0.0,
            popularity_updated: now,
            out_of_date_ts: None,
            submitted_ts: now,
            modified_ts: now,
            submitter_uid,
            maintainer_uid,
            packager_uid: maintainer_uid,
        }
    }
}

// Package model - an installable package produced by a base
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Package {
    pub id: i32,
    pub package_base_id: i32,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = packages)]
pub struct NewPackage {
    pub package_base_id: i32,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl NewPackage {
    pub fn new(package_base_id: i32, name: &str, version: &str) -> Self {
        Self {
            package_base_id,
            name: name.to_string(),
            version: version.to_string(),
            description: None,
            url: None,
        }
    }
}

/// The RPC projection of a package joined with its base, maintainer and
/// submitter. Field names match the column aliases of the projection query.
#[derive(QueryableByName, Debug, Clone, PartialEq)]
pub struct PackageRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub version: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub description: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub url: Option<String>,
    #[diesel(sql_type = Integer)]
    pub package_base_id: i32,
    #[diesel(sql_type = Text)]
    pub package_base_name: String,
    #[diesel(sql_type = Integer)]
    pub num_votes: i32,
    #[diesel(sql_type = Double)]
    pub popularity: f64,
    #[diesel(sql_type = BigInt)]
    pub popularity_updated: i64,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub out_of_date_ts: Option<i64>,
    #[diesel(sql_type = BigInt)]
    pub submitted_ts: i64,
    #[diesel(sql_type = BigInt)]
    pub modified_ts: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pub maintainer: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub submitter: Option<String>,
}

/// A single name column, used by the suggestion queries.
#[derive(QueryableByName, Debug, Clone, PartialEq)]
pub struct NameRow {
    #[diesel(sql_type = Text)]
    pub name: String,
}
