use super::extra_info::ExtraInfo;
use crate::config::AppConfig;
use crate::error::RpcError;
use crate::models::PackageRow;
use md5::{Digest, Md5};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value, json};

const SECONDS_PER_DAY: f64 = 86400.0;
const DAILY_DECAY: f64 = 0.98;

/// Popularity decayed from its last recalculation up to `now`.
pub fn decayed_popularity(row: &PackageRow, now: i64) -> f64 {
    let elapsed = (now - row.popularity_updated).max(0) as f64;
    row.popularity * DAILY_DECAY.powf(elapsed / SECONDS_PER_DAY)
}

/// Rounds to six decimals. Zero is rendered as the integer `0`.
pub fn popularity_value(popularity: f64) -> Value {
    let rounded = (popularity * 1e6).round() / 1e6;
    if rounded == 0.0 || !rounded.is_finite() {
        return json!(0);
    }
    json!(rounded)
}

/// Fields shared by search and info results.
pub fn package_json(row: &PackageRow, config: &AppConfig, now: i64) -> Map<String, Value> {
    let mut package = Map::new();
    package.insert("ID".into(), json!(row.id));
    package.insert("Name".into(), json!(row.name));
    package.insert("PackageBaseID".into(), json!(row.package_base_id));
    package.insert("PackageBase".into(), json!(row.package_base_name));
    package.insert("Version".into(), json!(row.version));
    package.insert("Description".into(), json!(row.description));
    package.insert("URL".into(), json!(row.url));
    package.insert(
        "URLPath".into(),
        json!(config.snapshot_path(&row.package_base_name)),
    );
    package.insert("NumVotes".into(), json!(row.num_votes));
    package.insert(
        "Popularity".into(),
        popularity_value(decayed_popularity(row, now)),
    );
    package.insert("OutOfDate".into(), json!(row.out_of_date_ts));
    package.insert("Maintainer".into(), json!(row.maintainer));
    package.insert("Submitter".into(), json!(row.submitter));
    package.insert("FirstSubmitted".into(), json!(row.submitted_ts));
    package.insert("LastModified".into(), json!(row.modified_ts));
    package
}

pub fn search_json(row: &PackageRow, config: &AppConfig, now: i64) -> Value {
    let mut package = package_json(row, config, now);
    package.remove("Submitter");
    Value::Object(package)
}

/// Info results always carry `License` and `Keywords`; other lists appear
/// only when the package has entries for them.
pub fn info_json(row: &PackageRow, extra: &ExtraInfo, config: &AppConfig, now: i64) -> Value {
    let mut package = package_json(row, config, now);
    package.insert("License".into(), json!([]));
    package.insert("Keywords".into(), json!([]));
    if let Some(lists) = extra.get(&row.id) {
        for (label, entries) in lists {
            package.insert(label.clone(), json!(entries));
        }
    }
    Value::Object(package)
}

pub fn envelope(version: Option<i64>, type_name: &str, results: Vec<Value>) -> Value {
    json!({
        "version": version,
        "type": type_name,
        "resultcount": results.len(),
        "results": results,
    })
}

pub fn error_envelope(version: Option<i64>, error: &RpcError) -> Value {
    json!({
        "version": version,
        "results": [],
        "resultcount": 0,
        "type": "error",
        "error": error.to_string(),
    })
}

/// Serializes objects with their keys in lexicographic order at every
/// nesting level, independent of the map type `serde_json` was built with.
struct Canonical<'a>(&'a Value);

impl Serialize for Canonical<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &Canonical(value))?;
                }
                out.end()
            }
            Value::Array(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(&Canonical(item))?;
                }
                out.end()
            }
            other => other.serialize(serializer),
        }
    }
}

pub fn to_canonical_json(value: &Value) -> serde_json::Result<String> {
    serde_json::to_string(&Canonical(value))
}

/// MD5 hex digest of a serialized body.
pub fn etag(body: &str) -> String {
    format!("{:x}", Md5::digest(body.as_bytes()))
}
