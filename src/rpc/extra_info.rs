use super::store::PackageStore;
use crate::models::ExtraInfoRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Per-package lists keyed by their public label, e.g. `Depends` or `License`.
pub type ExtraInfo = BTreeMap<i32, BTreeMap<String, Vec<String>>>;

/// Maps stored type names to the keys used in info results. Labels that are
/// already public pass through unchanged.
pub fn public_label(kind: &str) -> &str {
    match kind {
        "depends" => "Depends",
        "makedepends" => "MakeDepends",
        "checkdepends" => "CheckDepends",
        "optdepends" => "OptDepends",
        "conflicts" => "Conflicts",
        "provides" => "Provides",
        "replaces" => "Replaces",
        other => other,
    }
}

/// Groups records per package and label. A condition is appended to the
/// entry name verbatim, so `("glibc", ">=2.0")` becomes `glibc>=2.0`.
pub fn group_records(records: Vec<ExtraInfoRecord>) -> ExtraInfo {
    let mut grouped = ExtraInfo::new();
    for record in records {
        let entry = match record.cond.as_deref() {
            Some(cond) => format!("{}{}", record.name, cond),
            None => record.name,
        };
        let list = grouped
            .entry(record.id)
            .or_default()
            .entry(public_label(&record.kind).to_string())
            .or_default();
        if !list.contains(&entry) {
            list.push(entry);
        }
    }
    grouped
}

pub fn load_extra_info<S>(store: &S, ids: &BTreeSet<i32>) -> Result<ExtraInfo, diesel::result::Error>
where
    S: PackageStore + ?Sized,
{
    if ids.is_empty() {
        return Ok(ExtraInfo::new());
    }
    Ok(group_records(store.extra_info(ids)?))
}
