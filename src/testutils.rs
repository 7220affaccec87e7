use crate::models::{
    DependencyKind, ExtraInfoRecord, Package, PackageBase, PackageRow, RelationKind,
};
use crate::rpc::query::{PackageQuery, Predicate};
use crate::rpc::store::PackageStore;
use std::collections::BTreeSet;

/// In-memory [`PackageStore`] with the same matching rules as the SQL
/// implementation: substring searches ignore ASCII case, everything else is
/// exact, prefixes are case-sensitive.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Vec<(i32, String)>,
    bases: Vec<PackageBase>,
    packages: Vec<Package>,
    depends: Vec<(i32, DependencyKind, String, Option<String>)>,
    relations: Vec<(i32, RelationKind, String, Option<String>)>,
    licenses: Vec<(i32, String)>,
    groups: Vec<(i32, String)>,
    keywords: Vec<(i32, String)>,
    comaintainers: Vec<(i32, i32)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, username: &str) -> i32 {
        let id = self.users.len() as i32 + 1;
        self.users.push((id, username.to_string()));
        id
    }

    pub fn add_base(&mut self, name: &str, maintainer: Option<i32>, submitter: Option<i32>) -> i32 {
        let id = self.bases.len() as i32 + 1;
        self.bases.push(PackageBase {
            id,
            name: name.to_string(),
            num_votes: 0,
            popularity: 0.0,
            popularity_updated: 0,
            out_of_date_ts: None,
            submitted_ts: 0,
            modified_ts: 0,
            submitter_uid: submitter,
            maintainer_uid: maintainer,
            packager_uid: maintainer,
        });
        id
    }

    pub fn add_package(&mut self, base_id: i32, name: &str, version: &str) -> i32 {
        let id = self.packages.len() as i32 + 1;
        self.packages.push(Package {
            id,
            package_base_id: base_id,
            name: name.to_string(),
            version: version.to_string(),
            description: None,
            url: None,
        });
        id
    }

    pub fn add_dependency(
        &mut self,
        package_id: i32,
        kind: DependencyKind,
        name: &str,
        cond: Option<&str>,
    ) {
        self.depends
            .push((package_id, kind, name.to_string(), cond.map(str::to_string)));
    }

    pub fn add_relation(&mut self, package_id: i32, kind: RelationKind, name: &str, cond: Option<&str>) {
        self.relations
            .push((package_id, kind, name.to_string(), cond.map(str::to_string)));
    }

    pub fn add_license(&mut self, package_id: i32, name: &str) {
        self.licenses.push((package_id, name.to_string()));
    }

    pub fn add_group(&mut self, package_id: i32, name: &str) {
        self.groups.push((package_id, name.to_string()));
    }

    pub fn add_keyword(&mut self, base_id: i32, keyword: &str) {
        self.keywords.push((base_id, keyword.to_string()));
    }

    pub fn add_comaintainer(&mut self, base_id: i32, user_id: i32) {
        self.comaintainers.push((base_id, user_id));
    }

    fn username(&self, uid: Option<i32>) -> Option<&str> {
        let uid = uid?;
        self.users
            .iter()
            .find(|(id, _)| *id == uid)
            .map(|(_, name)| name.as_str())
    }

    fn base(&self, id: i32) -> Option<&PackageBase> {
        self.bases.iter().find(|base| base.id == id)
    }

    fn row(&self, package: &Package, base: &PackageBase) -> PackageRow {
        PackageRow {
            id: package.id,
            name: package.name.clone(),
            version: package.version.clone(),
            description: package.description.clone(),
            url: package.url.clone(),
            package_base_id: base.id,
            package_base_name: base.name.clone(),
            num_votes: base.num_votes,
            popularity: base.popularity,
            popularity_updated: base.popularity_updated,
            out_of_date_ts: base.out_of_date_ts,
            submitted_ts: base.submitted_ts,
            modified_ts: base.modified_ts,
            maintainer: self.username(base.maintainer_uid).map(str::to_string),
            submitter: self.username(base.submitter_uid).map(str::to_string),
        }
    }

    fn matches(&self, package: &Package, base: &PackageBase, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::NameIn(names) => names.contains(&package.name),
            Predicate::NameEquals(name) => &package.name == name,
            Predicate::NameContains(needle) => contains_ignore_case(&package.name, needle),
            Predicate::NameOrDescriptionContains(needle) => {
                contains_ignore_case(&package.name, needle)
                    || package
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ignore_case(d, needle))
            }
            Predicate::MaintainedBy(user) => self.username(base.maintainer_uid) == Some(user.as_str()),
            Predicate::Orphaned => base.maintainer_uid.is_none(),
            Predicate::SubmittedBy(user) => self.username(base.submitter_uid) == Some(user.as_str()),
            Predicate::CoMaintainedBy(user) => self
                .comaintainers
                .iter()
                .any(|(b, uid)| *b == base.id && self.username(Some(*uid)) == Some(user.as_str())),
            Predicate::Keyword(keyword) => self
                .keywords
                .iter()
                .any(|(b, k)| *b == base.id && k == keyword),
            Predicate::Dependency(kind, name) => self
                .depends
                .iter()
                .any(|(p, k, n, _)| *p == package.id && k == kind && n == name),
            Predicate::Relation(kind, name) => self
                .relations
                .iter()
                .any(|(p, k, n, _)| *p == package.id && k == kind && n == name),
            Predicate::Group(name) => self
                .groups
                .iter()
                .any(|(p, g)| *p == package.id && g == name),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

fn with_prefix<'a, I>(names: I, prefix: &str, limit: i64) -> Vec<String>
where
    I: Iterator<Item = &'a String>,
{
    let mut matched: Vec<String> = names.filter(|n| n.starts_with(prefix)).cloned().collect();
    matched.sort();
    matched.truncate(limit.max(0) as usize);
    matched
}

impl PackageStore for MemoryStore {
    fn packages(&self, query: &PackageQuery) -> Result<Vec<PackageRow>, diesel::result::Error> {
        let mut rows: Vec<PackageRow> = self
            .packages
            .iter()
            .filter_map(|package| {
                let base = self.base(package.package_base_id)?;
                let hit = query.branches().iter().any(|branch| {
                    branch
                        .iter()
                        .all(|predicate| self.matches(package, base, predicate))
                });
                hit.then(|| self.row(package, base))
            })
            .collect();

        rows.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(limit) = query.max_rows() {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows)
    }

    fn extra_info(
        &self,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<ExtraInfoRecord>, diesel::result::Error> {
        let mut records = Vec::new();

        for (p, kind, name, cond) in &self.depends {
            if ids.contains(p) {
                records.push(ExtraInfoRecord::new(*p, kind.name(), name, cond.as_deref()));
            }
        }
        for (p, kind, name, cond) in &self.relations {
            if ids.contains(p) {
                records.push(ExtraInfoRecord::new(*p, kind.name(), name, cond.as_deref()));
            }
        }
        for (p, name) in &self.groups {
            if ids.contains(p) {
                records.push(ExtraInfoRecord::new(*p, "Groups", name, None));
            }
        }
        for (p, name) in &self.licenses {
            if ids.contains(p) {
                records.push(ExtraInfoRecord::new(*p, "License", name, None));
            }
        }
        for package in self.packages.iter().filter(|p| ids.contains(&p.id)) {
            for (_, keyword) in self
                .keywords
                .iter()
                .filter(|(b, _)| *b == package.package_base_id)
            {
                records.push(ExtraInfoRecord::new(package.id, "Keywords", keyword, None));
            }
            for (_, uid) in self
                .comaintainers
                .iter()
                .filter(|(b, _)| *b == package.package_base_id)
            {
                if let Some(username) = self.username(Some(*uid)) {
                    records.push(ExtraInfoRecord::new(package.id, "CoMaintainers", username, None));
                }
            }
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }

    fn package_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        Ok(with_prefix(self.packages.iter().map(|p| &p.name), prefix, limit))
    }

    fn package_base_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        Ok(with_prefix(self.bases.iter().map(|b| &b.name), prefix, limit))
    }
}
