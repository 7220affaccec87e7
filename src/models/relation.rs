use crate::schema::{
    groups, licenses, package_comaintainers, package_depends, package_groups, package_keywords,
    package_licenses, package_relations,
};
use diesel::prelude::*;
use diesel::sql_types::{Integer, Nullable, Text};

/// Rows of `dependency_types`, seeded by the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Depends,
    MakeDepends,
    CheckDepends,
    OptDepends,
}

impl DependencyKind {
    pub fn id(self) -> i32 {
        match self {
            DependencyKind::Depends => 1,
            DependencyKind::MakeDepends => 2,
            DependencyKind::CheckDepends => 3,
            DependencyKind::OptDepends => 4,
        }
    }

    /// Name as stored in `dependency_types.name`.
    pub fn name(self) -> &'static str {
        match self {
            DependencyKind::Depends => "depends",
            DependencyKind::MakeDepends => "makedepends",
            DependencyKind::CheckDepends => "checkdepends",
            DependencyKind::OptDepends => "optdepends",
        }
    }
}

/// Rows of `relation_types`, seeded by the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Conflicts,
    Provides,
    Replaces,
}

impl RelationKind {
    pub fn id(self) -> i32 {
        match self {
            RelationKind::Conflicts => 1,
            RelationKind::Provides => 2,
            RelationKind::Replaces => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RelationKind::Conflicts => "conflicts",
            RelationKind::Provides => "provides",
            RelationKind::Replaces => "replaces",
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_depends)]
pub struct NewPackageDependency {
    pub package_id: i32,
    pub dep_type_id: i32,
    pub dep_name: String,
    pub dep_condition: Option<String>,
}

impl NewPackageDependency {
    pub fn new(package_id: i32, kind: DependencyKind, name: &str, condition: Option<&str>) -> Self {
        Self {
            package_id,
            dep_type_id: kind.id(),
            dep_name: name.to_string(),
            dep_condition: condition.map(str::to_string),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_relations)]
pub struct NewPackageRelation {
    pub package_id: i32,
    pub rel_type_id: i32,
    pub rel_name: String,
    pub rel_condition: Option<String>,
}

impl NewPackageRelation {
    pub fn new(package_id: i32, kind: RelationKind, name: &str, condition: Option<&str>) -> Self {
        Self {
            package_id,
            rel_type_id: kind.id(),
            rel_name: name.to_string(),
            rel_condition: condition.map(str::to_string),
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = licenses)]
pub struct NewLicense {
    pub name: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_licenses)]
pub struct PackageLicense {
    pub package_id: i32,
    pub license_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    pub name: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_groups)]
pub struct PackageGroup {
    pub package_id: i32,
    pub group_id: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_keywords)]
pub struct PackageKeyword {
    pub package_base_id: i32,
    pub keyword: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = package_comaintainers)]
pub struct NewPackageComaintainer {
    pub users_id: i32,
    pub package_base_id: i32,
    pub priority: i32,
}

/// One row of the batched extra-info query: `(package, type label, name, condition)`.
#[derive(QueryableByName, Debug, Clone, PartialEq)]
pub struct ExtraInfoRecord {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub kind: String,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub cond: Option<String>,
}

impl ExtraInfoRecord {
    pub fn new(id: i32, kind: &str, name: &str, cond: Option<&str>) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            name: name.to_string(),
            cond: cond.map(str::to_string),
        }
    }
}
