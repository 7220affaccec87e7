use crate::models::{DependencyKind, RelationKind};
use std::collections::BTreeSet;

/// A single restriction on the package projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    NameIn(BTreeSet<String>),
    NameEquals(String),
    NameContains(String),
    NameOrDescriptionContains(String),
    MaintainedBy(String),
    /// Package bases without a maintainer.
    Orphaned,
    SubmittedBy(String),
    CoMaintainedBy(String),
    Keyword(String),
    Dependency(DependencyKind, String),
    Relation(RelationKind, String),
    Group(String),
}

/// A storage-agnostic package query.
///
/// Predicates added with [`PackageQuery::filter`] are `AND`ed. Queries joined
/// with [`PackageQuery::union`] are combined as a set union on package id.
/// Results are always ordered by package name.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageQuery {
    branches: Vec<Vec<Predicate>>,
    limit: Option<i64>,
}

impl Default for PackageQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageQuery {
    pub fn new() -> Self {
        Self {
            branches: vec![Vec::new()],
            limit: None,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        if let Some(branch) = self.branches.last_mut() {
            branch.push(predicate);
        }
        self
    }

    pub fn union(mut self, other: PackageQuery) -> Self {
        self.branches.extend(other.branches);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn branches(&self) -> &[Vec<Predicate>] {
        &self.branches
    }

    pub fn max_rows(&self) -> Option<i64> {
        self.limit
    }
}
