use super::query::{PackageQuery, Predicate};
use crate::models::{DependencyKind, RelationKind};

pub const SUPPORTED_VERSIONS: &[i64] = &[5];
pub const DEFAULT_SEARCH_BY: &str = "name-desc";
/// Maximum number of names returned by the suggestion types.
pub const SUGGESTION_LIMIT: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    MultiInfo,
    Search,
    MSearch,
    Suggest,
    SuggestPkgbase,
}

impl RequestType {
    /// Parses a `type` value. `info` is accepted as an alias of `multiinfo`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "info" | "multiinfo" => Some(RequestType::MultiInfo),
            "search" => Some(RequestType::Search),
            "msearch" => Some(RequestType::MSearch),
            "suggest" => Some(RequestType::Suggest),
            "suggest-pkgbase" => Some(RequestType::SuggestPkgbase),
            _ => None,
        }
    }

    /// The value echoed back in the `type` field of the envelope.
    pub fn name(self) -> &'static str {
        match self {
            RequestType::MultiInfo => "multiinfo",
            RequestType::Search => "search",
            RequestType::MSearch => "msearch",
            RequestType::Suggest => "suggest",
            RequestType::SuggestPkgbase => "suggest-pkgbase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    NameDesc,
    Name,
    Maintainer,
    Depends,
    MakeDepends,
    OptDepends,
    CheckDepends,
    Provides,
    Conflicts,
    Replaces,
    Groups,
    Submitter,
    Keywords,
    CoMaintainers,
}

impl SearchBy {
    pub fn parse(raw: &str) -> Option<Self> {
        let by = match raw {
            "name-desc" => SearchBy::NameDesc,
            "name" => SearchBy::Name,
            "maintainer" => SearchBy::Maintainer,
            "depends" => SearchBy::Depends,
            "makedepends" => SearchBy::MakeDepends,
            "optdepends" => SearchBy::OptDepends,
            "checkdepends" => SearchBy::CheckDepends,
            "provides" => SearchBy::Provides,
            "conflicts" => SearchBy::Conflicts,
            "replaces" => SearchBy::Replaces,
            "groups" => SearchBy::Groups,
            "submitter" => SearchBy::Submitter,
            "keywords" => SearchBy::Keywords,
            "comaintainers" => SearchBy::CoMaintainers,
            _ => return None,
        };
        Some(by)
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchBy::NameDesc => "name-desc",
            SearchBy::Name => "name",
            SearchBy::Maintainer => "maintainer",
            SearchBy::Depends => "depends",
            SearchBy::MakeDepends => "makedepends",
            SearchBy::OptDepends => "optdepends",
            SearchBy::CheckDepends => "checkdepends",
            SearchBy::Provides => "provides",
            SearchBy::Conflicts => "conflicts",
            SearchBy::Replaces => "replaces",
            SearchBy::Groups => "groups",
            SearchBy::Submitter => "submitter",
            SearchBy::Keywords => "keywords",
            SearchBy::CoMaintainers => "comaintainers",
        }
    }

    /// Short code of the internal search field, as used in search logs.
    pub fn code(self) -> &'static str {
        match self {
            SearchBy::NameDesc => "nd",
            SearchBy::Name => "n",
            SearchBy::Maintainer => "m",
            SearchBy::Submitter => "s",
            SearchBy::Keywords => "k",
            SearchBy::CoMaintainers => "c",
            other => other.name(),
        }
    }

    /// Builds the query for searching `arg` by this field.
    ///
    /// An empty maintainer argument selects orphaned packages. The provides
    /// search also matches packages literally named `arg`.
    pub fn query(self, arg: &str) -> PackageQuery {
        let owned = arg.to_string();
        let predicate = match self {
            SearchBy::NameDesc => Predicate::NameOrDescriptionContains(owned),
            SearchBy::Name => Predicate::NameContains(owned),
            SearchBy::Maintainer if arg.is_empty() => Predicate::Orphaned,
            SearchBy::Maintainer => Predicate::MaintainedBy(owned),
            SearchBy::Submitter => Predicate::SubmittedBy(owned),
            SearchBy::CoMaintainers => Predicate::CoMaintainedBy(owned),
            SearchBy::Keywords => Predicate::Keyword(owned),
            SearchBy::Groups => Predicate::Group(owned),
            SearchBy::Depends => Predicate::Dependency(DependencyKind::Depends, owned),
            SearchBy::MakeDepends => Predicate::Dependency(DependencyKind::MakeDepends, owned),
            SearchBy::OptDepends => Predicate::Dependency(DependencyKind::OptDepends, owned),
            SearchBy::CheckDepends => Predicate::Dependency(DependencyKind::CheckDepends, owned),
            SearchBy::Conflicts => Predicate::Relation(RelationKind::Conflicts, owned),
            SearchBy::Replaces => Predicate::Relation(RelationKind::Replaces, owned),
            SearchBy::Provides => {
                return PackageQuery::new()
                    .filter(Predicate::Relation(RelationKind::Provides, owned.clone()))
                    .union(PackageQuery::new().filter(Predicate::NameEquals(owned)));
            }
        };
        PackageQuery::new().filter(predicate)
    }
}
