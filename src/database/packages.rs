use super::connection::{DbPool, checkout};
use super::sql::{Bind, Compound, Select, placeholders};
use crate::models::package::{NameRow, PackageRow};
use crate::rpc::query::{PackageQuery, Predicate};
use diesel::prelude::*;

/// Columns of the RPC projection, aliased to the fields of [`PackageRow`].
const PROJECTION: &[&str] = &[
    "p.id AS id",
    "p.name AS name",
    "p.version AS version",
    "p.description AS description",
    "p.url AS url",
    "pb.id AS package_base_id",
    "pb.name AS package_base_name",
    "pb.num_votes AS num_votes",
    "pb.popularity AS popularity",
    "pb.popularity_updated AS popularity_updated",
    "pb.out_of_date_ts AS out_of_date_ts",
    "pb.submitted_ts AS submitted_ts",
    "pb.modified_ts AS modified_ts",
    "m.username AS maintainer",
    "s.username AS submitter",
];

/// Package lookups backing the RPC request types
pub struct PackageOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> PackageOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Runs a package query against the joined projection, ordered by name.
    pub fn load_packages(
        &self,
        query: &PackageQuery,
    ) -> Result<Vec<PackageRow>, diesel::result::Error> {
        let mut conn = checkout(self.pool)?;
        package_statement(query)
            .into_query()
            .load::<PackageRow>(&mut conn)
    }

    /// Names of packages starting with `prefix`, compared case-sensitively.
    pub fn package_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        let select = Select::from("packages p")
            .project(&["p.name AS name"])
            .join_on("package_bases pb", "pb.id = p.package_base_id")
            .filter("substr(p.name, 1, length(?)) = ?", prefix_binds(prefix));
        self.load_names(select, limit)
    }

    /// Names of package bases starting with `prefix`, compared case-sensitively.
    pub fn package_base_names_with_prefix(
        &self,
        prefix: &str,
        limit: i64,
    ) -> Result<Vec<String>, diesel::result::Error> {
        let select = Select::from("package_bases pb")
            .project(&["pb.name AS name"])
            .filter("substr(pb.name, 1, length(?)) = ?", prefix_binds(prefix));
        self.load_names(select, limit)
    }

    fn load_names(&self, select: Select, limit: i64) -> Result<Vec<String>, diesel::result::Error> {
        let mut conn = checkout(self.pool)?;
        let rows = Compound::single(select)
            .order_by("name ASC")
            .limit(limit)
            .into_query()
            .load::<NameRow>(&mut conn)?;
        Ok(rows.into_iter().map(|row| row.name).collect())
    }
}

fn prefix_binds(prefix: &str) -> [Bind; 2] {
    [Bind::from(prefix), Bind::from(prefix)]
}

fn contains_pattern(needle: &str) -> Bind {
    Bind::Text(format!("%{needle}%"))
}

/// Renders a [`PackageQuery`] as one statement: each branch becomes a select
/// over the projection, branches are `UNION`ed.
pub fn package_statement(query: &PackageQuery) -> Compound {
    let parts = query.branches().iter().map(|branch| branch_select(branch)).collect();
    let compound = Compound::union(parts).order_by("name ASC");
    match query.max_rows() {
        Some(limit) => compound.limit(limit),
        None => compound,
    }
}

fn branch_select(predicates: &[Predicate]) -> Select {
    let mut select = Select::from("packages p")
        .project(PROJECTION)
        .join_on("package_bases pb", "pb.id = p.package_base_id")
        .left_join_on("users m", "m.id = pb.maintainer_uid")
        .left_join_on("users s", "s.id = pb.submitter_uid");

    for (index, predicate) in predicates.iter().enumerate() {
        select = apply_predicate(select, index, predicate);
    }

    // joins above may fan out rows per package
    select.group_by("p.id")
}

fn apply_predicate(select: Select, index: usize, predicate: &Predicate) -> Select {
    match predicate {
        Predicate::NameIn(names) if names.is_empty() => select.filter("1 = 0", []),
        Predicate::NameIn(names) => select.filter(
            &format!("p.name IN ({})", placeholders(names.len())),
            names.iter().map(|name| Bind::from(name.as_str())),
        ),
        Predicate::NameEquals(name) => select.filter("p.name = ?", [Bind::from(name.as_str())]),
        Predicate::NameContains(needle) => select.filter("p.name LIKE ?", [contains_pattern(needle)]),
        Predicate::NameOrDescriptionContains(needle) => select.filter(
            "(p.name LIKE ? OR p.description LIKE ?)",
            [contains_pattern(needle), contains_pattern(needle)],
        ),
        Predicate::MaintainedBy(username) => {
            select.filter("m.username = ?", [Bind::from(username.as_str())])
        }
        Predicate::Orphaned => select.filter("pb.maintainer_uid IS NULL", []),
        Predicate::SubmittedBy(username) => {
            select.filter("s.username = ?", [Bind::from(username.as_str())])
        }
        Predicate::CoMaintainedBy(username) => {
            let pc = format!("pc{index}");
            let cu = format!("cu{index}");
            select
                .join_on(
                    &format!("package_comaintainers {pc}"),
                    &format!("{pc}.package_base_id = pb.id"),
                )
                .join_on(&format!("users {cu}"), &format!("{cu}.id = {pc}.users_id"))
                .filter(&format!("{cu}.username = ?"), [Bind::from(username.as_str())])
        }
        Predicate::Keyword(keyword) => {
            let pk = format!("pk{index}");
            select
                .join_on(
                    &format!("package_keywords {pk}"),
                    &format!("{pk}.package_base_id = pb.id"),
                )
                .filter(&format!("{pk}.keyword = ?"), [Bind::from(keyword.as_str())])
        }
        Predicate::Dependency(kind, name) => {
            let pd = format!("pd{index}");
            select
                .join_on(&format!("package_depends {pd}"), &format!("{pd}.package_id = p.id"))
                .filter(
                    &format!("{pd}.dep_type_id = ? AND {pd}.dep_name = ?"),
                    [Bind::from(kind.id()), Bind::from(name.as_str())],
                )
        }
        Predicate::Relation(kind, name) => {
            let pr = format!("pr{index}");
            select
                .join_on(&format!("package_relations {pr}"), &format!("{pr}.package_id = p.id"))
                .filter(
                    &format!("{pr}.rel_type_id = ? AND {pr}.rel_name = ?"),
                    [Bind::from(kind.id()), Bind::from(name.as_str())],
                )
        }
        Predicate::Group(name) => {
            let pg = format!("pg{index}");
            let g = format!("g{index}");
            select
                .join_on(&format!("package_groups {pg}"), &format!("{pg}.package_id = p.id"))
                .join_on(&format!("\"groups\" {g}"), &format!("{g}.id = {pg}.group_id"))
                .filter(&format!("{g}.name = ?"), [Bind::from(name.as_str())])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RelationKind;
    use std::collections::BTreeSet;

    #[test]
    fn test_name_in_statement() {
        let names: BTreeSet<String> = ["a".to_string(), "b".to_string()].into();
        let (sql, binds) = package_statement(
            &PackageQuery::new().filter(Predicate::NameIn(names)).limit(11),
        )
        .build();

        assert!(sql.contains("WHERE p.name IN (?, ?) GROUP BY p.id"));
        assert!(sql.ends_with("ORDER BY name ASC LIMIT ?"));
        assert_eq!(binds, vec![Bind::from("a"), Bind::from("b"), Bind::Int(11)]);
    }

    #[test]
    fn test_empty_name_in_matches_nothing() {
        let (sql, binds) =
            package_statement(&PackageQuery::new().filter(Predicate::NameIn(BTreeSet::new())))
                .build();
        assert!(sql.contains("WHERE 1 = 0"));
        assert!(binds.is_empty());
    }

    #[test]
    fn test_provides_union_statement() {
        let query = PackageQuery::new()
            .filter(Predicate::Relation(RelationKind::Provides, "x".into()))
            .union(PackageQuery::new().filter(Predicate::NameEquals("x".into())))
            .limit(6);
        let (sql, binds) = package_statement(&query).build();

        assert_eq!(sql.matches(" UNION ").count(), 1);
        assert!(sql.contains("INNER JOIN package_relations pr0 ON pr0.package_id = p.id"));
        assert_eq!(
            binds,
            vec![Bind::Int(2), Bind::from("x"), Bind::from("x"), Bind::Int(6)]
        );
    }

    #[test]
    fn test_search_pattern_is_bound() {
        let (sql, binds) = package_statement(
            &PackageQuery::new().filter(Predicate::NameOrDescriptionContains("it's".into())),
        )
        .build();
        assert!(!sql.contains("it's"));
        assert_eq!(
            binds,
            vec![Bind::from("%it's%"), Bind::from("%it's%")]
        );
    }
}
