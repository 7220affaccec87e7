use super::connection::{DbPool, checkout};
use super::sql::{Bind, Compound, Select};
use crate::models::ExtraInfoRecord;
use diesel::prelude::*;
use std::collections::BTreeSet;

const REQUESTED: &str = "IN (SELECT id FROM requested)";

/// Batched loader for the per-package lists of the info response
pub struct ExtraInfoOperations<'a> {
    pool: &'a DbPool,
}

impl<'a> ExtraInfoOperations<'a> {
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Loads dependencies, relations, groups, licenses, keywords and
    /// co-maintainers of every package in `ids` with a single statement.
    pub fn load(&self, ids: &BTreeSet<i32>) -> Result<Vec<ExtraInfoRecord>, diesel::result::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = checkout(self.pool)?;
        extra_info_statement(ids)
            .into_query()
            .load::<ExtraInfoRecord>(&mut conn)
    }
}

pub fn extra_info_statement(ids: &BTreeSet<i32>) -> Compound {
    let values = vec!["(?)"; ids.len()].join(", ");
    let binds = ids.iter().map(|id| Bind::from(*id)).collect();

    let members = vec![
        Select::from("package_depends pd")
            .distinct()
            .project(&[
                "pd.package_id AS id",
                "dt.name AS kind",
                "pd.dep_name AS name",
                "pd.dep_condition AS cond",
            ])
            .join_on("dependency_types dt", "dt.id = pd.dep_type_id")
            .filter(&format!("pd.package_id {REQUESTED}"), []),
        Select::from("package_relations pr")
            .distinct()
            .project(&[
                "pr.package_id AS id",
                "rt.name AS kind",
                "pr.rel_name AS name",
                "pr.rel_condition AS cond",
            ])
            .join_on("relation_types rt", "rt.id = pr.rel_type_id")
            .filter(&format!("pr.package_id {REQUESTED}"), []),
        Select::from("package_groups pg")
            .distinct()
            .project(&[
                "pg.package_id AS id",
                "'Groups' AS kind",
                "g.name AS name",
                "NULL AS cond",
            ])
            .join_on("\"groups\" g", "g.id = pg.group_id")
            .filter(&format!("pg.package_id {REQUESTED}"), []),
        Select::from("package_licenses pl")
            .distinct()
            .project(&[
                "pl.package_id AS id",
                "'License' AS kind",
                "l.name AS name",
                "NULL AS cond",
            ])
            .join_on("licenses l", "l.id = pl.license_id")
            .filter(&format!("pl.package_id {REQUESTED}"), []),
        Select::from("packages p")
            .distinct()
            .project(&[
                "p.id AS id",
                "'Keywords' AS kind",
                "pk.keyword AS name",
                "NULL AS cond",
            ])
            .join_on("package_keywords pk", "pk.package_base_id = p.package_base_id")
            .filter(&format!("p.id {REQUESTED}"), []),
        Select::from("packages p")
            .distinct()
            .project(&[
                "p.id AS id",
                "'CoMaintainers' AS kind",
                "u.username AS name",
                "NULL AS cond",
            ])
            .join_on(
                "package_comaintainers pc",
                "pc.package_base_id = p.package_base_id",
            )
            .join_on("users u", "u.id = pc.users_id")
            .filter(&format!("p.id {REQUESTED}"), []),
    ];

    Compound::union_all(members)
        .with(&format!("requested(id) AS (VALUES {values})"), binds)
        .order_by("name ASC")
}
