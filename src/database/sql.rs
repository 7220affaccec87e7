//! A small composer for the raw `SELECT` statements the RPC queries need.
//!
//! The package projection joins a fixed set of aliased tables and is combined
//! with `UNION`, which the typed query DSL cannot express for raw projections.
//! Every value goes through a bind parameter; only table and column
//! expressions chosen by this crate are ever formatted into the SQL text.

use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::{BigInt, Text};
use diesel::sqlite::Sqlite;

/// A value bound to one `?` placeholder, in the order the placeholders appear.
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Text(String),
    Int(i64),
}

impl From<&str> for Bind {
    fn from(value: &str) -> Self {
        Bind::Text(value.to_string())
    }
}

impl From<String> for Bind {
    fn from(value: String) -> Self {
        Bind::Text(value)
    }
}

impl From<i64> for Bind {
    fn from(value: i64) -> Self {
        Bind::Int(value)
    }
}

impl From<i32> for Bind {
    fn from(value: i32) -> Self {
        Bind::Int(i64::from(value))
    }
}

/// One `SELECT` statement under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    distinct: bool,
    columns: Vec<String>,
    from: String,
    joins: Vec<String>,
    conditions: Vec<String>,
    group_by: Vec<String>,
    binds: Vec<Bind>,
}

impl Select {
    pub fn from(table: &str) -> Self {
        Self {
            from: table.to_string(),
            ..Self::default()
        }
    }

    pub fn project(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn join_on(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("INNER JOIN {table} ON {on}"));
        self
    }

    pub fn left_join_on(mut self, table: &str, on: &str) -> Self {
        self.joins.push(format!("LEFT JOIN {table} ON {on}"));
        self
    }

    /// Adds an `AND`ed condition. `binds` must match the `?` count of `condition`.
    pub fn filter<I>(mut self, condition: &str, binds: I) -> Self
    where
        I: IntoIterator<Item = Bind>,
    {
        self.conditions.push(condition.to_string());
        self.binds.extend(binds);
        self
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_by.push(column.to_string());
        self
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }
        sql
    }

    pub fn binds(&self) -> &[Bind] {
        &self.binds
    }
}

/// Several selects glued by `UNION` / `UNION ALL`, with an optional leading
/// `WITH` clause and a trailing `ORDER BY` / `LIMIT` over the combined rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    with: Option<(String, Vec<Bind>)>,
    parts: Vec<Select>,
    all: bool,
    order_by: Option<String>,
    limit: Option<i64>,
}

impl Compound {
    pub fn single(select: Select) -> Self {
        Self::union(vec![select])
    }

    /// Set union: duplicate rows across parts are removed.
    pub fn union(parts: Vec<Select>) -> Self {
        Self {
            parts,
            ..Self::default()
        }
    }

    pub fn union_all(parts: Vec<Select>) -> Self {
        Self {
            parts,
            all: true,
            ..Self::default()
        }
    }

    /// Prepends `WITH <clause>`; its binds come before those of the parts.
    pub fn with(mut self, clause: &str, binds: Vec<Bind>) -> Self {
        self.with = Some((clause.to_string(), binds));
        self
    }

    pub fn order_by(mut self, expression: &str) -> Self {
        self.order_by = Some(expression.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Renders the statement and the binds in placeholder order.
    pub fn build(&self) -> (String, Vec<Bind>) {
        let mut sql = String::new();
        let mut binds = Vec::new();

        if let Some((clause, with_binds)) = &self.with {
            sql.push_str("WITH ");
            sql.push_str(clause);
            sql.push(' ');
            binds.extend(with_binds.iter().cloned());
        }

        let glue = if self.all { " UNION ALL " } else { " UNION " };
        let rendered: Vec<String> = self.parts.iter().map(Select::to_sql).collect();
        sql.push_str(&rendered.join(glue));
        for part in &self.parts {
            binds.extend(part.binds().iter().cloned());
        }

        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            binds.push(Bind::Int(limit));
        }

        (sql, binds)
    }

    /// Renders and binds the statement, ready for `.load::<T>()` into a
    /// `QueryableByName` type.
    pub fn into_query(self) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
        let (sql, binds) = self.build();
        bind_all(sql, binds)
    }
}

/// `?, ?, ?` for `count` placeholders.
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub fn bind_all(sql: String, binds: Vec<Bind>) -> BoxedSqlQuery<'static, Sqlite, SqlQuery> {
    let mut query = diesel::sql_query(sql).into_boxed::<Sqlite>();
    for bind in binds {
        query = match bind {
            Bind::Text(value) => query.bind::<Text, _>(value),
            Bind::Int(value) => query.bind::<BigInt, _>(value),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_rendering() {
        let select = Select::from("packages p")
            .project(&["p.id AS id", "p.name AS name"])
            .join_on("package_bases pb", "pb.id = p.package_base_id")
            .left_join_on("users m", "m.id = pb.maintainer_uid")
            .filter("p.name = ?", [Bind::from("foo")])
            .filter("m.username = ?", [Bind::from("bob")])
            .group_by("p.id");

        assert_eq!(
            select.to_sql(),
            "SELECT p.id AS id, p.name AS name FROM packages p \
             INNER JOIN package_bases pb ON pb.id = p.package_base_id \
             LEFT JOIN users m ON m.id = pb.maintainer_uid \
             WHERE p.name = ? AND m.username = ? GROUP BY p.id"
        );
        assert_eq!(select.binds(), &[Bind::from("foo"), Bind::from("bob")]);
    }

    #[test]
    fn test_compound_bind_order() {
        let first = Select::from("a").project(&["x AS name"]).filter("x = ?", [Bind::from("1")]);
        let second = Select::from("b").project(&["y AS name"]).filter("y = ?", [Bind::from("2")]);
        let (sql, binds) = Compound::union(vec![first, second])
            .with("ids(id) AS (VALUES (?))", vec![Bind::from(7i32)])
            .order_by("name")
            .limit(5)
            .build();

        assert_eq!(
            sql,
            "WITH ids(id) AS (VALUES (?)) SELECT x AS name FROM a WHERE x = ? \
             UNION SELECT y AS name FROM b WHERE y = ? ORDER BY name LIMIT ?"
        );
        assert_eq!(
            binds,
            vec![Bind::Int(7), Bind::from("1"), Bind::from("2"), Bind::Int(5)]
        );
    }

    #[test]
    fn test_union_all_and_distinct() {
        let part = Select::from("t").distinct().project(&["a"]);
        let (sql, binds) = Compound::union_all(vec![part.clone(), part]).build();
        assert_eq!(sql, "SELECT DISTINCT a FROM t UNION ALL SELECT DISTINCT a FROM t");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
