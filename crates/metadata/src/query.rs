//! Incremental SQL construction with automatic placeholder numbering.
//!
//! Listing queries are assembled from a variable combination of clauses
//! (search x ownership x box x sort). Tracking positional argument indices by
//! hand across those combinations is where off-by-one bugs live, so every
//! clause goes through [`QueryBuilder::add_condition`], which renumbers `?`
//! markers into the target database's native positional syntax and keeps the
//! argument list in lockstep.

use stampkeeper_core::listing::{OwnedFilter, SortDirection, SortKey};
use uuid::Uuid;

/// Target database flavor. Controls positional-parameter syntax and the
/// expressions used for numeric-aware catalog sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Native syntax for the `n`-th positional parameter (1-based).
    fn placeholder(self, n: usize) -> String {
        match self {
            Self::Sqlite => format!("?{n}"),
            Self::Postgres => format!("${n}"),
        }
    }

    /// Predicate: does `column` start with a digit?
    fn numeric_prefix_test(self, column: &str) -> String {
        match self {
            Self::Sqlite => format!("{column} GLOB '[0-9]*'"),
            Self::Postgres => format!("{column} ~ '^[0-9]'"),
        }
    }

    /// Expression extracting the leading integer of `column`. NULL (Postgres)
    /// or 0 (SQLite) for non-numeric values; those rows are already grouped
    /// separately by the sort expression, so the value is unused there.
    fn leading_integer(self, column: &str) -> String {
        match self {
            Self::Sqlite => format!("CAST({column} AS INTEGER)"),
            Self::Postgres => format!("CAST(substring({column} from '^[0-9]+') AS BIGINT)"),
        }
    }
}

/// A query argument captured during building, bound by the store when the
/// finished statement executes.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlArg {
    Text(String),
    Int(i64),
    Uuid(Uuid),
    Bool(bool),
}

impl From<&str> for SqlArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SqlArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Uuid> for SqlArg {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<bool> for SqlArg {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Builds one parameterized SQL statement from a base fragment plus
/// conditionally appended clauses.
#[derive(Debug)]
pub struct QueryBuilder {
    dialect: Dialect,
    query: String,
    args: Vec<SqlArg>,
}

impl QueryBuilder {
    /// Start from a base SQL fragment (typically `SELECT ... WHERE ...`).
    /// The base must not contain `?` markers; parameters enter through
    /// [`add_condition`](Self::add_condition).
    pub fn new(dialect: Dialect, base: &str) -> Self {
        Self {
            dialect,
            query: base.to_string(),
            args: Vec::new(),
        }
    }

    /// Append `fragment`, replacing each `?` marker left to right with the
    /// next native placeholder and recording `args` in the same order. With
    /// empty `args` the fragment is appended verbatim (static clauses).
    ///
    /// # Panics
    ///
    /// Panics when the `?` count in `fragment` differs from `args.len()`.
    /// A mismatch is a programmer error in the calling query, not a runtime
    /// condition, and silently mis-numbered parameters would corrupt every
    /// argument after the mismatch.
    pub fn add_condition(&mut self, fragment: &str, args: Vec<SqlArg>) {
        if args.is_empty() {
            self.query.push_str(fragment);
            return;
        }

        let markers = fragment.matches('?').count();
        assert_eq!(
            markers,
            args.len(),
            "placeholder/argument mismatch: {markers} markers for {} arguments in {fragment:?}",
            args.len(),
        );

        let mut rest = fragment;
        for arg in args {
            // Marker count was verified above, so `find` cannot fail here.
            let pos = rest.find('?').expect("verified marker present");
            self.query.push_str(&rest[..pos]);
            self.args.push(arg);
            self.query.push_str(&self.dialect.placeholder(self.args.len()));
            rest = &rest[pos + 1..];
        }
        self.query.push_str(rest);
    }

    /// Case-insensitive substring search across name, scott_number, and
    /// series. No-op when `term` is empty.
    pub fn add_search_filter(&mut self, term: &str, alias: &str) {
        if term.is_empty() {
            return;
        }
        let pattern = format!("%{term}%");
        self.add_condition(
            &format!(
                " AND (LOWER({alias}.name) LIKE LOWER(?) \
                 OR LOWER({alias}.scott_number) LIKE LOWER(?) \
                 OR LOWER({alias}.series) LIKE LOWER(?))"
            ),
            vec![
                SqlArg::Text(pattern.clone()),
                SqlArg::Text(pattern.clone()),
                SqlArg::Text(pattern),
            ],
        );
    }

    /// Restrict to rows whose box reference equals `box_id`. No-op when unset.
    pub fn add_box_filter(&mut self, box_id: Option<Uuid>, alias: &str) {
        if let Some(id) = box_id {
            self.add_condition(&format!(" AND {alias}.box_id = ?"), vec![SqlArg::Uuid(id)]);
        }
    }

    /// HAVING clause over the joined instance count for owned/needed
    /// filtering on an aggregated query. No-op for [`OwnedFilter::Any`].
    pub fn add_owned_filter(&mut self, owned: OwnedFilter, alias: &str) {
        match owned {
            OwnedFilter::Owned => {
                self.add_condition(&format!(" HAVING COUNT({alias}.id) > 0"), vec![]);
            }
            OwnedFilter::Needed => {
                self.add_condition(&format!(" HAVING COUNT({alias}.id) = 0"), vec![]);
            }
            OwnedFilter::Any => {}
        }
    }

    /// Subquery variant of the owned/needed filter for non-aggregated
    /// queries (counts, inner-join listings): EXISTS over the design's live
    /// instances. No-op for [`OwnedFilter::Any`].
    pub fn add_owned_exists_filter(&mut self, owned: OwnedFilter, stamp_alias: &str) {
        let exists = format!(
            "EXISTS (SELECT 1 FROM stamp_instances oi \
             WHERE oi.stamp_id = {stamp_alias}.id AND oi.date_deleted IS NULL)"
        );
        match owned {
            OwnedFilter::Owned => self.add_condition(&format!(" AND {exists}"), vec![]),
            OwnedFilter::Needed => self.add_condition(&format!(" AND NOT {exists}"), vec![]),
            OwnedFilter::Any => {}
        }
    }

    /// Exclude soft-deleted rows.
    pub fn add_deleted_filter(&mut self, alias: &str) {
        self.add_condition(&format!(" AND {alias}.date_deleted IS NULL"), vec![]);
    }

    /// ORDER BY for `sort`/`order` plus LIMIT/OFFSET parameters.
    ///
    /// Every ordering ends with a tie-break on `{alias}.id` so pagination is
    /// stable when the primary key has duplicate values; without it, page
    /// boundaries could skip or repeat rows between requests. Nullable sort
    /// columns order NULLS LAST in both directions.
    ///
    /// The catalog-number default sorts in three fixed groups — numeric
    /// prefixes (by extracted leading integer), then non-numeric values
    /// (lexically), then NULL — with `order` applied inside the groups.
    pub fn add_sort_and_limit(
        &mut self,
        sort: SortKey,
        order: SortDirection,
        limit: i64,
        offset: i64,
        alias: &str,
    ) {
        let dir = order.as_sql();
        match sort {
            SortKey::Name => {
                self.add_condition(&format!(" ORDER BY {alias}.name {dir}, {alias}.id ASC"), vec![]);
            }
            SortKey::IssueDate => {
                self.add_condition(
                    &format!(" ORDER BY {alias}.issue_date {dir} NULLS LAST, {alias}.id ASC"),
                    vec![],
                );
            }
            SortKey::DateAdded => {
                self.add_condition(
                    &format!(" ORDER BY {alias}.date_added {dir}, {alias}.id ASC"),
                    vec![],
                );
            }
            SortKey::ScottNumber => {
                let column = format!("{alias}.scott_number");
                let test = self.dialect.numeric_prefix_test(&column);
                let numeric = self.dialect.leading_integer(&column);
                self.add_condition(
                    &format!(
                        " ORDER BY CASE WHEN {column} IS NULL THEN 2 WHEN {test} THEN 0 ELSE 1 END ASC, \
                         {numeric} {dir}, {column} {dir}, {alias}.id ASC"
                    ),
                    vec![],
                );
            }
        }
        self.add_condition(
            " LIMIT ? OFFSET ?",
            vec![SqlArg::Int(limit), SqlArg::Int(offset)],
        );
    }

    /// The finished SQL string and its ordered argument list.
    pub fn finish(self) -> (String, Vec<SqlArg>) {
        (self.query, self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumbers_sqlite_placeholders() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT * FROM stamps WHERE 1=1");
        qb.add_condition(" AND name = ?", vec!["Lincoln".into()]);
        qb.add_condition(" AND quantity > ? AND quantity < ?", vec![1i64.into(), 10i64.into()]);
        let (sql, args) = qb.finish();
        assert_eq!(
            sql,
            "SELECT * FROM stamps WHERE 1=1 AND name = ?1 AND quantity > ?2 AND quantity < ?3"
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn renumbers_postgres_placeholders() {
        let mut qb = QueryBuilder::new(Dialect::Postgres, "SELECT * FROM stamps WHERE 1=1");
        qb.add_condition(" AND name = ?", vec!["Lincoln".into()]);
        qb.add_condition(" AND series = ?", vec!["Germania".into()]);
        let (sql, _) = qb.finish();
        assert_eq!(
            sql,
            "SELECT * FROM stamps WHERE 1=1 AND name = $1 AND series = $2"
        );
    }

    #[test]
    fn empty_args_append_verbatim() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_condition(" ORDER BY name ASC", vec![]);
        let (sql, args) = qb.finish();
        assert_eq!(sql, "SELECT 1 ORDER BY name ASC");
        assert!(args.is_empty());
    }

    #[test]
    #[should_panic(expected = "placeholder/argument mismatch")]
    fn marker_count_mismatch_panics() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_condition(" WHERE a = ? AND b = ?", vec![1i64.into()]);
    }

    #[test]
    fn search_filter_adds_three_patterns() {
        let mut qb = QueryBuilder::new(Dialect::Postgres, "SELECT 1");
        qb.add_search_filter("lincoln", "s");
        let (sql, args) = qb.finish();
        assert!(sql.contains("LOWER(s.name) LIKE LOWER($1)"));
        assert!(sql.contains("LOWER(s.scott_number) LIKE LOWER($2)"));
        assert!(sql.contains("LOWER(s.series) LIKE LOWER($3)"));
        assert_eq!(args, vec![SqlArg::Text("%lincoln%".to_string()); 3]);
    }

    #[test]
    fn search_filter_empty_term_is_noop() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_search_filter("", "s");
        let (sql, args) = qb.finish();
        assert_eq!(sql, "SELECT 1");
        assert!(args.is_empty());
    }

    #[test]
    fn owned_filter_having_clauses() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_owned_filter(OwnedFilter::Owned, "si");
        let (sql, _) = qb.finish();
        assert!(sql.ends_with(" HAVING COUNT(si.id) > 0"));

        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_owned_filter(OwnedFilter::Needed, "si");
        let (sql, _) = qb.finish();
        assert!(sql.ends_with(" HAVING COUNT(si.id) = 0"));

        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_owned_filter(OwnedFilter::Any, "si");
        let (sql, _) = qb.finish();
        assert_eq!(sql, "SELECT 1");
    }

    #[test]
    fn sort_maps_keys_and_appends_tiebreak() {
        for (key, expect) in [
            (SortKey::Name, " ORDER BY s.name DESC, s.id ASC"),
            (
                SortKey::IssueDate,
                " ORDER BY s.issue_date DESC NULLS LAST, s.id ASC",
            ),
            (SortKey::DateAdded, " ORDER BY s.date_added DESC, s.id ASC"),
        ] {
            let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
            qb.add_sort_and_limit(key, SortDirection::Desc, 10, 20, "s");
            let (sql, args) = qb.finish();
            assert!(sql.contains(expect), "{key:?}: {sql}");
            assert!(sql.ends_with(" LIMIT ?1 OFFSET ?2"));
            assert_eq!(args, vec![SqlArg::Int(10), SqlArg::Int(20)]);
        }
    }

    #[test]
    fn default_sort_is_numeric_aware() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_sort_and_limit(SortKey::ScottNumber, SortDirection::Asc, 10, 0, "s");
        let (sql, _) = qb.finish();
        assert!(sql.contains("CASE WHEN s.scott_number IS NULL THEN 2"));
        assert!(sql.contains("s.scott_number GLOB '[0-9]*'"));
        assert!(sql.contains("CAST(s.scott_number AS INTEGER) ASC"));
        assert!(sql.contains("s.id ASC"));

        let mut qb = QueryBuilder::new(Dialect::Postgres, "SELECT 1");
        qb.add_sort_and_limit(SortKey::ScottNumber, SortDirection::Asc, 10, 0, "s");
        let (sql, _) = qb.finish();
        assert!(sql.contains("s.scott_number ~ '^[0-9]'"));
        assert!(sql.contains("substring(s.scott_number from '^[0-9]+')"));
    }

    #[test]
    fn owned_exists_filter_subqueries() {
        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_owned_exists_filter(OwnedFilter::Needed, "s");
        let (sql, _) = qb.finish();
        assert!(sql.contains("AND NOT EXISTS (SELECT 1 FROM stamp_instances oi"));

        let mut qb = QueryBuilder::new(Dialect::Sqlite, "SELECT 1");
        qb.add_owned_exists_filter(OwnedFilter::Any, "s");
        let (sql, _) = qb.finish();
        assert_eq!(sql, "SELECT 1");
    }

    #[test]
    fn box_and_deleted_filters() {
        let id = Uuid::new_v4();
        let mut qb = QueryBuilder::new(Dialect::Postgres, "SELECT 1");
        qb.add_box_filter(Some(id), "si");
        qb.add_deleted_filter("si");
        qb.add_box_filter(None, "si");
        let (sql, args) = qb.finish();
        assert_eq!(sql, "SELECT 1 AND si.box_id = $1 AND si.date_deleted IS NULL");
        assert_eq!(args, vec![SqlArg::Uuid(id)]);
    }
}
