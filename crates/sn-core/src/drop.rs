//! Kind-agnostic drop for relation-like nodes.
//!
//! Persisted state never records which physical kind a node was created as,
//! and a node may change kind under the same name between releases (a view
//! promoted to a materialized view, for example). The cleanup script therefore
//! probes the catalog at drop time and removes whichever of table, view, or
//! materialized view currently exists under the name.

use crate::sql_utils::{escape_sql_string, split_qualified_name};

/// A physical relation kind that may sit behind a node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Table,
    View,
    MaterializedView,
}

impl RelationKind {
    /// All kinds probed by [`drop_table_like`], in drop order.
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Table,
        RelationKind::View,
        RelationKind::MaterializedView,
    ];

    /// Short catalog name: `pg_<short>s` with a `<short>name` column.
    fn catalog_short(self) -> &'static str {
        match self {
            RelationKind::Table => "table",
            RelationKind::View => "view",
            RelationKind::MaterializedView => "matview",
        }
    }

    /// Keyword used in `DROP <keyword>`.
    pub fn ddl_keyword(self) -> &'static str {
        match self {
            RelationKind::Table => "table",
            RelationKind::View => "view",
            RelationKind::MaterializedView => "materialized view",
        }
    }
}

/// Build a single idempotent script that drops `qualified_name` whatever
/// relation kind it currently is, and does nothing if it does not exist.
///
/// # Examples
/// ```
/// use sn_core::drop::drop_table_like;
/// let sql = drop_table_like("derived.surveys");
/// assert!(sql.contains("from pg_matviews"));
/// assert!(sql.contains("drop view if exists derived.surveys cascade"));
/// ```
pub fn drop_table_like(qualified_name: &str) -> String {
    let (schema, name) = split_qualified_name(qualified_name);
    let checks: Vec<String> = RelationKind::ALL
        .iter()
        .map(|kind| drop_if_present(schema, name, *kind))
        .collect();

    format!("do $$ begin\n{}\nend $$;", checks.join("\n"))
}

fn drop_if_present(schema: &str, name: &str, kind: RelationKind) -> String {
    let short = kind.catalog_short();
    format!(
        "  if exists (\n    select * from pg_{short}s\n    where schemaname = '{schema_lit}' and {short}name = '{name_lit}'\n  ) then\n    drop {keyword} if exists {schema}.{name} cascade;\n  end if;",
        short = short,
        schema_lit = escape_sql_string(schema),
        name_lit = escape_sql_string(name),
        keyword = kind.ddl_keyword(),
        schema = schema,
        name = name,
    )
}

#[cfg(test)]
#[path = "drop_test.rs"]
mod tests;
