//! Differential synchronization of a derived table against a source table.
//!
//! A source table node keeps a denormalized table in step with a frequently
//! mutated, normalized source (for example a table of JSON documents) without
//! a full rebuild. Each refresh deletes derived rows whose source row is gone
//! or has been modified since the derived row was captured, then inserts rows
//! from a fresh evaluation of the node's query that have no derived row yet.
//! Unchanged rows are left alone and changed rows are fully replaced; the
//! scheme relies on the source carrying a reliable last-modified timestamp.

use serde::{Deserialize, Serialize};

use crate::sql_utils::quote_ident;

/// Reference to the upstream table a source table node is synchronized from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRef {
    /// Schema-qualified source table name
    pub table: String,

    /// Column of the derived table holding the source row id
    pub id: String,

    /// Column of the derived table holding the source's last-modified time as captured
    pub timestamp: String,

    /// Key column of the source table
    #[serde(default = "default_source_id")]
    pub source_id: String,

    /// Last-modified column of the source table
    #[serde(default = "default_source_updated_at")]
    pub source_updated_at: String,
}

fn default_source_id() -> String {
    "id".to_string()
}

fn default_source_updated_at() -> String {
    "updatedAt".to_string()
}

impl SourceRef {
    /// Create a reference using the default source key (`id`) and
    /// last-modified (`updatedAt`) columns.
    pub fn new(table: impl Into<String>, id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
            timestamp: timestamp.into(),
            source_id: default_source_id(),
            source_updated_at: default_source_updated_at(),
        }
    }

    /// Delete derived rows whose source row is missing or newer than the captured timestamp.
    pub fn delete_stale_rows(&self, table_name: &str) -> String {
        let source_id = quote_ident(&self.source_id);
        let updated_at = quote_ident(&self.source_updated_at);
        format!(
            "delete from {table}\nwhere id in (\n  select\n    tbl.id\n  from\n    {table} as tbl\n    left join {source} as source on source.{source_id} = tbl.{id}\n  where\n    source.{updated_at} is null\n    or tbl.{timestamp} < source.{updated_at}\n);",
            table = table_name,
            source = self.table,
            source_id = source_id,
            id = quote_ident(&self.id),
            updated_at = updated_at,
            timestamp = quote_ident(&self.timestamp),
        )
    }

    /// Insert rows from a fresh evaluation of `spec` that have no derived row yet.
    pub fn insert_new_rows(&self, table_name: &str, spec: &str) -> String {
        let id = quote_ident(&self.id);
        format!(
            "insert into {table}\nselect\n  spec.*\nfrom\n  ({spec}) as spec\n  left join {table} as tbl on tbl.{id} = spec.{id}\nwhere\n  tbl.id is null;",
            table = table_name,
            spec = spec,
            id = id,
        )
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
