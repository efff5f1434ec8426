//! Persisted node state: the engine's only durable memory.
//!
//! One row per previously applied node records the fingerprint it was
//! created with and the exact script that removes it, so the object can be
//! torn down even after its definition disappears from configuration.

use sn_core::StateConfig;
use std::fmt;

/// Database id of a registered pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(pub i64);

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State recorded for one applied node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    /// Owning pipeline
    pub pipeline: PipelineId,

    /// Node name, unique within the pipeline
    pub name: String,

    /// Fingerprint the node was last created with
    pub hash: String,

    /// Script that removes the node's database object
    pub cleanup: String,
}

/// Qualified names of the two state tables and the SQL that reads and writes them.
///
/// Table names come from trusted configuration; row values are always bound
/// as parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTables {
    /// `<schema>.<pipeline_table>`: `(id, name)`
    pub pipelines: String,

    /// `<schema>.<node_table>`: `(pipeline, name, hash, cleanup)`
    pub nodes: String,
}

impl Default for StateTables {
    fn default() -> Self {
        Self::from(&StateConfig::default())
    }
}

impl From<&StateConfig> for StateTables {
    fn from(config: &StateConfig) -> Self {
        Self {
            pipelines: format!("{}.{}", config.schema, config.pipeline_table),
            nodes: format!("{}.{}", config.schema, config.node_table),
        }
    }
}

impl StateTables {
    /// Reference DDL for provisioning the state tables.
    pub fn ddl(&self) -> String {
        format!(
            "create table if not exists {pipelines} (\n  id serial primary key,\n  name text not null unique\n);\ncreate table if not exists {nodes} (\n  id serial primary key,\n  pipeline integer not null references {pipelines} (id) on delete cascade,\n  name text not null,\n  hash text not null,\n  cleanup text not null,\n  unique (pipeline, name)\n);",
            pipelines = self.pipelines,
            nodes = self.nodes,
        )
    }

    pub(crate) fn find_pipeline_sql(&self) -> String {
        format!(
            "select id::bigint from {} where name = $1",
            self.pipelines
        )
    }

    pub(crate) fn load_nodes_sql(&self) -> String {
        format!(
            "select name, hash, cleanup from {} where pipeline = $1::bigint order by name",
            self.nodes
        )
    }

    pub(crate) fn upsert_node_sql(&self) -> String {
        format!(
            "insert into {} (pipeline, name, hash, cleanup) values ($1::bigint, $2, $3, $4)\n\
             on conflict (pipeline, name) do update set hash = excluded.hash, cleanup = excluded.cleanup",
            self.nodes
        )
    }

    pub(crate) fn delete_node_sql(&self) -> String {
        format!(
            "delete from {} where pipeline = $1::bigint and name = $2",
            self.nodes
        )
    }
}
