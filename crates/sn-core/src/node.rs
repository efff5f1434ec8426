//! Managed SQL node kinds.
//!
//! A node is one derived SQL object (custom type, view, materialized view, or
//! denormalized table) that the refresh engine keeps in step with its
//! declaration. Each kind knows how to create itself from nothing, how to
//! refresh an existing object whose shape has not changed, and how to remove
//! itself regardless of what physical kind currently sits under its name.
//!
//! | kind                | create                          | refresh                       | delete            |
//! |---------------------|---------------------------------|-------------------------------|-------------------|
//! | `type`              | `create type .. as ..`          | *(none)*                      | `drop type ..`    |
//! | `view`              | `create view .. as ..`          | *(none)*                      | kind-agnostic     |
//! | `materialized_view` | `create materialized view ..`   | `refresh materialized view ..`| kind-agnostic     |
//! | `table`             | `create table .. as ..` + keys  | caller-supplied delete/insert | kind-agnostic     |
//! | `source_table`      | same as `table`                 | derived from [`SourceRef`]    | kind-agnostic     |

use serde::{Deserialize, Serialize};

use crate::drop::drop_table_like;
use crate::names::NodeName;
use crate::source::SourceRef;

/// Immutable node definition supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Globally unique, schema-qualified name
    pub name: NodeName,

    /// Other nodes this node's `spec` references
    #[serde(default)]
    pub deps: Vec<NodeName>,

    /// SQL fragment: a type body or a query
    pub spec: String,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, deps: &[&str], spec: impl Into<String>) -> Self {
        Self {
            name: NodeName::new(name),
            deps: deps.iter().map(|d| NodeName::new(*d)).collect(),
            spec: spec.into(),
        }
    }
}

/// Discriminator for the managed node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Type,
    View,
    MaterializedView,
    Table,
    SourceTable,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Type => write!(f, "type"),
            NodeKind::View => write!(f, "view"),
            NodeKind::MaterializedView => write!(f, "materialized_view"),
            NodeKind::Table => write!(f, "table"),
            NodeKind::SourceTable => write!(f, "source_table"),
        }
    }
}

/// A node definition wrapped with the behavior of its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagedNode {
    /// Custom composite/enum type
    Type(NodeSpec),

    /// Plain view
    View(NodeSpec),

    /// Materialized view, refreshed in place while its definition is stable
    MaterializedView(NodeSpec),

    /// Table created from a query, maintained by caller-supplied statements
    Table {
        spec: NodeSpec,
        delete_stale_rows: String,
        insert_new_rows: String,
    },

    /// Table synchronized differentially against a source table
    SourceTable { spec: NodeSpec, source: SourceRef },
}

impl ManagedNode {
    /// The wrapped definition.
    pub fn spec(&self) -> &NodeSpec {
        match self {
            ManagedNode::Type(spec)
            | ManagedNode::View(spec)
            | ManagedNode::MaterializedView(spec)
            | ManagedNode::Table { spec, .. }
            | ManagedNode::SourceTable { spec, .. } => spec,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.spec().name
    }

    pub fn deps(&self) -> &[NodeName] {
        &self.spec().deps
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ManagedNode::Type(_) => NodeKind::Type,
            ManagedNode::View(_) => NodeKind::View,
            ManagedNode::MaterializedView(_) => NodeKind::MaterializedView,
            ManagedNode::Table { .. } => NodeKind::Table,
            ManagedNode::SourceTable { .. } => NodeKind::SourceTable,
        }
    }

    /// Statements that bring the object into existence from nothing, in order.
    pub fn create(&self) -> Vec<String> {
        let spec = self.spec();
        let name = &spec.name;
        match self {
            ManagedNode::Type(_) => vec![format!("create type {} as {};", name, spec.spec)],
            ManagedNode::View(_) => vec![format!("create view {} as {};", name, spec.spec)],
            ManagedNode::MaterializedView(_) => {
                vec![format!("create materialized view {} as {};", name, spec.spec)]
            }
            ManagedNode::Table { .. } | ManagedNode::SourceTable { .. } => vec![
                format!("create table {} as {};", name, spec.spec),
                format!("alter table {} add column id serial primary key;", name),
                format!(
                    "alter table {} add column \"createdAt\" timestamp default now();",
                    name
                ),
            ],
        }
    }

    /// Statements that bring an existing, unchanged-shape object up to date.
    ///
    /// `None` for kinds without an incremental refresh.
    pub fn refresh(&self) -> Option<Vec<String>> {
        match self {
            ManagedNode::Type(_) | ManagedNode::View(_) => None,
            ManagedNode::MaterializedView(spec) => {
                Some(vec![format!("refresh materialized view {};", spec.name)])
            }
            ManagedNode::Table {
                delete_stale_rows,
                insert_new_rows,
                ..
            } => Some(vec![delete_stale_rows.clone(), insert_new_rows.clone()]),
            ManagedNode::SourceTable { spec, source } => Some(vec![
                source.delete_stale_rows(&spec.name),
                source.insert_new_rows(&spec.name, &spec.spec),
            ]),
        }
    }

    /// A single idempotent script that removes the object.
    pub fn delete(&self) -> String {
        match self {
            ManagedNode::Type(spec) => format!("drop type if exists {} cascade;", spec.name),
            _ => drop_table_like(self.name()),
        }
    }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod tests;
