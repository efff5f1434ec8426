//! Reconciliation of declared nodes against persisted state.
//!
//! Planning is pure: it only compares fresh fingerprints with stored rows and
//! never touches the database, so the same plan backs both dry runs and the
//! real refresh.

use crate::error::{RefreshError, RefreshResult};
use serde::Serialize;
use sn_core::{CoreError, NodeKind, NodeName, Pipeline};
use sn_db::NodeState;
use std::collections::{HashMap, HashSet};

/// What a refresh does with one declared node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// No persisted row yet
    Create,
    /// Fingerprint changed: drop and create again
    Recreate,
    /// Fingerprint unchanged; run the node's refresh statements
    Refresh,
    /// Fingerprint unchanged and nothing to refresh
    Unchanged,
}

impl NodeAction {
    /// Whether the node's object is dropped and created
    pub fn rebuilds(self) -> bool {
        matches!(self, NodeAction::Create | NodeAction::Recreate)
    }
}

impl std::fmt::Display for NodeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeAction::Create => "create",
            NodeAction::Recreate => "recreate",
            NodeAction::Refresh => "refresh",
            NodeAction::Unchanged => "unchanged",
        };
        write!(f, "{}", s)
    }
}

/// A declared node with its planned action
#[derive(Debug, Clone, Serialize)]
pub struct PlannedNode {
    pub name: NodeName,
    pub kind: NodeKind,
    pub action: NodeAction,
    /// Fresh fingerprint
    pub hash: String,
}

/// A persisted node that is no longer declared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleNode {
    pub name: String,
    /// Stored script that removes the object
    pub cleanup: String,
}

/// Full reconciliation plan for one pipeline
#[derive(Debug, Clone, Serialize)]
pub struct RefreshPlan {
    pub pipeline: String,
    /// Removed first, in persisted order
    pub stale: Vec<StaleNode>,
    /// Declared order
    pub nodes: Vec<PlannedNode>,
}

impl RefreshPlan {
    /// Number of declared nodes planned with `action`
    pub fn count(&self, action: NodeAction) -> usize {
        self.nodes.iter().filter(|n| n.action == action).count()
    }

    /// True when the run would drop or create anything
    pub fn has_changes(&self) -> bool {
        !self.stale.is_empty() || self.nodes.iter().any(|n| n.action.rebuilds())
    }
}

/// Compare fresh fingerprints against persisted state.
///
/// `hashes` must hold a fingerprint for every node of `pipeline`.
pub fn plan(
    pipeline: &Pipeline,
    hashes: &HashMap<NodeName, String>,
    states: &[NodeState],
) -> RefreshResult<RefreshPlan> {
    let declared: HashSet<&str> = pipeline.nodes().iter().map(|n| n.name().as_str()).collect();
    let persisted: HashMap<&str, &NodeState> =
        states.iter().map(|s| (s.name.as_str(), s)).collect();

    let stale = states
        .iter()
        .filter(|s| !declared.contains(s.name.as_str()))
        .map(|s| StaleNode {
            name: s.name.clone(),
            cleanup: s.cleanup.clone(),
        })
        .collect();

    let mut nodes = Vec::with_capacity(pipeline.nodes().len());
    for node in pipeline.nodes() {
        let hash = hashes.get(node.name()).ok_or_else(|| {
            RefreshError::Config(CoreError::InvalidNode {
                name: node.name().to_string(),
                reason: "no fingerprint computed".to_string(),
            })
        })?;

        let action = match persisted.get(node.name().as_str()) {
            None => NodeAction::Create,
            Some(state) if state.hash != *hash => NodeAction::Recreate,
            Some(_) if node.refresh().is_some() => NodeAction::Refresh,
            Some(_) => NodeAction::Unchanged,
        };

        nodes.push(PlannedNode {
            name: node.name().clone(),
            kind: node.kind(),
            action,
            hash: hash.clone(),
        });
    }

    Ok(RefreshPlan {
        pipeline: pipeline.name().to_string(),
        stale,
        nodes,
    })
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
