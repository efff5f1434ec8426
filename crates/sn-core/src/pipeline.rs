//! A named, ordered collection of managed nodes.

use std::collections::HashMap;

use crate::dag::NodeDag;
use crate::error::CoreResult;
use crate::hash::build_hashes;
use crate::names::{NodeName, PipelineName};
use crate::node::ManagedNode;

/// A validated pipeline: unique node names, declared in dependency order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: PipelineName,
    nodes: Vec<ManagedNode>,
}

impl Pipeline {
    /// Build a pipeline, rejecting duplicate names, unknown or misordered
    /// dependencies, and cycles.
    pub fn new(name: PipelineName, nodes: Vec<ManagedNode>) -> CoreResult<Self> {
        NodeDag::build(&name, &nodes)?;
        Ok(Self { name, nodes })
    }

    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    /// Nodes in declared (dependency) order.
    pub fn nodes(&self) -> &[ManagedNode] {
        &self.nodes
    }

    pub fn get(&self, name: &str) -> Option<&ManagedNode> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    /// Dependency graph for inspection (`ls`, impact reporting).
    pub fn dag(&self) -> CoreResult<NodeDag> {
        NodeDag::build(&self.name, &self.nodes)
    }

    /// Fresh fingerprints for every node.
    pub fn hashes(&self) -> CoreResult<HashMap<NodeName, String>> {
        build_hashes(&self.nodes)
    }
}
