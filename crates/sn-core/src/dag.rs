//! Dependency graph validation for a pipeline's declared node list.
//!
//! The refresh engine processes nodes strictly in declared order, so the list
//! itself must already be a valid topological order. [`NodeDag::build`]
//! checks that up front and rejects the pipeline with a configuration error
//! instead of letting a misordered dependency drop out of a fingerprint.

use crate::error::{CoreError, CoreResult};
use crate::names::NodeName;
use crate::node::ManagedNode;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

/// A directed acyclic graph of node dependencies
#[derive(Debug)]
pub struct NodeDag {
    /// Edges point from dependency to dependent
    graph: DiGraph<NodeName, ()>,

    /// Map from node name to graph index
    node_map: HashMap<NodeName, NodeIndex>,
}

impl NodeDag {
    /// Build and validate the DAG for `pipeline`'s declared nodes.
    ///
    /// Rejects duplicate names, dependencies on undeclared nodes, cycles,
    /// and dependencies declared after their dependent.
    pub fn build(pipeline: &str, nodes: &[ManagedNode]) -> CoreResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::with_capacity(nodes.len());
        let mut position = HashMap::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            let name = node.name();
            if node_map.contains_key(name) {
                return Err(CoreError::DuplicateNode {
                    pipeline: pipeline.to_string(),
                    name: name.to_string(),
                });
            }
            let idx = graph.add_node(name.clone());
            node_map.insert(name.clone(), idx);
            position.insert(name.clone(), i);
        }

        for node in nodes {
            let to = node_map[node.name()];
            for dep in node.deps() {
                let from = node_map
                    .get(dep)
                    .copied()
                    .ok_or_else(|| CoreError::UnknownDependency {
                        node: node.name().to_string(),
                        dependency: dep.to_string(),
                    })?;
                graph.add_edge(from, to, ());
            }
        }

        let dag = Self { graph, node_map };
        dag.validate()?;

        for node in nodes {
            let own = position[node.name()];
            for dep in node.deps() {
                if position[dep] > own {
                    return Err(CoreError::DependencyOrder {
                        node: node.name().to_string(),
                        dependency: dep.to_string(),
                    });
                }
            }
        }

        Ok(dag)
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        self.topological_order().map(|_| ())
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Get nodes in a topological order (dependencies first)
    pub fn topological_order(&self) -> CoreResult<Vec<NodeName>> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices
                .into_iter()
                .map(|idx| self.graph[idx].clone())
                .collect()),
            Err(cycle) => {
                let cycle_str = self.find_cycle_path(cycle.node_id());
                Err(CoreError::CircularDependency { cycle: cycle_str })
            }
        }
    }

    /// Get direct dependencies of a node
    pub fn dependencies(&self, node: &str) -> Vec<NodeName> {
        self.neighbors(node, petgraph::Direction::Incoming)
    }

    /// Get direct dependents of a node
    pub fn dependents(&self, node: &str) -> Vec<NodeName> {
        self.neighbors(node, petgraph::Direction::Outgoing)
    }

    /// Get all descendants (transitive dependents) of a node.
    ///
    /// These are exactly the nodes whose fingerprint changes when `node` changes.
    pub fn descendants(&self, node: &str) -> Vec<NodeName> {
        let Some(&start) = self.node_map.get(node) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, petgraph::Direction::Outgoing) {
                let target = edge.target();
                if visited.insert(target) {
                    result.push(self.graph[target].clone());
                    stack.push(target);
                }
            }
        }
        result
    }

    fn neighbors(&self, node: &str, direction: petgraph::Direction) -> Vec<NodeName> {
        let Some(&idx) = self.node_map.get(node) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                petgraph::Direction::Incoming => self.graph[e.source()].clone(),
                petgraph::Direction::Outgoing => self.graph[e.target()].clone(),
            })
            .collect()
    }

    /// Check if a node exists in the DAG
    pub fn contains(&self, node: &str) -> bool {
        self.node_map.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
