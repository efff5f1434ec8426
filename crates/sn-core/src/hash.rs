//! Content fingerprints for change detection.
//!
//! A node's fingerprint covers its create, refresh, and delete text plus the
//! fingerprints of its dependencies, so any edit to an ancestor changes the
//! fingerprint of every descendant. Statement text is hashed exactly as
//! written; cosmetic edits count as changes.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::names::NodeName;
use crate::node::ManagedNode;

/// Incremental SHA-256 over a sequence of strings.
///
/// Each part is length-prefixed, so `["ab", "c"]` and `["a", "bc"]` differ.
#[derive(Clone, Default)]
pub struct NodeHasher {
    inner: Sha256,
}

impl NodeHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, part: &str) {
        self.inner.update((part.len() as u64).to_le_bytes());
        self.inner.update(part.as_bytes());
    }

    /// Lowercase hex digest.
    pub fn finish(self) -> String {
        format!("{:x}", self.inner.finalize())
    }
}

/// Compute the fingerprint of one node given the fingerprints computed so far.
pub fn node_hash(node: &ManagedNode, hashes: &HashMap<NodeName, String>) -> CoreResult<String> {
    let mut hasher = NodeHasher::new();
    for statement in node.create() {
        hasher.update(&statement);
    }
    if let Some(refresh) = node.refresh() {
        for statement in refresh {
            hasher.update(&statement);
        }
    }
    hasher.update(&node.delete());
    for dep in node.deps() {
        let dep_hash = hashes.get(dep).ok_or_else(|| CoreError::DependencyOrder {
            node: node.name().to_string(),
            dependency: dep.to_string(),
        })?;
        hasher.update(dep_hash);
    }
    Ok(hasher.finish())
}

/// Compute fingerprints for every node, in declared order.
///
/// A dependency that has not been hashed yet (declared later, or not at
/// all) is an error rather than a silent gap in the fingerprint.
pub fn build_hashes(nodes: &[ManagedNode]) -> CoreResult<HashMap<NodeName, String>> {
    let mut hashes = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let hash = node_hash(node, &hashes)?;
        hashes.insert(node.name().clone(), hash);
    }
    Ok(hashes)
}

#[cfg(test)]
#[path = "hash_test.rs"]
mod tests;
