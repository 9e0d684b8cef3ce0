use std::collections::{HashMap, HashSet};

use crate::NodeId;

/// Materialized neighbours of one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Nodes this one precedes.
    pub forward: HashSet<NodeId>,
    /// Nodes that precede this one.
    pub backward: HashSet<NodeId>,
}

/// A broken storage invariant, naming the offending node pair.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphViolation {
    #[error("node {0} relates to itself")]
    SelfLoop(NodeId),
    #[error("edge {0} -> {1} is not mirrored")]
    Mirror(NodeId, NodeId),
    #[error("edge {from} -> {to} is missing (implied through {via})")]
    Transitivity { from: NodeId, to: NodeId, via: NodeId },
    #[error("nodes {0} and {1} precede each other")]
    Antisymmetry(NodeId, NodeId),
    #[error("node {0} has an edge to missing node {1}")]
    DanglingEdge(NodeId, NodeId),
    #[error("node {0} is not bound to any label")]
    Unindexed(NodeId),
    #[error("a label is bound to missing node {0}")]
    Missing(NodeId),
    #[error("node {0} was never handed out by the id counter")]
    IdOutOfRange(NodeId),
    #[error("cycle through node {0}")]
    Cycle(NodeId),
}

/// Adjacency sets keyed by node id. Together the forward and backward sets
/// hold the entire strict transitive closure; `x <= x` is never stored.
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    nodes: HashMap<NodeId, Node>,
}

impl RelationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Nodes `id` is known to precede. Empty for unknown ids.
    pub fn forward(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.get(&id).into_iter().flat_map(|n| n.forward.iter().copied())
    }

    /// Nodes known to precede `id`. Empty for unknown ids.
    pub fn backward(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.get(&id).into_iter().flat_map(|n| n.backward.iter().copied())
    }

    /// Whether the edge `x -> y` is materialized.
    pub fn precedes(&self, x: NodeId, y: NodeId) -> bool {
        self.nodes.get(&x).is_some_and(|n| n.forward.contains(&y))
    }

    pub fn add_node(&mut self, id: NodeId) {
        self.nodes.entry(id).or_default();
    }

    /// Drops `id` and every edge that mentions it. O(degree(id)).
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.remove(&id)?;
        for succ in &node.forward {
            if let Some(n) = self.nodes.get_mut(succ) {
                n.backward.remove(&id);
            }
        }
        for pred in &node.backward {
            if let Some(n) = self.nodes.get_mut(pred) {
                n.forward.remove(&id);
            }
        }
        Some(node)
    }

    /// The only way an edge is ever created. Both directions are written
    /// together so the sets stay mirrored.
    pub fn link(&mut self, x: NodeId, y: NodeId) {
        if x == y || !self.contains(x) || !self.contains(y) {
            return;
        }
        if let Some(n) = self.nodes.get_mut(&x) {
            n.forward.insert(y);
        }
        if let Some(n) = self.nodes.get_mut(&y) {
            n.backward.insert(x);
        }
    }

    /// The only way an edge is ever removed.
    pub fn unlink(&mut self, x: NodeId, y: NodeId) {
        if let Some(n) = self.nodes.get_mut(&x) {
            n.forward.remove(&y);
        }
        if let Some(n) = self.nodes.get_mut(&y) {
            n.backward.remove(&x);
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Node ids in ascending order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of materialized edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.forward.len()).sum()
    }

    /// Verifies irreflexive storage, mirroring, closure and antisymmetry.
    pub fn check(&self) -> Result<(), GraphViolation> {
        for (&id, node) in &self.nodes {
            for &succ in &node.forward {
                if succ == id {
                    return Err(GraphViolation::SelfLoop(id));
                }
                let Some(other) = self.nodes.get(&succ) else {
                    return Err(GraphViolation::DanglingEdge(id, succ));
                };
                if !other.backward.contains(&id) {
                    return Err(GraphViolation::Mirror(id, succ));
                }
                if other.forward.contains(&id) {
                    return Err(GraphViolation::Antisymmetry(id, succ));
                }
                if let Some(&to) = other.forward.iter().find(|t| !node.forward.contains(*t)) {
                    return Err(GraphViolation::Transitivity { from: id, to, via: succ });
                }
            }
            for &pred in &node.backward {
                if pred == id {
                    return Err(GraphViolation::SelfLoop(id));
                }
                let Some(other) = self.nodes.get(&pred) else {
                    return Err(GraphViolation::DanglingEdge(id, pred));
                };
                if !other.forward.contains(&id) {
                    return Err(GraphViolation::Mirror(pred, id));
                }
            }
        }
        Ok(())
    }
}
