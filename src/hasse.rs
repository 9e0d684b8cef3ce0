//! Derived views of a poset: covering (Hasse) edges, incomparabilities,
//! a linear extension, and a serializable snapshot.
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::PosetError;
use crate::graph::GraphViolation;
use crate::poset::Poset;
use crate::NodeId;

/// Portable form of a poset: its elements in insertion order and its
/// covering edges. Replaying it rebuilds the same relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosetSnapshot {
    pub elements: Vec<String>,
    pub covers: Vec<(String, String)>,
}

impl Poset {
    /// Builds a poset from chains: each row reads `r[0] <= r[1] <= ...`.
    ///
    /// Pairs already implied by earlier rows are skipped; a row that
    /// contradicts them fails with `ReverseHolds`.
    pub fn from_chains<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Self, PosetError> {
        let mut p = Poset::new();
        for row in rows {
            for label in row {
                let label = label.as_ref();
                if !p.contains(label) {
                    p.insert(label)?;
                }
            }
        }
        for row in rows {
            for pair in row.windows(2) {
                let (x, y) = (pair[0].as_ref(), pair[1].as_ref());
                if !p.test(x, y)? {
                    p.add_relation(x, y)?;
                }
            }
        }
        Ok(p)
    }

    /// Element labels in insertion order.
    pub fn elements(&self) -> Vec<&str> {
        self.index.iter().map(|(label, _)| label).collect()
    }

    /// Position of each live id in insertion order.
    fn positions(&self) -> HashMap<NodeId, usize> {
        self.index
            .iter()
            .enumerate()
            .map(|(pos, (_, id))| (id, pos))
            .collect()
    }

    fn ordered_edges(&self) -> Vec<(NodeId, NodeId)> {
        let pos = self.positions();
        let mut edges = Vec::with_capacity(self.graph.edge_count());
        for (_, id) in self.index.iter() {
            let mut succ: Vec<NodeId> = self.graph.forward(id).collect();
            succ.sort_unstable_by_key(|s| pos.get(s).copied().unwrap_or(usize::MAX));
            edges.extend(succ.into_iter().map(|s| (id, s)));
        }
        edges
    }

    fn labelled(&self, edges: Vec<(NodeId, NodeId)>) -> Vec<(String, String)> {
        edges
            .into_iter()
            .map(|(a, b)| (self.label_of(a), self.label_of(b)))
            .collect()
    }

    /// Every materialized pair `x < y`.
    pub fn relations(&self) -> Vec<(String, String)> {
        self.labelled(self.ordered_edges())
    }

    fn cover_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.ordered_edges()
            .into_iter()
            .filter(|&(a, b)| {
                !self
                    .graph
                    .forward(a)
                    .any(|z| z != b && self.graph.precedes(z, b))
            })
            .collect()
    }

    /// Hasse edges: the materialized pairs with nothing strictly between.
    pub fn covers(&self) -> Vec<(String, String)> {
        self.labelled(self.cover_edges())
    }

    /// Unordered pairs where neither direction holds, by insertion order.
    pub fn incomparable_pairs(&self) -> Vec<(String, String)> {
        let ids: Vec<(&str, NodeId)> = self.index.iter().collect();
        let mut out = Vec::new();
        for (i, &(x, a)) in ids.iter().enumerate() {
            for &(y, b) in &ids[i + 1..] {
                if !self.related(a, b) && !self.related(b, a) {
                    out.push((x.to_string(), y.to_string()));
                }
            }
        }
        out
    }

    /// Covering edges as a petgraph digraph, node weights are labels.
    pub fn to_digraph(&self) -> DiGraph<String, ()> {
        self.build_digraph().0
    }

    fn build_digraph(&self) -> (DiGraph<String, ()>, Vec<NodeId>) {
        let mut g: DiGraph<String, ()> = DiGraph::new();
        let mut ids = Vec::with_capacity(self.len());
        let mut nodes: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(self.len());
        for (label, id) in self.index.iter() {
            nodes.insert(id, g.add_node(label.to_string()));
            ids.push(id);
        }
        for (a, b) in self.cover_edges() {
            if let (Some(&u), Some(&v)) = (nodes.get(&a), nodes.get(&b)) {
                g.add_edge(u, v, ());
            }
        }
        (g, ids)
    }

    /// One total order compatible with the relation. Among the elements
    /// ready at each step the earliest inserted comes first.
    pub fn linear_extension(&self) -> Result<Vec<String>, GraphViolation> {
        let (g, ids) = self.build_digraph();
        let mut indegree: Vec<usize> = g
            .node_indices()
            .map(|n| g.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        // node indices follow insertion order
        let mut ready: BinaryHeap<Reverse<usize>> = indegree
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(g.node_count());
        while let Some(Reverse(i)) = ready.pop() {
            let ix = NodeIndex::new(i);
            order.push(g[ix].clone());
            for succ in g.neighbors_directed(ix, Direction::Outgoing) {
                let d = &mut indegree[succ.index()];
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(succ.index()));
                }
            }
        }

        if order.len() < g.node_count() {
            let stuck = indegree.iter().position(|&d| d > 0).unwrap_or_default();
            return Err(GraphViolation::Cycle(ids.get(stuck).copied().unwrap_or_default()));
        }
        Ok(order)
    }

    pub fn snapshot(&self) -> PosetSnapshot {
        PosetSnapshot {
            elements: self.elements().into_iter().map(str::to_string).collect(),
            covers: self.covers(),
        }
    }

    pub fn from_snapshot(snapshot: &PosetSnapshot) -> Result<Self, PosetError> {
        let mut p = Poset::new();
        for label in &snapshot.elements {
            p.insert(label)?;
        }
        for (x, y) in &snapshot.covers {
            p.add_relation(x, y)?;
        }
        p.check_invariants()?;
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelationRejection;

    fn chains(rows: &[&[&str]]) -> Poset {
        let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
        Poset::from_chains(&rows).unwrap()
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn chains_build_closure() {
        let p = chains(&[&["a", "b", "c"], &["a", "d"]]);
        assert_eq!(p.elements(), vec!["a", "b", "c", "d"]);
        assert_eq!(p.test("a", "c"), Ok(true));
        assert_eq!(p.test("b", "d"), Ok(false));
        assert!(p.check_invariants().is_ok());
    }

    #[test]
    fn contradicting_chain_is_rejected() {
        let rows = vec![vec!["a", "b"], vec!["b", "a"]];
        assert_eq!(
            Poset::from_chains(&rows).err(),
            Some(PosetError::rejected("b", "a", RelationRejection::ReverseHolds))
        );
    }

    #[test]
    fn covers_drop_implied_edges() {
        let p = chains(&[&["a", "b", "c"]]);
        assert_eq!(
            p.relations(),
            vec![pair("a", "b"), pair("a", "c"), pair("b", "c")]
        );
        assert_eq!(p.covers(), vec![pair("a", "b"), pair("b", "c")]);
    }

    #[test]
    fn incomparable_pairs_are_listed_once() {
        let p = chains(&[&["a", "b"], &["c"]]);
        assert_eq!(p.incomparable_pairs(), vec![pair("a", "c"), pair("b", "c")]);
    }

    #[test]
    fn linear_extension_respects_order() {
        let p = chains(&[&["c", "b"], &["a", "b"], &["b", "d"]]);
        let order = p.linear_extension().unwrap();
        let at = |l: &str| order.iter().position(|x| x == l).unwrap();
        assert_eq!(order.len(), 4);
        assert!(at("c") < at("b"));
        assert!(at("a") < at("b"));
        assert!(at("b") < at("d"));
    }

    #[test]
    fn linear_extension_prefers_insertion_order() {
        let mut p = chains(&[&["a"], &["b"], &["c"], &["d"]]);
        assert_eq!(p.linear_extension().unwrap(), vec!["a", "b", "c", "d"]);

        p.add_relation("c", "d").unwrap();
        assert_eq!(p.linear_extension().unwrap(), vec!["a", "b", "c", "d"]);

        p.add_relation("d", "a").unwrap();
        assert_eq!(p.linear_extension().unwrap(), vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn digraph_has_one_edge_per_cover() {
        let p = chains(&[&["a", "b", "c", "d"]]);
        let g = p.to_digraph();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn snapshot_replays_to_same_relation() {
        let mut p = chains(&[&["a", "b", "c"], &["x", "c"]]);
        p.delete_relation("a", "b").unwrap();
        let snap = p.snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: PosetSnapshot = serde_json::from_str(&json).unwrap();
        let q = Poset::from_snapshot(&back).unwrap();
        assert_eq!(q.relations(), p.relations());
        assert_eq!(q.elements(), p.elements());
    }
}
