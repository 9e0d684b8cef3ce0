use crate::error::PosetError;
use crate::graph::{GraphViolation, RelationGraph};
use crate::index::ElementIndex;
use crate::NodeId;

/// One independent partial-order store.
///
/// Owns its label index, its relation graph and the counter that hands out
/// node ids. Nothing is shared between posets.
#[derive(Debug, Clone, Default)]
pub struct Poset {
    /// Next id to hand out; only [`clear`](Self::clear) winds it back.
    pub(crate) next_id: NodeId,
    pub(crate) index: ElementIndex,
    pub(crate) graph: RelationGraph,
}

impl Poset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &ElementIndex {
        &self.index
    }

    pub fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    /// The id the next successful [`insert`](Self::insert) will receive.
    pub fn next_id(&self) -> NodeId {
        self.next_id
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.lookup(label).is_some()
    }

    /// Adds a new, unrelated element and returns its id.
    pub fn insert(&mut self, label: &str) -> Result<NodeId, PosetError> {
        let id = self.next_id;
        self.index.insert(label, id)?;
        self.graph.add_node(id);
        self.next_id += 1;
        Ok(id)
    }

    /// Removes an element together with every relation mentioning it.
    ///
    /// Relations among its former neighbours are left as they were: anything
    /// the closure already materialized stays, nothing new is derived.
    pub fn remove(&mut self, label: &str) -> Result<NodeId, PosetError> {
        let id = self.index.remove(label)?;
        self.graph.remove_node(id);
        Ok(id)
    }

    /// Drops all elements and restarts node ids at 0.
    pub fn clear(&mut self) {
        self.index.clear();
        self.graph.clear();
        self.next_id = 0;
    }

    pub(crate) fn resolve_pair(&self, x: &str, y: &str) -> Result<(NodeId, NodeId), PosetError> {
        Ok((self.index.resolve(x)?, self.index.resolve(y)?))
    }

    /// Label for an id that is known to be bound.
    pub(crate) fn label_of(&self, id: NodeId) -> String {
        self.index.label(id).unwrap_or_default().to_string()
    }

    /// Full consistency check of the graph and of its agreement with the index.
    pub fn check_invariants(&self) -> Result<(), GraphViolation> {
        self.graph.check()?;
        for (_, id) in self.index.iter() {
            if id >= self.next_id {
                return Err(GraphViolation::IdOutOfRange(id));
            }
            if !self.graph.contains(id) {
                return Err(GraphViolation::Missing(id));
            }
        }
        for id in self.graph.ids() {
            if self.index.label(id).is_none() {
                return Err(GraphViolation::Unindexed(id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_handed_out_in_order() {
        let mut p = Poset::new();
        assert_eq!(p.insert("a"), Ok(0));
        assert_eq!(p.insert("b"), Ok(1));
        assert_eq!(p.next_id(), 2);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn failed_insert_does_not_consume_an_id() {
        let mut p = Poset::new();
        p.insert("a").unwrap();
        assert_eq!(p.insert("a"), Err(PosetError::DuplicateElement("a".into())));
        assert_eq!(p.insert(""), Err(PosetError::InvalidLabel));
        assert_eq!(p.insert("b"), Ok(1));
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut p = Poset::new();
        p.insert("a").unwrap();
        assert_eq!(p.remove("a"), Ok(0));
        assert_eq!(p.insert("a"), Ok(1));
        assert!(p.check_invariants().is_ok());
    }

    #[test]
    fn remove_unknown_fails() {
        let mut p = Poset::new();
        assert_eq!(p.remove("x"), Err(PosetError::ElementNotFound("x".into())));
    }

    #[test]
    fn clear_resets_counter() {
        let mut p = Poset::new();
        for l in ["a", "b", "c"] {
            p.insert(l).unwrap();
        }
        p.add_relation("a", "b").unwrap();
        p.clear();
        assert!(p.is_empty());
        assert_eq!(p.graph().edge_count(), 0);
        assert_eq!(p.insert("z"), Ok(0));
    }

    #[test]
    fn check_catches_index_graph_disagreement() {
        let mut p = Poset::new();
        p.insert("a").unwrap();
        p.graph.add_node(9);
        assert_eq!(p.check_invariants(), Err(GraphViolation::Unindexed(9)));
    }

    #[test]
    fn check_separates_missing_node_from_unissued_id() {
        let mut p = Poset::new();
        p.insert("a").unwrap();
        p.graph.remove_node(0);
        assert_eq!(p.check_invariants(), Err(GraphViolation::Missing(0)));

        let mut q = Poset::new();
        q.insert("a").unwrap();
        q.next_id = 0;
        assert_eq!(q.check_invariants(), Err(GraphViolation::IdOutOfRange(0)));
    }
}
