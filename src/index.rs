use std::collections::HashMap;

use ordermap::OrderMap;

use crate::error::PosetError;
use crate::NodeId;

/// Bijection between element labels and node ids within one poset.
#[derive(Debug, Clone, Default)]
pub struct ElementIndex {
    /// label -> id, in order of insertion
    ids: OrderMap<String, NodeId>,
    /// Reverse index: id -> label
    labels: HashMap<NodeId, String>,
}

impl ElementIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Resolves a label. Empty and unknown labels resolve to nothing.
    pub fn lookup(&self, label: &str) -> Option<NodeId> {
        if label.is_empty() {
            return None;
        }
        self.ids.get(label).copied()
    }

    /// Like [`lookup`](Self::lookup), but says why resolution failed.
    pub fn resolve(&self, label: &str) -> Result<NodeId, PosetError> {
        if label.is_empty() {
            return Err(PosetError::InvalidLabel);
        }
        self.lookup(label)
            .ok_or_else(|| PosetError::ElementNotFound(label.to_string()))
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    /// Binds `label` to `id`. Fails without touching the index when the
    /// label is empty or already bound.
    pub fn insert(&mut self, label: &str, id: NodeId) -> Result<(), PosetError> {
        if label.is_empty() {
            return Err(PosetError::InvalidLabel);
        }
        if self.ids.contains_key(label) {
            return Err(PosetError::DuplicateElement(label.to_string()));
        }
        self.ids.insert(label.to_string(), id);
        self.labels.insert(id, label.to_string());
        Ok(())
    }

    /// Unbinds `label`, handing back its id for graph cleanup.
    pub fn remove(&mut self, label: &str) -> Result<NodeId, PosetError> {
        let id = self.resolve(label)?;
        self.ids.remove(label);
        self.labels.remove(&id);
        Ok(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.labels.clear();
    }

    /// `(label, id)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.ids.iter().map(|(label, &id)| (label.as_str(), id))
    }
}
