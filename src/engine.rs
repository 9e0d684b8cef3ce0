//! Relation maintenance on top of a [`Poset`].
//!
//! The graph always stores the whole strict closure, so `test` is a set
//! lookup and every mutation only walks the neighbourhoods of the two
//! elements involved. All checks run before the first write.

use std::iter;

use crate::error::{PosetError, RelationRejection};
use crate::poset::Poset;
use crate::NodeId;

impl Poset {
    /// `x <= y`, reflexively. Fails when either label does not resolve.
    pub fn test(&self, x: &str, y: &str) -> Result<bool, PosetError> {
        let (a, b) = self.resolve_pair(x, y)?;
        Ok(self.related(a, b))
    }

    pub(crate) fn related(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.graph.precedes(a, b)
    }

    /// Records `x <= y` and extends the closure.
    ///
    /// Rejected when `x <= y` or `y <= x` already holds, which covers
    /// `x == y`. Every predecessor of `x` (and `x`) gets linked to every
    /// successor of `y` (and `y`); nothing else is visited.
    pub fn add_relation(&mut self, x: &str, y: &str) -> Result<(), PosetError> {
        let (a, b) = self.resolve_pair(x, y)?;
        if a == b {
            return Err(PosetError::rejected(x, y, RelationRejection::Reflexive));
        }
        if self.graph.precedes(a, b) {
            return Err(PosetError::rejected(x, y, RelationRejection::AlreadyHolds));
        }
        if self.graph.precedes(b, a) {
            return Err(PosetError::rejected(x, y, RelationRejection::ReverseHolds));
        }

        let sources: Vec<NodeId> = iter::once(a).chain(self.graph.backward(a)).collect();
        let targets: Vec<NodeId> = iter::once(b).chain(self.graph.forward(b)).collect();
        for &w in &sources {
            for &z in &targets {
                self.graph.link(w, z);
            }
        }
        Ok(())
    }

    /// Smallest node strictly between `a` and `b`, if any.
    fn witness(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        self.graph
            .forward(a)
            .filter(|&z| z != b && self.graph.precedes(z, b))
            .min()
    }

    /// Whether the direct edge `x -> y` carries no intermediate element and
    /// may therefore be dropped without breaking transitivity.
    pub fn can_delete_relation(&self, x: &str, y: &str) -> Result<bool, PosetError> {
        let (a, b) = self.resolve_pair(x, y)?;
        if a == b {
            return Err(PosetError::rejected(x, y, RelationRejection::Reflexive));
        }
        Ok(self.witness(a, b).is_none())
    }

    /// Drops exactly the edge `x -> y`.
    ///
    /// Other materialized edges are never revisited, even ones that were
    /// originally derived through this edge.
    pub fn delete_relation(&mut self, x: &str, y: &str) -> Result<(), PosetError> {
        let (a, b) = self.resolve_pair(x, y)?;
        if a == b {
            return Err(PosetError::rejected(x, y, RelationRejection::Reflexive));
        }
        if !self.graph.precedes(a, b) {
            return Err(PosetError::rejected(x, y, RelationRejection::NotRelated));
        }
        if let Some(z) = self.witness(a, b) {
            return Err(PosetError::StructuralRelation {
                from: x.to_string(),
                to: y.to_string(),
                witness: self.label_of(z),
            });
        }
        self.graph.unlink(a, b);
        Ok(())
    }
}
