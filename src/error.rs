use std::fmt;

use crate::graph::GraphViolation;
use crate::PosetHandle;

/// Why a relation request was turned away before touching the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationRejection {
    /// Both labels name the same element.
    Reflexive,
    /// `from <= to` already holds.
    AlreadyHolds,
    /// `to <= from` holds, so adding `from <= to` would break antisymmetry.
    ReverseHolds,
    /// Deletion requested for a pair that is not related.
    NotRelated,
}

impl fmt::Display for RelationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Reflexive => "reflexive pair",
            Self::AlreadyHolds => "relation already holds",
            Self::ReverseHolds => "reverse relation holds",
            Self::NotRelated => "relation does not hold",
        };
        f.write_str(text)
    }
}

/// Every way a poset operation can fail.
///
/// All of these are reported before any mutation happens, so a failed call
/// leaves the poset exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PosetError {
    #[error("no poset with handle {0}")]
    UnknownHandle(PosetHandle),

    /// Empty label. A null label cannot be expressed through `&str`.
    #[error("label must be a non-empty string")]
    InvalidLabel,

    #[error("element {0:?} not found")]
    ElementNotFound(String),

    #[error("element {0:?} already present")]
    DuplicateElement(String),

    #[error("invalid relation {from:?} <= {to:?}: {reason}")]
    InvalidRelationRequest {
        from: String,
        to: String,
        reason: RelationRejection,
    },

    /// The direct edge is implied through `witness` and must stay.
    #[error("relation {from:?} <= {to:?} is implied through {witness:?}")]
    StructuralRelation {
        from: String,
        to: String,
        witness: String,
    },

    #[error(transparent)]
    Corrupt(#[from] GraphViolation),
}

impl PosetError {
    /// Stable kind name for diagnostics and machine-readable output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownHandle(_) => "unknown_handle",
            Self::InvalidLabel | Self::ElementNotFound(_) => "invalid_label",
            Self::DuplicateElement(_) => "duplicate_element",
            Self::InvalidRelationRequest { .. } => "invalid_relation_request",
            Self::StructuralRelation { .. } => "structural_relation",
            Self::Corrupt(_) => "corrupt",
        }
    }

    pub(crate) fn rejected(from: &str, to: &str, reason: RelationRejection) -> Self {
        Self::InvalidRelationRequest {
            from: from.to_string(),
            to: to.to_string(),
            reason,
        }
    }
}
