//! # poset_store
//!
//! Independently addressable partial-order stores.
//!
//! Each [`Poset`] tracks a set of labelled elements and a relation over them
//! that stays antisymmetric and transitive after every call. The full strict
//! closure is kept materialized, so [`Poset::test`] is a set lookup and each
//! mutation only touches the neighbourhoods of the elements it names.
//!
//! Posets are reached through a [`Registry`] (or [`SharedRegistry`] for
//! concurrent callers) that hands out opaque numeric handles and exposes the
//! boolean call surface: `new`, `delete`, `size`, `insert`, `remove`, `add`,
//! `del`, `test`, `clear`.
//!
//! # Conventions
//!
//! - **Errors**: typed [`PosetError`] inside the library; the registry surface
//!   collapses them to `false`/`0`.
//! - **Logging**: `tracing` macros only; the `poset` binary installs the
//!   subscriber.
pub mod config;
mod engine;
pub mod error;
pub mod graph;
mod hasse;
pub mod index;
mod poset;
pub mod registry;

/// Opaque identifier of one poset inside a registry.
pub type PosetHandle = u64;

/// Identity of one element inside one poset.
pub type NodeId = u64;

pub use config::{Config, LogFormat, RegistryConfig};
pub use error::{PosetError, RelationRejection};
pub use graph::{GraphViolation, RelationGraph};
pub use hasse::PosetSnapshot;
pub use index::ElementIndex;
pub use poset::Poset;
pub use registry::{Registry, SharedRegistry};
