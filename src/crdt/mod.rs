//! CRDT (Conflict-free Replicated Data Type) implementation module.
//!
//! This module contains the RGA (Replicated Growable Array) CRDT implementation
//! and all its supporting types and structures.

pub mod element;
pub mod operation;
pub mod pending;
pub mod rga;
pub mod snapshot;
pub mod types;

// Re-export the main public API
pub use element::Element;
pub use operation::Operation;
pub use rga::RGA;
pub use snapshot::Snapshot;
pub use types::{OpId, ReplicaId, Seq, SequenceClock};
