//! Identity and ordering types for the RGA.
//!
//! This module contains the operation identifier, its orderings and the clock
//! that hands out fresh identifiers for local operations.

pub mod clock;
pub mod op_id;
pub mod replica;

pub use clock::SequenceClock;
pub use op_id::OpId;
pub use replica::{ReplicaId, Seq};
