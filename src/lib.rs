//! # collab-rga - collaborative text editing on an RGA CRDT
//!
//! A Conflict-free Replicated Data Type (CRDT) implementation of a replicated growable array,
//! plus the pieces around it needed for several people to edit one text at the same time:
//! a wire protocol, a relay server and a replica client.
//!
//! ## Features
//!
//! - **Conflict-free**: Operations can be applied in any order and every replica converges
//! - **Causal buffering**: Operations that arrive before the element they depend on are held
//!   back and applied as soon as that element shows up
//! - **Idempotent**: Duplicate deliveries of an insert or delete are ignored
//! - **Tombstone-based deletion**: Deleted characters stay in place as anchors for later inserts
//!
//! ## Example
//!
//! ```rust
//! use collab_rga::RGA;
//!
//! let mut rga = RGA::new(1); // replica ID = 1
//! let h = rga.insert_local(0, 'H');
//! rga.insert_local(1, 'i');
//!
//! let mut other = RGA::new(2);
//! for element in rga.elements().to_vec() {
//!     other.insert(element);
//! }
//! assert_eq!(other.materialize(), "Hi");
//! assert_eq!(h.origin, None);
//! ```

pub mod client;
pub mod config;
pub mod crdt;
pub mod edit;
pub mod error;
pub mod presence;
pub mod protocol;
pub mod server;

// Re-export the main public API from the CRDT module
pub use crdt::{Element, OpId, Operation, RGA, ReplicaId, Seq, SequenceClock, Snapshot};
pub use error::{ClientError, ConfigError, Error, ProtocolError};
pub use protocol::WireMessage;
