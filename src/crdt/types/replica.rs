//! Replica identifier type.
//!
//! Every participant picks its replica id once per process lifetime (usually at
//! random when the session starts) and stamps it on each operation it generates.

/// A unique identifier for each replica (collaborator) editing a document.
///
/// Two replicas must never share an id, otherwise their operation ids could
/// collide and one of the colliding inserts would be treated as a duplicate.
pub type ReplicaId = u64;

/// Sequence number of an operation within a single replica's stream.
pub type Seq = u64;
