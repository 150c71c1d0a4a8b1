//! Operation identifier and the orderings built on top of it.
//!
//! Every element ever inserted into the RGA is named by the `OpId` of the
//! insert operation that created it. The id doubles as the tie-breaker for
//! concurrent insertions at the same position.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::crdt::types::replica::{ReplicaId, Seq};

/// Globally unique identifier of an insert operation (and of the element it creates).
///
/// # Ordering
///
/// Ids are ordered first by `seq`, then by `replica_id`. No two replicas share a
/// replica id and no replica reuses a seq, so the order is total over every id
/// that can exist in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId {
    /// The replica that generated the operation
    #[serde(alias = "client_id")]
    pub replica_id: ReplicaId,
    /// Position of the operation in its replica's stream
    pub seq: Seq,
}

impl OpId {
    /// Creates a new id from its two components.
    pub fn new(replica_id: ReplicaId, seq: Seq) -> Self {
        OpId { replica_id, seq }
    }

    /// Ranks two ids that share the same origin.
    ///
    /// `Ordering::Less` means `self` is placed before `other` in the document.
    /// A higher `seq` goes first, so an element typed after its author saw the
    /// existing siblings lands directly behind the origin, where the cursor was.
    /// Equal `seq` falls back to the id order, lower replica first.
    pub fn sibling_order(&self, other: &OpId) -> Ordering {
        match other.seq.cmp(&self.seq) {
            Ordering::Equal => self.replica_id.cmp(&other.replica_id),
            other => other,
        }
    }
}

impl PartialOrd for OpId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpId {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.seq.cmp(&other.seq) {
            Ordering::Equal => self.replica_id.cmp(&other.replica_id),
            other => other,
        }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.seq, self.replica_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_id_ordering() {
        let id1 = OpId::new(1, 1);
        let id2 = OpId::new(2, 1);
        let id3 = OpId::new(1, 2);

        // Same seq, replica breaks the tie
        assert!(id1 < id2);

        // Seq dominates replica
        assert!(id2 < id3);
        assert!(id1 < id3);
    }

    #[test]
    fn test_equality_needs_both_fields() {
        assert_eq!(OpId::new(3, 7), OpId::new(3, 7));
        assert_ne!(OpId::new(3, 7), OpId::new(7, 3));
        assert_ne!(OpId::new(3, 7), OpId::new(3, 8));
    }

    #[test]
    fn test_sibling_order_tie_break() {
        let a = OpId::new(1, 5);
        let b = OpId::new(2, 5);

        assert_eq!(a.sibling_order(&b), Ordering::Less);
        assert_eq!(b.sibling_order(&a), Ordering::Greater);
        assert_eq!(a.sibling_order(&a), Ordering::Equal);
    }

    #[test]
    fn test_sibling_order_newer_first() {
        let older = OpId::new(1, 2);
        let newer = OpId::new(9, 3);

        assert_eq!(newer.sibling_order(&older), Ordering::Less);
        assert_eq!(older.sibling_order(&newer), Ordering::Greater);
    }

    #[test]
    fn test_serde_accepts_client_id_alias() {
        let id: OpId = serde_json::from_str(r#"{"client_id":42,"seq":3}"#).unwrap();
        assert_eq!(id, OpId::new(42, 3));

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"replica_id":42,"seq":3}"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(OpId::new(7, 12).to_string(), "12@7");
    }
}
