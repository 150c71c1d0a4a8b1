//! Per-replica sequence clock for generating operation ids.
//!
//! The clock behaves like a Lamport clock: it ticks for every local operation
//! and is pulled forward whenever the replica integrates an id with a larger
//! seq, so a fresh local id always outranks every id the replica has seen.

use crate::crdt::types::op_id::OpId;
use crate::crdt::types::replica::{ReplicaId, Seq};

/// Generates monotonically increasing `OpId`s for one replica.
#[derive(Debug, Clone)]
pub struct SequenceClock {
    replica_id: ReplicaId,
    seq: Seq,
}

impl SequenceClock {
    /// Creates a clock that has not issued any id yet
    pub fn new(replica_id: ReplicaId) -> Self {
        SequenceClock { replica_id, seq: 0 }
    }

    /// Issues the next id for a local operation.
    pub fn tick(&mut self) -> OpId {
        self.seq += 1;
        OpId::new(self.replica_id, self.seq)
    }

    /// Moves the clock forward past an observed id. Never goes backwards.
    pub fn observe(&mut self, id: OpId) {
        self.advance_to(id.seq);
    }

    /// Moves the clock forward to `seq` if it is behind.
    pub fn advance_to(&mut self, seq: Seq) {
        self.seq = self.seq.max(seq);
    }

    /// Highest seq issued or observed so far
    pub fn current(&self) -> Seq {
        self.seq
    }

    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }
}
