//! Buffer for operations whose causal dependency has not arrived yet.
//!
//! An insert waits on its origin, a delete waits on its target. Nothing in the
//! buffer is ever discarded implicitly: an entry leaves only when the id it is
//! waiting for gets integrated, or when the owner calls [`PendingOps::clear`].

use std::collections::{HashMap, HashSet};

use crate::crdt::element::Element;
use crate::crdt::types::OpId;

/// Pending inserts keyed by their missing origin, and pending deletes keyed by target.
#[derive(Debug, Clone, Default)]
pub struct PendingOps {
    inserts: HashMap<OpId, Vec<Element>>,
    waiting_ids: HashSet<OpId>,
    deletes: HashSet<OpId>,
}

impl PendingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks an insert until `missing` is integrated. A second copy of an
    /// already parked element is ignored.
    pub fn defer_insert(&mut self, missing: OpId, element: Element) -> bool {
        if !self.waiting_ids.insert(element.id) {
            return false;
        }
        self.inserts.entry(missing).or_default().push(element);
        true
    }

    /// Parks a delete until its target is integrated.
    pub fn defer_delete(&mut self, target: OpId) -> bool {
        self.deletes.insert(target)
    }

    /// Removes and returns every insert that was waiting on `id`.
    pub fn take_inserts(&mut self, id: OpId) -> Vec<Element> {
        let ready = self.inserts.remove(&id).unwrap_or_default();
        for element in &ready {
            self.waiting_ids.remove(&element.id);
        }
        ready
    }

    /// Removes a parked delete for `id`, returning whether there was one.
    pub fn take_delete(&mut self, id: OpId) -> bool {
        self.deletes.remove(&id)
    }

    /// True if an insert with this id is parked.
    pub fn is_waiting(&self, id: OpId) -> bool {
        self.waiting_ids.contains(&id)
    }

    /// Ids that parked inserts are waiting on.
    pub fn missing_origins(&self) -> Vec<OpId> {
        self.inserts.keys().copied().collect()
    }

    /// Drains every parked insert, in no particular order.
    pub fn drain_inserts(&mut self) -> Vec<Element> {
        self.waiting_ids.clear();
        self.inserts.drain().flat_map(|(_, elements)| elements).collect()
    }

    pub fn drain_deletes(&mut self) -> Vec<OpId> {
        self.deletes.drain().collect()
    }

    pub fn insert_count(&self) -> usize {
        self.waiting_ids.len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting_ids.is_empty() && self.deletes.is_empty()
    }

    pub fn clear(&mut self) {
        self.inserts.clear();
        self.waiting_ids.clear();
        self.deletes.clear();
    }
}
