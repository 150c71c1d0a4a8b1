//! Core RGA CRDT implementation.
//!
//! This module contains the main RGA (Replicated Growable Array) struct and its operations.
//! The RGA provides a conflict-free replicated data type suitable for collaborative text editing.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use tracing::{debug, warn};

use crate::crdt::element::Element;
use crate::crdt::operation::Operation;
use crate::crdt::pending::PendingOps;
use crate::crdt::snapshot::Snapshot;
use crate::crdt::types::{OpId, ReplicaId, Seq, SequenceClock};

/// The Replicated Growable Array (RGA) CRDT.
///
/// Elements live in a flat list in document order. Every element remembers the
/// element it was typed after (its origin), and the list is always the pre-order
/// walk of the tree those origins form, with siblings ranked by
/// [`OpId::sibling_order`]. That walk depends only on the set of elements, never
/// on the order they arrived in, which is what makes replicas converge.
///
/// # Design
///
/// - Tombstone-based deletion, elements are never removed
/// - Operations whose origin (or delete target) is unknown are buffered and
///   retried once the missing element is integrated
/// - Duplicate deliveries are detected by id and ignored
/// - A per-replica sequence clock hands out ids for local edits
#[derive(Debug, Clone)]
pub struct RGA {
    /// The unique identifier for this replica
    replica_id: ReplicaId,
    /// Clock for generating ids of local operations
    clock: SequenceClock,
    /// Every integrated element in document order, tombstones included
    elements: Vec<Element>,
    /// Ids of every integrated element
    ids: HashSet<OpId>,
    /// Operations waiting on an element that has not arrived yet
    pending: PendingOps,
    /// Active content-type label (e.g. the editor's language mode)
    content_type: Option<String>,
}

impl RGA {
    /// Creates a new, empty RGA instance.
    ///
    /// # Arguments
    ///
    /// * `replica_id` - Unique identifier for this replica
    pub fn new(replica_id: ReplicaId) -> Self {
        RGA {
            replica_id,
            clock: SequenceClock::new(replica_id),
            elements: Vec::new(),
            ids: HashSet::new(),
            pending: PendingOps::new(),
            content_type: None,
        }
    }

    /// Creates a replica whose initial state is loaded from a snapshot.
    pub fn from_snapshot(replica_id: ReplicaId, snapshot: Snapshot) -> Self {
        let mut rga = RGA::new(replica_id);
        rga.load_snapshot(snapshot);
        rga
    }

    /// Gets the replica ID for this RGA instance.
    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    /// Highest seq this replica has issued or observed.
    pub fn current_seq(&self) -> Seq {
        self.clock.current()
    }

    /// Integrates an element, local or remote.
    ///
    /// Duplicates are ignored, as are elements that name themselves as origin or
    /// carry the maximum seq. An element whose origin has not been integrated
    /// yet is buffered and placed as soon as the origin arrives; integrating an
    /// element also drains everything that was waiting on it.
    pub fn insert(&mut self, element: Element) {
        if element.origin == Some(element.id) {
            warn!(id = %element.id, "Dropping element that names itself as origin");
            return;
        }
        if element.id.seq == Seq::MAX {
            warn!(id = %element.id, "Dropping element whose seq leaves no room for local ids");
            return;
        }
        if self.ids.contains(&element.id) || self.pending.is_waiting(element.id) {
            debug!(id = %element.id, "Ignoring duplicate insert");
            return;
        }

        self.clock.observe(element.id);

        let mut ready = vec![element];
        while let Some(element) = ready.pop() {
            if self.ids.contains(&element.id) {
                continue;
            }

            let start = match element.origin {
                None => 0,
                Some(origin) => match self.position(origin) {
                    Some(index) => index + 1,
                    None => {
                        debug!(id = %element.id, %origin, "Buffering insert until origin arrives");
                        self.pending.defer_insert(origin, element);
                        continue;
                    }
                },
            };

            let id = element.id;
            self.integrate_at(start, element);

            if self.pending.take_delete(id) {
                debug!(%id, "Applying buffered delete");
                self.tombstone(id);
            }

            let dependents = self.pending.take_inserts(id);
            if !dependents.is_empty() {
                debug!(%id, count = dependents.len(), "Draining buffered inserts");
                ready.extend(dependents);
            }
        }
    }

    /// Logically deletes the element identified by `id`.
    ///
    /// Deleting a tombstone is a no-op. Deleting an id that has not been
    /// integrated yet buffers the delete until the insert arrives.
    pub fn delete(&mut self, id: OpId) {
        if self.ids.contains(&id) {
            self.tombstone(id);
        } else if self.pending.defer_delete(id) {
            debug!(%id, "Buffering delete until target arrives");
        }
    }

    /// Applies a replicated operation.
    pub fn apply(&mut self, operation: Operation) {
        match operation {
            Operation::Insert(element) => self.insert(element),
            Operation::Delete(id) => self.delete(id),
        }
    }

    /// Inserts `value` at visible position `index` on behalf of this replica.
    ///
    /// Positions past the end are clamped to the end. Returns the new element,
    /// which is what gets broadcast to the other replicas.
    pub fn insert_local(&mut self, index: usize, value: char) -> Element {
        let origin = match index {
            0 => None,
            _ => self
                .visible_elements()
                .take(index)
                .last()
                .map(|element| element.id),
        };
        let element = Element::new(self.clock.tick(), origin, value);
        self.insert(element.clone());
        element
    }

    /// Deletes the character at visible position `index` on behalf of this replica.
    ///
    /// Returns the id of the deleted element, or `None` if `index` is out of range.
    pub fn delete_local(&mut self, index: usize) -> Option<OpId> {
        let id = self.visible_elements().nth(index)?.id;
        self.tombstone(id);
        Some(id)
    }

    /// Returns the current visible content.
    pub fn materialize(&self) -> String {
        self.visible_elements().map(|element| element.value).collect()
    }

    /// Replaces the whole document with `snapshot`.
    ///
    /// The clock is moved past every seq in the snapshot so that ids generated
    /// afterwards cannot collide with ids already in it. Buffered operations
    /// survive and are retried against the new contents.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) {
        let Snapshot {
            nodes,
            content_type,
        } = snapshot;

        self.ids.clear();
        self.elements = Vec::with_capacity(nodes.len());
        for element in nodes {
            if element.id.seq == Seq::MAX {
                warn!(id = %element.id, "Skipping snapshot element whose seq leaves no room for local ids");
            } else if self.ids.insert(element.id) {
                self.clock.observe(element.id);
                self.elements.push(element);
            } else {
                warn!(id = %element.id, "Skipping duplicate element in snapshot");
            }
        }
        self.content_type = content_type;

        debug!(
            replica = self.replica_id,
            elements = self.elements.len(),
            seq = self.clock.current(),
            "Loaded snapshot"
        );

        for element in self.pending.drain_inserts() {
            self.insert(element);
        }
        for id in self.pending.drain_deletes() {
            self.delete(id);
        }
    }

    /// Captures every element and the content-type label.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.elements.clone(), self.content_type.clone())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// Returns true if an element with this id has been integrated.
    pub fn contains(&self, id: OpId) -> bool {
        self.ids.contains(&id)
    }

    /// Looks up an integrated element.
    pub fn get(&self, id: OpId) -> Option<&Element> {
        self.position(id).map(|index| &self.elements[index])
    }

    /// All elements in document order, tombstones included.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Visible elements in document order.
    pub fn visible_elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.elements.iter().filter(|element| element.visible)
    }

    /// Number of visible characters.
    pub fn len(&self) -> usize {
        self.visible_elements().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements including tombstones.
    pub fn total_len(&self) -> usize {
        self.elements.len()
    }

    /// Number of inserts waiting on a missing origin.
    pub fn pending_inserts(&self) -> usize {
        self.pending.insert_count()
    }

    /// Number of deletes waiting on a missing target.
    pub fn pending_deletes(&self) -> usize {
        self.pending.delete_count()
    }

    /// Ids that buffered inserts are waiting on.
    pub fn missing_origins(&self) -> Vec<OpId> {
        self.pending.missing_origins()
    }

    /// Drops every buffered operation. Meant for callers that resynchronise
    /// from a fresh snapshot and know the buffered dependencies will never come.
    pub fn clear_pending(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                inserts = self.pending.insert_count(),
                deletes = self.pending.delete_count(),
                "Discarding buffered operations"
            );
        }
        self.pending.clear();
    }

    fn position(&self, id: OpId) -> Option<usize> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.elements.iter().position(|element| element.id == id)
    }

    /// Places `element` at or after `start`, the slot right behind its origin.
    ///
    /// Siblings ranked before the new element are skipped together with their
    /// subtrees; the element goes in front of the first sibling ranked after
    /// it, or of the first element outside the origin's subtree.
    fn integrate_at(&mut self, start: usize, element: Element) {
        let mut index = start;
        while let Some(next) = self.elements.get(index) {
            if !next.is_sibling_of(&element)
                || next.id.sibling_order(&element.id) != Ordering::Less
            {
                break;
            }
            index = self.subtree_end(index);
        }

        self.ids.insert(element.id);
        self.elements.insert(index, element);
    }

    /// Index one past the last element of the subtree rooted at `root`.
    fn subtree_end(&self, root: usize) -> usize {
        let mut members = HashSet::from([self.elements[root].id]);
        let mut index = root + 1;
        while let Some(next) = self.elements.get(index) {
            match next.origin {
                Some(origin) if members.contains(&origin) => {
                    members.insert(next.id);
                    index += 1;
                }
                _ => break,
            }
        }
        index
    }

    fn tombstone(&mut self, id: OpId) {
        if let Some(index) = self.position(id) {
            if !self.elements[index].delete() {
                debug!(%id, "Element already deleted");
            }
        }
    }
}

impl fmt::Display for RGA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in self.visible_elements() {
            write!(f, "{}", element.value)?;
        }
        Ok(())
    }
}
