//! Element definition for the RGA.
//!
//! An element is one unit of content (a single `char`) together with the id of
//! the operation that inserted it and the id of the element it was typed after.

use serde::{Deserialize, Serialize};

use crate::crdt::types::OpId;

/// Represents a single character within the RGA.
///
/// Each element contains:
/// - The id of the insert operation that created it
/// - The origin: the element that immediately preceded it in its author's view
///   when it was inserted (`None` means the start of the document)
/// - The character content
/// - A visibility flag that acts as a tombstone for logical deletion
///
/// # Tombstone Deletion
///
/// Deleted elements are never removed from the list, only hidden. Later inserts
/// whose origin points at a deleted element can still be positioned relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: OpId,
    pub origin: Option<OpId>,
    pub value: char,
    pub visible: bool,
}

impl Element {
    /// Creates a new visible element.
    pub fn new(id: OpId, origin: Option<OpId>, value: char) -> Self {
        Element {
            id,
            origin,
            value,
            visible: true,
        }
    }

    /// Creates an element that is already tombstoned, as found in snapshots.
    pub fn tombstone(id: OpId, origin: Option<OpId>, value: char) -> Self {
        Element {
            id,
            origin,
            value,
            visible: false,
        }
    }

    /// Returns true if this element shares `other`'s origin.
    pub fn is_sibling_of(&self, other: &Element) -> bool {
        self.origin == other.origin
    }

    /// Marks this element as deleted. Returns false if it already was.
    pub fn delete(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }
}
