//! Operations that mutate the replicated sequence.

use serde::{Deserialize, Serialize};

use crate::crdt::element::Element;
use crate::crdt::types::OpId;

/// A single replicated edit, as produced locally and applied on every replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Insert(Element),
    Delete(OpId),
}

impl Operation {
    /// The id this operation creates (insert) or targets (delete).
    pub fn id(&self) -> OpId {
        match self {
            Operation::Insert(element) => element.id,
            Operation::Delete(id) => *id,
        }
    }
}

impl From<Element> for Operation {
    fn from(element: Element) -> Self {
        Operation::Insert(element)
    }
}
