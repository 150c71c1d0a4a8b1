//! Full-state snapshot of a document, used when a replica joins.

use serde::{Deserialize, Serialize};

use crate::crdt::element::Element;
use crate::crdt::types::{ReplicaId, Seq};

/// Every element of a document in list order, tombstones included, plus the
/// active content-type label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Element>,
    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Element>, content_type: Option<String>) -> Self {
        Snapshot {
            nodes,
            content_type,
        }
    }

    /// Highest seq found among elements created by `replica_id`.
    pub fn max_seq_for(&self, replica_id: ReplicaId) -> Option<Seq> {
        self.nodes
            .iter()
            .filter(|element| element.id.replica_id == replica_id)
            .map(|element| element.id.seq)
            .max()
    }

    /// Highest seq found among all elements.
    pub fn max_seq(&self) -> Option<Seq> {
        self.nodes.iter().map(|element| element.id.seq).max()
    }

    /// Visible text of the snapshot without loading it into an engine.
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .filter(|element| element.visible)
            .map(|element| element.value)
            .collect()
    }
}
