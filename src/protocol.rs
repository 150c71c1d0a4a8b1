//! Wire protocol shared by the relay server and replica clients.
//!
//! Every websocket text frame carries exactly one JSON object tagged by its
//! `"type"` field. The set of message kinds is closed; anything that does not
//! decode into [`WireMessage`] is rejected before it can reach the RGA.

use serde::{Deserialize, Serialize};

use crate::crdt::{Element, OpId, Operation, ReplicaId, Snapshot};
use crate::error::ProtocolError;
use crate::presence::Identity;

/// Messages exchanged between replicas through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WireMessage {
    /// A new element
    Insert { node: Element },
    /// Tombstone the element with this id
    Delete { id: OpId },
    /// Ephemeral cursor position, never stored
    Cursor {
        #[serde(alias = "client_id")]
        replica_id: ReplicaId,
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        identity: Option<Identity>,
    },
    /// The document's content-type label changed
    ContentType { name: String },
    /// Full document state, sent by the relay on join and on resync
    Snapshot(Snapshot),
}

impl WireMessage {
    /// Decodes a single text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encodes this message as a text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The replicated operation carried by this message, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            WireMessage::Insert { node } => Some(Operation::Insert(node.clone())),
            WireMessage::Delete { id } => Some(Operation::Delete(*id)),
            WireMessage::Cursor { .. }
            | WireMessage::ContentType { .. }
            | WireMessage::Snapshot(_) => None,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Insert { .. } => "insert",
            WireMessage::Delete { .. } => "delete",
            WireMessage::Cursor { .. } => "cursor",
            WireMessage::ContentType { .. } => "content-type",
            WireMessage::Snapshot(_) => "snapshot",
        }
    }
}

impl From<Operation> for WireMessage {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Insert(node) => WireMessage::Insert { node },
            Operation::Delete(id) => WireMessage::Delete { id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_insert() {
        let msg = WireMessage::decode(
            r#"{"type":"insert","node":{"id":{"replica_id":1,"seq":1},"origin":null,"value":"H","visible":true}}"#,
        )
        .unwrap();

        assert_eq!(
            msg.operation(),
            Some(Operation::Insert(Element::new(OpId::new(1, 1), None, 'H')))
        );
        assert_eq!(msg.kind(), "insert");
    }

    #[test]
    fn test_decode_delete_with_client_id() {
        let msg = WireMessage::decode(r#"{"type":"delete","id":{"client_id":4,"seq":9}}"#).unwrap();
        assert_eq!(msg, WireMessage::Delete { id: OpId::new(4, 9) });
    }

    #[test]
    fn test_cursor_carries_no_operation() {
        let msg = WireMessage::decode(r#"{"type":"cursor","client_id":12,"index":3}"#).unwrap();
        assert_eq!(
            msg,
            WireMessage::Cursor {
                replica_id: 12,
                index: 3,
                identity: None,
            }
        );
        assert_eq!(msg.operation(), None);
    }

    #[test]
    fn test_content_type_tag() {
        let msg = WireMessage::ContentType {
            name: "rust".to_string(),
        };
        assert_eq!(msg.encode().unwrap(), r#"{"type":"content-type","name":"rust"}"#);
    }

    #[test]
    fn test_snapshot_layout() {
        let snapshot = Snapshot::new(
            vec![Element::new(OpId::new(1, 1), None, 'a')],
            Some("python".to_string()),
        );
        let json = serde_json::to_value(WireMessage::Snapshot(snapshot.clone())).unwrap();

        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["contentType"], "python");
        assert_eq!(json["nodes"][0]["value"], "a");

        let decoded = WireMessage::decode(&json.to_string()).unwrap();
        assert_eq!(decoded, WireMessage::Snapshot(snapshot));
    }

    #[test]
    fn test_malformed_messages_are_rejected() {
        assert!(WireMessage::decode("not json").is_err());
        assert!(WireMessage::decode(r#"{"type":"rename","id":1}"#).is_err());
        assert!(WireMessage::decode(r#"{"type":"insert"}"#).is_err());
        assert!(WireMessage::decode(r#"{"type":"delete","id":{"seq":1}}"#).is_err());
    }

    #[test]
    fn test_operation_conversion() {
        let op = Operation::Delete(OpId::new(2, 2));
        let msg = WireMessage::from(op.clone());
        assert_eq!(msg.operation(), Some(op));
    }
}
