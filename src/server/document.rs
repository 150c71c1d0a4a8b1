//! Per-document actors.
//!
//! Each document is owned by a single tokio task holding its RGA. Websocket
//! sessions talk to it through a command channel and receive every accepted
//! message back through a broadcast channel, so all mutation of one document
//! happens on one task without locks.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::crdt::{ReplicaId, Snapshot, RGA};
use crate::protocol::WireMessage;

/// Replica id the relay uses for its own copy of each document. The relay
/// never generates operations, so it never stamps this id on anything.
pub const RELAY_REPLICA_ID: ReplicaId = 0;

/// Commands accepted by a document actor.
#[derive(Debug)]
pub enum DocumentCommand {
    /// A session joined and needs the current state
    Join { respond: oneshot::Sender<Snapshot> },
    /// A decoded message from a session
    Message { msg: WireMessage },
    /// Summary for the HTTP API
    Inspect {
        respond: oneshot::Sender<DocumentState>,
    },
}

/// Summary of a document as seen by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentState {
    pub doc_id: String,
    pub text: String,
    pub content_type: Option<String>,
    /// Elements including tombstones
    pub nodes: usize,
    /// Operations buffered on a missing dependency
    pub pending: usize,
}

/// Owns one document's RGA and serialises every change to it.
pub struct DocumentActor {
    doc_id: String,
    rga: RGA,
    receiver: mpsc::Receiver<DocumentCommand>,
    broadcaster: broadcast::Sender<String>,
}

impl DocumentActor {
    pub fn new(
        doc_id: String,
        receiver: mpsc::Receiver<DocumentCommand>,
        broadcaster: broadcast::Sender<String>,
    ) -> Self {
        Self {
            doc_id,
            rga: RGA::new(RELAY_REPLICA_ID),
            receiver,
            broadcaster,
        }
    }

    /// Processes commands until every handle is dropped.
    pub async fn run(mut self) {
        info!(doc_id = %self.doc_id, "Document actor started");
        while let Some(command) = self.receiver.recv().await {
            self.handle(command);
        }
        info!(doc_id = %self.doc_id, "Document actor stopped");
    }

    fn handle(&mut self, command: DocumentCommand) {
        match command {
            DocumentCommand::Join { respond } => {
                // The session may already be gone
                let _ = respond.send(self.rga.snapshot());
            }
            DocumentCommand::Message { msg } => self.apply(msg),
            DocumentCommand::Inspect { respond } => {
                let _ = respond.send(self.state());
            }
        }
    }

    fn apply(&mut self, msg: WireMessage) {
        match &msg {
            WireMessage::Insert { node } => self.rga.insert(node.clone()),
            WireMessage::Delete { id } => self.rga.delete(*id),
            WireMessage::ContentType { name } => {
                info!(doc_id = %self.doc_id, content_type = %name, "Content type changed");
                self.rga.set_content_type(name.clone());
            }
            WireMessage::Cursor { .. } => {}
            WireMessage::Snapshot(_) => {
                warn!(doc_id = %self.doc_id, "Ignoring snapshot sent by a client");
                return;
            }
        }

        match msg.encode() {
            Ok(json) => {
                // No subscribers is fine, the state is already updated
                if self.broadcaster.send(json).is_err() {
                    debug!(doc_id = %self.doc_id, "No sessions to broadcast to");
                }
            }
            Err(e) => error!(doc_id = %self.doc_id, "Failed to encode {}: {}", msg.kind(), e),
        }
    }

    fn state(&self) -> DocumentState {
        DocumentState {
            doc_id: self.doc_id.clone(),
            text: self.rga.materialize(),
            content_type: self.rga.content_type().map(str::to_string),
            nodes: self.rga.total_len(),
            pending: self.rga.pending_inserts() + self.rga.pending_deletes(),
        }
    }
}

/// Cloneable handle to a running document actor.
#[derive(Clone)]
pub struct DocumentHandle {
    sender: mpsc::Sender<DocumentCommand>,
    broadcaster: broadcast::Sender<String>,
}

impl DocumentHandle {
    /// Spawns the actor for `doc_id` on the current tokio runtime.
    pub fn spawn(doc_id: String, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        let (broadcaster, _) = broadcast::channel(capacity);

        let actor = DocumentActor::new(doc_id, receiver, broadcaster.clone());
        tokio::spawn(actor.run());

        Self {
            sender,
            broadcaster,
        }
    }

    /// Receives every message accepted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    /// Current state of the document, `None` if the actor is gone.
    pub async fn join(&self) -> Option<Snapshot> {
        let (respond, response) = oneshot::channel();
        self.sender
            .send(DocumentCommand::Join { respond })
            .await
            .ok()?;
        response.await.ok()
    }

    /// Forwards a message to the actor. Returns false if the actor is gone.
    pub async fn send(&self, msg: WireMessage) -> bool {
        self.sender
            .send(DocumentCommand::Message { msg })
            .await
            .is_ok()
    }

    pub async fn inspect(&self) -> Option<DocumentState> {
        let (respond, response) = oneshot::channel();
        self.sender
            .send(DocumentCommand::Inspect { respond })
            .await
            .ok()?;
        response.await.ok()
    }
}

/// All documents served by the relay, keyed by id.
pub struct DocumentRegistry {
    documents: Mutex<HashMap<String, DocumentHandle>>,
    capacity: usize,
}

impl DocumentRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Returns the handle for `doc_id`, spawning its actor on first use.
    ///
    /// Documents live for the life of the process; nothing evicts them.
    pub fn get_or_spawn(&self, doc_id: &str) -> DocumentHandle {
        self.documents
            .lock()
            .entry(doc_id.to_string())
            .or_insert_with(|| {
                info!(%doc_id, "Creating document");
                DocumentHandle::spawn(doc_id.to_string(), self.capacity)
            })
            .clone()
    }

    pub fn get(&self, doc_id: &str) -> Option<DocumentHandle> {
        self.documents.lock().get(doc_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crdt::{Element, OpId};

    fn insert(replica_id: ReplicaId, seq: u64, origin: Option<OpId>, value: char) -> WireMessage {
        WireMessage::Insert {
            node: Element::new(OpId::new(replica_id, seq), origin, value),
        }
    }

    #[tokio::test]
    async fn test_actor_applies_and_broadcasts() {
        let handle = DocumentHandle::spawn("doc".to_string(), 16);
        let mut updates = handle.subscribe();

        assert!(handle.send(insert(1, 1, None, 'h')).await);
        assert!(handle.send(insert(1, 2, Some(OpId::new(1, 1)), 'i')).await);

        let first = WireMessage::decode(&updates.recv().await.unwrap()).unwrap();
        assert_eq!(first, insert(1, 1, None, 'h'));
        updates.recv().await.unwrap();

        let state = handle.inspect().await.unwrap();
        assert_eq!(state.text, "hi");
        assert_eq!(state.nodes, 2);
        assert_eq!(state.pending, 0);
    }

    #[tokio::test]
    async fn test_join_returns_snapshot_with_content_type() {
        let handle = DocumentHandle::spawn("doc".to_string(), 16);
        handle.send(insert(3, 1, None, 'x')).await;
        handle
            .send(WireMessage::ContentType {
                name: "rust".to_string(),
            })
            .await;

        let snapshot = handle.join().await.unwrap();
        assert_eq!(snapshot.text(), "x");
        assert_eq!(snapshot.content_type.as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn test_cursor_passes_through_without_state() {
        let handle = DocumentHandle::spawn("doc".to_string(), 16);
        let mut updates = handle.subscribe();
        let cursor = WireMessage::Cursor {
            replica_id: 5,
            index: 2,
            identity: None,
        };

        handle.send(cursor.clone()).await;
        let echoed = WireMessage::decode(&updates.recv().await.unwrap()).unwrap();
        assert_eq!(echoed, cursor);
        assert_eq!(handle.inspect().await.unwrap().nodes, 0);
    }

    #[tokio::test]
    async fn test_out_of_order_ops_are_buffered() {
        let handle = DocumentHandle::spawn("doc".to_string(), 16);
        handle.send(insert(1, 2, Some(OpId::new(1, 1)), 'b')).await;

        let state = handle.inspect().await.unwrap();
        assert_eq!(state.text, "");
        assert_eq!(state.pending, 1);

        handle.send(insert(1, 1, None, 'a')).await;
        let state = handle.inspect().await.unwrap();
        assert_eq!(state.text, "ab");
        assert_eq!(state.pending, 0);
    }

    #[tokio::test]
    async fn test_registry_reuses_documents() {
        let registry = DocumentRegistry::new(8);
        assert!(registry.is_empty());
        assert!(registry.get("a").is_none());

        registry.get_or_spawn("a").send(insert(1, 1, None, 'z')).await;
        registry.get_or_spawn("b");
        assert_eq!(registry.len(), 2);

        let state = registry.get("a").unwrap().inspect().await.unwrap();
        assert_eq!(state.text, "z");
        assert_eq!(state.doc_id, "a");
    }
}
