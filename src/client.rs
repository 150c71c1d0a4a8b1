//! Replica client for the relay server.
//!
//! A `ReplicaClient` owns a local RGA replica, joins a document over a
//! websocket, turns text edits into operations it sends to the relay and
//! applies whatever the relay broadcasts back.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::crdt::{RGA, ReplicaId, Snapshot};
use crate::edit::apply_text;
use crate::error::ClientError;
use crate::presence::{Cursors, Identity};
use crate::protocol::WireMessage;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What changed after applying one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// An insert or delete was applied (the text may or may not differ)
    TextChanged,
    /// A remote collaborator moved their cursor
    Cursor { replica_id: ReplicaId, index: usize },
    /// The document's content-type label changed
    ContentType(String),
    /// The relay resent the whole document
    Resynced,
}

/// One participant connected to one document.
pub struct ReplicaClient {
    socket: Socket,
    rga: RGA,
    cursors: Cursors,
    identity: Identity,
}

impl ReplicaClient {
    /// Connects to `url` (e.g. `ws://127.0.0.1:3000/ws/notes`) and waits for
    /// the initial snapshot.
    pub async fn connect(url: &str, replica_id: ReplicaId) -> Result<Self, ClientError> {
        let (mut socket, _) = connect_async(url).await?;
        let snapshot = read_snapshot(&mut socket).await?;
        info!(
            replica_id,
            elements = snapshot.nodes.len(),
            "Joined document at {}",
            url
        );

        Ok(Self {
            socket,
            rga: RGA::from_snapshot(replica_id, snapshot),
            cursors: Cursors::new(),
            identity: Identity::for_replica(replica_id),
        })
    }

    pub fn replica_id(&self) -> ReplicaId {
        self.rga.replica_id()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Current visible text of the local replica.
    pub fn text(&self) -> String {
        self.rga.materialize()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.rga.content_type()
    }

    pub fn cursors(&self) -> &Cursors {
        &self.cursors
    }

    pub fn replica(&self) -> &RGA {
        &self.rga
    }

    /// Replaces the local text with `new_text` and sends the resulting
    /// operations. Returns how many operations were sent.
    pub async fn edit(&mut self, new_text: &str) -> Result<usize, ClientError> {
        let operations = apply_text(&mut self.rga, new_text);
        let count = operations.len();
        for operation in operations {
            self.send(&WireMessage::from(operation)).await?;
        }
        debug!(count, "Sent local edit");
        Ok(count)
    }

    /// Broadcasts this replica's cursor position.
    pub async fn move_cursor(&mut self, index: usize) -> Result<(), ClientError> {
        let msg = WireMessage::Cursor {
            replica_id: self.replica_id(),
            index,
            identity: Some(self.identity.clone()),
        };
        self.send(&msg).await
    }

    /// Changes the document's content-type label for everyone.
    pub async fn set_content_type(&mut self, name: &str) -> Result<(), ClientError> {
        self.rga.set_content_type(name);
        self.send(&WireMessage::ContentType {
            name: name.to_string(),
        })
        .await
    }

    /// Waits for the next meaningful message from the relay and applies it.
    ///
    /// Malformed frames and the echo of this replica's own cursor are skipped.
    pub async fn next_event(&mut self) -> Result<ClientEvent, ClientError> {
        loop {
            let text = match self.socket.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            };

            let msg = match WireMessage::decode(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Discarding message from relay: {}", e);
                    continue;
                }
            };

            if let Some(event) = self.apply(msg) {
                return Ok(event);
            }
        }
    }

    /// Sends a close frame and waits for the socket to shut down.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.socket.close(None).await?;
        Ok(())
    }

    fn apply(&mut self, msg: WireMessage) -> Option<ClientEvent> {
        if let Some(operation) = msg.operation() {
            self.rga.apply(operation);
            return Some(ClientEvent::TextChanged);
        }

        match msg {
            WireMessage::Cursor {
                replica_id,
                index,
                identity,
            } => {
                if replica_id == self.replica_id() {
                    return None;
                }
                self.cursors.update(replica_id, index, identity);
                Some(ClientEvent::Cursor { replica_id, index })
            }
            WireMessage::ContentType { name } => {
                self.rga.set_content_type(name.clone());
                Some(ClientEvent::ContentType(name))
            }
            WireMessage::Snapshot(snapshot) => {
                self.rga.load_snapshot(snapshot);
                Some(ClientEvent::Resynced)
            }
            WireMessage::Insert { .. } | WireMessage::Delete { .. } => None,
        }
    }

    async fn send(&mut self, msg: &WireMessage) -> Result<(), ClientError> {
        let json = msg.encode().map_err(ClientError::Encode)?;
        self.socket.send(Message::Text(json)).await?;
        Ok(())
    }
}

async fn read_snapshot(socket: &mut Socket) -> Result<Snapshot, ClientError> {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => {
                return match WireMessage::decode(&text)? {
                    WireMessage::Snapshot(snapshot) => Ok(snapshot),
                    _ => Err(ClientError::MissingSnapshot),
                };
            }
            Some(Ok(Message::Close(_))) | None => return Err(ClientError::Closed),
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
