//! WebSocket session management for collaborative editing.
//!
//! A session bridges one websocket to one document actor: it sends the joining
//! client a snapshot, forwards the document's broadcasts to the socket and
//! forwards decoded client messages to the actor.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::{Message, WebSocket};
use chrono::Utc;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

use crate::crdt::Snapshot;
use crate::error::ProtocolError;
use crate::protocol::WireMessage;
use crate::server::document::DocumentHandle;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// WebSocket session for one connected replica
pub struct WebSocketSession {
    socket: WebSocket,
    document: DocumentHandle,
    session_id: String,
}

impl WebSocketSession {
    /// Create a new WebSocket session
    pub fn new(socket: WebSocket, document: DocumentHandle, session_id: String) -> Self {
        Self {
            socket,
            document,
            session_id,
        }
    }

    /// Handle the WebSocket connection lifecycle
    pub async fn handle(self) {
        let WebSocketSession {
            socket,
            document,
            session_id,
        } = self;
        info!("WebSocket session {} established", session_id);

        // Subscribe before joining so nothing accepted after the snapshot is missed
        let updates = document.subscribe();
        let Some(snapshot) = document.join().await else {
            error!("Document actor gone before session {} joined", session_id);
            return;
        };

        let (mut sink, stream) = socket.split();
        if let Err(e) = send_snapshot(&mut sink, snapshot).await {
            error!("Failed to send initial state to {}: {}", session_id, e);
            return;
        }

        let mut send_task = tokio::spawn(forward_updates(
            sink,
            updates,
            document.clone(),
            session_id.clone(),
        ));
        let mut recv_task = tokio::spawn(forward_messages(stream, document, session_id.clone()));

        tokio::select! {
            _ = &mut send_task => recv_task.abort(),
            _ = &mut recv_task => send_task.abort(),
        };

        info!("WebSocket session {} ended", session_id);
    }
}

/// Document broadcasts -> socket.
async fn forward_updates(
    mut sink: SplitSink<WebSocket, Message>,
    mut updates: broadcast::Receiver<String>,
    document: DocumentHandle,
    session_id: String,
) {
    loop {
        match updates.recv().await {
            Ok(json) => {
                if sink.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                // Operations were lost for this session; resync it from a snapshot
                warn!(
                    "Session {} lagged by {} messages, resending snapshot",
                    session_id, skipped
                );
                let Some(snapshot) = document.join().await else {
                    break;
                };
                if send_snapshot(&mut sink, snapshot).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Socket -> document actor.
async fn forward_messages(
    mut stream: SplitStream<WebSocket>,
    document: DocumentHandle,
    session_id: String,
) {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => match WireMessage::decode(&text) {
                Ok(msg) => {
                    if !document.send(msg).await {
                        break;
                    }
                }
                Err(e) => {
                    // Don't break connection for parse errors
                    warn!("Discarding message from {}: {}", session_id, e);
                }
            },
            Ok(Message::Binary(data)) => {
                warn!(
                    "Discarding message from {}: {}",
                    session_id,
                    ProtocolError::Binary(data.len())
                );
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket session {} closed by client", session_id);
                break;
            }
            Ok(_) => {
                // Ping/pong frames are answered by the websocket layer
            }
            Err(e) => {
                warn!("WebSocket error for {}: {}", session_id, e);
                break;
            }
        }
    }
}

async fn send_snapshot(
    sink: &mut SplitSink<WebSocket, Message>,
    snapshot: Snapshot,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = WireMessage::Snapshot(snapshot).encode()?;
    sink.send(Message::Text(json)).await?;
    Ok(())
}

/// Generate a unique session ID
pub fn generate_session_id() -> String {
    let n = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
    format!("session_{}_{}", Utc::now().timestamp_millis(), n)
}

/// Create and handle a new WebSocket session
pub async fn handle_websocket_connection(socket: WebSocket, document: DocumentHandle) {
    let session_id = generate_session_id();
    let session = WebSocketSession::new(socket, document, session_id);
    session.handle().await;
}
