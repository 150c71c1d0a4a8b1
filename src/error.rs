//! Error types for the layers around the CRDT.
//!
//! The RGA itself never fails: duplicates are ignored and operations with
//! missing dependencies are buffered. Errors only exist at the edges, where
//! text arrives from the network or settings arrive from the environment.

use std::io;

/// A wire message that could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unexpected binary frame of {0} bytes")]
    Binary(usize),
}

/// Invalid server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}: {source}")]
    Address {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid channel capacity {0:?}: expected a positive integer")]
    ChannelCapacity(String),
}

/// Failure of a replica client's connection.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("could not encode message: {0}")]
    Encode(serde_json::Error),
    #[error("connection closed")]
    Closed,
    #[error("expected a snapshot as the first message")]
    MissingSnapshot,
}

/// Top-level error of the relay server binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
