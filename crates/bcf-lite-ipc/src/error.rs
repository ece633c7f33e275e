// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the message transport

use thiserror::Error;

/// Transport result type
pub type Result<T> = std::result::Result<T, TransportError>;

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Socket I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Envelope could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Envelope could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The peer is not listening (anymore)
    #[error("Peer on port {port} unavailable: {message}")]
    PeerUnavailable { port: u16, message: String },
}

impl TransportError {
    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        TransportError::Encode(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        TransportError::Decode(msg.into())
    }

    /// Create a peer unavailable error
    pub fn peer_unavailable(port: u16, msg: impl Into<String>) -> Self {
        TransportError::PeerUnavailable {
            port,
            message: msg.into(),
        }
    }

    /// Check if this error means the peer went away
    pub fn is_peer_gone(&self) -> bool {
        matches!(self, TransportError::PeerUnavailable { .. })
    }
}
