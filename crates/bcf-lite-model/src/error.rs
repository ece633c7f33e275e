// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for viewpoint operations

use crate::{ApplyStage, ViewId};
use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur while generating or applying viewpoints
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Viewpoints can only be captured from 3D views
    #[error("Active view is not a 3D view")]
    NotThreeDView,

    /// There is no active view at all
    #[error("No active view")]
    NoActiveView,

    /// A view id did not resolve to a host view
    #[error("View {0} not found")]
    ViewNotFound(ViewId),

    /// A host API call failed
    #[error("Host error: {0}")]
    Host(String),

    /// Malformed message payload
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// A message of the wrong type was handed to a decoder
    #[error("Unexpected message type: expected {expected}, got {actual}")]
    UnexpectedMessage { expected: String, actual: String },

    /// A step of an inbound viewpoint application failed
    #[error("Viewpoint application failed after stage '{stage}': {source}")]
    Apply {
        stage: ApplyStage,
        #[source]
        source: Box<BridgeError>,
    },

    /// Snapshot capture failed
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(String),
}

impl BridgeError {
    /// Create a host error
    pub fn host(msg: impl Into<String>) -> Self {
        BridgeError::Host(msg.into())
    }

    /// Create a payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        BridgeError::Payload(msg.into())
    }

    /// Create an unexpected message error
    pub fn unexpected_message(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        BridgeError::UnexpectedMessage {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Wrap an error with the last stage that completed before it happened
    pub fn apply(stage: ApplyStage, source: BridgeError) -> Self {
        BridgeError::Apply {
            stage,
            source: Box::new(source),
        }
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        BridgeError::Snapshot(msg.into())
    }

    /// Stage reached before failure, if this is an apply error
    pub fn failed_after(&self) -> Option<ApplyStage> {
        match self {
            BridgeError::Apply { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Json(e.to_string())
    }
}
