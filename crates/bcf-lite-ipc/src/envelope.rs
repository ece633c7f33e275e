// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Envelope and message vocabulary
//!
//! One [`Envelope`] is the unit exchanged between the host and the
//! companion process. The payload is an opaque string, usually JSON.

use crate::{Result, TransportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracking id used for fire-and-forget notifications
pub const NOTIFICATION_TRACKING_ID: &str = "0";

/// Message type vocabulary
///
/// Unrecognised names are kept as [`MessageType::Unknown`] so a newer peer
/// never breaks decoding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    ViewpointData,
    ViewpointGenerationRequested,
    ViewpointGenerated,
    InstanceSelected,
    AddInstance,
    RemoveInstance,
    AllInstancesRequested,
    AllInstances,
    FocusHostApplication,
    GoToSettings,
    SetBrowserToForeground,
    ValidateInstance,
    ValidatedInstance,
    CloseDesktopApplication,
    Unknown(String),
}

impl MessageType {
    /// Every known message type
    pub const KNOWN: [MessageType; 14] = [
        MessageType::ViewpointData,
        MessageType::ViewpointGenerationRequested,
        MessageType::ViewpointGenerated,
        MessageType::InstanceSelected,
        MessageType::AddInstance,
        MessageType::RemoveInstance,
        MessageType::AllInstancesRequested,
        MessageType::AllInstances,
        MessageType::FocusHostApplication,
        MessageType::GoToSettings,
        MessageType::SetBrowserToForeground,
        MessageType::ValidateInstance,
        MessageType::ValidatedInstance,
        MessageType::CloseDesktopApplication,
    ];

    /// Wire name
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::ViewpointData => "VIEWPOINT_DATA",
            MessageType::ViewpointGenerationRequested => "VIEWPOINT_GENERATION_REQUESTED",
            MessageType::ViewpointGenerated => "VIEWPOINT_GENERATED",
            MessageType::InstanceSelected => "INSTANCE_SELECTED",
            MessageType::AddInstance => "ADD_INSTANCE",
            MessageType::RemoveInstance => "REMOVE_INSTANCE",
            MessageType::AllInstancesRequested => "ALL_INSTANCES_REQUESTED",
            MessageType::AllInstances => "ALL_INSTANCES",
            MessageType::FocusHostApplication => "FOCUS_REVIT_APPLICATION",
            MessageType::GoToSettings => "GO_TO_SETTINGS",
            MessageType::SetBrowserToForeground => "SET_BROWSER_TO_FOREGROUND",
            MessageType::ValidateInstance => "VALIDATE_INSTANCE",
            MessageType::ValidatedInstance => "VALIDATED_INSTANCE",
            MessageType::CloseDesktopApplication => "CLOSE_DESKTOP_APPLICATION",
            MessageType::Unknown(name) => name,
        }
    }

    /// Check if this is one of the known types
    pub fn is_known(&self) -> bool {
        !matches!(self, MessageType::Unknown(_))
    }
}

impl From<&str> for MessageType {
    fn from(name: &str) -> Self {
        MessageType::KNOWN
            .iter()
            .find(|t| t.as_str() == name)
            .cloned()
            .unwrap_or_else(|| MessageType::Unknown(name.to_string()))
    }
}

impl From<String> for MessageType {
    fn from(name: String) -> Self {
        MessageType::from(name.as_str())
    }
}

impl From<MessageType> for String {
    fn from(message_type: MessageType) -> Self {
        message_type.as_str().to_string()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire unit exchanged between the two processes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(alias = "MessageType")]
    pub message_type: MessageType,
    #[serde(default, alias = "TrackingId")]
    pub tracking_id: String,
    #[serde(default, alias = "MessagePayload")]
    pub message_payload: String,
}

impl Envelope {
    /// Create a new envelope
    pub fn new(
        message_type: MessageType,
        tracking_id: impl Into<String>,
        message_payload: impl Into<String>,
    ) -> Self {
        Self {
            message_type,
            tracking_id: tracking_id.into(),
            message_payload: message_payload.into(),
        }
    }

    /// Notification without payload, tracked as `"0"`
    pub fn notification(message_type: MessageType) -> Self {
        Self::new(message_type, NOTIFICATION_TRACKING_ID, String::new())
    }

    /// Request with a fresh tracking id
    pub fn request(message_type: MessageType, message_payload: impl Into<String>) -> Self {
        Self::new(message_type, new_tracking_id(), message_payload)
    }

    /// Reply to this envelope, keeping its tracking id
    pub fn reply(&self, message_type: MessageType, message_payload: impl Into<String>) -> Self {
        Self::new(message_type, self.tracking_id.clone(), message_payload)
    }

    /// Encode as a single JSON line (without the trailing newline)
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| TransportError::encode(e.to_string()))
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json.trim()).map_err(|e| TransportError::decode(e.to_string()))
    }
}

/// Fresh random tracking id
pub fn new_tracking_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
