// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BCF viewpoint JSON shape
//!
//! Mirrors the BCF REST viewpoint object as far as cameras, clipping planes,
//! components and the snapshot go. Fields this bridge does not use (lines,
//! bitmaps, guid, ...) are ignored on input.

use bcf_lite_ipc::{Envelope, MessageType};
use bcf_lite_model::{
    BridgeError, Camera, ClippingPlane, Component, Position, Result, Snapshot, SnapshotType,
    Viewpoint, Visibility,
};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// `{x, y, z}` triple used for both points and directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyzJson {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl XyzJson {
    pub fn point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Point3<f64>> for XyzJson {
    fn from(p: Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

impl From<Vector3<f64>> for XyzJson {
    fn from(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrthogonalCameraJson {
    pub camera_view_point: XyzJson,
    pub camera_direction: XyzJson,
    pub camera_up_vector: XyzJson,
    pub view_to_world_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCameraJson {
    pub camera_view_point: XyzJson,
    pub camera_direction: XyzJson,
    pub camera_up_vector: XyzJson,
    pub field_of_view: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClippingPlaneJson {
    pub location: XyzJson,
    pub direction: XyzJson,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisibilityJson {
    #[serde(default)]
    pub default_visibility: bool,
    #[serde(default)]
    pub exceptions: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentsJson {
    #[serde(default)]
    pub selection: Vec<Component>,
    #[serde(default)]
    pub visibility: VisibilityJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotJson {
    #[serde(default)]
    pub snapshot_type: SnapshotType,
    pub snapshot_data: String,
}

/// Snapshot as received: either the BCF object or a bare data URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnapshotField {
    Object(SnapshotJson),
    DataUrl(String),
}

/// BCF viewpoint object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewpointJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orthogonal_camera: Option<OrthogonalCameraJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_camera: Option<PerspectiveCameraJson>,
    #[serde(default)]
    pub clipping_planes: Vec<ClippingPlaneJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentsJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<SnapshotField>,
}

impl ViewpointJson {
    /// Convert into the model viewpoint
    ///
    /// If both cameras are present the orthogonal one wins.
    pub fn into_viewpoint(self) -> Viewpoint {
        let camera = match (self.orthogonal_camera, self.perspective_camera) {
            (Some(ortho), _) => Some(Camera::Orthogonal {
                position: Position::new(
                    ortho.camera_view_point.point(),
                    ortho.camera_direction.vector(),
                    ortho.camera_up_vector.vector(),
                ),
                scale: ortho.view_to_world_scale,
            }),
            (None, Some(persp)) => Some(Camera::Perspective {
                position: Position::new(
                    persp.camera_view_point.point(),
                    persp.camera_direction.vector(),
                    persp.camera_up_vector.vector(),
                ),
                field_of_view: persp.field_of_view,
            }),
            (None, None) => None,
        };

        let components = self.components.unwrap_or_default();

        Viewpoint {
            camera,
            clipping_planes: self
                .clipping_planes
                .iter()
                .map(|p| ClippingPlane::new(p.location.point(), p.direction.vector()))
                .collect(),
            selection: components.selection,
            visibility: Visibility {
                default_visible: components.visibility.default_visibility,
                exceptions: components.visibility.exceptions,
            },
            snapshot: self.snapshot.map(|s| match s {
                SnapshotField::Object(o) => Snapshot {
                    snapshot_type: o.snapshot_type,
                    data: o.snapshot_data,
                },
                SnapshotField::DataUrl(data) => Snapshot {
                    snapshot_type: SnapshotType::Png,
                    data,
                },
            }),
        }
    }

    /// Build the wire object from a model viewpoint
    pub fn from_viewpoint(viewpoint: &Viewpoint) -> Self {
        let (orthogonal_camera, perspective_camera) = match viewpoint.camera {
            Some(Camera::Orthogonal { position, scale }) => (
                Some(OrthogonalCameraJson {
                    camera_view_point: position.center.into(),
                    camera_direction: position.forward.into(),
                    camera_up_vector: position.up.into(),
                    view_to_world_scale: scale,
                }),
                None,
            ),
            Some(Camera::Perspective {
                position,
                field_of_view,
            }) => (
                None,
                Some(PerspectiveCameraJson {
                    camera_view_point: position.center.into(),
                    camera_direction: position.forward.into(),
                    camera_up_vector: position.up.into(),
                    field_of_view,
                }),
            ),
            None => (None, None),
        };

        Self {
            orthogonal_camera,
            perspective_camera,
            clipping_planes: viewpoint
                .clipping_planes
                .iter()
                .map(|p| ClippingPlaneJson {
                    location: p.location.into(),
                    direction: p.direction.into(),
                })
                .collect(),
            components: Some(ComponentsJson {
                selection: viewpoint.selection.clone(),
                visibility: VisibilityJson {
                    default_visibility: viewpoint.visibility.default_visible,
                    exceptions: viewpoint.visibility.exceptions.clone(),
                },
            }),
            snapshot: viewpoint.snapshot.as_ref().map(|s| {
                SnapshotField::Object(SnapshotJson {
                    snapshot_type: s.snapshot_type,
                    snapshot_data: s.data.clone(),
                })
            }),
        }
    }
}

/// Remove one layer of JSON string encoding, if present
///
/// Some senders stringify the viewpoint object before putting it in the
/// envelope payload, producing `"{\"orthogonal_camera\":...}"`.
pub fn strip_double_encoding(payload: &str) -> String {
    let trimmed = payload.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }
    match serde_json::from_str::<String>(trimmed) {
        Ok(inner) => inner,
        Err(_) => trimmed.trim_matches('"').replace("\\\"", "\""),
    }
}

/// Decode a viewpoint payload
pub fn decode_viewpoint(payload: &str) -> Result<Viewpoint> {
    let json = strip_double_encoding(payload);
    let wire: ViewpointJson = serde_json::from_str(&json)
        .map_err(|e| BridgeError::payload(format!("invalid viewpoint JSON: {}", e)))?;
    Ok(wire.into_viewpoint())
}

/// Decode the viewpoint carried by a `VIEWPOINT_DATA` envelope
pub fn decode_viewpoint_envelope(envelope: &Envelope) -> Result<Viewpoint> {
    if envelope.message_type != MessageType::ViewpointData {
        return Err(BridgeError::unexpected_message(
            MessageType::ViewpointData.as_str(),
            envelope.message_type.as_str(),
        ));
    }
    decode_viewpoint(&envelope.message_payload)
}

/// Encode a viewpoint as a `VIEWPOINT_GENERATED` payload
///
/// The companion expects the snapshot as the bare data URL, not the BCF
/// snapshot object.
pub fn encode_generated_payload(viewpoint: &Viewpoint) -> Result<String> {
    let mut value = serde_json::to_value(ViewpointJson::from_viewpoint(viewpoint))?;
    if let Some(snapshot) = value.get_mut("snapshot") {
        let data = snapshot
            .get("snapshot_data")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        *snapshot = data;
    }
    Ok(value.to_string())
}
