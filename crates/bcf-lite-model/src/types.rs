// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for viewpoint data representation
//!
//! This module defines the fundamental types exchanged between a host view and
//! the BCF interchange model. All of them are transient: built for one request,
//! dropped after one codec pass.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type-safe host element handle
///
/// Only meaningful inside the host session that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize, Default)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ElementId {
    fn from(id: i64) -> Self {
        ElementId(id)
    }
}

/// Type-safe host view handle
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub struct ViewId(pub i64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view:{}", self.0)
    }
}

/// Coordinate axis
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit vector along the positive axis
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Camera location and orientation
///
/// `forward` and `up` are unit directions; `center` is a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub center: Point3<f64>,
    pub forward: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Position {
    /// Create a new position
    pub fn new(center: Point3<f64>, forward: Vector3<f64>, up: Vector3<f64>) -> Self {
        Self {
            center,
            forward,
            up,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            forward: Vector3::zeros(),
            up: Vector3::zeros(),
        }
    }
}

/// Camera projection kind
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CameraKind {
    Orthogonal,
    Perspective,
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraKind::Orthogonal => write!(f, "orthogonal"),
            CameraKind::Perspective => write!(f, "perspective"),
        }
    }
}

/// Viewpoint camera
///
/// Positions are in global coordinates and meters while they travel
/// through the interchange format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Camera {
    /// Parallel projection; `scale` is the view-to-world scale (view box height in meters)
    Orthogonal { position: Position, scale: f64 },
    /// Perspective projection; `field_of_view` in degrees
    Perspective {
        position: Position,
        field_of_view: f64,
    },
}

impl Camera {
    /// Get the projection kind
    pub fn kind(&self) -> CameraKind {
        match self {
            Camera::Orthogonal { .. } => CameraKind::Orthogonal,
            Camera::Perspective { .. } => CameraKind::Perspective,
        }
    }

    /// Get the camera position
    pub fn position(&self) -> &Position {
        match self {
            Camera::Orthogonal { position, .. } | Camera::Perspective { position, .. } => position,
        }
    }
}

/// Half-space boundary; `direction` points away from the kept region
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClippingPlane {
    pub location: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl ClippingPlane {
    /// Create a new clipping plane
    pub fn new(location: Point3<f64>, direction: Vector3<f64>) -> Self {
        Self {
            location,
            direction,
        }
    }
}

/// Axis-aligned bounding box
///
/// A bound set to `-inf` (min) or `+inf` (max) leaves that side unbounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new box from its corners
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// The box that is unbounded on every side
    pub fn infinite() -> Self {
        Self {
            min: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            max: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
        }
    }

    /// Check if every bound is infinite
    pub fn is_infinite(&self) -> bool {
        *self == Self::infinite()
    }

    /// Check if both bounds on an axis are finite
    pub fn is_finite_on(&self, axis: Axis) -> bool {
        self.min[axis.index()].is_finite() && self.max[axis.index()].is_finite()
    }

    /// Lower bound on an axis
    pub fn min_on(&self, axis: Axis) -> f64 {
        self.min[axis.index()]
    }

    /// Upper bound on an axis
    pub fn max_on(&self, axis: Axis) -> f64 {
        self.max[axis.index()]
    }

    /// Intersection of the half-spaces described by both boxes
    ///
    /// Idempotent, and [`Aabb::infinite`] is its identity element.
    pub fn merge_reduce(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.sup(&other.min),
            max: self.max.inf(&other.max),
        }
    }

    /// Per-axis center of the box
    ///
    /// An axis with one infinite bound centers on its finite bound;
    /// an axis unbounded on both sides centers on zero.
    pub fn centroid(&self) -> Point3<f64> {
        let mut center = Point3::origin();
        for axis in Axis::ALL {
            let (lo, hi) = (self.min_on(axis), self.max_on(axis));
            center[axis.index()] = match (lo.is_finite(), hi.is_finite()) {
                (true, true) => (lo + hi) * 0.5,
                (true, false) => lo,
                (false, true) => hi,
                (false, false) => 0.0,
            };
        }
        center
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::infinite()
    }
}

/// Project placement relative to global coordinates
///
/// A rotation about the vertical axis followed by a translation. The
/// translation is in host internal units unless scaled.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ProjectBase {
    pub translation: Vector3<f64>,
    /// Rotation angle about the vertical axis in radians
    pub angle: f64,
}

impl ProjectBase {
    /// Create a new project base
    pub fn new(translation: Vector3<f64>, angle: f64) -> Self {
        Self { translation, angle }
    }

    /// Create a project base from east/north/elevation offsets and an angle
    pub fn from_offsets(east_west: f64, north_south: f64, elevation: f64, angle: f64) -> Self {
        Self::new(Vector3::new(east_west, north_south, elevation), angle)
    }

    /// Copy of this base with the translation multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            translation: self.translation * factor,
            angle: self.angle,
        }
    }
}

/// An element reference that is stable outside the host process
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_system: Option<String>,
    /// Stable interchange identifier (IFC GUID)
    #[serde(rename = "ifc_guid")]
    pub stable_id: String,
    /// Host-local identifier at the time of export
    #[serde(
        rename = "authoring_tool_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub authoring_local_id: Option<String>,
}

impl Component {
    /// Create a component carrying only a stable id
    pub fn with_stable_id(stable_id: impl Into<String>) -> Self {
        Self {
            originating_system: None,
            stable_id: stable_id.into(),
            authoring_local_id: None,
        }
    }
}

/// Default visibility plus the components that deviate from it
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Visibility {
    pub default_visible: bool,
    pub exceptions: Vec<Component>,
}

/// Snapshot image format
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotType {
    #[default]
    Png,
    Jpg,
}

/// Opaque snapshot reference
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Snapshot {
    pub snapshot_type: SnapshotType,
    /// Data URL or opaque reference
    pub data: String,
}

/// A BCF viewpoint: camera, clipping, visibility and selection
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Viewpoint {
    pub camera: Option<Camera>,
    pub clipping_planes: Vec<ClippingPlane>,
    pub selection: Vec<Component>,
    pub visibility: Visibility,
    pub snapshot: Option<Snapshot>,
}

/// Bottom-left and top-right corners of a view's visible rectangle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomCorners {
    pub bottom_left: Point3<f64>,
    pub top_right: Point3<f64>,
}

/// Snapshot of a host view, in local coordinates and internal units
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    pub id: ViewId,
    pub name: String,
    pub is_3d: bool,
    pub is_perspective: bool,
    /// Eye position
    pub origin: Point3<f64>,
    /// Points from the model toward the viewer
    pub view_direction: Vector3<f64>,
    pub up_direction: Vector3<f64>,
    pub right_direction: Vector3<f64>,
    pub zoom_corners: Option<ZoomCorners>,
    /// Active section box, if any
    pub section_box: Option<Aabb>,
}

/// View orientation handed to the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub eye: Point3<f64>,
    pub up: Vector3<f64>,
    /// Looking direction
    pub forward: Vector3<f64>,
}

impl From<Position> for Orientation {
    fn from(position: Position) -> Self {
        Self {
            eye: position.center,
            up: position.up,
            forward: position.forward,
        }
    }
}

/// Progress of an inbound viewpoint application
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ApplyStage {
    #[default]
    Idle,
    ViewResolved,
    StateReset,
    OrientationApplied,
    VisibilityApplied,
    SelectionApplied,
    ClippingApplied,
    ZoomPending,
    Done,
}

impl fmt::Display for ApplyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplyStage::Idle => "idle",
            ApplyStage::ViewResolved => "view resolved",
            ApplyStage::StateReset => "state reset",
            ApplyStage::OrientationApplied => "orientation applied",
            ApplyStage::VisibilityApplied => "visibility applied",
            ApplyStage::SelectionApplied => "selection applied",
            ApplyStage::ClippingApplied => "clipping applied",
            ApplyStage::ZoomPending => "zoom pending",
            ApplyStage::Done => "done",
        };
        f.write_str(name)
    }
}
