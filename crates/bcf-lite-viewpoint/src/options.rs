// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codec tuning knobs

use bcf_lite_geometry::DEFAULT_ANGLE_THRESHOLD_RAD;

/// Field of view reported for perspective views (host default, degrees)
pub const DEFAULT_PERSPECTIVE_FIELD_OF_VIEW: f64 = 45.0;

pub const DEFAULT_ORTHOGONAL_VIEW_NAME: &str = "BCF Orthogonal";
pub const DEFAULT_PERSPECTIVE_VIEW_NAME: &str = "BCF Perspective";

/// Options shared by the outbound and inbound codec
#[derive(Debug, Clone, PartialEq)]
pub struct CodecOptions {
    /// Maximum deviation for a clipping plane to count as axis-aligned
    pub angle_threshold_rad: f64,
    /// Field of view emitted for perspective cameras
    pub perspective_field_of_view: f64,
    /// Scratch view used for orthogonal cameras
    pub orthogonal_view_name: String,
    /// Scratch view used for perspective cameras
    pub perspective_view_name: String,
    /// Attach a snapshot to generated viewpoints
    pub include_snapshot: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            angle_threshold_rad: DEFAULT_ANGLE_THRESHOLD_RAD,
            perspective_field_of_view: DEFAULT_PERSPECTIVE_FIELD_OF_VIEW,
            orthogonal_view_name: DEFAULT_ORTHOGONAL_VIEW_NAME.to_string(),
            perspective_view_name: DEFAULT_PERSPECTIVE_VIEW_NAME.to_string(),
            include_snapshot: true,
        }
    }
}
