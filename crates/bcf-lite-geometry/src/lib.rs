// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BCF-Lite Geometry
//!
//! Pure math for moving viewpoint data between a host's project-local
//! coordinate system and the global, meter-based system of the BCF
//! interchange model.
//!
//! ## Overview
//!
//! - **Transforms**: rotate about the vertical axis and translate positions
//!   and section boxes by a [`ProjectBase`], in either direction
//! - **Units**: linear length conversion that leaves infinite bounds alone
//! - **Clipping**: rebuild an axis-aligned box from clipping planes and
//!   emit the planes of a box
//! - **View box**: decompose a zoom diagonal into height and width, and
//!   rebuild zoom corners from them
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bcf_lite_geometry::{transform_position, Position, ProjectBase, Point3, Vector3};
//!
//! let base = ProjectBase::new(Vector3::new(10.0, 10.0, 5.0), std::f64::consts::FRAC_PI_2);
//! let local = Position::new(Point3::new(1.0, 1.0, 1.0), Vector3::z(), Vector3::x());
//!
//! let global = transform_position(&base, &local, false);
//! let back = transform_position(&base, &global, true);
//! assert!((back.center - local.center).norm() < 1e-9);
//! ```

pub mod clipping;
pub mod error;
pub mod transform;
pub mod units;
pub mod view;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

// Re-export model types the functions here operate on
pub use bcf_lite_model::{Aabb, Axis, ClippingPlane, Position, ProjectBase, ZoomCorners};

// Re-export main functions
pub use clipping::{
    aabb_to_clipping_planes, clipping_planes_to_aabb, plane_to_aabb, DEFAULT_ANGLE_THRESHOLD_RAD,
};
pub use error::{Error, Result};
pub use transform::{rotate_about_vertical, transform_aabb, transform_position};
pub use units::{
    aabb_to_internal_unit, aabb_to_meters, point_to_internal_unit, point_to_meters,
    to_internal_unit, to_meters, LengthUnit,
};
pub use view::{view_box_values, zoom_rectangle, ViewBox};
