// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BCF-Lite Model - Domain types and host capability traits for viewpoint exchange
//!
//! This crate provides the shared vocabulary of the bridge between a BIM authoring
//! host and its companion UI process: camera poses, clipping planes, bounding boxes,
//! element components and viewpoints, plus the traits a host implements so the
//! viewpoint codec can read and mutate its view state.
//!
//! # Architecture
//!
//! The host surface is split by concern:
//!
//! - [`ElementSource`] - Visible/hidden element enumeration and stable id lookup
//! - [`ViewReader`] - Read-only access to view state
//! - [`ViewWriter`] - View mutations (orientation, visibility, section box, zoom)
//! - [`HostDocument`] - All of the above plus project placement and units
//! - [`SnapshotSource`] - Opaque snapshot image capture
//! - [`ErrorNotifier`] - Host-native warning/error notification
//!
//! # Example
//!
//! ```ignore
//! use bcf_lite_model::{HostDocument, ViewReader};
//!
//! fn describe(host: &impl HostDocument) {
//!     if let Some(view) = host.active_view() {
//!         println!("Active view '{}' (3D: {})", view.name, view.is_3d);
//!     }
//! }
//! ```

pub mod error;
pub mod traits;
pub mod types;

// Re-export all public types
pub use error::*;
pub use traits::*;
pub use types::*;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
