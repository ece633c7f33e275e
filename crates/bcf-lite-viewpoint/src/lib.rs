// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BCF-Lite Viewpoint
//!
//! Builds BCF viewpoints from a host's active view and applies received
//! viewpoints back onto dedicated scratch views.
//!
//! ## Overview
//!
//! - **Outbound**: [`generate_viewpoint`] reads camera, section box,
//!   visibility and selection from the host and converts them to global
//!   coordinates in meters
//! - **Inbound**: [`apply_viewpoint`] resolves components through a
//!   [`CorrelationIndex`], converts back to local coordinates and drives
//!   the host's view mutations stage by stage
//! - **Zoom**: orthogonal scale is applied afterwards by a [`ZoomCorrection`]
//! - **Wire**: [`ViewpointJson`] is the BCF JSON shape
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bcf_lite_viewpoint::{apply_viewpoint, decode_viewpoint, ApplyOutcome, CodecOptions};
//!
//! let viewpoint = decode_viewpoint(&envelope.message_payload)?;
//! if let ApplyOutcome::Applied(applied) = apply_viewpoint(&mut host, &viewpoint, &options)? {
//!     if let Some(zoom) = applied.zoom {
//!         zoom.schedule(&dispatcher.handle());
//!     }
//! }
//! ```

pub mod correlation;
pub mod inbound;
pub mod options;
pub mod outbound;
pub mod wire;
pub mod zoom;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use correlation::CorrelationIndex;
pub use inbound::{apply_viewpoint, AppliedViewpoint, ApplyOutcome};
pub use options::{
    CodecOptions, DEFAULT_ORTHOGONAL_VIEW_NAME, DEFAULT_PERSPECTIVE_FIELD_OF_VIEW,
    DEFAULT_PERSPECTIVE_VIEW_NAME,
};
pub use outbound::{generate_viewpoint, png_snapshot};
pub use wire::{
    decode_viewpoint, decode_viewpoint_envelope, encode_generated_payload, strip_double_encoding,
    ViewpointJson,
};
pub use zoom::ZoomCorrection;
