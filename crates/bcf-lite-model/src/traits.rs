// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host capability traits
//!
//! These traits are the only window the viewpoint codec has onto the host
//! application. Read access takes `&self`; every mutation takes `&mut self`
//! so it can only happen where the host context is owned, which is the
//! dispatcher's idle tick.

use crate::{
    Aabb, CameraKind, ElementId, Orientation, ProjectBase, Result, ViewId, ViewState, ZoomCorners,
};

/// Element enumeration and stable id lookup
pub trait ElementSource {
    /// Elements currently visible in a view
    fn visible_elements(&self, view: ViewId) -> Result<Vec<ElementId>>;

    /// Elements present in a view but hidden
    fn hidden_elements(&self, view: ViewId) -> Result<Vec<ElementId>>;

    /// Stable interchange id of an element, if it has one
    fn stable_id(&self, element: ElementId) -> Option<String>;

    /// Host-local id exported as `authoring_tool_id`
    fn authoring_local_id(&self, element: ElementId) -> Option<String> {
        Some(element.to_string())
    }

    /// The host's current selection
    fn selection(&self) -> Vec<ElementId>;
}

/// Read-only access to view state
pub trait ViewReader {
    /// The view the user is looking at
    fn active_view(&self) -> Option<ViewState>;
}

/// View mutations
///
/// All coordinates are local and in internal units.
pub trait ViewWriter {
    /// Get or create the dedicated view named `name` for a camera kind
    fn scratch_view(&mut self, kind: CameraKind, name: &str) -> Result<ViewId>;

    /// Clear selection, temporary hide/isolate, hidden elements and the section box
    fn reset_view(&mut self, view: ViewId) -> Result<()>;

    /// Set eye, up and looking direction
    fn set_orientation(&mut self, view: ViewId, orientation: &Orientation) -> Result<()>;

    /// Disable the far clip of a perspective view
    fn reset_far_clip(&mut self, _view: ViewId) -> Result<()> {
        Ok(())
    }

    /// Hide elements in a view
    fn hide_elements(&mut self, view: ViewId, elements: &[ElementId]) -> Result<()>;

    /// Temporarily isolate elements in a view
    fn isolate_elements(&mut self, view: ViewId, elements: &[ElementId]) -> Result<()>;

    /// Replace the host selection
    fn set_selection(&mut self, elements: &[ElementId]) -> Result<()>;

    /// Set the section box, or disable it with `None`
    fn set_section_box(&mut self, view: ViewId, section_box: Option<&Aabb>) -> Result<()>;

    /// Zoom a view to a rectangle
    fn zoom_to(&mut self, view: ViewId, corners: &ZoomCorners) -> Result<()>;

    /// Make a view the active one
    fn activate_view(&mut self, view: ViewId) -> Result<()>;
}

/// A host document: element access, view access and project placement
pub trait HostDocument: ElementSource + ViewReader + ViewWriter {
    /// Project base in internal units
    fn project_base(&self) -> ProjectBase;

    /// Meters per internal length unit
    fn unit_scale(&self) -> f64;

    /// Name and version of the authoring application
    fn originating_system(&self) -> String;
}

/// Opaque snapshot capture
pub trait SnapshotSource {
    /// Render a view to PNG bytes
    fn snapshot_png(&self, view: ViewId) -> Result<Vec<u8>>;
}

/// Host-native user notification
///
/// Implementations must be callable from the dispatch boundary; they
/// are shared with the dispatcher behind an `Arc`.
pub trait ErrorNotifier: Send + Sync {
    /// Show a non-fatal warning
    fn show_warning(&self, title: &str, message: &str);

    /// Show an error
    fn show_error(&self, title: &str, message: &str);
}

/// Notifier that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ErrorNotifier for LogNotifier {
    fn show_warning(&self, title: &str, message: &str) {
        log::warn!("{}: {}", title, message);
    }

    fn show_error(&self, title: &str, message: &str) {
        log::error!("{}: {}", title, message);
    }
}
