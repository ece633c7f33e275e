// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host for tests
//!
//! Implements every host trait over plain collections and records the
//! mutations it receives, so tests can assert on order and injected
//! failures.

use bcf_lite_geometry::LengthUnit;
use bcf_lite_model::{
    Aabb, BridgeError, CameraKind, ElementId, ElementSource, HostDocument, Orientation,
    ProjectBase, Result, SnapshotSource, ViewId, ViewReader, ViewState, ViewWriter, ZoomCorners,
};
use nalgebra::{Point3, Vector3};
use std::collections::{BTreeMap, BTreeSet};
use std::mem::discriminant;

/// A host mutation, as recorded by [`MemoryHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    ScratchView,
    ResetView,
    SetOrientation,
    ResetFarClip,
    HideElements,
    IsolateElements,
    SetSelection,
    SetSectionBox,
    ZoomTo,
    ActivateView(ViewId),
}

#[derive(Debug, Clone)]
struct MemoryView {
    state: ViewState,
    hidden: BTreeSet<ElementId>,
    temporarily_hidden: BTreeSet<ElementId>,
    isolated: Option<BTreeSet<ElementId>>,
    far_clip_reset: bool,
}

impl MemoryView {
    fn new(state: ViewState) -> Self {
        Self {
            state,
            hidden: BTreeSet::new(),
            temporarily_hidden: BTreeSet::new(),
            isolated: None,
            far_clip_reset: false,
        }
    }

    fn is_visible(&self, element: &ElementId) -> bool {
        !self.hidden.contains(element)
            && !self.temporarily_hidden.contains(element)
            && self.isolated.as_ref().map_or(true, |set| set.contains(element))
    }
}

/// Host document kept entirely in memory
#[derive(Debug, Clone)]
pub struct MemoryHost {
    elements: BTreeMap<ElementId, Option<String>>,
    views: Vec<MemoryView>,
    active: Option<ViewId>,
    selection: Vec<ElementId>,
    project_base: ProjectBase,
    unit_scale: f64,
    originating_system: String,
    snapshot: Option<Vec<u8>>,
    calls: Vec<HostCall>,
    fail_on: Option<HostCall>,
    next_view_id: i64,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            elements: BTreeMap::new(),
            views: Vec::new(),
            active: None,
            selection: Vec::new(),
            project_base: ProjectBase::default(),
            unit_scale: LengthUnit::Foot.meters_per_unit(),
            originating_system: "BCF-Lite Memory Host".to_string(),
            snapshot: None,
            calls: Vec::new(),
            fail_on: None,
            next_view_id: 1000,
        }
    }

    pub fn with_unit_scale(mut self, unit_scale: f64) -> Self {
        self.unit_scale = unit_scale;
        self
    }

    pub fn with_originating_system(mut self, name: impl Into<String>) -> Self {
        self.originating_system = name.into();
        self
    }

    /// Make [`SnapshotSource::snapshot_png`] return these bytes
    pub fn with_snapshot(mut self, png: Vec<u8>) -> Self {
        self.snapshot = Some(png);
        self
    }

    pub fn set_project_base(&mut self, base: ProjectBase) {
        self.project_base = base;
    }

    pub fn add_element(&mut self, id: ElementId, stable_id: Option<&str>) {
        self.elements.insert(id, stable_id.map(str::to_string));
    }

    /// Add a view, replacing one with the same id
    pub fn add_view(&mut self, state: ViewState) -> ViewId {
        let id = state.id;
        self.views.retain(|v| v.state.id != id);
        self.views.push(MemoryView::new(state));
        id
    }

    pub fn set_active(&mut self, view: ViewId) {
        self.active = Some(view);
    }

    pub fn active_view_id(&self) -> Option<ViewId> {
        self.active
    }

    pub fn view_state(&self, view: ViewId) -> Option<ViewState> {
        self.find(view).map(|v| v.state.clone())
    }

    pub fn update_view(&mut self, view: ViewId, update: impl FnOnce(&mut ViewState)) {
        if let Some(v) = self.views.iter_mut().find(|v| v.state.id == view) {
            update(&mut v.state);
        }
    }

    /// Hide elements permanently, as a user would
    pub fn hide(&mut self, view: ViewId, elements: &[ElementId]) {
        if let Some(v) = self.views.iter_mut().find(|v| v.state.id == view) {
            v.hidden.extend(elements.iter().copied());
        }
    }

    /// Select elements, as a user would
    pub fn select(&mut self, elements: &[ElementId]) {
        self.selection = elements.to_vec();
    }

    pub fn far_clip_reset(&self, view: ViewId) -> bool {
        self.find(view).is_some_and(|v| v.far_clip_reset)
    }

    /// Mutations received so far, in order
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Make every call of this kind fail
    pub fn fail_on(&mut self, call: HostCall) {
        self.fail_on = Some(call);
    }

    fn find(&self, view: ViewId) -> Option<&MemoryView> {
        self.views.iter().find(|v| v.state.id == view)
    }

    fn find_mut(&mut self, view: ViewId) -> Result<&mut MemoryView> {
        self.views
            .iter_mut()
            .find(|v| v.state.id == view)
            .ok_or(BridgeError::ViewNotFound(view))
    }

    fn record(&mut self, call: HostCall) -> Result<()> {
        self.calls.push(call);
        match self.fail_on {
            Some(failing) if discriminant(&failing) == discriminant(&call) => {
                Err(BridgeError::host(format!("{:?} rejected", call)))
            }
            _ => Ok(()),
        }
    }

    fn scratch_state(&mut self, kind: CameraKind, name: &str) -> ViewState {
        self.next_view_id += 1;
        ViewState {
            id: ViewId(self.next_view_id),
            name: name.to_string(),
            is_3d: true,
            is_perspective: kind == CameraKind::Perspective,
            origin: Point3::origin(),
            view_direction: Vector3::z(),
            up_direction: Vector3::y(),
            right_direction: Vector3::x(),
            zoom_corners: Some(ZoomCorners {
                bottom_left: Point3::new(-10.0, -5.0, 0.0),
                top_right: Point3::new(10.0, 5.0, 0.0),
            }),
            section_box: None,
        }
    }
}

impl ElementSource for MemoryHost {
    fn visible_elements(&self, view: ViewId) -> Result<Vec<ElementId>> {
        let v = self.find(view).ok_or(BridgeError::ViewNotFound(view))?;
        Ok(self.elements.keys().filter(|e| v.is_visible(e)).copied().collect())
    }

    fn hidden_elements(&self, view: ViewId) -> Result<Vec<ElementId>> {
        let v = self.find(view).ok_or(BridgeError::ViewNotFound(view))?;
        Ok(self.elements.keys().filter(|e| !v.is_visible(e)).copied().collect())
    }

    fn stable_id(&self, element: ElementId) -> Option<String> {
        self.elements.get(&element).cloned().flatten()
    }

    fn selection(&self) -> Vec<ElementId> {
        self.selection.clone()
    }
}

impl ViewReader for MemoryHost {
    fn active_view(&self) -> Option<ViewState> {
        self.active.and_then(|id| self.view_state(id))
    }
}

impl ViewWriter for MemoryHost {
    fn scratch_view(&mut self, kind: CameraKind, name: &str) -> Result<ViewId> {
        self.record(HostCall::ScratchView)?;
        if let Some(existing) = self.views.iter().find(|v| v.state.name == name) {
            return Ok(existing.state.id);
        }
        let state = self.scratch_state(kind, name);
        Ok(self.add_view(state))
    }

    fn reset_view(&mut self, view: ViewId) -> Result<()> {
        self.record(HostCall::ResetView)?;
        self.selection.clear();
        let v = self.find_mut(view)?;
        v.hidden.clear();
        v.temporarily_hidden.clear();
        v.isolated = None;
        v.state.section_box = None;
        Ok(())
    }

    fn set_orientation(&mut self, view: ViewId, orientation: &Orientation) -> Result<()> {
        self.record(HostCall::SetOrientation)?;
        let v = self.find_mut(view)?;
        v.state.origin = orientation.eye;
        v.state.view_direction = -orientation.forward;
        v.state.up_direction = orientation.up;
        v.state.right_direction = orientation.forward.cross(&orientation.up);
        Ok(())
    }

    fn reset_far_clip(&mut self, view: ViewId) -> Result<()> {
        self.record(HostCall::ResetFarClip)?;
        self.find_mut(view)?.far_clip_reset = true;
        Ok(())
    }

    fn hide_elements(&mut self, view: ViewId, elements: &[ElementId]) -> Result<()> {
        self.record(HostCall::HideElements)?;
        self.find_mut(view)?
            .temporarily_hidden
            .extend(elements.iter().copied());
        Ok(())
    }

    fn isolate_elements(&mut self, view: ViewId, elements: &[ElementId]) -> Result<()> {
        self.record(HostCall::IsolateElements)?;
        self.find_mut(view)?.isolated = Some(elements.iter().copied().collect());
        Ok(())
    }

    fn set_selection(&mut self, elements: &[ElementId]) -> Result<()> {
        self.record(HostCall::SetSelection)?;
        self.selection = elements.to_vec();
        Ok(())
    }

    fn set_section_box(&mut self, view: ViewId, section_box: Option<&Aabb>) -> Result<()> {
        self.record(HostCall::SetSectionBox)?;
        self.find_mut(view)?.state.section_box = section_box.copied();
        Ok(())
    }

    fn zoom_to(&mut self, view: ViewId, corners: &ZoomCorners) -> Result<()> {
        self.record(HostCall::ZoomTo)?;
        self.find_mut(view)?.state.zoom_corners = Some(*corners);
        Ok(())
    }

    fn activate_view(&mut self, view: ViewId) -> Result<()> {
        self.record(HostCall::ActivateView(view))?;
        self.find_mut(view)?;
        self.active = Some(view);
        Ok(())
    }
}

impl HostDocument for MemoryHost {
    fn project_base(&self) -> ProjectBase {
        self.project_base
    }

    fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    fn originating_system(&self) -> String {
        self.originating_system.clone()
    }
}

impl SnapshotSource for MemoryHost {
    fn snapshot_png(&self, _view: ViewId) -> Result<Vec<u8>> {
        self.snapshot
            .clone()
            .ok_or_else(|| BridgeError::snapshot("no snapshot configured"))
    }
}
