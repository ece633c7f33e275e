// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BCF viewpoint -> host view
//!
//! Application runs as a fixed sequence of stages. A failing stage aborts
//! the remaining ones and is reported as [`BridgeError::Apply`] naming the
//! last stage that completed; nothing already applied is rolled back.

use crate::{CodecOptions, CorrelationIndex, ZoomCorrection};
use bcf_lite_geometry::{
    aabb_to_internal_unit, clipping_planes_to_aabb, point_to_internal_unit, transform_aabb,
    transform_position,
};
use bcf_lite_model::{
    ApplyStage, BridgeError, Camera, ClippingPlane, HostDocument, Orientation, Position, Result,
    ViewId, Viewpoint,
};

/// Result of applying a viewpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The viewpoint had no camera; nothing was touched
    NoCamera,
    /// The viewpoint was applied to `view`
    Applied(AppliedViewpoint),
}

/// Details of an applied viewpoint
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedViewpoint {
    /// Scratch view the viewpoint was applied to
    pub view: ViewId,
    /// Last stage reached
    pub stage: ApplyStage,
    /// Exceptions resolved to host elements
    pub exceptions: usize,
    /// Elements selected after filtering
    pub selected: usize,
    /// Whether a section box was set
    pub section_box: bool,
    /// Zoom still to be applied on a later idle tick (orthogonal cameras)
    pub zoom: Option<ZoomCorrection>,
}

fn failed_after(stage: ApplyStage) -> impl FnOnce(BridgeError) -> BridgeError {
    move |e| BridgeError::apply(stage, e)
}

/// Apply a viewpoint to the host
///
/// The returned [`AppliedViewpoint::zoom`] must be run on a later idle
/// tick, see [`ZoomCorrection::schedule`].
pub fn apply_viewpoint<H>(
    host: &mut H,
    viewpoint: &Viewpoint,
    options: &CodecOptions,
) -> Result<ApplyOutcome>
where
    H: HostDocument + ?Sized,
{
    let Some(camera) = viewpoint.camera else {
        log::error!("BCF viewpoint has no camera information. Aborting ...");
        return Ok(ApplyOutcome::NoCamera);
    };

    let mut stage = ApplyStage::Idle;

    log::info!("Found camera type {}, opening related view ...", camera.kind());
    let view_name = match camera {
        Camera::Orthogonal { .. } => &options.orthogonal_view_name,
        Camera::Perspective { .. } => &options.perspective_view_name,
    };
    let view = host
        .scratch_view(camera.kind(), view_name)
        .map_err(failed_after(stage))?;
    stage = ApplyStage::ViewResolved;

    host.reset_view(view).map_err(failed_after(stage))?;
    stage = ApplyStage::StateReset;
    log::info!("Reset view '{}'.", view_name);

    let visible = host.visible_elements(view).map_err(failed_after(stage))?;
    let index = CorrelationIndex::build(&*host, &visible);
    log::debug!("Correlated {} of {} visible elements", index.len(), visible.len());

    apply_orientation(host, view, &camera).map_err(failed_after(stage))?;
    stage = ApplyStage::OrientationApplied;

    let exceptions = index.resolve_all(&viewpoint.visibility.exceptions);
    let mut selection = index.resolve_all(&viewpoint.selection);
    if !exceptions.is_empty() {
        if viewpoint.visibility.default_visible {
            host.hide_elements(view, &exceptions)
                .map_err(failed_after(stage))?;
            selection.retain(|id| !exceptions.contains(id));
        } else {
            host.isolate_elements(view, &exceptions)
                .map_err(failed_after(stage))?;
            selection.retain(|id| exceptions.contains(id));
        }
    }
    stage = ApplyStage::VisibilityApplied;

    if !selection.is_empty() {
        log::info!("Select {} elements ...", selection.len());
        host.set_selection(&selection).map_err(failed_after(stage))?;
    }
    stage = ApplyStage::SelectionApplied;
    log::info!("Applied view orientation and visibility in '{}'.", view_name);

    let section_box =
        apply_clipping(host, view, &viewpoint.clipping_planes, options).map_err(failed_after(stage))?;
    stage = ApplyStage::ClippingApplied;
    log::info!("Applied view point clipping planes in '{}'.", view_name);

    let zoom = match camera {
        Camera::Orthogonal { scale, .. } => {
            log::info!("Found orthogonal camera, setting zoom callback ...");
            stage = ApplyStage::ZoomPending;
            Some(ZoomCorrection::new(view, scale))
        }
        Camera::Perspective { .. } => None,
    };

    host.activate_view(view).map_err(failed_after(stage))?;
    if zoom.is_none() {
        stage = ApplyStage::Done;
    }
    log::info!("Finished loading BCF viewpoint.");

    Ok(ApplyOutcome::Applied(AppliedViewpoint {
        view,
        stage,
        exceptions: exceptions.len(),
        selected: selection.len(),
        section_box,
        zoom,
    }))
}

fn apply_orientation<H>(host: &mut H, view: ViewId, camera: &Camera) -> Result<()>
where
    H: HostDocument + ?Sized,
{
    log::info!("Calculating view orientation from camera position ...");
    let position = camera.position();
    let local = transform_position(
        &host.project_base(),
        &Position::new(
            point_to_internal_unit(&position.center, host.unit_scale()),
            position.forward,
            position.up,
        ),
        true,
    );

    if let Camera::Perspective { .. } = camera {
        log::info!("Resetting far clip ...");
        host.reset_far_clip(view)?;
    }

    log::info!("Applying new view orientation ...");
    host.set_orientation(view, &Orientation::from(local))
}

/// Returns whether a section box was set
fn apply_clipping<H>(
    host: &mut H,
    view: ViewId,
    planes: &[ClippingPlane],
    options: &CodecOptions,
) -> Result<bool>
where
    H: HostDocument + ?Sized,
{
    // Planes are axis-aligned in global coordinates, so reduce them there
    let aabb = clipping_planes_to_aabb(planes, options.angle_threshold_rad);

    if aabb.is_infinite() {
        log::info!("Found no axis aligned clipping planes. Disabling section box ...");
        host.set_section_box(view, None)?;
        return Ok(false);
    }

    let unit_scale = host.unit_scale();
    let local = transform_aabb(&host.project_base().scaled(unit_scale), &aabb, true);

    log::info!("Found axis aligned clipping planes. Setting resulting section box ...");
    host.set_section_box(view, Some(&aabb_to_internal_unit(&local, unit_scale)))?;
    Ok(true)
}
