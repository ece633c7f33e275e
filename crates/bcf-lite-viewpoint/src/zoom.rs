// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deferred zoom correction for orthogonal views
//!
//! Setting an orthogonal view's orientation does not change its zoom, so the
//! viewpoint's view-to-world scale is applied on a later idle tick, once the
//! host has settled the newly activated view.

use bcf_lite_geometry::{to_internal_unit, view_box_values, zoom_rectangle, ViewBox};
use bcf_lite_ipc::DispatcherHandle;
use bcf_lite_model::{BridgeError, HostDocument, Result, ViewId};

/// Pending zoom of `view` to a view box height of `scale` meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomCorrection {
    pub view: ViewId,
    pub scale: f64,
}

impl ZoomCorrection {
    pub fn new(view: ViewId, scale: f64) -> Self {
        Self { view, scale }
    }

    /// Zoom the active view, keeping its aspect ratio
    ///
    /// Returns `false` without touching the host if the user switched to
    /// another view in the meantime.
    pub fn apply<H: HostDocument + ?Sized>(&self, host: &mut H) -> Result<bool> {
        let Some(active) = host.active_view() else {
            return Ok(false);
        };
        if active.id != self.view {
            log::debug!(
                "Skipping zoom: active view {} is not {}",
                active.id,
                self.view
            );
            return Ok(false);
        }

        log::info!("Zooming to scale '{}' ...", self.scale);

        let corners = active
            .zoom_corners
            .ok_or_else(|| BridgeError::host(format!("view '{}' has no zoom corners", active.name)))?;
        let current = view_box_values(
            &corners.top_right,
            &corners.bottom_left,
            &active.right_direction,
        )?;

        let height = to_internal_unit(self.scale, host.unit_scale());
        let target = ViewBox {
            height,
            width: height * current.aspect_ratio()?,
        };
        let rectangle = zoom_rectangle(
            &active.origin,
            &active.up_direction,
            &active.right_direction,
            &target,
        );

        log::info!(
            "Zoom to {:?} | {:?} ...",
            rectangle.top_right,
            rectangle.bottom_left
        );
        host.zoom_to(self.view, &rectangle)?;
        log::info!("Finished applying zoom for orthogonal view.");
        Ok(true)
    }

    /// Queue this correction for the next idle tick
    pub fn schedule<H>(self, dispatcher: &DispatcherHandle<H>)
    where
        H: HostDocument + 'static,
    {
        log::info!("Append zoom callback for orthogonal view to idle queue ...");
        dispatcher.enqueue_with_title("Error zooming the view.", move |host: &mut H| {
            self.apply(host).map(|_| ())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;
    use approx::assert_relative_eq;
    use bcf_lite_geometry::LengthUnit;
    use bcf_lite_model::{ViewState, ZoomCorners};
    use nalgebra::{Point3, Vector3};

    fn host_with_view(id: ViewId) -> MemoryHost {
        let mut host = MemoryHost::new().with_unit_scale(LengthUnit::Foot.meters_per_unit());
        let view = host.add_view(ViewState {
            id,
            name: "BCF Orthogonal".to_string(),
            is_3d: true,
            is_perspective: false,
            origin: Point3::new(5.0, 5.0, 0.0),
            view_direction: Vector3::z(),
            up_direction: Vector3::y(),
            right_direction: Vector3::x(),
            zoom_corners: Some(ZoomCorners {
                bottom_left: Point3::new(1.0, 3.0, 0.0),
                top_right: Point3::new(9.0, 7.0, 0.0),
            }),
            section_box: None,
        });
        host.set_active(view);
        host
    }

    #[test]
    fn test_zoom_to_scale_keeps_aspect_ratio() {
        let mut host = host_with_view(ViewId(3));
        let correction = ZoomCorrection::new(ViewId(3), 3.048);

        assert!(correction.apply(&mut host).unwrap());

        let corners = host.view_state(ViewId(3)).unwrap().zoom_corners.unwrap();
        assert_relative_eq!(corners.bottom_left, Point3::new(-5.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(corners.top_right, Point3::new(15.0, 10.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_other_active_view_is_left_alone() {
        let mut host = host_with_view(ViewId(3));
        let correction = ZoomCorrection::new(ViewId(99), 3.048);

        assert!(!correction.apply(&mut host).unwrap());
        assert_eq!(
            host.view_state(ViewId(3)).unwrap().zoom_corners.unwrap().top_right,
            Point3::new(9.0, 7.0, 0.0)
        );
    }
}
