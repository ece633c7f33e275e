// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host view -> BCF viewpoint

use crate::CodecOptions;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bcf_lite_geometry::{
    aabb_to_clipping_planes, aabb_to_meters, point_to_meters, to_meters, transform_aabb,
    transform_position, view_box_values,
};
use bcf_lite_model::{
    BridgeError, Camera, ClippingPlane, Component, ElementId, HostDocument, Position, Result,
    Snapshot, SnapshotSource, SnapshotType, ViewState, Viewpoint, Visibility,
};
use nalgebra::{center, Point3};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Build a viewpoint from the host's active view
///
/// Fails with [`BridgeError::NotThreeDView`] if the active view is not a
/// 3D view. A failing snapshot is logged and left out.
pub fn generate_viewpoint<H>(host: &H, options: &CodecOptions) -> Result<Viewpoint>
where
    H: HostDocument + SnapshotSource + ?Sized,
{
    let view = host.active_view().ok_or(BridgeError::NoActiveView)?;
    if !view.is_3d {
        return Err(BridgeError::NotThreeDView);
    }

    log::info!("Generating viewpoint from view '{}' ...", view.name);

    let camera = camera_of(host, &view, options)?;
    let clipping_planes = clipping_planes_of(host, &view);
    let (selection, visibility) = components_of(host, &view)?;

    let snapshot = if options.include_snapshot {
        match host.snapshot_png(view.id) {
            Ok(png) => Some(png_snapshot(&png)),
            Err(e) => {
                log::warn!("Snapshot of view '{}' failed: {}", view.name, e);
                None
            }
        }
    } else {
        None
    };

    log::info!(
        "Generated viewpoint with {} clipping planes, {} exceptions, {} selected",
        clipping_planes.len(),
        visibility.exceptions.len(),
        selection.len()
    );

    Ok(Viewpoint {
        camera: Some(camera),
        clipping_planes,
        selection,
        visibility,
        snapshot,
    })
}

/// Wrap PNG bytes as a data URL snapshot
pub fn png_snapshot(png: &[u8]) -> Snapshot {
    Snapshot {
        snapshot_type: SnapshotType::Png,
        data: format!("{}{}", PNG_DATA_URL_PREFIX, BASE64.encode(png)),
    }
}

fn camera_of<H>(host: &H, view: &ViewState, options: &CodecOptions) -> Result<Camera>
where
    H: HostDocument + ?Sized,
{
    let unit_scale = host.unit_scale();

    let view_center: Point3<f64> = if view.is_perspective {
        view.origin
    } else {
        let corners = view
            .zoom_corners
            .ok_or_else(|| BridgeError::host(format!("view '{}' has no zoom corners", view.name)))?;
        center(&corners.bottom_left, &corners.top_right)
    };

    let global = transform_position(
        &host.project_base(),
        &Position::new(view_center, view.view_direction, view.up_direction),
        false,
    );

    // Hosts report the direction toward the viewer; BCF wants the looking direction
    let position = Position::new(
        point_to_meters(&global.center, unit_scale),
        -global.forward,
        global.up,
    );

    if view.is_perspective {
        return Ok(Camera::Perspective {
            position,
            field_of_view: options.perspective_field_of_view,
        });
    }

    let corners = view
        .zoom_corners
        .ok_or_else(|| BridgeError::host(format!("view '{}' has no zoom corners", view.name)))?;
    let view_box = view_box_values(&corners.top_right, &corners.bottom_left, &view.right_direction)?;

    Ok(Camera::Orthogonal {
        position,
        scale: to_meters(view_box.height, unit_scale),
    })
}

fn clipping_planes_of<H>(host: &H, view: &ViewState) -> Vec<ClippingPlane>
where
    H: HostDocument + ?Sized,
{
    let Some(section_box) = view.section_box.filter(|b| !b.is_infinite()) else {
        return Vec::new();
    };

    let unit_scale = host.unit_scale();
    let global = transform_aabb(
        &host.project_base().scaled(unit_scale),
        &aabb_to_meters(&section_box, unit_scale),
        false,
    );

    aabb_to_clipping_planes(&global, None)
}

fn components_of<H>(host: &H, view: &ViewState) -> Result<(Vec<Component>, Visibility)>
where
    H: HostDocument + ?Sized,
{
    let visible = host.visible_elements(view.id)?;
    let hidden = host.hidden_elements(view.id)?;

    let default_visible = visible.len() >= hidden.len();
    let exceptions = if default_visible { &hidden } else { &visible };

    let originating_system = host.originating_system();
    let to_components = |elements: &[ElementId]| -> Vec<Component> {
        elements
            .iter()
            .filter_map(|&element| {
                host.stable_id(element).map(|stable_id| Component {
                    originating_system: Some(originating_system.clone()),
                    stable_id,
                    authoring_local_id: host.authoring_local_id(element),
                })
            })
            .collect()
    };

    Ok((
        to_components(&host.selection()),
        Visibility {
            default_visible,
            exceptions: to_components(exceptions),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryHost;
    use crate::{apply_viewpoint, ApplyOutcome};
    use approx::assert_relative_eq;
    use bcf_lite_model::{Aabb, ProjectBase, ViewId, ZoomCorners};
    use nalgebra::Vector3;
    use std::f64::consts::FRAC_PI_2;

    fn orthogonal_host() -> MemoryHost {
        let mut host = MemoryHost::new().with_unit_scale(1.0);
        host.add_element(ElementId(1), Some("guid-1"));
        host.add_element(ElementId(2), Some("guid-2"));
        host.add_element(ElementId(3), Some("guid-3"));
        host.add_element(ElementId(4), None);
        let view = host.add_view(ViewState {
            id: ViewId(100),
            name: "{3D}".to_string(),
            is_3d: true,
            is_perspective: false,
            origin: Point3::new(0.0, 0.0, 10.0),
            view_direction: Vector3::new(0.0, 0.0, 1.0),
            up_direction: Vector3::new(0.0, 1.0, 0.0),
            right_direction: Vector3::new(1.0, 0.0, 0.0),
            zoom_corners: Some(ZoomCorners {
                bottom_left: Point3::new(-4.0, -3.0, 0.0),
                top_right: Point3::new(4.0, 3.0, 0.0),
            }),
            section_box: None,
        });
        host.set_active(view);
        host
    }

    #[test]
    fn test_rejects_non_3d_view() {
        let mut host = orthogonal_host();
        let plan = host.add_view(ViewState {
            is_3d: false,
            name: "Level 1".to_string(),
            id: ViewId(7),
            ..host.view_state(ViewId(100)).unwrap()
        });
        host.set_active(plan);

        assert!(matches!(
            generate_viewpoint(&host, &CodecOptions::default()),
            Err(BridgeError::NotThreeDView)
        ));
    }

    #[test]
    fn test_orthogonal_camera() {
        let host = orthogonal_host();
        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();

        match viewpoint.camera {
            Some(Camera::Orthogonal { position, scale }) => {
                assert_relative_eq!(position.center, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-9);
                assert_relative_eq!(position.forward, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-9);
                assert_relative_eq!(scale, 6.0, epsilon = 1e-9);
            }
            other => panic!("expected orthogonal camera, got {:?}", other),
        }
    }

    #[test]
    fn test_perspective_camera_uses_origin_and_fov() {
        let mut host = orthogonal_host().with_unit_scale(0.3048);
        host.update_view(ViewId(100), |v| v.is_perspective = true);

        let options = CodecOptions {
            perspective_field_of_view: 60.0,
            ..CodecOptions::default()
        };
        let viewpoint = generate_viewpoint(&host, &options).unwrap();

        match viewpoint.camera {
            Some(Camera::Perspective {
                position,
                field_of_view,
            }) => {
                assert_relative_eq!(position.center, Point3::new(0.0, 0.0, 3.048), epsilon = 1e-9);
                assert_eq!(field_of_view, 60.0);
            }
            other => panic!("expected perspective camera, got {:?}", other),
        }
    }

    #[test]
    fn test_camera_is_global() {
        let mut host = orthogonal_host();
        host.set_project_base(ProjectBase::from_offsets(100.0, 0.0, 0.0, 0.0));

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        let position = *viewpoint.camera.unwrap().position();
        assert_relative_eq!(position.center, Point3::new(100.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_smaller_set_becomes_exceptions() {
        let mut host = orthogonal_host();
        host.hide(ViewId(100), &[ElementId(3)]);

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        assert!(viewpoint.visibility.default_visible);
        assert_eq!(viewpoint.visibility.exceptions.len(), 1);
        assert_eq!(viewpoint.visibility.exceptions[0].stable_id, "guid-3");

        host.hide(ViewId(100), &[ElementId(1), ElementId(2)]);
        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        assert!(!viewpoint.visibility.default_visible);
        // Element 4 is visible but has no stable id
        assert!(viewpoint.visibility.exceptions.is_empty());
    }

    #[test]
    fn test_selection_components() {
        let mut host = orthogonal_host().with_originating_system("Test Host 1.0");
        host.select(&[ElementId(2), ElementId(4)]);

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        assert_eq!(viewpoint.selection.len(), 1);
        assert_eq!(viewpoint.selection[0].stable_id, "guid-2");
        assert_eq!(
            viewpoint.selection[0].originating_system.as_deref(),
            Some("Test Host 1.0")
        );
        assert_eq!(viewpoint.selection[0].authoring_local_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_section_box_planes() {
        let mut host = orthogonal_host();
        host.update_view(ViewId(100), |v| {
            v.section_box = Some(Aabb::new(
                Point3::new(0.0, 0.0, f64::NEG_INFINITY),
                Point3::new(2.0, 4.0, 6.0),
            ))
        });

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        assert_eq!(viewpoint.clipping_planes.len(), 5);
        assert_eq!(viewpoint.clipping_planes[0].direction, -Vector3::x());
    }

    #[test]
    fn test_section_box_planes_stay_axis_aligned_under_rotated_base() {
        let mut host = orthogonal_host();
        host.set_project_base(ProjectBase::from_offsets(10.0, 10.0, 5.0, 0.5));
        host.update_view(ViewId(100), |v| {
            v.section_box = Some(Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 3.0)))
        });

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        let planes = &viewpoint.clipping_planes;
        assert_eq!(planes.len(), 6);

        let axes = [
            -Vector3::x(),
            -Vector3::y(),
            -Vector3::z(),
            Vector3::x(),
            Vector3::y(),
            Vector3::z(),
        ];
        for (plane, axis) in planes.iter().zip(axes) {
            assert_eq!(plane.direction, axis);
        }
        // Elevation only shifts Z
        assert_relative_eq!(planes[2].location.z, 5.0, epsilon = 1e-9);
        assert_relative_eq!(planes[5].location.z, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_section_box_survives_round_trip() {
        let mut host = orthogonal_host();
        host.set_project_base(ProjectBase::from_offsets(10.0, 10.0, 5.0, FRAC_PI_2));
        let section_box = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 3.0));
        host.update_view(ViewId(100), |v| v.section_box = Some(section_box));

        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        // Quarter turn maps the local box onto (9,10,5)..(10,12,8)
        assert_relative_eq!(viewpoint.clipping_planes[0].location.x, 9.0, epsilon = 1e-9);
        assert_relative_eq!(viewpoint.clipping_planes[4].location.y, 12.0, epsilon = 1e-9);

        let applied = match apply_viewpoint(&mut host, &viewpoint, &CodecOptions::default()).unwrap()
        {
            ApplyOutcome::Applied(applied) => applied,
            ApplyOutcome::NoCamera => panic!("viewpoint was not applied"),
        };
        let recovered = host.view_state(applied.view).unwrap().section_box.unwrap();

        assert!(applied.section_box);
        assert_relative_eq!(recovered.min, section_box.min, epsilon = 1e-9);
        assert_relative_eq!(recovered.max, section_box.max, epsilon = 1e-9);
    }

    #[test]
    fn test_snapshot_data_url() {
        let host = orthogonal_host().with_snapshot(vec![0x89, b'P', b'N', b'G']);
        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();

        assert_eq!(
            viewpoint.snapshot.unwrap().data,
            "data:image/png;base64,iVBORw=="
        );
    }

    #[test]
    fn test_failing_snapshot_is_left_out() {
        let host = orthogonal_host();
        let viewpoint = generate_viewpoint(&host, &CodecOptions::default()).unwrap();
        assert!(viewpoint.snapshot.is_none());
    }
}
