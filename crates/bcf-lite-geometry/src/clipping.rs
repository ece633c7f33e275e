// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Clipping plane <-> bounding box reconstruction
//!
//! Hosts clip with section boxes, BCF clips with half-spaces. A plane whose
//! direction is close to a coordinate axis bounds the box on that axis:
//! directions point away from the kept region, so a `+X` plane sets the
//! upper X bound and a `-X` plane the lower one.

use bcf_lite_model::{Aabb, Axis, ClippingPlane};
use nalgebra::Point3;

/// Default tolerance for treating a plane as axis-aligned (5 degrees)
pub const DEFAULT_ANGLE_THRESHOLD_RAD: f64 = 0.087266462599716;

const MIN_DIRECTION_NORM: f64 = 1e-12;

/// Box bounded by a single plane
///
/// Planes that deviate from every axis by `angle_threshold_rad` or more
/// yield [`Aabb::infinite`], so they drop out of a reduction.
pub fn plane_to_aabb(plane: &ClippingPlane, angle_threshold_rad: f64) -> Aabb {
    let mut aabb = Aabb::infinite();

    if plane.direction.norm() < MIN_DIRECTION_NORM {
        log::debug!("Ignoring clipping plane with zero direction");
        return aabb;
    }

    for axis in Axis::ALL {
        let unit = axis.unit();
        let i = axis.index();

        if plane.direction.angle(&unit) < angle_threshold_rad {
            aabb.max[i] = plane.location[i];
            return aabb;
        }
        if plane.direction.angle(&-unit) < angle_threshold_rad {
            aabb.min[i] = plane.location[i];
            return aabb;
        }
    }

    log::debug!(
        "Ignoring clipping plane not aligned to any axis: direction {:?}",
        plane.direction
    );
    aabb
}

/// Reduce clipping planes to the box they bound together
///
/// Starts from [`Aabb::infinite`] and tightens it with every axis-aligned
/// plane. No planes, or no aligned planes, yield the infinite box.
pub fn clipping_planes_to_aabb(planes: &[ClippingPlane], angle_threshold_rad: f64) -> Aabb {
    planes
        .iter()
        .map(|p| plane_to_aabb(p, angle_threshold_rad))
        .fold(Aabb::infinite(), |acc, next| acc.merge_reduce(&next))
}

/// Emit one outward-facing plane per finite box bound
///
/// Each plane sits on its bound along its own axis and at `center` on the
/// other two; `center` defaults to [`Aabb::centroid`]. Order is min X,
/// min Y, min Z, max X, max Y, max Z.
pub fn aabb_to_clipping_planes(aabb: &Aabb, center: Option<Point3<f64>>) -> Vec<ClippingPlane> {
    let center = center.unwrap_or_else(|| aabb.centroid());
    let mut planes = Vec::with_capacity(6);

    for axis in Axis::ALL {
        let bound = aabb.min_on(axis);
        if bound.is_finite() {
            let mut location = center;
            location[axis.index()] = bound;
            planes.push(ClippingPlane::new(location, -axis.unit()));
        }
    }

    for axis in Axis::ALL {
        let bound = aabb.max_on(axis);
        if bound.is_finite() {
            let mut location = center;
            location[axis.index()] = bound;
            planes.push(ClippingPlane::new(location, axis.unit()));
        }
    }

    planes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn unit_box() -> Aabb {
        Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_unit_box_emits_six_planes() {
        let planes = aabb_to_clipping_planes(&unit_box(), None);

        assert_eq!(planes.len(), 6);
        assert_eq!(planes[0].location, Point3::new(0.0, 0.5, 0.5));
        assert_eq!(planes[0].direction, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(planes[5].location, Point3::new(0.5, 0.5, 1.0));
        assert_eq!(planes[5].direction, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_emission_order() {
        let directions: Vec<_> = aabb_to_clipping_planes(&unit_box(), None)
            .iter()
            .map(|p| p.direction)
            .collect();

        assert_eq!(
            directions,
            vec![
                -Vector3::x(),
                -Vector3::y(),
                -Vector3::z(),
                Vector3::x(),
                Vector3::y(),
                Vector3::z(),
            ]
        );
    }

    #[test]
    fn test_explicit_center() {
        let planes = aabb_to_clipping_planes(&unit_box(), Some(Point3::origin()));
        assert_eq!(planes[3].location, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_infinite_axis_emits_no_plane() {
        let aabb = Aabb::new(
            Point3::new(0.0, f64::NEG_INFINITY, 0.0),
            Point3::new(1.0, 1.0, f64::INFINITY),
        );
        let planes = aabb_to_clipping_planes(&aabb, None);

        assert_eq!(planes.len(), 4);
        assert!(planes.iter().all(|p| p.direction != -Vector3::y()));
        assert!(planes.iter().all(|p| p.direction != Vector3::z()));
        assert!(aabb_to_clipping_planes(&Aabb::infinite(), None).is_empty());
    }

    #[test]
    fn test_box_round_trip() {
        let aabb = Aabb::new(Point3::new(-4.0, 2.5, -1.0), Point3::new(3.0, 9.0, 12.0));
        let planes = aabb_to_clipping_planes(&aabb, None);
        let rebuilt = clipping_planes_to_aabb(&planes, DEFAULT_ANGLE_THRESHOLD_RAD);

        assert_eq!(rebuilt, aabb);
    }

    #[test]
    fn test_partial_box_round_trip() {
        let aabb = Aabb::new(
            Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, 0.5),
            Point3::new(f64::INFINITY, 8.0, f64::INFINITY),
        );
        let planes = aabb_to_clipping_planes(&aabb, None);
        let rebuilt = clipping_planes_to_aabb(&planes, DEFAULT_ANGLE_THRESHOLD_RAD);

        assert_eq!(rebuilt, aabb);
    }

    #[test]
    fn test_slightly_tilted_plane_is_accepted() {
        let tilt = 0.05_f64;
        let plane = ClippingPlane::new(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::new(tilt.cos(), tilt.sin(), 0.0),
        );
        let aabb = plane_to_aabb(&plane, DEFAULT_ANGLE_THRESHOLD_RAD);

        assert_relative_eq!(aabb.max.x, 2.0);
        assert_eq!(aabb.min.x, f64::NEG_INFINITY);
    }

    #[test]
    fn test_diagonal_plane_is_excluded() {
        let plane = ClippingPlane::new(
            Point3::new(2.0, 2.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0).normalize(),
        );
        let planes = [
            plane,
            ClippingPlane::new(Point3::new(0.0, 0.0, -3.0), -Vector3::z()),
        ];
        let aabb = clipping_planes_to_aabb(&planes, DEFAULT_ANGLE_THRESHOLD_RAD);

        assert_eq!(aabb.min.z, -3.0);
        assert_eq!(aabb.max.x, f64::INFINITY);
        assert_eq!(aabb.max.y, f64::INFINITY);
    }

    #[test]
    fn test_no_planes_is_infinite() {
        assert!(clipping_planes_to_aabb(&[], DEFAULT_ANGLE_THRESHOLD_RAD).is_infinite());
    }

    #[test]
    fn test_opposing_planes_tighten() {
        let planes = [
            ClippingPlane::new(Point3::new(5.0, 0.0, 0.0), Vector3::x()),
            ClippingPlane::new(Point3::new(3.0, 0.0, 0.0), Vector3::x()),
        ];
        let aabb = clipping_planes_to_aabb(&planes, DEFAULT_ANGLE_THRESHOLD_RAD);
        assert_eq!(aabb.max.x, 3.0);
    }
}
