// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Project-local <-> global coordinate transforms
//!
//! A [`ProjectBase`] is a rotation about the vertical axis followed by a
//! translation. Going local -> global rotates first and translates after;
//! the reverse direction negates both and translates first, so the two are
//! exact inverses. Directions are only ever rotated.
//!
//! Section boxes are transformed as boxes, so the planes built from them
//! stay axis-aligned in the target system.

use bcf_lite_model::{Aabb, Position, ProjectBase};
use nalgebra::{Point3, Rotation3, Vector3};

/// Rotate a vector about the Z axis by `angle` radians (counter-clockwise)
#[inline]
pub fn rotate_about_vertical(v: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle) * v
}

/// Shared point rule: (translate ->) rotate (-> translate)
#[inline]
fn transform_point(base: &ProjectBase, point: &Point3<f64>, reverse: bool) -> Point3<f64> {
    let i = if reverse { -1.0 } else { 1.0 };
    let translation = base.translation * i;
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), base.angle * i);

    if reverse {
        rotation * (point + translation)
    } else {
        rotation * point + translation
    }
}

/// Transform a camera position by a project base
///
/// With `reverse == false` this maps project-local to global coordinates,
/// with `reverse == true` global to project-local. The base translation
/// must be in the same unit as `position.center`.
pub fn transform_position(base: &ProjectBase, position: &Position, reverse: bool) -> Position {
    let angle = if reverse { -base.angle } else { base.angle };

    Position {
        center: transform_point(base, &position.center, reverse),
        forward: rotate_about_vertical(&position.forward, angle),
        up: rotate_about_vertical(&position.up, angle),
    }
}

/// Transform an axis-aligned box by a project base
///
/// The result is the axis-aligned bound of the rotated box, so it is exact
/// for quarter turns and grows otherwise. Infinite bounds stay infinite on
/// every axis they rotate into. Boxes travel in meters, so the base
/// translation is expected in meters as well (see [`ProjectBase::scaled`]).
pub fn transform_aabb(base: &ProjectBase, aabb: &Aabb, reverse: bool) -> Aabb {
    let i = if reverse { -1.0 } else { 1.0 };
    let translation = base.translation * i;
    let (sin, cos) = (base.angle * i).sin_cos();

    let mut x = (aabb.min.x, aabb.max.x);
    let mut y = (aabb.min.y, aabb.max.y);
    let mut z = (aabb.min.z, aabb.max.z);

    if reverse {
        x = shift(x, translation.x);
        y = shift(y, translation.y);
    }

    let rotated_x = add(scale(cos, x), scale(-sin, y));
    let rotated_y = add(scale(sin, x), scale(cos, y));
    (x, y) = (rotated_x, rotated_y);

    if !reverse {
        x = shift(x, translation.x);
        y = shift(y, translation.y);
    }
    z = shift(z, translation.z);

    Aabb::new(Point3::new(x.0, y.0, z.0), Point3::new(x.1, y.1, z.1))
}

type Interval = (f64, f64);

const NEGLIGIBLE_FACTOR: f64 = 1e-12;

fn scale(k: f64, (lo, hi): Interval) -> Interval {
    if k.abs() < NEGLIGIBLE_FACTOR {
        (0.0, 0.0)
    } else if k > 0.0 {
        (k * lo, k * hi)
    } else {
        (k * hi, k * lo)
    }
}

fn add(a: Interval, b: Interval) -> Interval {
    (a.0 + b.0, a.1 + b.1)
}

fn shift((lo, hi): Interval, by: f64) -> Interval {
    (lo + by, hi + by)
}
