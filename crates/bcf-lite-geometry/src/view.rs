// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! View box decomposition for orthogonal views

use crate::{Error, Result};
use bcf_lite_model::ZoomCorners;
use nalgebra::{Point3, Vector3};

/// Height and width of a view's visible rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub height: f64,
    pub width: f64,
}

impl ViewBox {
    /// Width over height
    pub fn aspect_ratio(&self) -> Result<f64> {
        if self.height.abs() < f64::EPSILON {
            return Err(Error::DegenerateViewBox {
                height: self.height,
                width: self.width,
            });
        }
        Ok(self.width / self.height)
    }
}

/// Decompose a zoom diagonal against the view's right direction
///
/// The diagonal runs from `bottom_left` to `top_right`; its projection on
/// `right` is the width and the remainder the height.
pub fn view_box_values(
    top_right: &Point3<f64>,
    bottom_left: &Point3<f64>,
    right: &Vector3<f64>,
) -> Result<ViewBox> {
    if right.norm() < f64::EPSILON {
        return Err(Error::degenerate_direction("view right direction is zero"));
    }

    let diagonal = top_right - bottom_left;
    let distance = diagonal.norm();
    let angle = diagonal.angle(right);

    Ok(ViewBox {
        height: distance * angle.sin(),
        width: distance * angle.cos(),
    })
}

/// Zoom corners of a `height` x `width` rectangle centred on `origin`
pub fn zoom_rectangle(
    origin: &Point3<f64>,
    up: &Vector3<f64>,
    right: &Vector3<f64>,
    view_box: &ViewBox,
) -> ZoomCorners {
    let half_up = up * (view_box.height / 2.0);
    let half_right = right * (view_box.width / 2.0);

    ZoomCorners {
        bottom_left: origin - half_up - half_right,
        top_right: origin + half_up + half_right,
    }
}
