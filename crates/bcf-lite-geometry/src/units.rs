// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length unit conversion
//!
//! `unit_scale` is always meters per internal unit. Infinite values pass
//! through unchanged so unbounded box sides stay unbounded.

use crate::{Error, Result};
use bcf_lite_model::Aabb;
use nalgebra::Point3;
use std::str::FromStr;

/// Length units hosts commonly use internally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[default]
    Foot,
    Inch,
    Meter,
    Centimeter,
    Millimeter,
}

impl LengthUnit {
    /// Meters per unit
    pub fn meters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Foot => 0.3048,
            LengthUnit::Inch => 0.0254,
            LengthUnit::Meter => 1.0,
            LengthUnit::Centimeter => 0.01,
            LengthUnit::Millimeter => 0.001,
        }
    }
}

impl FromStr for LengthUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ft" | "foot" | "feet" => Ok(LengthUnit::Foot),
            "in" | "inch" | "inches" => Ok(LengthUnit::Inch),
            "m" | "meter" | "meters" | "metre" | "metres" => Ok(LengthUnit::Meter),
            "cm" | "centimeter" | "centimeters" | "centimetre" => Ok(LengthUnit::Centimeter),
            "mm" | "millimeter" | "millimeters" | "millimetre" => Ok(LengthUnit::Millimeter),
            _ => Err(Error::unknown_unit(s)),
        }
    }
}

/// Convert a length from internal units to meters
#[inline]
pub fn to_meters(value: f64, unit_scale: f64) -> f64 {
    if value.is_finite() {
        value * unit_scale
    } else {
        value
    }
}

/// Convert a length from meters to internal units
#[inline]
pub fn to_internal_unit(value: f64, unit_scale: f64) -> f64 {
    if value.is_finite() {
        value / unit_scale
    } else {
        value
    }
}

/// Convert a point from internal units to meters
pub fn point_to_meters(point: &Point3<f64>, unit_scale: f64) -> Point3<f64> {
    point.map(|c| to_meters(c, unit_scale))
}

/// Convert a point from meters to internal units
pub fn point_to_internal_unit(point: &Point3<f64>, unit_scale: f64) -> Point3<f64> {
    point.map(|c| to_internal_unit(c, unit_scale))
}

/// Convert a box from internal units to meters
pub fn aabb_to_meters(aabb: &Aabb, unit_scale: f64) -> Aabb {
    Aabb::new(
        point_to_meters(&aabb.min, unit_scale),
        point_to_meters(&aabb.max, unit_scale),
    )
}

/// Convert a box from meters to internal units
pub fn aabb_to_internal_unit(aabb: &Aabb, unit_scale: f64) -> Aabb {
    Aabb::new(
        point_to_internal_unit(&aabb.min, unit_scale),
        point_to_internal_unit(&aabb.max, unit_scale),
    )
}
