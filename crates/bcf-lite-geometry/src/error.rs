// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry operations

use thiserror::Error;

/// Geometry result type
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry errors
#[derive(Error, Debug)]
pub enum Error {
    /// A direction needed for a decomposition has zero length
    #[error("Degenerate direction: {0}")]
    DegenerateDirection(String),

    /// A view box with zero height or width
    #[error("Degenerate view box: height {height}, width {width}")]
    DegenerateViewBox { height: f64, width: f64 },

    /// Unknown length unit name
    #[error("Unknown length unit: {0}")]
    UnknownUnit(String),
}

impl Error {
    /// Create a degenerate direction error
    pub fn degenerate_direction(msg: impl Into<String>) -> Self {
        Error::DegenerateDirection(msg.into())
    }

    /// Create an unknown unit error
    pub fn unknown_unit(name: impl Into<String>) -> Self {
        Error::UnknownUnit(name.into())
    }
}

impl From<Error> for bcf_lite_model::BridgeError {
    fn from(e: Error) -> Self {
        bcf_lite_model::BridgeError::host(e.to_string())
    }
}
