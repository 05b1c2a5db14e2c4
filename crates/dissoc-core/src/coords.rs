//! Parsing of `x_y_z` coordinate path segments and the radius parameter.

use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{Point3, DEFAULT_RADIUS};

/// Message returned to clients for malformed coordinate segments.
pub const COORDINATE_FORMAT_MSG: &str = "Coordinates must be in x_y_z format";

/// Separator between the components of a coordinate segment.
const SEPARATOR: char = '_';

fn split_triple(raw: &str) -> Result<[&str; 3]> {
    let mut parts = raw.split(SEPARATOR);
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), Some(z), None) => Ok([x, y, z]),
        _ => Err(Error::InvalidInput(COORDINATE_FORMAT_MSG.to_string())),
    }
}

impl FromStr for Point3 {
    type Err = Error;

    /// Parse `x_y_z` into a point. Each component must be a finite number.
    fn from_str(raw: &str) -> Result<Self> {
        let [x, y, z] = split_triple(raw)?;
        let component = |s: &str| -> Result<f64> {
            s.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidInput(COORDINATE_FORMAT_MSG.to_string()))
        };
        Ok(Point3::new(component(x)?, component(y)?, component(z)?))
    }
}

/// Parse `x_y_z` into three integers, as the location echo route expects.
pub fn parse_integer_triple(raw: &str) -> Result<[i64; 3]> {
    let [x, y, z] = split_triple(raw)?;
    let component = |s: &str| -> Result<i64> {
        s.trim()
            .parse::<i64>()
            .map_err(|_| Error::InvalidInput(COORDINATE_FORMAT_MSG.to_string()))
    };
    Ok([component(x)?, component(y)?, component(z)?])
}

/// Resolve the optional `r` query parameter.
///
/// A missing, unparsable or non-finite value falls back to [`DEFAULT_RADIUS`]
/// rather than failing the request.
pub fn parse_radius(raw: Option<&str>) -> f64 {
    match raw.map(|s| s.trim().parse::<f64>()) {
        Some(Ok(r)) if r.is_finite() => r,
        Some(_) => {
            tracing::debug!(
                subsystem = "engine",
                component = "coords",
                raw = raw.unwrap_or_default(),
                fallback = DEFAULT_RADIUS,
                "Unparsable radius, using default"
            );
            DEFAULT_RADIUS
        }
        None => DEFAULT_RADIUS,
    }
}
