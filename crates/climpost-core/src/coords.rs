//! Coordinate-axis checks shared by the area weighting and field loaders.
//! All coordinates are degrees in f64.

use crate::error::{CoordAxis, InvalidInputError, Result};

/// Reject axes that cannot define at least one cell interval.
///
/// Requires two or more values, all finite. Monotonicity is not checked here;
/// see [`is_strictly_monotonic`].
pub fn validate_axis(axis: CoordAxis, values: &[f64]) -> Result<()> {
    if values.len() < 2 {
        return Err(InvalidInputError::TooFewCoordinates { axis, len: values.len() });
    }
    if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InvalidInputError::NonFiniteCoordinate { axis, index, value });
    }
    Ok(())
}

/// True if `values` is strictly increasing or strictly decreasing.
/// Sequences shorter than 2 are trivially monotonic.
pub fn is_strictly_monotonic(values: &[f64]) -> bool {
    let increasing = values.windows(2).all(|w| w[1] > w[0]);
    let decreasing = values.windows(2).all(|w| w[1] < w[0]);
    increasing || decreasing
}
