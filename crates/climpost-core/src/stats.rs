//! Area-weighted reductions over lat/lon fields.

use ndarray::{Array2, Zip};

use crate::error::{InvalidInputError, Result};

fn check_shape(values: &Array2<f64>, weights: &Array2<f64>) -> Result<()> {
    if values.dim() != weights.dim() {
        return Err(InvalidInputError::ShapeMismatch { expected: weights.dim(), found: values.dim() });
    }
    Ok(())
}

/// Σ w·x / Σ w over cells where `x` is finite.
///
/// Weights of missing cells are dropped from the denominator, so a global
/// weight array still yields a proper mean over the valid region.
pub fn weighted_mean(values: &Array2<f64>, weights: &Array2<f64>) -> Result<f64> {
    check_shape(values, weights)?;
    let (num, den) = Zip::from(values).and(weights).fold((0.0, 0.0), |(num, den), &x, &w| {
        if x.is_finite() {
            (num + w * x, den + w)
        } else {
            (num, den)
        }
    });
    if !(den > 0.0) {
        return Err(InvalidInputError::NoValidCells);
    }
    Ok(num / den)
}

/// Σ area·x over cells where `x` is finite, e.g. a flux density in
/// units/m² integrated to a total.
pub fn weighted_total(values: &Array2<f64>, area: &Array2<f64>) -> Result<f64> {
    check_shape(values, area)?;
    Ok(Zip::from(values)
        .and(area)
        .fold(0.0, |acc, &x, &a| if x.is_finite() { acc + a * x } else { acc }))
}
