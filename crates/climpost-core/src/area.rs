//! Grid-cell area and global area weighting for lat/lon grids.
//!
//! Each cell (i, j) is the spherical quadrilateral between lat[i], lat[i+1]
//! and lon[j], lon[j+1]. Its area follows from the spherical zone formula:
//!
//!   A = (π/180) · R² · |sin φ_i − sin φ_{i+1}| · |λ_j − λ_{j+1}|
//!
//! with φ in radians inside the sine and λ in degrees. The formula only yields
//! (N-1) × (M-1) values; the last row and column are filled by copying row 0
//! and then column 0, so the output has one cell per input coordinate.

use ndarray::{s, Array1, Array2, Axis, Zip};

use crate::coords::validate_axis;
use crate::error::{CoordAxis, InvalidInputError, Result};
use crate::params::WeightingParams;

/// Physical cell areas and their normalized global weights, both N × M.
#[derive(Debug, Clone)]
pub struct CellAreas {
    /// Cell area in m².
    pub area: Array2<f64>,
    /// `area / area.sum()`; sums to 1.
    pub weight: Array2<f64>,
}

impl CellAreas {
    pub fn shape(&self) -> (usize, usize) {
        self.area.dim()
    }

    pub fn total_area(&self) -> f64 {
        self.area.sum()
    }
}

/// Compute cell areas and global weights on the Earth.
pub fn compute_area_and_weights(lat: &[f64], lon: &[f64]) -> Result<CellAreas> {
    compute_area_and_weights_with(lat, lon, &WeightingParams::default())
}

/// Compute cell areas and global weights on a sphere of `params.radius_m`.
pub fn compute_area_and_weights_with(
    lat: &[f64],
    lon: &[f64],
    params: &WeightingParams,
) -> Result<CellAreas> {
    validate_axis(CoordAxis::Latitude, lat)?;
    validate_axis(CoordAxis::Longitude, lon)?;
    params.validate()?;

    let area = cell_areas(lat, lon, params.radius_m);

    let total = area.sum();
    if !total.is_finite() {
        return Err(InvalidInputError::NonFiniteArea(total));
    }
    if total <= 0.0 {
        return Err(InvalidInputError::ZeroTotalArea);
    }
    let weight = &area / total;

    log::debug!(
        "cell areas: {}x{} grid, total {:.6e} m² (R = {} m)",
        lat.len(),
        lon.len(),
        total,
        params.radius_m
    );

    Ok(CellAreas { area, weight })
}

/// Raw area array with the wrap-around boundary applied. Inputs are assumed
/// validated (len ≥ 2 on both axes).
fn cell_areas(lat: &[f64], lon: &[f64], radius_m: f64) -> Array2<f64> {
    let (n, m) = (lat.len(), lon.len());
    let scale = std::f64::consts::PI / 180.0 * radius_m * radius_m;

    // Per-row zone factor and per-column span; the interior is their outer product.
    let band: Array1<f64> = lat
        .windows(2)
        .map(|w| (w[0].to_radians().sin() - w[1].to_radians().sin()).abs())
        .collect();
    let span: Array1<f64> = lon.windows(2).map(|w| (w[0] - w[1]).abs()).collect();

    let mut area = Array2::<f64>::zeros((n, m));
    let zip = Zip::from(area.slice_mut(s![..n - 1, ..m - 1]))
        .and_broadcast(band.view().insert_axis(Axis(1)))
        .and_broadcast(span.view().insert_axis(Axis(0)));

    #[cfg(feature = "threading")]
    zip.par_for_each(|a, &b, &d| *a = scale * b * d);
    #[cfg(not(feature = "threading"))]
    zip.for_each(|a, &b, &d| *a = scale * b * d);

    // Row first, then column: the corner ends up equal to area[0, 0].
    let first_row = area.row(0).to_owned();
    area.row_mut(n - 1).assign(&first_row);
    let first_col = area.column(0).to_owned();
    area.column_mut(m - 1).assign(&first_col);

    area
}
