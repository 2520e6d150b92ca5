//! Post-processing for gridded climate-model output: grid-cell area
//! weighting, wind change fields and area-weighted statistics.

pub mod area;
pub mod coords;
pub mod error;
pub mod field;
pub mod params;
pub mod stats;
pub mod wind;

pub use area::{compute_area_and_weights, compute_area_and_weights_with, CellAreas};
pub use error::{CoordAxis, InvalidInputError, Result};
pub use field::GriddedField;
pub use params::{WeightingParams, EARTH_RADIUS_M};
pub use wind::WindChange;
