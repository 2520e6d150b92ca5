use serde::{Deserialize, Serialize};

use crate::error::{InvalidInputError, Result};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Tunables for the grid-cell area computation.
/// Defaults describe the Earth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightingParams {
    /// Sphere radius in metres.
    pub radius_m: f64,
}

impl Default for WeightingParams {
    fn default() -> Self {
        Self { radius_m: EARTH_RADIUS_M }
    }
}

impl WeightingParams {
    pub fn with_radius(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius_m.is_finite() && self.radius_m > 0.0) {
            return Err(InvalidInputError::InvalidRadius(self.radius_m));
        }
        Ok(())
    }
}
