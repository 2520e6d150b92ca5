//! Wind change between a historical and a future period.
//!
//! For each model the change vector is (Δu, Δv) = future − historical. Its
//! magnitude is the plotted "change in wind speed"; its direction is the
//! orientation of the change arrow. Ensemble statistics average models
//! element-wise on a shared grid.

use ndarray::{Array2, Zip};

use crate::error::{InvalidInputError, Result};
use crate::field::GriddedField;

/// Change fields for one model (or an ensemble mean), all on `lat` × `lon`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindChange {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Zonal change in m/s.
    pub du: Array2<f64>,
    /// Meridional change in m/s.
    pub dv: Array2<f64>,
    /// Magnitude of the change vector in m/s.
    pub speed: Array2<f64>,
    /// Direction of the change vector, degrees counter-clockwise from east,
    /// in [-180, 180].
    pub direction_deg: Array2<f64>,
}

fn check_grid(reference: &GriddedField, other: &GriddedField) -> Result<()> {
    if reference.shape() != other.shape() {
        return Err(InvalidInputError::ShapeMismatch { expected: reference.shape(), found: other.shape() });
    }
    if !reference.same_grid(other) {
        return Err(InvalidInputError::MalformedField("fields use different coordinates".into()));
    }
    Ok(())
}

fn direction_of(du: &Array2<f64>, dv: &Array2<f64>) -> Array2<f64> {
    Zip::from(du).and(dv).map_collect(|&u, &v| v.atan2(u).to_degrees())
}

impl WindChange {
    /// Change from the historical (u, v) pair to the future pair.
    /// All four fields must share one grid.
    pub fn between(
        hist_u: &GriddedField,
        hist_v: &GriddedField,
        fut_u: &GriddedField,
        fut_v: &GriddedField,
    ) -> Result<Self> {
        for f in [hist_v, fut_u, fut_v] {
            check_grid(hist_u, f)?;
        }

        let du = &fut_u.data - &hist_u.data;
        let dv = &fut_v.data - &hist_v.data;
        let speed = Zip::from(&du).and(&dv).map_collect(|&u, &v| u.hypot(v));
        let direction_deg = direction_of(&du, &dv);

        Ok(Self {
            lat: hist_u.lat.clone(),
            lon: hist_u.lon.clone(),
            du,
            dv,
            speed,
            direction_deg,
        })
    }

    /// Element-wise multi-model mean.
    ///
    /// `du`, `dv` and `speed` are averaged independently, so the mean speed is
    /// the mean of per-model magnitudes and is at least the magnitude of the
    /// mean vector. Direction is taken from the mean components.
    pub fn ensemble_mean(members: &[WindChange]) -> Result<Self> {
        let first = members.first().ok_or(InvalidInputError::EmptyEnsemble)?;
        let expected = (first.lat.len(), first.lon.len());
        for m in members {
            for a in [&m.du, &m.dv, &m.speed, &m.direction_deg] {
                if a.dim() != expected {
                    return Err(InvalidInputError::ShapeMismatch { expected, found: a.dim() });
                }
            }
            if m.lat != first.lat || m.lon != first.lon {
                return Err(InvalidInputError::MalformedField("ensemble members use different coordinates".into()));
            }
        }

        let k = members.len() as f64;
        let mut du = Array2::<f64>::zeros(expected);
        let mut dv = Array2::<f64>::zeros(expected);
        let mut speed = Array2::<f64>::zeros(expected);
        for m in members {
            du += &m.du;
            dv += &m.dv;
            speed += &m.speed;
        }
        du /= k;
        dv /= k;
        speed /= k;
        let direction_deg = direction_of(&du, &dv);

        log::debug!("ensemble mean over {} members, grid {:?}", members.len(), du.dim());

        Ok(Self {
            lat: first.lat.clone(),
            lon: first.lon.clone(),
            du,
            dv,
            speed,
            direction_deg,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.du.dim()
    }
}
