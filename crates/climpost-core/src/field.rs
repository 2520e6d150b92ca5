//! Lat/lon gridded fields and their JSON layout.

use ndarray::Array2;
use serde::Deserialize;

use crate::coords::validate_axis;
use crate::error::{CoordAxis, InvalidInputError, Result};

/// A 2D field of f64 values on a lat/lon grid, rows along latitude.
/// Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Shape (lat.len(), lon.len()).
    pub data: Array2<f64>,
}

/// JSON layout: `{ "lat": [..], "lon": [..], "data": [[..], ..] }`, one inner
/// array per latitude row. `null` cells load as NaN.
#[derive(Deserialize)]
struct FieldDoc {
    lat: Vec<f64>,
    lon: Vec<f64>,
    #[serde(deserialize_with = "null_as_nan_rows")]
    data: Vec<Vec<f64>>,
}

fn null_as_nan_rows<'de, D: serde::Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<Vec<f64>>, D::Error> {
    let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(d)?;
    Ok(rows
        .into_iter()
        .map(|r| r.into_iter().map(|x| x.unwrap_or(f64::NAN)).collect())
        .collect())
}

impl GriddedField {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, data: Array2<f64>) -> Result<Self> {
        validate_axis(CoordAxis::Latitude, &lat)?;
        validate_axis(CoordAxis::Longitude, &lon)?;
        let expected = (lat.len(), lon.len());
        if data.dim() != expected {
            return Err(InvalidInputError::ShapeMismatch { expected, found: data.dim() });
        }
        Ok(Self { lat, lon, data })
    }

    /// Parse a field from its JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let doc: FieldDoc =
            serde_json::from_str(s).map_err(|e| InvalidInputError::MalformedField(e.to_string()))?;
        let rows = doc.data.len();
        let cols = doc.data.first().map_or(0, Vec::len);
        if let Some(r) = doc.data.iter().position(|row| row.len() != cols) {
            return Err(InvalidInputError::MalformedField(format!(
                "row {r} has {} values, row 0 has {cols}",
                doc.data[r].len()
            )));
        }
        let flat: Vec<f64> = doc.data.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((rows, cols), flat)
            .map_err(|e| InvalidInputError::MalformedField(e.to_string()))?;
        Self::new(doc.lat, doc.lon, data)
    }

    /// Serialize back to the JSON document layout. NaN cells become `null`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "lat": self.lat,
            "lon": self.lon,
            "data": rows_as_json(&self.data),
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// True if both fields use identical coordinates.
    pub fn same_grid(&self, other: &Self) -> bool {
        self.lat == other.lat && self.lon == other.lon
    }

    pub fn min_value(&self) -> f64 {
        self.data.iter().cloned().filter(|v| !v.is_nan()).fold(f64::INFINITY, f64::min)
    }

    pub fn max_value(&self) -> f64 {
        self.data.iter().cloned().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Row-major nested arrays; serde_json writes non-finite numbers as `null`.
pub fn rows_as_json(a: &Array2<f64>) -> serde_json::Value {
    serde_json::Value::from(
        a.rows()
            .into_iter()
            .map(|r| r.to_vec())
            .collect::<Vec<Vec<f64>>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn parses_rows_and_nulls() {
        let f = GriddedField::from_json_str(
            r#"{"lat": [10, 20], "lon": [0, 5, 10], "data": [[1, 2, 3], [4, null, 6]]}"#,
        )
        .unwrap();
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(f.data[[1, 2]], 6.0);
        assert!(f.data[[1, 1]].is_nan());
        assert_eq!(f.min_value(), 1.0);
        assert_eq!(f.max_value(), 6.0);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = GriddedField::from_json_str(r#"{"lat": [0, 1], "lon": [0, 1], "data": [[1, 2], [3]]}"#)
            .unwrap_err();
        assert!(matches!(err, InvalidInputError::MalformedField(_)));
    }

    #[test]
    fn data_must_match_coordinates() {
        let err = GriddedField::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], array![[1.0, 2.0], [3.0, 4.0]])
            .unwrap_err();
        assert_eq!(err, InvalidInputError::ShapeMismatch { expected: (3, 2), found: (2, 2) });
    }

    #[test]
    fn json_value_reloads() {
        let f = GriddedField::new(vec![0.0, 1.0], vec![0.0, 1.0], array![[1.0, f64::NAN], [3.0, 4.0]]).unwrap();
        let text = f.to_json_value().to_string();
        let back = GriddedField::from_json_str(&text).unwrap();
        assert!(f.same_grid(&back));
        assert!(back.data[[0, 1]].is_nan());
        assert_eq!(back.data[[1, 0]], 3.0);
    }
}
