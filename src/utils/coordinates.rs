use crate::error::{ProcessingError, Result};
use serde::{Deserialize, Serialize};

/// A station location as a (latitude, longitude) pair in decimal degrees.
///
/// Only the cardinality of the input is validated. Out-of-range latitudes or
/// longitudes are accepted as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from any ordered sequence of numbers
    ///
    /// # Examples
    /// ```
    /// use climate_trends::utils::Coordinates;
    ///
    /// assert!(Coordinates::from_slice(&[14.0, 21.2]).is_ok());
    /// assert!(Coordinates::from_slice(&[14.0]).is_err());
    /// ```
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [latitude, longitude] => Ok(Self::new(*latitude, *longitude)),
            _ => Err(ProcessingError::InvalidCoordinates { len: values.len() }),
        }
    }

    /// Flat-earth distance in degrees on the (lat, lon) plane
    pub fn planar_distance(&self, latitude: f64, longitude: f64) -> f64 {
        ((latitude - self.latitude).powi(2) + (longitude - self.longitude).powi(2)).sqrt()
    }

    pub fn as_tuple(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

impl TryFrom<&[f64]> for Coordinates {
    type Error = ProcessingError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_slice(values)
    }
}

impl TryFrom<Vec<f64>> for Coordinates {
    type Error = ProcessingError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Parse a decimal-degree coordinate cell
pub fn parse_coordinate(coord_str: &str) -> Result<f64> {
    let trimmed = coord_str.trim();
    let value = trimmed.parse::<f64>().map_err(|_| {
        ProcessingError::InvalidCoordinate(format!("Invalid coordinate value: '{}'", coord_str))
    })?;

    if !value.is_finite() {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Coordinate is not finite: '{}'",
            coord_str
        )));
    }

    Ok(value)
}
