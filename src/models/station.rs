use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{AnnualMeanRecord, RawDailyRecord, TrendFit};
use crate::processors::{DataCleaner, TrendEstimator};
use crate::utils::constants::MIN_QUALIFYING_YEARS;
use crate::utils::Coordinates;

/// Where a station is in its analysis lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationState {
    /// Constructed, `run` not called yet
    Unanalyzed,
    /// Too few qualifying years for a trend
    Insufficient { qualifying_years: usize },
    /// Annual series and trend fit available
    Analyzed,
}

/// One weather station and the result of its trend analysis.
///
/// A station is built from a name and a coordinate pair, analyzed once with
/// [`Station::run`], and read-only afterwards. The annual series and the fit
/// are only visible when the station is [`StationState::Analyzed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    name: String,
    coordinates: Coordinates,
    annual_series: Vec<AnnualMeanRecord>,
    fit_results: Option<TrendFit>,
    state: StationState,
}

impl Station {
    /// Create a station, failing unless `coordinates` holds exactly two values
    pub fn new(name: impl Into<String>, coordinates: &[f64]) -> Result<Self> {
        let coordinates = Coordinates::from_slice(coordinates)?;
        Ok(Self::with_coordinates(name, coordinates))
    }

    pub fn with_coordinates(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates,
            annual_series: Vec::new(),
            fit_results: None,
            state: StationState::Unanalyzed,
        }
    }

    /// Rebuild an analyzed station from persisted results
    pub fn restore(
        name: impl Into<String>,
        coordinates: Coordinates,
        mut annual_series: Vec<AnnualMeanRecord>,
        fit_results: TrendFit,
    ) -> Result<Self> {
        let name = name.into();
        if annual_series.len() < MIN_QUALIFYING_YEARS {
            return Err(ProcessingError::InvalidFormat(format!(
                "Station {} has {} annual records, at least {} required",
                name,
                annual_series.len(),
                MIN_QUALIFYING_YEARS
            )));
        }
        annual_series.sort_by_key(|r| r.year);

        Ok(Self {
            name,
            coordinates,
            annual_series,
            fit_results: Some(fit_results),
            state: StationState::Analyzed,
        })
    }

    /// Clean the raw rows, gate on sufficiency and fit the trend.
    ///
    /// Returns whether the station is sufficient. Meant to be called once;
    /// a second call simply recomputes from the new rows.
    pub fn run(&mut self, records: &[RawDailyRecord]) -> bool {
        let cleaned = DataCleaner::new().clean(records);

        // State is assigned in one place so series and fit never disagree
        let fit = if cleaned.is_sufficient() {
            TrendEstimator::new().fit(&cleaned.annual)
        } else {
            None
        };

        match fit {
            Some(fit) => {
                debug!(
                    station = %self.name,
                    years = cleaned.annual.len(),
                    slope = fit.slope,
                    r_squared = fit.r_squared,
                    "station analyzed"
                );
                self.annual_series = cleaned.annual;
                self.fit_results = Some(fit);
                self.state = StationState::Analyzed;
                true
            }
            None => {
                debug!(
                    station = %self.name,
                    qualifying_years = cleaned.qualifying_years(),
                    "station has insufficient data"
                );
                self.annual_series = Vec::new();
                self.fit_results = None;
                self.state = StationState::Insufficient {
                    qualifying_years: cleaned.qualifying_years(),
                };
                false
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn state(&self) -> StationState {
        self.state
    }

    pub fn is_sufficient(&self) -> bool {
        matches!(self.state, StationState::Analyzed)
    }

    /// Annual mean series, `None` unless analyzed
    pub fn temperatures(&self) -> Option<&[AnnualMeanRecord]> {
        self.is_sufficient().then_some(self.annual_series.as_slice())
    }

    /// Trend fit, `None` unless analyzed
    pub fn statistics(&self) -> Option<&TrendFit> {
        if self.is_sufficient() {
            self.fit_results.as_ref()
        } else {
            None
        }
    }

    /// First and last year of the annual series
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let series = self.temperatures()?;
        Some((series.first()?.year, series.last()?.year))
    }
}
