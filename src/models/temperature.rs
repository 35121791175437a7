use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{DATE_FORMAT, TENTHS_PER_DEGREE};

/// One raw row of a station file, cells kept as text.
///
/// Temperatures are in tenths of a degree and may hold sentinel codes or
/// garbage; the date may be unparsable. Nothing is validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDailyRecord {
    pub date: String,
    pub tmin: String,
    pub tmax: String,
}

impl RawDailyRecord {
    pub fn new(date: impl Into<String>, tmin: impl Into<String>, tmax: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            tmin: tmin.into(),
            tmax: tmax.into(),
        }
    }

    /// Build a row from a calendar date and integer tenths-of-a-degree readings
    pub fn from_tenths(date: NaiveDate, tmin: i64, tmax: i64) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            tmin: tmin.to_string(),
            tmax: tmax.to_string(),
        }
    }
}

/// A day that survived cleaning, temperatures in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub tmin: f64,
    pub tmax: f64,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, tmin: f64, tmax: f64) -> Self {
        Self { date, tmin, tmax }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Daily mean temperature: midpoint of min and max
    pub fn mean(&self) -> f64 {
        (self.tmin + self.tmax) / 2.0
    }

    /// Render back into the raw tenths-of-a-degree form
    pub fn to_raw(&self) -> RawDailyRecord {
        RawDailyRecord::from_tenths(
            self.date,
            (self.tmin * TENTHS_PER_DEGREE).round() as i64,
            (self.tmax * TENTHS_PER_DEGREE).round() as i64,
        )
    }
}

/// Mean temperature of one calendar year with its number of contributing days
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualMeanRecord {
    pub year: i32,
    pub t: f64,
    pub count: usize,
}

impl AnnualMeanRecord {
    pub fn new(year: i32, t: f64, count: usize) -> Self {
        Self { year, t, count }
    }
}
