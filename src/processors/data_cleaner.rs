use crate::models::{AnnualMeanRecord, DailyRecord, RawDailyRecord};
use crate::utils::constants::{
    DATE_FORMAT, MIN_DAYS_PER_YEAR, MIN_QUALIFYING_YEARS, MISSING_MARKERS, MISSING_SENTINELS,
    TENTHS_PER_DEGREE,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::trace;

/// Annual series produced from one station's raw rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CleanedSeries {
    /// Qualifying years, ascending
    pub annual: Vec<AnnualMeanRecord>,
    pub valid_days: usize,
    pub dropped_rows: usize,
}

impl CleanedSeries {
    pub fn qualifying_years(&self) -> usize {
        self.annual.len()
    }

    pub fn is_sufficient(&self) -> bool {
        self.annual.len() >= MIN_QUALIFYING_YEARS
    }
}

/// Turns raw per-day rows into an annual mean temperature series.
///
/// Malformed rows are dropped, never reported as errors.
pub struct DataCleaner;

impl DataCleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean, aggregate by year and keep years with enough valid days
    pub fn clean(&self, records: &[RawDailyRecord]) -> CleanedSeries {
        let daily = self.clean_daily(records);
        let dropped_rows = records.len() - daily.len();
        let annual = self.qualifying_years(self.aggregate_annual(&daily));

        trace!(
            rows = records.len(),
            valid_days = daily.len(),
            dropped_rows,
            qualifying_years = annual.len(),
            "cleaned station rows"
        );

        CleanedSeries {
            annual,
            valid_days: daily.len(),
            dropped_rows,
        }
    }

    /// Rows with a valid date and both temperatures, in input order
    pub fn clean_daily(&self, records: &[RawDailyRecord]) -> Vec<DailyRecord> {
        records
            .iter()
            .filter_map(|record| self.clean_record(record))
            .collect()
    }

    pub fn clean_record(&self, record: &RawDailyRecord) -> Option<DailyRecord> {
        let date = parse_date(&record.date)?;
        let tmin = parse_temperature(&record.tmin)?;
        let tmax = parse_temperature(&record.tmax)?;
        Some(DailyRecord::new(date, tmin, tmax))
    }

    /// Group days by calendar year, ascending, without any coverage filter
    pub fn aggregate_annual(&self, daily: &[DailyRecord]) -> Vec<AnnualMeanRecord> {
        let by_year = daily
            .iter()
            .fold(BTreeMap::<i32, (f64, usize)>::new(), |mut acc, day| {
                let entry = acc.entry(day.year()).or_insert((0.0, 0));
                entry.0 += day.mean();
                entry.1 += 1;
                acc
            });

        by_year
            .into_iter()
            .map(|(year, (sum, count))| AnnualMeanRecord::new(year, sum / count as f64, count))
            .collect()
    }

    /// Drop years with fewer than the required valid days or an overflowed mean
    pub fn qualifying_years(&self, annual: Vec<AnnualMeanRecord>) -> Vec<AnnualMeanRecord> {
        annual
            .into_iter()
            .filter(|record| record.count >= MIN_DAYS_PER_YEAR && record.t.is_finite())
            .collect()
    }
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a strict YYYY-MM-DD date; anything else is missing
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let trimmed = cell.trim();
    // chrono accepts unpadded fields and signed years, so check the shape first
    let well_formed = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok()
}

/// Parse a tenths-of-a-degree cell into degrees, mapping sentinels and junk to missing
pub fn parse_temperature(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        return None;
    }

    let tenths = trimmed.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if MISSING_SENTINELS.iter().any(|&s| tenths == s as f64) {
        return None;
    }

    Some(tenths / TENTHS_PER_DEGREE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn days_in_year(year: i32, days: usize, tmin: i64, tmax: i64) -> Vec<RawDailyRecord> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        (0..days)
            .map(|d| RawDailyRecord::from_tenths(start + Duration::days(d as i64), tmin, tmax))
            .collect()
    }

    #[test]
    fn test_parse_temperature_sentinels() {
        assert_eq!(parse_temperature("217"), Some(21.7));
        assert_eq!(parse_temperature(" -15 "), Some(-1.5));
        assert_eq!(parse_temperature("-9999"), None);
        assert_eq!(parse_temperature("-999"), None);
        assert_eq!(parse_temperature("-99"), None);
        assert_eq!(parse_temperature(""), None);
        assert_eq!(parse_temperature("NAN"), None);
        assert_eq!(parse_temperature("abc"), None);
        assert_eq!(parse_temperature("inf"), None);
        // Only the exact sentinel codes are missing
        assert_eq!(parse_temperature("-98"), Some(-9.8));
    }

    #[test]
    fn test_parse_date_is_strict() {
        assert_eq!(
            parse_date("1949-01-01"),
            NaiveDate::from_ymd_opt(1949, 1, 1)
        );
        assert_eq!(parse_date("1949-02-30"), None);
        assert_eq!(parse_date("01/02/1949"), None);
        assert_eq!(parse_date("19490101"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2020-1-5"), None);
        assert_eq!(parse_date("+2020-01-05"), None);
        assert_eq!(parse_date("2020-01-5 "), None);
        assert_eq!(parse_date(" 2020-01-05 "), NaiveDate::from_ymd_opt(2020, 1, 5));
    }

    #[test]
    fn test_overflowing_years_do_not_qualify() {
        let cleaner = DataCleaner::new();
        let records: Vec<RawDailyRecord> = days_in_year(2000, 200, 0, 0)
            .into_iter()
            .map(|r| RawDailyRecord::new(r.date, "1e308", "1e308"))
            .collect();

        let annual = cleaner.aggregate_annual(&cleaner.clean_daily(&records));
        assert_eq!(annual.len(), 1);
        assert!(annual[0].t.is_infinite());

        let cleaned = cleaner.clean(&records);
        assert_eq!(cleaned.qualifying_years(), 0);
        assert_eq!(cleaned.valid_days, 200);
    }

    #[test]
    fn test_rows_with_any_missing_field_are_dropped() {
        let cleaner = DataCleaner::new();
        let records = vec![
            RawDailyRecord::new("2020-01-01", "100", "200"),
            RawDailyRecord::new("not a date", "100", "200"),
            RawDailyRecord::new("2020-01-03", "-9999", "200"),
            RawDailyRecord::new("2020-01-04", "100", "NAN"),
            RawDailyRecord::new("2020-01-05", "", ""),
        ];

        let daily = cleaner.clean_daily(&records);
        assert_eq!(daily.len(), 1);
        assert!((daily[0].mean() - 15.0).abs() < 1e-12);

        let cleaned = cleaner.clean(&records);
        assert_eq!(cleaned.dropped_rows, 4);
        assert_eq!(cleaned.valid_days, 1);
    }

    #[test]
    fn test_annual_series_ascending_regardless_of_input_order() {
        let cleaner = DataCleaner::new();
        let mut records = Vec::new();
        records.extend(days_in_year(2002, 200, 100, 200));
        records.extend(days_in_year(2000, 200, 0, 100));
        records.extend(days_in_year(2001, 200, 50, 150));
        records.reverse();

        let cleaned = cleaner.clean(&records);
        let years: Vec<i32> = cleaned.annual.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002]);
        assert!((cleaned.annual[0].t - 5.0).abs() < 1e-9);
        assert!((cleaned.annual[1].t - 10.0).abs() < 1e-9);
        assert!((cleaned.annual[2].t - 15.0).abs() < 1e-9);
        assert!(cleaned.annual.iter().all(|r| r.count == 200));
        assert!(cleaned.is_sufficient());
    }

    #[test]
    fn test_year_threshold_boundary() {
        let cleaner = DataCleaner::new();
        let mut records = days_in_year(1990, 179, 100, 200);
        records.extend(days_in_year(1991, 180, 100, 200));

        let cleaned = cleaner.clean(&records);
        assert_eq!(cleaned.annual.len(), 1);
        assert_eq!(cleaned.annual[0].year, 1991);
        assert_eq!(cleaned.annual[0].count, 180);
    }

    #[test]
    fn test_invalid_days_do_not_count_towards_threshold() {
        let cleaner = DataCleaner::new();
        let mut records = days_in_year(1990, 180, 100, 200);
        records[0].tmax = "-9999".to_string();

        let cleaned = cleaner.clean(&records);
        assert!(cleaned.annual.is_empty());
    }

    #[test]
    fn test_all_missing_input_is_empty_not_error() {
        let cleaner = DataCleaner::new();
        let records = days_in_year(2010, 365, -9999, -9999);

        let cleaned = cleaner.clean(&records);
        assert!(cleaned.annual.is_empty());
        assert!(!cleaned.is_sufficient());
        assert_eq!(cleaned.dropped_rows, 365);
    }

    #[test]
    fn test_two_qualifying_years_are_insufficient() {
        let cleaner = DataCleaner::new();
        let mut records = days_in_year(2000, 365, 100, 200);
        records.extend(days_in_year(2001, 365, 100, 200));
        records.extend(days_in_year(2002, 100, 100, 200));

        let cleaned = cleaner.clean(&records);
        assert_eq!(cleaned.qualifying_years(), 2);
        assert!(!cleaned.is_sufficient());
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let cleaner = DataCleaner::new();
        let mut records = Vec::new();
        for year in 1980..1984 {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            for d in 0..300i64 {
                let tmin = if d % 17 == 0 { -9999 } else { d % 40 - 20 };
                records.push(RawDailyRecord::from_tenths(
                    start + Duration::days(d),
                    tmin,
                    d % 50 + 100,
                ));
            }
        }
        records.push(RawDailyRecord::new("garbage", "1", "2"));

        let first = cleaner.clean(&records);
        let rerendered: Vec<RawDailyRecord> = cleaner
            .clean_daily(&records)
            .iter()
            .map(DailyRecord::to_raw)
            .collect();
        let second = cleaner.clean(&rerendered);

        assert_eq!(first.annual, second.annual);
        assert_eq!(second.dropped_rows, 0);
    }
}
