use crate::models::Station;

/// Aggregate view over a set of analyzed stations
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSummary {
    pub station_count: usize,
    pub warming_stations: usize,
    pub cooling_stations: usize,
    /// Degrees per year
    pub mean_slope: f64,
    pub median_slope: f64,
    pub mean_r_squared: f64,
    pub year_range: Option<(i32, i32)>,
    pub strongest_warming: Option<(String, f64)>,
    pub strongest_cooling: Option<(String, f64)>,
}

impl TrendSummary {
    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Trend Summary ===\n");
        summary.push_str(&format!("Stations: {}\n", self.station_count));

        if self.station_count == 0 {
            summary.push_str("No analyzed stations\n");
            return summary;
        }

        if let Some((first, last)) = self.year_range {
            summary.push_str(&format!("Years covered: {} - {}\n", first, last));
        }
        summary.push_str(&format!(
            "Warming: {} | Cooling: {}\n",
            self.warming_stations, self.cooling_stations
        ));
        summary.push_str(&format!(
            "Mean slope: {:+.3}°C/decade\n",
            self.mean_slope * 10.0
        ));
        summary.push_str(&format!(
            "Median slope: {:+.3}°C/decade\n",
            self.median_slope * 10.0
        ));
        summary.push_str(&format!("Mean r²: {:.3}\n", self.mean_r_squared));

        if let Some((name, slope)) = &self.strongest_warming {
            summary.push_str(&format!(
                "Strongest warming: {} ({:+.3}°C/decade)\n",
                name,
                slope * 10.0
            ));
        }
        if let Some((name, slope)) = &self.strongest_cooling {
            summary.push_str(&format!(
                "Strongest cooling: {} ({:+.3}°C/decade)\n",
                name,
                slope * 10.0
            ));
        }

        summary
    }
}

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Summarize trend fits; stations without results are ignored
    pub fn summarize(&self, stations: &[Station]) -> TrendSummary {
        let fits: Vec<(&Station, f64, f64)> = stations
            .iter()
            .filter_map(|s| s.statistics().map(|fit| (s, fit.slope, fit.r_squared)))
            .collect();

        let station_count = fits.len();
        let n = station_count.max(1) as f64;

        let mut slopes: Vec<f64> = fits.iter().map(|(_, slope, _)| *slope).collect();
        slopes.sort_by(|a, b| a.total_cmp(b));

        let year_range = fits
            .iter()
            .filter_map(|(s, _, _)| s.year_range())
            .reduce(|(a0, a1), (b0, b1)| (a0.min(b0), a1.max(b1)));

        let strongest_warming = fits
            .iter()
            .filter(|(_, slope, _)| *slope > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, slope, _)| (s.name().to_string(), *slope));

        let strongest_cooling = fits
            .iter()
            .filter(|(_, slope, _)| *slope < 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, slope, _)| (s.name().to_string(), *slope));

        TrendSummary {
            station_count,
            warming_stations: slopes.iter().filter(|s| **s > 0.0).count(),
            cooling_stations: slopes.iter().filter(|s| **s < 0.0).count(),
            mean_slope: slopes.iter().sum::<f64>() / n,
            median_slope: median(&slopes),
            mean_r_squared: fits.iter().map(|(_, _, r2)| r2).sum::<f64>() / n,
            year_range,
            strongest_warming,
            strongest_cooling,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of sorted values, 0.0 when empty
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnnualMeanRecord, TrendFit};
    use crate::utils::Coordinates;

    fn station(name: &str, first_year: i32, slope: f64, r_squared: f64) -> Station {
        let series = (0..3)
            .map(|i| AnnualMeanRecord::new(first_year + i, 10.0, 365))
            .collect();
        Station::restore(
            name,
            Coordinates::new(0.0, 0.0),
            series,
            TrendFit::new(0.0, slope, r_squared),
        )
        .unwrap()
    }

    #[test]
    fn test_summarize() {
        let stations = vec![
            station("A", 1950, 0.03, 0.5),
            station("B", 1980, -0.01, 0.1),
            station("C", 2000, 0.01, 0.3),
        ];

        let summary = TrendAnalyzer::new().summarize(&stations);
        assert_eq!(summary.station_count, 3);
        assert_eq!(summary.warming_stations, 2);
        assert_eq!(summary.cooling_stations, 1);
        assert!((summary.mean_slope - 0.01).abs() < 1e-12);
        assert!((summary.median_slope - 0.01).abs() < 1e-12);
        assert!((summary.mean_r_squared - 0.3).abs() < 1e-12);
        assert_eq!(summary.year_range, Some((1950, 2002)));
        assert_eq!(summary.strongest_warming, Some(("A".to_string(), 0.03)));
        assert_eq!(summary.strongest_cooling, Some(("B".to_string(), -0.01)));

        let text = summary.detailed_summary();
        assert!(text.contains("Stations: 3"));
        assert!(text.contains("Years covered: 1950 - 2002"));
    }

    #[test]
    fn test_summarize_ignores_unanalyzed() {
        let unanalyzed = Station::new("U", &[1.0, 1.0]).unwrap();
        let summary = TrendAnalyzer::new().summarize(&[unanalyzed]);

        assert_eq!(summary.station_count, 0);
        assert_eq!(summary.mean_slope, 0.0);
        assert!(summary.year_range.is_none());
        assert!(summary.detailed_summary().contains("No analyzed stations"));
    }
}
