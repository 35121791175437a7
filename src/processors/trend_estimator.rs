use crate::models::{AnnualMeanRecord, TrendFit};

/// Ordinary least squares of annual mean temperature against year.
///
/// Every year carries equal weight whatever its day count.
pub struct TrendEstimator;

impl TrendEstimator {
    pub fn new() -> Self {
        Self
    }

    pub fn fit(&self, series: &[AnnualMeanRecord]) -> Option<TrendFit> {
        let xs: Vec<f64> = series.iter().map(|r| r.year as f64).collect();
        let ys: Vec<f64> = series.iter().map(|r| r.t).collect();
        self.fit_points(&xs, &ys)
    }

    /// Fit `y = intercept + slope * x`.
    ///
    /// Returns `None` for fewer than two points, mismatched lengths, when
    /// all `x` are equal, or when the fit is not finite. A constant `y`
    /// yields an r² of 1.0.
    pub fn fit_points(&self, xs: &[f64], ys: &[f64]) -> Option<TrendFit> {
        if xs.len() != ys.len() || xs.len() < 2 {
            return None;
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        // Centered sums keep precision with year-sized x values
        let (sxx, sxy) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(sxx, sxy), (&x, &y)| {
                let dx = x - x_mean;
                (sxx + dx * dx, sxy + dx * (y - y_mean))
            });

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let (ss_res, ss_tot) = xs
            .iter()
            .zip(ys)
            .fold((0.0, 0.0), |(ss_res, ss_tot), (&x, &y)| {
                let residual = y - (y_mean + slope * (x - x_mean));
                (ss_res + residual * residual, ss_tot + (y - y_mean).powi(2))
            });

        let r_squared = if ss_tot == 0.0 {
            1.0
        } else {
            1.0 - ss_res / ss_tot
        };

        if !(intercept.is_finite() && slope.is_finite() && r_squared.is_finite()) {
            return None;
        }

        Some(TrendFit::new(intercept, slope, r_squared))
    }
}

impl Default for TrendEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i32, f64)]) -> Vec<AnnualMeanRecord> {
        points
            .iter()
            .map(|&(year, t)| AnnualMeanRecord::new(year, t, 365))
            .collect()
    }

    #[test]
    fn test_perfect_line() {
        let estimator = TrendEstimator::new();
        let data = series(&[(2000, 10.0), (2001, 10.5), (2002, 11.0), (2003, 11.5)]);

        let fit = estimator.fit(&data).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-9);
        assert!((fit.intercept - (10.0 - 0.5 * 2000.0)).abs() < 1e-6);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_points_known_values() {
        let estimator = TrendEstimator::new();
        // x = 1,2,3 ; y = 1,3,2 -> slope 0.5, intercept 1.0, r² 0.25
        let fit = estimator
            .fit_points(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0])
            .unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_day_count_does_not_weight() {
        let estimator = TrendEstimator::new();
        let mut data = series(&[(1, 1.0), (2, 3.0), (3, 2.0)]);
        data[1].count = 180;

        let fit = estimator.fit(&data).unwrap();
        assert!((fit.slope - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_series() {
        let estimator = TrendEstimator::new();
        let fit = estimator
            .fit(&series(&[(1990, 4.0), (1991, 4.0), (1992, 4.0)]))
            .unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let estimator = TrendEstimator::new();
        assert!(estimator.fit(&[]).is_none());
        assert!(estimator.fit(&series(&[(2000, 1.0)])).is_none());
        assert!(estimator.fit_points(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(estimator.fit_points(&[1.0, 2.0], &[2.0]).is_none());
    }

    #[test]
    fn test_non_finite_values_give_no_fit() {
        let estimator = TrendEstimator::new();
        assert!(estimator
            .fit_points(&[1.0, 2.0, 3.0], &[1.0, f64::INFINITY, 2.0])
            .is_none());
        assert!(estimator
            .fit(&series(&[(2000, 1.0), (2001, f64::NAN), (2002, 2.0)]))
            .is_none());
    }
}
