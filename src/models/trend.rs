use serde::{Deserialize, Serialize};

/// Least-squares line `t = intercept + slope * year`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendFit {
    pub intercept: f64,
    /// Degrees per year
    pub slope: f64,
    /// Coefficient of determination
    pub r_squared: f64,
}

impl TrendFit {
    pub fn new(intercept: f64, slope: f64, r_squared: f64) -> Self {
        Self {
            intercept,
            slope,
            r_squared,
        }
    }

    pub fn predict(&self, year: f64) -> f64 {
        self.intercept + self.slope * year
    }

    pub fn slope_per_decade(&self) -> f64 {
        self.slope * 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict() {
        let fit = TrendFit::new(-30.0, 0.02, 0.8);
        assert!((fit.predict(2000.0) - 10.0).abs() < 1e-9);
        assert!((fit.slope_per_decade() - 0.2).abs() < 1e-12);
    }
}
