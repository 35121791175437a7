pub mod station;
pub mod temperature;
pub mod trend;

pub use station::{Station, StationState};
pub use temperature::{AnnualMeanRecord, DailyRecord, RawDailyRecord};
pub use trend::TrendFit;
