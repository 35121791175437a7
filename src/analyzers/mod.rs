pub mod station_locator;
pub mod trend_analyzer;

pub use station_locator::{find_nearest, nearest_with_distance, StationLocator};
pub use trend_analyzer::{TrendAnalyzer, TrendSummary};
