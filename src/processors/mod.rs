pub mod data_cleaner;
pub mod parallel_processor;
pub mod trend_estimator;

pub use data_cleaner::{CleanedSeries, DataCleaner};
pub use parallel_processor::{
    ParallelProcessor, ProcessingSummary, SkipReason, SkippedStation, StationOutcome,
};
pub use trend_estimator::TrendEstimator;
