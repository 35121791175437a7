pub mod config;
pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod logging;
pub mod progress;

pub use config::ProcessingConfig;
pub use constants::*;
pub use coordinates::{parse_coordinate, Coordinates};
pub use filename::{generate_default_parquet_filename, skip_report_path};
pub use progress::ProgressReporter;
