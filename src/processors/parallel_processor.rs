use crate::error::{ProcessingError, Result};
use crate::models::{Station, StationState};
use crate::readers::{discover_station_files, station_name_from_path, GhcnReader};
use crate::utils::progress::ProgressReporter;
use crate::utils::ProcessingConfig;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Why a station file produced no analyzed station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The file could not be read or failed the raw-row pre-filter
    ReadFailed(String),
    InvalidCoordinates(String),
    InsufficientData { qualifying_years: usize },
}

impl SkipReason {
    fn category(&self) -> &'static str {
        match self {
            SkipReason::ReadFailed(_) => "read failed",
            SkipReason::InvalidCoordinates(_) => "invalid coordinates",
            SkipReason::InsufficientData { .. } => "insufficient data",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ReadFailed(e) => write!(f, "read failed: {}", e),
            SkipReason::InvalidCoordinates(e) => write!(f, "invalid coordinates: {}", e),
            SkipReason::InsufficientData { qualifying_years } => {
                write!(f, "insufficient data: {} qualifying years", qualifying_years)
            }
        }
    }
}

/// Result of processing one station file
#[derive(Debug, Clone)]
pub enum StationOutcome {
    Analyzed(Station),
    Skipped { name: String, reason: SkipReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedStation {
    pub name: String,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Collected outcomes of a processing run
#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_files: usize,
    /// Analyzed stations, sorted by name
    pub stations: Vec<Station>,
    pub skipped: Vec<SkippedStation>,
}

impl ProcessingSummary {
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for skipped in &self.skipped {
            *counts.entry(skipped.reason.category()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Processing Report ===\n");
        summary.push_str(&format!("Station files: {}\n", self.total_files));
        summary.push_str(&format!(
            "Analyzed: {} ({:.1}%)\n",
            self.stations.len(),
            percentage(self.stations.len(), self.total_files)
        ));
        summary.push_str(&format!("Skipped: {}\n", self.skipped.len()));

        for (category, count) in self.skip_counts() {
            summary.push_str(&format!("  {}: {}\n", category, count));
        }

        summary
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Runs station analysis over many files on a bounded thread pool.
///
/// Each file is read and analyzed independently; a failing file only
/// produces a skipped outcome for itself.
pub struct ParallelProcessor {
    max_workers: usize,
    reader: GhcnReader,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            reader: GhcnReader::new(),
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(config.max_workers).with_reader(
            GhcnReader::new()
                .with_min_raw_rows(config.min_raw_rows)
                .with_mmap(config.use_mmap),
        )
    }

    pub fn with_reader(mut self, reader: GhcnReader) -> Self {
        self.reader = reader;
        self
    }

    /// Read, construct and analyze a single station file
    pub fn process_file(&self, path: &Path) -> StationOutcome {
        let name = station_name_from_path(path).unwrap_or_else(|_| path.display().to_string());

        let data = match self.reader.read_station(path) {
            Ok(data) => data,
            Err(
                e @ (ProcessingError::InvalidCoordinate(_)
                | ProcessingError::InvalidCoordinates { .. }),
            ) => {
                return StationOutcome::Skipped {
                    name,
                    reason: SkipReason::InvalidCoordinates(e.to_string()),
                }
            }
            Err(e) => {
                return StationOutcome::Skipped {
                    name,
                    reason: SkipReason::ReadFailed(e.to_string()),
                }
            }
        };

        let mut station = Station::with_coordinates(data.name, data.coordinates);
        if station.run(&data.records) {
            return StationOutcome::Analyzed(station);
        }

        let qualifying_years = match station.state() {
            StationState::Insufficient { qualifying_years } => qualifying_years,
            _ => 0,
        };

        StationOutcome::Skipped {
            name,
            reason: SkipReason::InsufficientData { qualifying_years },
        }
    }

    /// Process every station file in a directory
    pub fn process_directory(
        &self,
        input_dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<ProcessingSummary> {
        let files = discover_station_files(input_dir)?;
        info!(
            dir = %input_dir.display(),
            files = files.len(),
            workers = self.max_workers,
            "processing station files"
        );
        self.process_files(&files, progress)
    }

    pub fn process_files(
        &self,
        files: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<ProcessingSummary> {
        if let Some(p) = progress {
            p.set_length(files.len() as u64);
            p.set_message(&format!("Analyzing {} stations...", files.len()));
        }

        // Configure Rayon thread pool
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let outcomes: Vec<(PathBuf, StationOutcome)> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let outcome = self.process_file(path);

                    if let Some(p) = progress {
                        p.increment(1);
                    }

                    (path.clone(), outcome)
                })
                .collect()
        });

        let mut summary = ProcessingSummary {
            total_files: files.len(),
            ..Default::default()
        };

        for (path, outcome) in outcomes {
            match outcome {
                StationOutcome::Analyzed(station) => summary.stations.push(station),
                StationOutcome::Skipped { name, reason } => {
                    debug!(station = %name, %reason, "station skipped");
                    summary.skipped.push(SkippedStation { name, path, reason });
                }
            }
        }

        summary
            .stations
            .sort_by(|a, b| a.name().cmp(b.name()));

        if let Some(p) = progress {
            p.finish_with_message(&format!(
                "Analyzed {} of {} stations",
                summary.stations.len(),
                summary.total_files
            ));
        }

        info!(
            analyzed = summary.stations.len(),
            skipped = summary.skipped.len(),
            "processing complete"
        );

        Ok(summary)
    }
}

impl Default for ParallelProcessor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_days(dir: &Path, name: &str, start: &str, days: i64, lat: &str) -> PathBuf {
        let path = dir.join(format!("{}.csv", name));
        let mut file = File::create(&path).unwrap();
        writeln!(file, "STATION,DATE,LATITUDE,LONGITUDE,TMIN,TMAX").unwrap();
        let start = NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap();
        for d in 0..days {
            let date = start + Duration::days(d);
            writeln!(file, "{},{},{},8.5,{},{}", name, date, lat, 100 + d / 30, 200).unwrap();
        }
        path
    }

    #[test]
    fn test_process_file_outcomes() {
        let dir = TempDir::new().unwrap();
        let good = write_days(dir.path(), "GOOD", "2000-01-01", 4 * 365, "40.5");
        let short = write_days(dir.path(), "SHORT", "2000-01-01", 500, "40.5");
        let tiny = write_days(dir.path(), "TINY", "2000-01-01", 20, "40.5");
        let bad_coords = write_days(dir.path(), "BADC", "2000-01-01", 400, "north");

        let processor = ParallelProcessor::new(2);

        match processor.process_file(&good) {
            StationOutcome::Analyzed(station) => {
                assert_eq!(station.name(), "GOOD");
                assert_eq!(station.temperatures().unwrap().len(), 4);
            }
            other => panic!("expected analyzed, got {:?}", other),
        }

        match processor.process_file(&short) {
            StationOutcome::Skipped { name, reason } => {
                assert_eq!(name, "SHORT");
                assert_eq!(
                    reason,
                    SkipReason::InsufficientData {
                        qualifying_years: 1
                    }
                );
            }
            other => panic!("expected skipped, got {:?}", other),
        }

        assert!(matches!(
            processor.process_file(&tiny),
            StationOutcome::Skipped {
                reason: SkipReason::ReadFailed(_),
                ..
            }
        ));
        assert!(matches!(
            processor.process_file(&bad_coords),
            StationOutcome::Skipped {
                reason: SkipReason::InvalidCoordinates(_),
                ..
            }
        ));
        assert!(matches!(
            processor.process_file(&dir.path().join("missing.csv")),
            StationOutcome::Skipped {
                reason: SkipReason::ReadFailed(_),
                ..
            }
        ));
    }

    #[test]
    fn test_process_directory_isolates_failures() -> Result<()> {
        let dir = TempDir::new()?;
        write_days(dir.path(), "ZULU", "1990-01-01", 3 * 365 + 1, "10.0");
        write_days(dir.path(), "ALPHA", "1995-01-01", 5 * 365 + 1, "20.0");
        write_days(dir.path(), "SPARSE", "1995-01-01", 300, "30.0");
        std::fs::write(dir.path().join("BROKEN.csv"), "DATE,TMIN\n2000-01-01,1\n")?;

        let summary = ParallelProcessor::new(3).process_directory(dir.path(), None)?;

        assert_eq!(summary.total_files, 4);
        let names: Vec<&str> = summary.stations.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["ALPHA", "ZULU"]);
        assert_eq!(summary.skipped.len(), 2);

        let counts = summary.skip_counts();
        assert_eq!(counts.get("insufficient data"), Some(&1));
        assert_eq!(counts.get("read failed"), Some(&1));

        let report = summary.summary();
        assert!(report.contains("Station files: 4"));
        assert!(report.contains("Analyzed: 2 (50.0%)"));

        Ok(())
    }

    #[test]
    fn test_empty_file_list() {
        // rayon treats 0 threads as "use the default"
        let summary = ParallelProcessor::new(0).process_files(&[], None).unwrap();
        assert_eq!(summary.total_files, 0);
        assert!(summary.stations.is_empty());
        assert!(summary.summary().contains("Analyzed: 0 (0.0%)"));
    }
}
