use crate::error::{ProcessingError, Result};
use crate::models::RawDailyRecord;
use crate::utils::constants::{
    DATE_COLUMN, DEFAULT_BUFFER_SIZE, DEFAULT_MIN_RAW_ROWS, LATITUDE_COLUMN, LONGITUDE_COLUMN,
    REQUIRED_COLUMNS, STATION_FILE_EXTENSION, TMAX_COLUMN, TMIN_COLUMN,
};
use crate::utils::coordinates::{parse_coordinate, Coordinates};
use csv::{ReaderBuilder, StringRecord, Trim};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the analysis needs from one station file
#[derive(Debug, Clone)]
pub struct StationData {
    pub name: String,
    pub coordinates: Coordinates,
    pub records: Vec<RawDailyRecord>,
}

/// Reader for GHCN-daily style CSV files.
///
/// Expected header (any order, extra columns ignored):
/// `STATION, DATE, LATITUDE, LONGITUDE, ELEVATION, NAME, TMIN, TMAX`
pub struct GhcnReader {
    min_raw_rows: usize,
    use_mmap: bool,
}

struct ColumnIndex {
    date: usize,
    tmin: usize,
    tmax: usize,
    // Absent coordinate columns surface as coordinate errors on the first row
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl GhcnReader {
    pub fn new() -> Self {
        Self {
            min_raw_rows: DEFAULT_MIN_RAW_ROWS,
            use_mmap: false,
        }
    }

    pub fn with_min_raw_rows(mut self, min_raw_rows: usize) -> Self {
        self.min_raw_rows = min_raw_rows;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read one station file; the station name is the file stem
    pub fn read_station(&self, path: &Path) -> Result<StationData> {
        let name = station_name_from_path(path)?;
        let file = File::open(path)?;

        if self.use_mmap {
            let mmap = unsafe { Mmap::map(&file)? };
            self.read_from(name, &mmap[..])
        } else {
            let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
            self.read_from(name, reader)
        }
    }

    /// Read station data from any CSV source
    pub fn read_from<R: Read>(&self, name: String, source: R) -> Result<StationData> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);

        let columns = Self::column_index(reader.headers()?)?;

        let mut coordinates = None;
        let mut records = Vec::new();

        for row in reader.records() {
            let row = row?;

            if coordinates.is_none() {
                coordinates = Some(Self::parse_coordinates(&row, &columns)?);
            }

            records.push(RawDailyRecord::new(
                row.get(columns.date).unwrap_or_default(),
                row.get(columns.tmin).unwrap_or_default(),
                row.get(columns.tmax).unwrap_or_default(),
            ));
        }

        if records.len() < self.min_raw_rows {
            return Err(ProcessingError::InsufficientRows {
                found: records.len(),
                required: self.min_raw_rows,
            });
        }

        let coordinates = coordinates.ok_or_else(|| {
            ProcessingError::InvalidCoordinate(format!("No coordinates for station {}", name))
        })?;

        debug!(station = %name, rows = records.len(), %coordinates, "read station file");

        Ok(StationData {
            name,
            coordinates,
            records,
        })
    }

    /// Quick header-only check that the required columns exist
    pub fn is_relevant(&self, path: &Path) -> Result<bool> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_path(path)?;
        let headers = reader.headers()?;

        Ok(REQUIRED_COLUMNS
            .iter()
            .all(|required| headers.iter().any(|h| h == *required)))
    }

    fn column_index(headers: &StringRecord) -> Result<ColumnIndex> {
        let position = |column: &str| headers.iter().position(|h| h == column);
        let find = |column: &str| {
            position(column).ok_or_else(|| ProcessingError::MissingColumn(column.to_string()))
        };

        Ok(ColumnIndex {
            date: find(DATE_COLUMN)?,
            tmin: find(TMIN_COLUMN)?,
            tmax: find(TMAX_COLUMN)?,
            latitude: position(LATITUDE_COLUMN),
            longitude: position(LONGITUDE_COLUMN),
        })
    }

    fn parse_coordinates(row: &StringRecord, columns: &ColumnIndex) -> Result<Coordinates> {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).unwrap_or_default();
        let latitude = parse_coordinate(cell(columns.latitude))?;
        let longitude = parse_coordinate(cell(columns.longitude))?;
        Ok(Coordinates::new(latitude, longitude))
    }
}

impl Default for GhcnReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Station name from the file stem (e.g. `ACW00011604.csv` -> `ACW00011604`)
pub fn station_name_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid file path: {:?}", path)))
}

/// All station CSV files in a directory, sorted by path
pub fn discover_station_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_station_file = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(STATION_FILE_EXTENSION));

        if path.is_file() && is_station_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Remove station files lacking the required columns; returns how many qualified
pub fn prune_irrelevant(dir: &Path, dry_run: bool) -> Result<usize> {
    let reader = GhcnReader::new();
    let mut removed = 0;

    for path in discover_station_files(dir)? {
        let relevant = match reader.is_relevant(&path) {
            Ok(relevant) => relevant,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "unreadable header");
                false
            }
        };

        if relevant {
            continue;
        }

        if !dry_run {
            std::fs::remove_file(&path)?;
        }
        debug!(file = %path.display(), dry_run, "irrelevant station file");
        removed += 1;
    }

    info!(removed, dry_run, "pruned station files");
    Ok(removed)
}
