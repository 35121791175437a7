/// Raw temperature codes that mean "no measurement"
pub const MISSING_SENTINELS: [i64; 3] = [-9999, -999, -99];

/// Textual markers for a missing measurement (compared case-sensitively after trimming)
pub const MISSING_MARKERS: [&str; 2] = ["", "NAN"];

/// Raw temperatures are stored in tenths of a degree
pub const TENTHS_PER_DEGREE: f64 = 10.0;

/// Date format of the DATE column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Valid daily observations a year needs to enter the annual series
pub const MIN_DAYS_PER_YEAR: usize = 180;

/// Qualifying years a station needs before a trend is fitted
pub const MIN_QUALIFYING_YEARS: usize = 3;

/// Raw rows an input file must carry before it is analyzed at all
pub const DEFAULT_MIN_RAW_ROWS: usize = 180;

/// Column names
pub const DATE_COLUMN: &str = "DATE";
pub const TMIN_COLUMN: &str = "TMIN";
pub const TMAX_COLUMN: &str = "TMAX";
pub const LATITUDE_COLUMN: &str = "LATITUDE";
pub const LONGITUDE_COLUMN: &str = "LONGITUDE";
pub const REQUIRED_COLUMNS: [&str; 3] = [DATE_COLUMN, TMIN_COLUMN, TMAX_COLUMN];

/// Extension of station input files
pub const STATION_FILE_EXTENSION: &str = "csv";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Environment prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "CLIMATE_TRENDS";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
