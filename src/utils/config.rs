use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    CONFIG_ENV_PREFIX, DEFAULT_MIN_RAW_ROWS,
};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Settings for the file-processing layer.
///
/// Resolution order: defaults, then an optional TOML file, then
/// `CLIMATE_TRENDS_*` environment variables, then CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProcessingConfig {
    #[validate(range(min = 1, max = 4096))]
    pub max_workers: usize,

    #[validate(range(min = 1))]
    pub min_raw_rows: usize,

    #[validate(length(min = 1))]
    pub compression: String,

    pub use_mmap: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_workers: num_cpus::get(),
            min_raw_rows: DEFAULT_MIN_RAW_ROWS,
            compression: COMPRESSION_SNAPPY.to_string(),
            use_mmap: false,
        }
    }
}

impl ProcessingConfig {
    /// Load layered configuration and validate it
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = Config::builder()
            .set_default("max_workers", defaults.max_workers as i64)?
            .set_default("min_raw_rows", defaults.min_raw_rows as i64)?
            .set_default("compression", defaults.compression.as_str())?
            .set_default("use_mmap", defaults.use_mmap)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true));

        let config: ProcessingConfig = builder.build()?.try_deserialize()?;
        config.check()?;

        Ok(config)
    }

    /// Apply explicit command-line overrides, re-validating the result
    pub fn with_overrides(
        mut self,
        max_workers: Option<usize>,
        min_raw_rows: Option<usize>,
        compression: Option<String>,
        use_mmap: bool,
    ) -> Result<Self> {
        if let Some(workers) = max_workers {
            self.max_workers = workers;
        }
        if let Some(rows) = min_raw_rows {
            self.min_raw_rows = rows;
        }
        if let Some(compression) = compression {
            self.compression = compression;
        }
        self.use_mmap |= use_mmap;

        self.check()?;
        Ok(self)
    }

    fn check(&self) -> Result<()> {
        self.validate()?;

        match self.compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY | COMPRESSION_GZIP | COMPRESSION_LZ4 | COMPRESSION_ZSTD
            | COMPRESSION_NONE => Ok(()),
            other => Err(ProcessingError::Config(format!(
                "Unsupported compression: {}",
                other
            ))),
        }
    }
}
