use crate::error::{ProcessingError, Result};
use crate::models::{AnnualMeanRecord, Station, TrendFit};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use crate::utils::Coordinates;
use arrow::array::{Array, ArrayRef, Float64Array, Int32Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Persists analyzed stations as one Parquet row per (station, year).
///
/// Station-level columns (coordinates and fit) repeat on every row of that
/// station, which keeps the table flat and easy to query.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

/// Flattened row of the results table
#[derive(Debug, Clone, PartialEq)]
struct ResultRow<'a> {
    station_name: &'a str,
    coordinates: Coordinates,
    annual: AnnualMeanRecord,
    fit: TrendFit,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Write analyzed stations; returns the number of rows written.
    ///
    /// Stations without results are left out. Nothing is written when no
    /// station has results.
    pub fn write_stations(&self, stations: &[Station], path: &Path) -> Result<usize> {
        let rows = Self::flatten(stations);
        if rows.is_empty() {
            debug!(path = %path.display(), "no analyzed stations to write");
            return Ok(0);
        }

        let schema = self.create_schema();
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in rows.chunks(self.row_group_size.max(1)) {
            let batch = self.rows_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        info!(path = %path.display(), rows = rows.len(), "wrote station results");
        Ok(rows.len())
    }

    fn flatten(stations: &[Station]) -> Vec<ResultRow<'_>> {
        stations
            .iter()
            .filter_map(|station| {
                let fit = *station.statistics()?;
                let series = station.temperatures()?;
                Some(series.iter().map(move |annual| ResultRow {
                    station_name: station.name(),
                    coordinates: station.coordinates(),
                    annual: *annual,
                    fit,
                }))
            })
            .flatten()
            .collect()
    }

    /// Arrow schema of the results table
    fn create_schema(&self) -> Arc<Schema> {
        let fields = vec![
            Field::new("station_name", DataType::Utf8, false),
            Field::new("latitude", DataType::Float64, false),
            Field::new("longitude", DataType::Float64, false),
            Field::new("year", DataType::Int32, false),
            Field::new("mean_temp", DataType::Float64, false),
            Field::new("day_count", DataType::UInt32, false),
            Field::new("intercept", DataType::Float64, false),
            Field::new("slope", DataType::Float64, false),
            Field::new("r_squared", DataType::Float64, false),
        ];

        Arc::new(Schema::new(fields))
    }

    fn rows_to_batch(&self, rows: &[ResultRow<'_>], schema: Arc<Schema>) -> Result<RecordBatch> {
        let names: Vec<&str> = rows.iter().map(|r| r.station_name).collect();
        let latitudes: Vec<f64> = rows.iter().map(|r| r.coordinates.latitude).collect();
        let longitudes: Vec<f64> = rows.iter().map(|r| r.coordinates.longitude).collect();
        let years: Vec<i32> = rows.iter().map(|r| r.annual.year).collect();
        let means: Vec<f64> = rows.iter().map(|r| r.annual.t).collect();
        let counts: Vec<u32> = rows.iter().map(|r| r.annual.count as u32).collect();
        let intercepts: Vec<f64> = rows.iter().map(|r| r.fit.intercept).collect();
        let slopes: Vec<f64> = rows.iter().map(|r| r.fit.slope).collect();
        let r_squared: Vec<f64> = rows.iter().map(|r| r.fit.r_squared).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(names)),
            Arc::new(Float64Array::from(latitudes)),
            Arc::new(Float64Array::from(longitudes)),
            Arc::new(Int32Array::from(years)),
            Arc::new(Float64Array::from(means)),
            Arc::new(UInt32Array::from(counts)),
            Arc::new(Float64Array::from(intercepts)),
            Arc::new(Float64Array::from(slopes)),
            Arc::new(Float64Array::from(r_squared)),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Load analyzed stations back, in the order they were written
    pub fn read_stations(&self, path: &Path) -> Result<Vec<Station>> {
        let file = File::open(path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, (Coordinates, TrendFit, Vec<AnnualMeanRecord>)> =
            HashMap::new();

        for batch in reader {
            let batch = batch?;

            let names = column::<StringArray>(&batch, "station_name")?;
            let latitudes = column::<Float64Array>(&batch, "latitude")?;
            let longitudes = column::<Float64Array>(&batch, "longitude")?;
            let years = column::<Int32Array>(&batch, "year")?;
            let means = column::<Float64Array>(&batch, "mean_temp")?;
            let counts = column::<UInt32Array>(&batch, "day_count")?;
            let intercepts = column::<Float64Array>(&batch, "intercept")?;
            let slopes = column::<Float64Array>(&batch, "slope")?;
            let r_squared = column::<Float64Array>(&batch, "r_squared")?;

            for i in 0..batch.num_rows() {
                let name = names.value(i);
                let annual =
                    AnnualMeanRecord::new(years.value(i), means.value(i), counts.value(i) as usize);

                if let Some((_, _, series)) = grouped.get_mut(name) {
                    series.push(annual);
                    continue;
                }

                order.push(name.to_string());
                grouped.insert(
                    name.to_string(),
                    (
                        Coordinates::new(latitudes.value(i), longitudes.value(i)),
                        TrendFit::new(intercepts.value(i), slopes.value(i), r_squared.value(i)),
                        vec![annual],
                    ),
                );
            }
        }

        let mut stations = Vec::with_capacity(order.len());
        for name in order {
            if let Some((coordinates, fit, series)) = grouped.remove(&name) {
                stations.push(Station::restore(name, coordinates, series, fit)?);
            }
        }

        debug!(path = %path.display(), stations = stations.len(), "loaded station results");
        Ok(stations)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes: Vec<i64> = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        let compression = if row_groups > 0 && metadata.row_group(0).num_columns() > 0 {
            metadata.row_group(0).column(0).compression()
        } else {
            Compression::UNCOMPRESSED
        };

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| ProcessingError::InvalidFormat(format!("Invalid {} column", name)))
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "File size: {:.2} MB\nTotal rows: {}\nRow groups: {}\nCompression: {:?}\nAvg rows per group: {:.0}",
            self.file_size as f64 / 1_048_576.0,
            self.total_rows,
            self.row_groups,
            self.compression,
            if self.row_groups > 0 {
                self.total_rows as f64 / self.row_groups as f64
            } else {
                0.0
            }
        )
    }
}
