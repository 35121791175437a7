use crate::analyzers::{StationLocator, TrendAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::{ParallelProcessor, ProcessingSummary};
use crate::readers::prune_irrelevant;
use crate::utils::progress::ProgressReporter;
use crate::utils::{generate_default_parquet_filename, skip_report_path, ProcessingConfig};
use crate::writers::ParquetWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Process {
            input_dir,
            output_file,
            compression,
            max_workers,
            min_raw_rows,
            use_mmap,
        } => {
            let config = ProcessingConfig::load(cli.config.as_deref())?.with_overrides(
                max_workers,
                min_raw_rows,
                compression,
                use_mmap,
            )?;
            let output_file = output_file.unwrap_or_else(generate_default_parquet_filename);

            println!("Analyzing station files...");
            println!("Input directory: {}", input_dir.display());
            println!("Output file: {}", output_file.display());
            println!(
                "Workers: {}, Minimum raw rows: {}",
                config.max_workers, config.min_raw_rows
            );
            info!(?config, "resolved configuration");

            // Station analysis is CPU-bound; keep it off the async runtime
            let processor = ParallelProcessor::from_config(&config);
            let summary = tokio::task::spawn_blocking(move || {
                let progress = ProgressReporter::new(0, "Analyzing stations...", false);
                processor.process_directory(&input_dir, Some(&progress))
            })
            .await??;

            println!("\n{}", summary.summary());

            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let writer = ParquetWriter::new().with_compression(&config.compression)?;
            let (rows, report_path) = write_results(&writer, &summary, &output_file)?;

            if rows == 0 {
                println!("No analyzed stations to write");
            } else {
                let file_info = writer.get_file_info(&output_file)?;
                println!("\n{}", file_info.summary());
            }

            if let Some(report_path) = report_path {
                println!("Skip report: {}", report_path.display());
            }

            println!("Processing complete!");
        }

        Commands::Prune { input_dir, dry_run } => {
            println!("Checking station files in {}", input_dir.display());
            let removed = prune_irrelevant(&input_dir, dry_run)?;

            if dry_run {
                println!("{} files would be removed.", removed);
            } else {
                println!("{} files removed.", removed);
            }
        }

        Commands::Nearest { file, lat, lon } => {
            let spinner = ProgressReporter::new_spinner("Loading station results...", false);
            let stations = ParquetWriter::new().read_stations(&file)?;
            spinner.finish_with_message(&format!("Loaded {} stations", stations.len()));

            let locator = StationLocator::new(stations);
            info!(stations = locator.len(), lat, lon, "searching nearest station");

            match locator.nearest_with_distance(lat, lon) {
                Some((station, distance)) => {
                    println!(
                        "Nearest station: {} at {} ({:.3}° away)",
                        station.name(),
                        station.coordinates(),
                        distance
                    );
                    if let Some(fit) = station.statistics() {
                        println!(
                            "Trend: {:+.3}°C/decade (intercept {:.3}, r² {:.3})",
                            fit.slope_per_decade(),
                            fit.intercept,
                            fit.r_squared
                        );
                    }
                    if let Some((first, last)) = station.year_range() {
                        println!("Years: {} - {}", first, last);
                        if let Some(fit) = station.statistics() {
                            println!(
                                "Fitted mean: {:.2}°C in {} -> {:.2}°C in {}",
                                fit.predict(first as f64),
                                first,
                                fit.predict(last as f64),
                                last
                            );
                        }
                    }
                }
                None => {
                    warn!(file = %file.display(), "no stations in results file");
                    println!("No stations found in {}", file.display());
                }
            }
        }

        Commands::Info { file, sample } => {
            println!("Analyzing results file: {}", file.display());

            let spinner = ProgressReporter::new_spinner("Loading station results...", false);
            let writer = ParquetWriter::new();
            let file_info = writer.get_file_info(&file)?;
            let stations = writer.read_stations(&file)?;
            spinner.finish_with_message(&format!("Loaded {} stations", stations.len()));

            let summary = TrendAnalyzer::new().summarize(&stations);
            println!("\n{}", summary.detailed_summary());

            println!("File Details:");
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Stations (showing up to {}):", sample);
                for (i, station) in stations.iter().take(sample).enumerate() {
                    let Some(fit) = station.statistics() else {
                        continue;
                    };
                    let years = station.temperatures().map_or(0, |t| t.len());
                    println!(
                        "{}. {} at {}: {:+.3}°C/decade, r²={:.3}, {} years",
                        i + 1,
                        station.name(),
                        station.coordinates(),
                        fit.slope_per_decade(),
                        fit.r_squared,
                        years
                    );
                }
            }
        }
    }

    Ok(())
}

/// Write the results table and skip report for one run.
///
/// Files left at these paths by an earlier run are removed when this run has
/// nothing to put in them. Returns the rows written and the report path.
fn write_results(
    writer: &ParquetWriter,
    summary: &ProcessingSummary,
    output_file: &Path,
) -> Result<(usize, Option<PathBuf>)> {
    let rows = writer.write_stations(&summary.stations, output_file)?;
    if rows == 0 {
        remove_stale(output_file)?;
    }

    let report_path = skip_report_path(output_file);
    if summary.skipped.is_empty() {
        remove_stale(&report_path)?;
        return Ok((rows, None));
    }

    std::fs::write(&report_path, serde_json::to_string_pretty(&summary.skipped)?)?;
    Ok((rows, Some(report_path)))
}

fn remove_stale(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            warn!(path = %path.display(), "removed results from an earlier run");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
