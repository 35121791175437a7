use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "climate-trends")]
#[command(about = "Annual temperature trends for weather stations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, action = ArgAction::Count, help = "Increase log verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze every station file in a directory and write the results
    Process {
        #[arg(short, long, help = "Directory of station CSV files")]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: output/climate-trends-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long)]
        compression: Option<String>,

        #[arg(long)]
        max_workers: Option<usize>,

        #[arg(long, help = "Minimum raw rows for a file to be analyzed")]
        min_raw_rows: Option<usize>,

        #[arg(long, help = "Read station files through memory maps")]
        use_mmap: bool,
    },

    /// Remove station files that lack DATE, TMIN or TMAX columns
    Prune {
        #[arg(short, long, help = "Directory of station CSV files")]
        input_dir: PathBuf,

        #[arg(long, help = "Only count the files that would be removed")]
        dry_run: bool,
    },

    /// Find the station nearest to a coordinate
    Nearest {
        #[arg(short, long, help = "Results Parquet file")]
        file: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Display information about a results file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}
