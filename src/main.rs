use clap::Parser;
use climate_trends::cli::{run, Cli};
use climate_trends::error::Result;
use climate_trends::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli).await
}
