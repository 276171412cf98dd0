// src/main.rs
use bsm_structure::cli::Args;
use bsm_structure::config::{Config, load_organizations};
use bsm_structure::data_fetcher::api::create_http_client_with_timeout;
use bsm_structure::error::AppError;
use bsm_structure::logging::setup_logging;
use bsm_structure::output::write_snapshot;
use bsm_structure::snapshot::{SnapshotOptions, build_snapshot};
use clap::Parser;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let year = args.resolve_year();

    let config = Config::load().await?;

    // The guard must be kept alive for the duration of the program
    let (log_file_path, _guard) = setup_logging(&config).await?;
    info!("Logs are being written to: {log_file_path}");

    info!("BSM structure extractor {}", bsm_structure::VERSION);
    info!("Year: {year}");
    info!(
        "Max attempts: {}, retry delay: {}s, request delay: {}s, timeout: {}s",
        config.max_attempts,
        config.retry_delay_seconds,
        config.request_delay_seconds,
        config.http_timeout_seconds
    );

    // Fail before any network activity if the mapping is unusable
    let organizations = load_organizations(&config.organizations_path).await?;

    let client =
        create_http_client_with_timeout(Duration::from_secs(config.http_timeout_seconds))?;
    let options = SnapshotOptions::from(&config);
    let snapshot = build_snapshot(&client, &options, &organizations, year).await;

    let output_file = write_snapshot(&snapshot, &config.output_dir).await?;
    info!("Finished, snapshot at {}", output_file.display());

    Ok(())
}
