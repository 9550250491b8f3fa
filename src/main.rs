use clap::{Parser, Subcommand};
use hubber_diff::commands::{CommandError, CompareOutcome, DownloadOutcome, compare_latest, download};
use hubber_diff::config::{AppConfig, load_config};
use hubber_diff::notifier::TracingSink;
use hubber_diff::scraper::HttpFeedSource;
use hubber_diff::storage::{FsStorage, exports};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hubber-diff")]
#[command(about = "Download catalog export snapshots and compare the latest two")]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download the offers feed if it changed since the latest stored export.
    Download,
    /// Compare the two latest stored exports.
    CompareLatest,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let storage = FsStorage::new(&config.storage_root);

    let result = match cli.command {
        Commands::Download => run_download(&config, &storage).await,
        Commands::CompareLatest => run_compare(&config, &storage),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let CommandError::Fetch(fetch) = &e {
                error!("Feed request failed (retryable: {}): {}", fetch.is_retryable(), fetch);
            } else {
                error!("{}", e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run_download(config: &AppConfig, storage: &FsStorage) -> Result<(), CommandError> {
    let url = config
        .offers_url
        .as_deref()
        .ok_or(CommandError::MissingOffersUrl)?;
    let source = HttpFeedSource::new(url, config.request_timeout(), &config.user_agent)?;
    info!("Checking feed {} for updates...", source.url());

    match download(&source, storage, &config.exports_folder).await? {
        DownloadOutcome::UpToDate { .. } => info!("Nothing to download. Exiting..."),
        DownloadOutcome::Saved { path } => info!("Snapshot stored at {}", path),
    }
    Ok(())
}

fn run_compare(config: &AppConfig, storage: &FsStorage) -> Result<(), CommandError> {
    info!("Comparing latest exports in {}", storage.root().join(&config.exports_folder).display());
    let outcome = compare_latest(storage, &config.exports_folder, exports::latest_two, &TracingSink)?;
    if let CompareOutcome::Compared { report, .. } = outcome {
        if report.is_empty() {
            info!("No differences between the latest two exports");
        }
    }
    Ok(())
}
