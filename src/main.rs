use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use store_listings::config::{Config, LogFormat};
use store_listings::pipeline::{ingest_document, normalize_stored};
use store_listings::report::{report_names, Report, DATABASE_REPORT};
use store_listings::storage::{ListingStore, SqliteStorage};

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; it decides the log format
    let config = Arc::new(Config::load()?);
    init_logging(config.log_format)?;

    info!("Starting store listing ingestion");

    if !config.has_work() {
        warn!("No inputs or database configured; set STORE_LISTINGS_INPUTS or STORE_LISTINGS_DATABASE");
        return Ok(());
    }

    // One blocking task per document; extraction shares no state
    let names = report_names(&config.inputs);
    let document_tasks = config.inputs.iter().cloned().zip(names).map(|(path, name)| {
        let config = config.clone();
        async move {
            let report = tokio::task::spawn_blocking(move || process_document(path))
                .await
                .context("Document task panicked")??;
            publish(&config, &report, &name)?;
            Ok::<(), anyhow::Error>(())
        }
    });

    let results = join_all(document_tasks).await;
    let failed = results
        .iter()
        .zip(&config.inputs)
        .filter_map(|(result, path)| result.as_ref().err().map(|e| (path, e)))
        .inspect(|(path, e)| error!("Failed to ingest {}: {:#}", path.display(), e))
        .count();

    if let Some(db_path) = &config.database {
        if let Err(e) = process_database(&config, db_path).await {
            error!("Failed to load listings from {}: {:#}", db_path.display(), e);
        }
    }

    info!(
        "Ingestion finished: {} documents, {} failed",
        config.inputs.len(),
        failed
    );
    Ok(())
}

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("store_listings=info".parse()?);

    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }
    Ok(())
}

fn process_document(path: PathBuf) -> Result<Report> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let extraction = ingest_document(&content)
        .with_context(|| format!("Could not extract listings from {}", path.display()))?;

    if extraction.listings.is_empty() {
        warn!("{} contains no listings", path.display());
    }

    Report::new(path.display().to_string(), extraction)
}

async fn process_database(config: &Config, db_path: &Path) -> Result<()> {
    let storage = SqliteStorage::open(db_path).await?;
    let records = storage.load_items().await?;
    let report = Report::new(db_path.display().to_string(), normalize_stored(records))?;
    publish(config, &report, DATABASE_REPORT)
}

fn publish(config: &Config, report: &Report, name: &str) -> Result<()> {
    match &config.output_dir {
        Some(dir) => {
            report.write_to(dir, name)?;
        }
        None => info!(
            "{}: {} listings, {} detail fields, fingerprint {}",
            report.source,
            report.listing_count,
            report.details.fields().count(),
            report.fingerprint
        ),
    }
    Ok(())
}
