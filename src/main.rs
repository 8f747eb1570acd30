//
// mysql_exporter
//
// An exporter for Prometheus, exporting MySQL server metrics gathered
// by a registry of scrapers.
//
#![forbid(unsafe_code)]
use mysql_exporter::cli;
use mysql_exporter::collector::{
    register_all,
    ScraperRegistry,
};
use mysql_exporter::errors::ExporterError;
use mysql_exporter::exporter::Exporter;
use mysql_exporter::file::{
    FileExporter,
    FileExporterOutput,
};
use mysql_exporter::metric::Metric;
use mysql_exporter::source::MySqlSource;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{
    debug,
    info,
};
use tracing_subscriber::EnvFilter;

// Sized for a cycle's burst of samples; producers block once the writer
// falls behind.
const METRIC_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<(), ExporterError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!(
        "Starting {} {}, built with rustc {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("RUSTC_VERSION"),
    );

    // The registry must exist before the CLI: scraper flags derive from
    // its entries.
    let registry = Arc::new(ScraperRegistry::new());
    register_all(&registry);

    let matches = cli::parse_args(&registry);
    cli::apply_scraper_flags(&matches, &registry)?;

    // Unwraps are fine, clap enforced presence and defaults.
    let dsn = matches.get_one::<String>("DSN").expect("dsn is required");
    let output = matches
        .get_one::<FileExporterOutput>("OUTPUT_FILE_PATH")
        .expect("output has a default")
        .clone();
    let interval = *matches
        .get_one::<Duration>("SCRAPE_INTERVAL")
        .expect("interval has a default");
    let timeout = *matches
        .get_one::<Duration>("SCRAPE_TIMEOUT")
        .expect("timeout has a default");

    // Connection lifecycle lives here; the scrapers only ever see the
    // shared handle.
    debug!("Connecting to data source");
    let pool = MySqlPoolOptions::new()
        .max_connections(3)
        .connect(dsn)
        .await
        .map_err(ExporterError::Connect)?;

    let source = Arc::new(MySqlSource::new(pool));
    let exporter = Exporter::new(registry, source, timeout);
    let writer = FileExporter::new(output);

    info!("Scraping every {interval:?}");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&exporter, &writer).await;
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            },
        }
    }

    Ok(())
}

// One scrape cycle: drive the scrapers, drain their samples, write them
// out. Failures are logged and the next tick tries again.
async fn run_cycle(exporter: &Exporter, writer: &FileExporter) {
    let (tx, mut rx) = mpsc::channel::<Metric>(METRIC_CHANNEL_CAPACITY);

    let drain = tokio::spawn(async move {
        let mut metrics = Vec::new();
        while let Some(metric) = rx.recv().await {
            metrics.push(metric);
        }
        metrics
    });

    let res = exporter.scrape_cycle(&tx).await;
    drop(tx);

    match res {
        Ok(()) => {
            let metrics = drain.await.expect("drain task not to panic");

            if let Err(e) = writer.export(&metrics) {
                tracing::error!("Failed to write samples: {e}");
            }
        },
        Err(e) => {
            tracing::error!("Scrape cycle failed: {e}");
        },
    }
}
