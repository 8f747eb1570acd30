// exporter: Scrape-cycle driver.
//
// One cycle fetches the enabled scraper set from the registry and runs
// every scraper concurrently against the shared source, bounded by the
// cycle budget. A failing scraper is reported through the meta samples
// and never aborts the others.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::collector::{
    ScrapeError,
    ScraperRegistry,
};
use crate::metric::{
    Desc,
    Metric,
};
use crate::source::{
    DataSource,
    SourceError,
};
use std::sync::Arc;
use std::time::{
    Duration,
    Instant,
};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{
    debug,
    error,
    info,
};

/// Duration of a collector scrape.
pub static COLLECTOR_DURATION_DESC: Desc = Desc {
    name: "mysql_exporter_collector_duration_seconds",
    help: "Collector time duration.",
    labels: &["collector"],
};

/// Whether a collector scrape succeeded.
pub static COLLECTOR_SUCCESS_DESC: Desc = Desc {
    name: "mysql_exporter_collector_success",
    help: "Whether the collector succeeded.",
    labels: &["collector"],
};

/// Drives scrape cycles against one data source.
pub struct Exporter {
    registry: Arc<ScraperRegistry>,
    source: Arc<dyn DataSource>,
    timeout: Duration,
}

impl Exporter {
    /// Returns a new driver. `timeout` is the per-scraper budget within
    /// one cycle.
    pub fn new(
        registry: Arc<ScraperRegistry>,
        source: Arc<dyn DataSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            source,
            timeout,
        }
    }

    /// Runs one scrape cycle, delivering samples and per-collector meta
    /// samples to `tx`.
    ///
    /// Scrapers requiring a newer server than the detected version are
    /// skipped. Individual scrape failures are absorbed into the success
    /// meta sample; only failure to reach the server at all is an error.
    pub async fn scrape_cycle(
        &self,
        tx: &mpsc::Sender<Metric>,
    ) -> Result<(), SourceError> {
        let server_version = self.source.server_version().await?;
        debug!("Detected server version: {server_version}");

        let mut tasks = JoinSet::new();

        for scraper in self.registry.enabled_scrapers() {
            if scraper.version() > server_version {
                info!(
                    "Skipping scraper '{}': requires MySQL >= {}, server is {}",
                    scraper.name(),
                    scraper.version(),
                    server_version,
                );
                continue;
            }

            let source = Arc::clone(&self.source);
            let tx = tx.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                let name = scraper.name();
                let start = Instant::now();

                let res = match tokio::time::timeout(
                    timeout,
                    scraper.scrape(&*source, &tx),
                )
                .await
                {
                    Ok(res) => res,
                    Err(_) => Err(ScrapeError::Timeout),
                };

                let duration = start.elapsed().as_secs_f64();

                let success = match res {
                    Ok(()) => {
                        debug!("Scraper '{name}' finished in {duration}s");
                        1.0
                    },
                    Err(e) => {
                        error!("Scraper '{name}' failed: {e}");
                        0.0
                    },
                };

                // Meta samples for the cycle driver itself. Send failures
                // here mean the consumer is gone and the cycle result no
                // longer matters.
                let _ = tx
                    .send(Metric::gauge(
                        &COLLECTOR_DURATION_DESC,
                        duration,
                        vec![name.to_owned()],
                    ))
                    .await;
                let _ = tx
                    .send(Metric::gauge(
                        &COLLECTOR_SUCCESS_DESC,
                        success,
                        vec![name.to_owned()],
                    ))
                    .await;
            });
        }

        while tasks.join_next().await.is_some() {}

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::register_all;
    use crate::source::Row;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    // Serves a canned version string, heartbeat rows and an optional
    // per-query delay.
    struct MockSource {
        version: &'static str,
        rows: Vec<Row>,
        delay: Option<Duration>,
    }

    impl MockSource {
        fn with_rows(rows: Vec<Row>) -> Self {
            Self {
                version: "8.0.32",
                rows,
                delay: None,
            }
        }
    }

    #[async_trait]
    impl DataSource for MockSource {
        async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError> {
            if sql == "SELECT VERSION()" {
                return Ok(vec![Row::new(vec![Some(self.version.into())])]);
            }

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            Ok(self.rows.clone())
        }
    }

    fn heartbeat_registry() -> Arc<ScraperRegistry> {
        let registry = Arc::new(ScraperRegistry::new());
        register_all(&registry);
        registry.set_enabled("heartbeat", true);
        registry
    }

    async fn drain(mut rx: mpsc::Receiver<Metric>) -> Vec<Metric> {
        let mut metrics = Vec::new();
        while let Some(metric) = rx.recv().await {
            metrics.push(metric);
        }
        metrics
    }

    #[tokio::test]
    async fn cycle_delivers_samples_and_meta() {
        let source = Arc::new(MockSource::with_rows(vec![Row::new(vec![
            Some("100.5".into()),
            Some("200.75".into()),
            Some("7".into()),
        ])]));

        let exporter = Exporter::new(
            heartbeat_registry(),
            source,
            Duration::from_secs(5),
        );

        let (tx, rx) = mpsc::channel(64);
        exporter.scrape_cycle(&tx).await.unwrap();
        drop(tx);

        let metrics = drain(rx).await;

        // Two heartbeat gauges plus duration and success.
        assert_eq!(metrics.len(), 4);

        let success = metrics
            .iter()
            .find(|m| m.desc == &COLLECTOR_SUCCESS_DESC)
            .expect("success meta sample");
        assert_eq!(success.value, 1.0);
        assert_eq!(success.label_values, vec!["heartbeat".to_string()]);
    }

    #[tokio::test]
    async fn cycle_reports_scraper_failure() {
        // A non-numeric stored timestamp fails the scrape.
        let source = Arc::new(MockSource::with_rows(vec![Row::new(vec![
            Some("junk".into()),
            Some("200.75".into()),
            Some("7".into()),
        ])]));

        let exporter = Exporter::new(
            heartbeat_registry(),
            source,
            Duration::from_secs(5),
        );

        let (tx, rx) = mpsc::channel(64);
        exporter.scrape_cycle(&tx).await.unwrap();
        drop(tx);

        let metrics = drain(rx).await;
        let success = metrics
            .iter()
            .find(|m| m.desc == &COLLECTOR_SUCCESS_DESC)
            .expect("success meta sample");
        assert_eq!(success.value, 0.0);
    }

    #[tokio::test]
    async fn cycle_cancels_overrunning_scraper() {
        let source = Arc::new(MockSource {
            version: "8.0.32",
            rows: vec![],
            delay: Some(Duration::from_secs(30)),
        });

        let exporter = Exporter::new(
            heartbeat_registry(),
            source,
            Duration::from_millis(50),
        );

        let (tx, rx) = mpsc::channel(64);

        // The cycle must come back within the budget, not after the
        // mock's 30s sleep, and report the scraper as failed.
        let start = Instant::now();
        exporter.scrape_cycle(&tx).await.unwrap();
        drop(tx);
        assert!(start.elapsed() < Duration::from_secs(5));

        let metrics = drain(rx).await;
        let success = metrics
            .iter()
            .find(|m| m.desc == &COLLECTOR_SUCCESS_DESC)
            .expect("success meta sample");
        assert_eq!(success.value, 0.0);
    }

    #[tokio::test]
    async fn cycle_skips_scrapers_newer_than_server() {
        let source = Arc::new(MockSource {
            version: "5.0.96",
            rows: vec![],
            delay: None,
        });

        // Heartbeat needs 5.1; a 5.0 server gets no samples at all.
        let exporter = Exporter::new(
            heartbeat_registry(),
            source,
            Duration::from_secs(5),
        );

        let (tx, rx) = mpsc::channel(64);
        exporter.scrape_cycle(&tx).await.unwrap();
        drop(tx);

        let metrics = drain(rx).await;
        assert!(metrics.is_empty());
    }

    #[tokio::test]
    async fn cycle_skips_disabled_scrapers() {
        let source = Arc::new(MockSource::with_rows(vec![]));
        let registry = Arc::new(ScraperRegistry::new());
        register_all(&registry);

        // heartbeat stays disabled.
        let exporter =
            Exporter::new(registry, source, Duration::from_secs(5));

        let (tx, rx) = mpsc::channel(64);
        exporter.scrape_cycle(&tx).await.unwrap();
        drop(tx);

        let metrics = drain(rx).await;
        assert!(metrics.is_empty());
    }
}
