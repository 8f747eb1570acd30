// mysql_exporter top level errors
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::collector::ConfigError;
use crate::source::SourceError;
use thiserror::Error;

/// Errors surfaced by the exporter binary.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Returned when a CLI override fails a scraper's own validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Returned when the data source cannot be reached or queried.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Returned when connecting the MySQL pool fails.
    #[error("failed to connect to data source: {0}")]
    Connect(#[source] sqlx::Error),

    /// Returned when writing samples fails.
    #[error("std::io::Error")]
    Io(#[from] std::io::Error),

    /// Returned when persisting the output file fails.
    #[error("failed to persist output file")]
    Persist(#[from] tempfile::PersistError),
}
