//! mysql_exporter library
//!
//! A pluggable scraper framework for exporting MySQL server metrics:
//! a registry of independently enabled, independently configurable
//! collectors, each querying the server and emitting samples onto a
//! shared channel.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Command line interface parsing.
pub mod cli;

/// Scraper contract, registry and the collectors themselves.
pub mod collector;

/// Top level errors.
pub mod errors;

/// Scrape-cycle driver.
pub mod exporter;

/// Sample writer for files and stdout.
pub mod file;

/// Sample and descriptor types.
pub mod metric;

/// Database access seam.
pub mod source;
