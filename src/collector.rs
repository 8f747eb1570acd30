// collector: Scraper capability contract and the pieces around it.
//
// Every collector implements Scraper; collectors that accept runtime
// configuration additionally implement Configurable. The two are checked
// separately: the registry probes for Configurable at registration time
// via as_configurable.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::metric::Metric;
use crate::source::{
    DataSource,
    SourceError,
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

mod args;
pub use args::{
    default_args,
    Arg,
    ArgDef,
    ArgKind,
    ArgValue,
};

mod flags;
pub use flags::{
    flags_for_scraper,
    FlagKind,
    ScraperFlag,
};

mod registry;
pub use registry::{
    RegistryError,
    ScraperRegistry,
};

mod bootstrap;
pub use bootstrap::register_all;

mod heartbeat;
pub use heartbeat::{
    Heartbeat,
    HEARTBEAT_NOW_DESC,
    HEARTBEAT_STORED_DESC,
};

/// Errors returned by [`Configurable::configure`].
///
/// Neither variant is retried: a wrong type or unknown name signals a bad
/// override, which the caller surfaces to the operator.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The supplied value's variant tag does not match the declared
    /// default's tag.
    #[error("wrong type for arg '{arg}' of scraper '{scraper}'")]
    WrongArgType {
        /// Scraper the argument was applied to.
        scraper: &'static str,
        /// Offending argument name.
        arg: String,
    },

    /// The argument name is not declared by the scraper.
    #[error("unknown arg '{arg}' for scraper '{scraper}'")]
    UnknownArg {
        /// Scraper the argument was applied to.
        scraper: &'static str,
        /// Offending argument name.
        arg: String,
    },
}

/// Errors returned by [`Scraper::scrape`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The backing query or row decode failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A column value failed numeric parsing.
    #[error("'{value}' in column '{column}' is not parsable as a number")]
    ParseValue {
        /// Column the value came from.
        column: &'static str,
        /// The raw value.
        value: String,
    },

    /// A required column was missing or NULL.
    #[error("missing column '{0}' in result row")]
    MissingColumn(&'static str),

    /// The sample consumer went away.
    #[error("metric channel closed")]
    ChannelClosed,

    /// The scrape exceeded its cycle deadline and was cancelled.
    #[error("scrape cancelled: deadline exceeded")]
    Timeout,
}

/// The mandatory capability set of a collector plugin.
///
/// A scraper is bounded by its caller's deadline: the scrape future is
/// dropped when the cycle budget runs out, which aborts the backing
/// query. Samples already delivered to the channel stay valid; there is
/// no rollback on error.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Stable unique identifier of the scraper.
    fn name(&self) -> &'static str;

    /// Describes the role of the scraper.
    fn help(&self) -> &'static str;

    /// Minimum MySQL version the scraper supports. Compared against the
    /// detected server version by the scrape-cycle driver.
    fn version(&self) -> f64;

    /// Whether the scraper itself is currently enabled. The registry
    /// level flag is authoritative at scrape time; this one normally
    /// tracks it.
    fn enabled(&self) -> bool;

    /// Enables or disables the scraper.
    fn set_enabled(&self, enabled: bool);

    /// Snapshot of the scraper's current argument values.
    fn args(&self) -> Vec<Arg>;

    /// Returns the scraper's Configurable capability, if it has one.
    fn as_configurable(&self) -> Option<&dyn Configurable> {
        None
    }

    /// Performs one scrape: query the source and deliver zero or more
    /// samples per row to `tx`. Returns promptly on the first query,
    /// decode or parse error; partial emission is acceptable.
    async fn scrape(
        &self,
        source: &dyn DataSource,
        tx: &mpsc::Sender<Metric>,
    ) -> Result<(), ScrapeError>;
}

/// Optional capability for argument-driven scrapers.
pub trait Configurable: Send + Sync {
    /// The ordered set of arguments the scraper declares.
    fn arg_definitions(&self) -> &'static [ArgDef];

    /// Applies the arguments in order, stopping at the first failure.
    /// Arguments applied before the failure remain applied.
    fn configure(&self, args: &[Arg]) -> Result<(), ConfigError>;
}
