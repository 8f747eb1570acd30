// Heartbeat scraper.
//
// Reads a heartbeat table as written by pt-heartbeat, or any other
// implementation writing two columns:
//
//   CREATE TABLE heartbeat (
//       ts        varchar(26) NOT NULL,
//       server_id int unsigned NOT NULL PRIMARY KEY
//   );
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    Arg,
    ArgDef,
    ArgValue,
    ConfigError,
    Configurable,
    ScrapeError,
    Scraper,
};
use crate::metric::{
    Desc,
    Metric,
};
use crate::source::DataSource;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::LazyLock;
use tokio::sync::mpsc;
use tracing::debug;

// Argument names.
const ARG_DATABASE: &str = "database";
const ARG_TABLE: &str = "table";
const ARG_UTC: &str = "utc";

// The second selected column gets the server timestamp at the exact same
// time the query runs.
const HEARTBEAT_QUERY: &str =
    "SELECT UNIX_TIMESTAMP(ts), UNIX_TIMESTAMP({now}), server_id FROM `{database}`.`{table}`";

static ARG_DEFS: LazyLock<Vec<ArgDef>> = LazyLock::new(|| {
    vec![
        ArgDef {
            name: ARG_DATABASE,
            help: "Database from where to collect heartbeat data",
            default: ArgValue::String("heartbeat".into()),
        },
        ArgDef {
            name: ARG_TABLE,
            help: "Table from where to collect heartbeat data",
            default: ArgValue::String("heartbeat".into()),
        },
        ArgDef {
            name: ARG_UTC,
            help: "Use UTC for timestamps of the current server \
                   (`pt-heartbeat` is called with `--utc`)",
            default: ArgValue::Bool(false),
        },
    ]
});

/// Timestamp stored in the heartbeat table.
pub static HEARTBEAT_STORED_DESC: Desc = Desc {
    name: "mysql_heartbeat_stored_timestamp_seconds",
    help: "Timestamp stored in the heartbeat table.",
    labels: &["server_id"],
};

/// Timestamp of the current server.
pub static HEARTBEAT_NOW_DESC: Desc = Desc {
    name: "mysql_heartbeat_now_timestamp_seconds",
    help: "Timestamp of the current server.",
    labels: &["server_id"],
};

// Private configuration, guarded by the scraper's own lock.
struct Config {
    database: String,
    table: String,
    utc: bool,
}

/// Scrapes stored and current timestamps from the heartbeat table.
pub struct Heartbeat {
    config: RwLock<Config>,
    enabled: AtomicBool,
}

impl Heartbeat {
    /// Returns a new heartbeat scraper. Argument values start empty;
    /// registration applies the declared defaults.
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config {
                database: String::new(),
                table: String::new(),
                utc: false,
            }),
            enabled: AtomicBool::new(false),
        }
    }
}

// Current timestamp expression for the query.
fn now_expr(utc: bool) -> &'static str {
    if utc {
        "UTC_TIMESTAMP(6)"
    }
    else {
        "NOW(6)"
    }
}

#[async_trait]
impl Scraper for Heartbeat {
    fn name(&self) -> &'static str {
        "heartbeat"
    }

    fn help(&self) -> &'static str {
        "Collect from heartbeat"
    }

    fn version(&self) -> f64 {
        5.1
    }

    fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn args(&self) -> Vec<Arg> {
        let config = self.config.read();

        vec![
            Arg::new(ARG_DATABASE, config.database.clone()),
            Arg::new(ARG_TABLE, config.table.clone()),
            Arg::new(ARG_UTC, config.utc),
        ]
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        Some(self)
    }

    async fn scrape(
        &self,
        source: &dyn DataSource,
        tx: &mpsc::Sender<Metric>,
    ) -> Result<(), ScrapeError> {
        let query = {
            let config = self.config.read();

            HEARTBEAT_QUERY
                .replace("{now}", now_expr(config.utc))
                .replace("{database}", &config.database)
                .replace("{table}", &config.table)
        };

        debug!("Scraping heartbeat");

        for row in source.query(&query).await? {
            let ts = row.get(0).ok_or(ScrapeError::MissingColumn("ts"))?;
            let now = row.get(1).ok_or(ScrapeError::MissingColumn("now"))?;
            let server_id =
                row.get(2).ok_or(ScrapeError::MissingColumn("server_id"))?;

            // Both timestamps parse before either sample goes out, so a
            // row is never partially emitted.
            let ts_val: f64 = ts.parse().map_err(|_| ScrapeError::ParseValue {
                column: "ts",
                value: ts.to_owned(),
            })?;

            let now_val: f64 = now.parse().map_err(|_| ScrapeError::ParseValue {
                column: "now",
                value: now.to_owned(),
            })?;

            let server_id: i64 =
                server_id.parse().map_err(|_| ScrapeError::ParseValue {
                    column: "server_id",
                    value: server_id.to_owned(),
                })?;
            let server_id = server_id.to_string();

            tx.send(Metric::gauge(
                &HEARTBEAT_NOW_DESC,
                now_val,
                vec![server_id.clone()],
            ))
            .await
            .map_err(|_| ScrapeError::ChannelClosed)?;

            tx.send(Metric::gauge(
                &HEARTBEAT_STORED_DESC,
                ts_val,
                vec![server_id],
            ))
            .await
            .map_err(|_| ScrapeError::ChannelClosed)?;
        }

        Ok(())
    }
}

impl Configurable for Heartbeat {
    fn arg_definitions(&self) -> &'static [ArgDef] {
        ARG_DEFS.as_slice()
    }

    fn configure(&self, args: &[Arg]) -> Result<(), ConfigError> {
        let mut config = self.config.write();

        for arg in args {
            match arg.name.as_str() {
                ARG_DATABASE => {
                    let database = arg.value.as_str().ok_or_else(|| {
                        ConfigError::WrongArgType {
                            scraper: self.name(),
                            arg: arg.name.clone(),
                        }
                    })?;
                    config.database = database.to_owned();
                },
                ARG_TABLE => {
                    let table = arg.value.as_str().ok_or_else(|| {
                        ConfigError::WrongArgType {
                            scraper: self.name(),
                            arg: arg.name.clone(),
                        }
                    })?;
                    config.table = table.to_owned();
                },
                ARG_UTC => {
                    let utc = arg.value.as_bool().ok_or_else(|| {
                        ConfigError::WrongArgType {
                            scraper: self.name(),
                            arg: arg.name.clone(),
                        }
                    })?;
                    config.utc = utc;
                },
                _ => {
                    return Err(ConfigError::UnknownArg {
                        scraper: self.name(),
                        arg: arg.name.clone(),
                    });
                },
            }
        }

        Ok(())
    }
}
