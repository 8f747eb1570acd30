// MySQL DataSource backed by an sqlx connection pool.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    DataSource,
    Row,
    SourceError,
};
use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use sqlx::{
    Executor,
    Row as _,
};
use tracing::debug;

/// A shared, already-authenticated MySQL handle.
///
/// Pool sizing and connection lifecycle belong to the caller constructing
/// the pool; this type only executes queries against it.
#[derive(Clone, Debug)]
pub struct MySqlSource {
    pool: MySqlPool,
}

impl MySqlSource {
    /// Returns a new source wrapping the given pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            pool,
        }
    }
}

#[async_trait]
impl DataSource for MySqlSource {
    async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError> {
        debug!("Executing query: {sql}");

        // Passing the statement as a plain string runs it over the text
        // protocol, so every column arrives as its text representation.
        let rows = self.pool.fetch_all(sql).await?;

        rows.iter()
            .map(|row| {
                let columns = (0..row.len())
                    .map(|i| row.try_get_unchecked::<Option<String>, _>(i))
                    .collect::<Result<_, _>>()?;

                Ok(Row::new(columns))
            })
            .collect()
    }
}
