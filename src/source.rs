// source: Database access seam consumed by scrapers.
//
// Scrapers never open or close connections; they are handed an already
// authenticated handle implementing DataSource. Rows surface their column
// values as raw text, which is how the MySQL text protocol delivers them
// and what the scrapers' own parsing expects.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use async_trait::async_trait;
use thiserror::Error;

mod mysql;
pub use mysql::MySqlSource;

/// Errors raised while querying a data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// A row could not be decoded.
    #[error("failed to decode row: {0}")]
    Decode(String),

    /// The reported server version was not parsable.
    #[error("'{0}' is not a parsable server version")]
    Version(String),
}

impl From<sqlx::Error> for SourceError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Decode(e.to_string())
            },
            _ => Self::Query(e.to_string()),
        }
    }
}

/// One result row, each column as its raw text representation.
///
/// `None` marks a SQL NULL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row(Vec<Option<String>>);

impl Row {
    /// Returns a new row from raw column values.
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Self(columns)
    }

    /// Returns the raw text of the given column, `None` if the column is
    /// NULL or out of range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|c| c.as_deref())
    }

    /// Number of columns in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An already-open relational handle supporting query execution and row
/// iteration. Implemented by [`MySqlSource`] in production and by mock
/// sources in tests.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Executes the query and returns every result row.
    ///
    /// Dropping the returned future aborts the in-flight query; callers
    /// bound scrapes with a deadline rather than an explicit context.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, SourceError>;

    /// Returns the backing server version as `major.minor`.
    async fn server_version(&self) -> Result<f64, SourceError> {
        let rows = self.query("SELECT VERSION()").await?;

        let version = rows
            .first()
            .and_then(|row| row.get(0))
            .ok_or_else(|| SourceError::Version("<empty>".into()))?;

        parse_version(version)
    }
}

// Parses a MySQL version string such as "8.0.32-debian" down to the
// major.minor float used for scraper version gating.
fn parse_version(version: &str) -> Result<f64, SourceError> {
    let mut parts = version.split('.');

    let major = parts.next().unwrap_or_default();
    let minor: String = parts
        .next()
        .unwrap_or("0")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    format!("{major}.{minor}")
        .parse()
        .map_err(|_| SourceError::Version(version.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn row_get() {
        let row = Row::new(vec![Some("100.5".into()), None, Some("7".into())]);

        assert_eq!(row.get(0), Some("100.5"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), Some("7"));
        assert_eq!(row.get(3), None);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn parse_version_plain() {
        let version = parse_version("8.0.32").unwrap();
        assert_eq!(version, 8.0);
    }

    #[test]
    fn parse_version_with_suffix() {
        let version = parse_version("10.11.6-MariaDB-log").unwrap();
        assert_eq!(version, 10.11);
    }

    #[test]
    fn parse_version_old() {
        let version = parse_version("5.1.73").unwrap();
        assert_eq!(version, 5.1);
    }

    #[test]
    fn parse_version_garbage() {
        let res = parse_version("not a version");
        assert!(res.is_err());
    }
}
