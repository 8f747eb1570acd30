// file: Sample writer
//
// Stand-in for the exposition collaborator: renders the samples of one
// scrape cycle as text and writes them to stdout or, atomically, to a
// .prom file.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::errors::ExporterError;
use crate::metric::Metric;
use std::fmt;
use std::io::{
    self,
    Write,
};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::debug;

/// Where rendered samples go.
#[derive(Clone, Debug)]
pub enum FileExporterOutput {
    /// Persist to the given path.
    File(PathBuf),
    /// Write to standard output.
    Stdout,
}

impl fmt::Display for FileExporterOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::File(path) => {
                let path = path.to_str().expect("path to str");
                write!(f, "{path}")
            },
            Self::Stdout => write!(f, "-"),
        }
    }
}

/// Writes scrape-cycle samples to a file or stdout.
pub struct FileExporter {
    dest: FileExporterOutput,
}

impl FileExporter {
    /// Returns a new writer for the given destination.
    pub fn new(output: FileExporterOutput) -> Self {
        debug!("New FileExporter output to: {output}");

        Self {
            dest: output,
        }
    }

    // Renders one line per sample.
    fn render(metrics: &[Metric]) -> String {
        let mut out = String::new();

        for metric in metrics {
            out.push_str(&metric.to_string());
            out.push('\n');
        }

        out
    }

    // Handles choosing the correct output type based on path
    fn write(&self, metrics: &str) -> Result<(), ExporterError> {
        debug!("Writing metrics to: {}", self.dest);

        match &self.dest {
            FileExporterOutput::Stdout => {
                io::stdout().write_all(metrics.as_bytes())?;
            },
            FileExporterOutput::File(path) => {
                // We already vetted the parent in the CLI validator, so
                // unwrap here should be fine.
                let parent = path.parent().expect("path to have a parent");

                // We do this since we need the temporary file to be on
                // the same filesystem as the final persisted file.
                let mut file = NamedTempFile::new_in(parent)?;
                file.write_all(metrics.as_bytes())?;
                file.persist(path)?;
            },
        }

        Ok(())
    }

    /// Renders and writes the samples of one scrape cycle.
    pub fn export(&self, metrics: &[Metric]) -> Result<(), ExporterError> {
        debug!("Exporting {} samples", metrics.len());

        self.write(&Self::render(metrics))
    }
}
