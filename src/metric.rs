// metric: Sample types delivered by scrapers over the metric channel.
//
// The wire encoder lives outside this crate; a scrape only produces
// momentary samples referencing a static descriptor.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use std::fmt;

/// Describes a time series: fully qualified name, help text and the label
/// names every sample must provide values for.
///
/// Descriptors are declared `static` next to the scraper that emits them.
#[derive(Debug, PartialEq)]
pub struct Desc {
    /// Fully qualified metric name, e.g. `mysql_heartbeat_now_timestamp_seconds`.
    pub name: &'static str,
    /// Help text for the metric.
    pub help: &'static str,
    /// Ordered label names.
    pub labels: &'static [&'static str],
}

/// The kind of sample being emitted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    /// A value that can go up and down.
    Gauge,
    /// A monotonically increasing value.
    Counter,
    /// A value of unknown kind.
    Untyped,
}

/// One sample: a descriptor reference, a kind, a value and the label
/// values matching the descriptor's label names.
#[derive(Debug, PartialEq)]
pub struct Metric {
    /// Descriptor this sample belongs to.
    pub desc: &'static Desc,
    /// Sample kind.
    pub kind: ValueKind,
    /// Sample value.
    pub value: f64,
    /// Label values, in the descriptor's label order.
    pub label_values: Vec<String>,
}

impl Metric {
    /// Returns a new gauge sample for the given descriptor.
    pub fn gauge(desc: &'static Desc, value: f64, label_values: Vec<String>) -> Self {
        Self {
            desc,
            kind: ValueKind::Gauge,
            value,
            label_values,
        }
    }
}

// Renders a sample in the text exposition style, used by the file writer.
impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.desc.name)?;

        if !self.label_values.is_empty() {
            let labels = self
                .desc
                .labels
                .iter()
                .zip(&self.label_values)
                .map(|(name, value)| format!("{name}=\"{value}\""))
                .collect::<Vec<_>>()
                .join(",");

            write!(f, "{{{labels}}}")?;
        }

        write!(f, " {}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    static TEST_DESC: Desc = Desc {
        name: "mysql_test_timestamp_seconds",
        help: "A test metric.",
        labels: &["server_id"],
    };

    static PLAIN_DESC: Desc = Desc {
        name: "mysql_test_total",
        help: "A label free test metric.",
        labels: &[],
    };

    #[test]
    fn gauge_sample() {
        let metric = Metric::gauge(&TEST_DESC, 42.5, vec!["7".into()]);

        assert_eq!(metric.kind, ValueKind::Gauge);
        assert_eq!(metric.value, 42.5);
        assert_eq!(metric.label_values, vec!["7".to_string()]);
    }

    #[test]
    fn display_with_labels() {
        let metric = Metric::gauge(&TEST_DESC, 200.75, vec!["7".into()]);

        assert_eq!(
            metric.to_string(),
            "mysql_test_timestamp_seconds{server_id=\"7\"} 200.75",
        );
    }

    #[test]
    fn display_without_labels() {
        let metric = Metric::gauge(&PLAIN_DESC, 3.0, vec![]);

        assert_eq!(metric.to_string(), "mysql_test_total 3");
    }
}
