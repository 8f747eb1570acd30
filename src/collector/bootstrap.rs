// Scraper bootstrap.
//
// Every known scraper is constructed and registered here, in one fixed,
// auditable order, before the exporter starts serving. There is no
// deferred self-registration; adding a collector means adding a line to
// register_all.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    Heartbeat,
    ScraperRegistry,
};
use std::sync::Arc;
use tracing::debug;

/// Registers every known scraper with its compiled-in default
/// enablement, applying each scraper's declared argument defaults.
///
/// # Panics
///
/// Panics when a scraper's own defaults fail its own validation or when
/// two scrapers share a name. Both are build defects surfaced at process
/// start.
pub fn register_all(registry: &ScraperRegistry) {
    debug!("Registering all scrapers");

    registry.must_register_with_defaults(Arc::new(Heartbeat::new()), false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_known_scrapers() {
        let registry = ScraperRegistry::new();
        register_all(&registry);

        let names: Vec<&str> =
            registry.all().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["heartbeat"]);

        // Heartbeat ships disabled; operators opt in per flag.
        assert!(!registry.is_enabled("heartbeat"));
    }

    #[test]
    fn bootstrap_is_single_shot() {
        // Running the bootstrap twice against the same registry is a
        // duplicate registration and must panic loudly.
        let registry = ScraperRegistry::new();
        register_all(&registry);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            register_all(&registry)
        }));
        assert!(res.is_err());
    }
}
