// Scraper registry.
//
// Single source of truth for which collectors exist, whether they are
// enabled and which CLI flags they bind. Registration happens once,
// before scraping starts; at steady state only the enabled flag is read
// or written under the lock.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    default_args,
    flags_for_scraper,
    Scraper,
    ScraperFlag,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while registering scrapers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A scraper with the same name is already registered.
    #[error("scraper with name {0} is already registered")]
    Duplicate(&'static str),
}

// One registry slot. Never handed out directly; the accessor functions
// below are the only way at the entry state.
struct ScraperEntry {
    enabled: bool,
    flags: HashMap<String, ScraperFlag>,
    scraper: Arc<dyn Scraper>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<&'static str, ScraperEntry>,
    // Registration order, so flag union collisions resolve
    // deterministically as later-registration-wins.
    order: Vec<&'static str>,
}

/// Process-wide table of registered scrapers.
///
/// Constructed once at start-up and passed by reference to every
/// consumer. One lock guards mutation and enabled-flag access; each
/// scraper's private configuration has its own lock and is independent
/// of this one.
#[derive(Default)]
pub struct ScraperRegistry {
    inner: Mutex<Inner>,
}

impl ScraperRegistry {
    /// Returns a new, empty registry.
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a new scraper under its unique name.
    ///
    /// A duplicate name is a registration error; the existing entry is
    /// left untouched.
    pub fn register(
        &self,
        scraper: Arc<dyn Scraper>,
        enabled: bool,
    ) -> Result<(), RegistryError> {
        let name = scraper.name();
        debug!("Registering scraper: {name}");

        let mut inner = self.inner.lock();

        if inner.entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }

        let flags = flags_for_scraper(scraper.as_ref(), enabled);

        inner.entries.insert(name, ScraperEntry {
            enabled,
            flags,
            scraper,
        });
        inner.order.push(name);

        Ok(())
    }

    /// Bootstrap convenience: applies the scraper's own declared defaults
    /// through its Configurable capability, then registers it.
    ///
    /// # Panics
    ///
    /// Panics if the defaults fail the scraper's own validation or if the
    /// name is already taken. Both are programming defects: declared
    /// defaults must always validate, and names are assigned at compile
    /// time.
    pub fn must_register_with_defaults(
        &self,
        scraper: Arc<dyn Scraper>,
        enabled: bool,
    ) {
        if let Some(configurable) = scraper.as_configurable() {
            let defaults = default_args(configurable.arg_definitions());

            if let Err(e) = configurable.configure(&defaults) {
                panic!("bug: {e}");
            }
        }

        if let Err(e) = self.register(scraper, enabled) {
            panic!("bug: {e}");
        }
    }

    /// Returns the named scraper, if registered.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Scraper>> {
        let inner = self.inner.lock();

        inner.entries.get(name).map(|entry| Arc::clone(&entry.scraper))
    }

    /// Snapshot of every registered scraper, in registration order.
    pub fn all(&self) -> Vec<Arc<dyn Scraper>> {
        let inner = self.inner.lock();

        inner
            .order
            .iter()
            .map(|name| Arc::clone(&inner.entries[name].scraper))
            .collect()
    }

    /// Snapshot of every scraper whose registry flag is enabled, in
    /// registration order.
    pub fn enabled_scrapers(&self) -> Vec<Arc<dyn Scraper>> {
        let inner = self.inner.lock();

        inner
            .order
            .iter()
            .map(|name| &inner.entries[name])
            .filter(|entry| entry.enabled)
            .map(|entry| Arc::clone(&entry.scraper))
            .collect()
    }

    /// Whether the named scraper is enabled. Unknown names read as
    /// disabled.
    pub fn is_enabled(&self, name: &str) -> bool {
        let inner = self.inner.lock();

        inner.entries.get(name).map(|e| e.enabled).unwrap_or(false)
    }

    /// Sets the enabled flag of the named scraper. A no-op for unknown
    /// names.
    pub fn set_enabled(&self, name: &str, enabled: bool) {
        debug!("Setting scraper {name} enabled: {enabled}");

        let mut inner = self.inner.lock();

        if let Some(entry) = inner.entries.get_mut(name) {
            entry.enabled = enabled;
        }
    }

    /// Unions every scraper's flag bindings into one mapping.
    ///
    /// Flag names are expected to be globally unique; on a collision the
    /// later registration silently wins.
    pub fn all_flags(&self) -> HashMap<String, ScraperFlag> {
        let inner = self.inner.lock();

        let mut flags = HashMap::new();
        for name in &inner.order {
            for (flag_name, flag) in &inner.entries[name].flags {
                flags.insert(flag_name.clone(), flag.clone());
            }
        }

        flags
    }
}
