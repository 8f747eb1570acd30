// CLI flag bindings derived from registered scrapers.
//
// The registry produces these; the cli module turns them into clap
// arguments and feeds explicit overrides back through the registry.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use super::{
    ArgValue,
    Scraper,
};
use std::collections::HashMap;

/// What a flag controls when parsed back.
#[derive(Clone, Debug, PartialEq)]
pub enum FlagKind {
    /// Toggles the scraper's registry-level enablement.
    Enable {
        /// Enablement at registration time.
        default: bool,
    },

    /// Overrides one declared argument.
    Arg {
        /// The argument name within the scraper.
        arg: &'static str,
        /// The argument's declared default.
        default: ArgValue,
    },
}

/// One CLI flag binding produced for a scraper.
#[derive(Clone, Debug, PartialEq)]
pub struct ScraperFlag {
    /// Flag name, globally unique by convention.
    pub name: String,
    /// Operator facing description.
    pub help: String,
    /// Owning scraper.
    pub scraper: &'static str,
    /// What the flag controls.
    pub kind: FlagKind,
}

// Flag names are derived deterministically from scraper and argument
// names, mirroring the collect.* namespace operators already know.
fn enable_flag_name(scraper: &str) -> String {
    format!("collect.{scraper}")
}

fn arg_flag_name(scraper: &str, arg: &str) -> String {
    format!("collect.{scraper}.{arg}")
}

/// Derives the full flag binding set for a scraper: one enable flag plus
/// one typed value flag per declared argument.
pub fn flags_for_scraper(
    scraper: &dyn Scraper,
    enabled: bool,
) -> HashMap<String, ScraperFlag> {
    let mut flags = HashMap::new();

    let name = enable_flag_name(scraper.name());
    flags.insert(name.clone(), ScraperFlag {
        name,
        help: scraper.help().to_owned(),
        scraper: scraper.name(),
        kind: FlagKind::Enable {
            default: enabled,
        },
    });

    if let Some(configurable) = scraper.as_configurable() {
        for def in configurable.arg_definitions() {
            let name = arg_flag_name(scraper.name(), def.name);

            flags.insert(name.clone(), ScraperFlag {
                name,
                help: def.help.to_owned(),
                scraper: scraper.name(),
                kind: FlagKind::Arg {
                    arg: def.name,
                    default: def.default.clone(),
                },
            });
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Heartbeat;
    use pretty_assertions::assert_eq;

    #[test]
    fn heartbeat_flag_names() {
        let scraper = Heartbeat::new();
        let flags = flags_for_scraper(&scraper, true);

        let mut names: Vec<&str> = flags.keys().map(String::as_str).collect();
        names.sort_unstable();

        let ok = vec![
            "collect.heartbeat",
            "collect.heartbeat.database",
            "collect.heartbeat.table",
            "collect.heartbeat.utc",
        ];
        assert_eq!(names, ok);
    }

    #[test]
    fn enable_flag_default() {
        let scraper = Heartbeat::new();
        let flags = flags_for_scraper(&scraper, false);

        let flag = &flags["collect.heartbeat"];
        assert_eq!(flag.scraper, "heartbeat");
        assert_eq!(flag.kind, FlagKind::Enable {
            default: false,
        });
    }

    #[test]
    fn arg_flag_carries_declared_default() {
        let scraper = Heartbeat::new();
        let flags = flags_for_scraper(&scraper, true);

        let flag = &flags["collect.heartbeat.utc"];
        assert_eq!(flag.kind, FlagKind::Arg {
            arg: "utc",
            default: ArgValue::Bool(false),
        });
    }
}
