//! Inbox configuration, read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use federation_core::ResolverConfig;
use tracing::warn;

pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct InboxConfig {
    /// Listen address (`INBOX_ADDR`).
    pub addr: SocketAddr,
    /// Largest accepted request body in bytes (`INBOX_BODY_LIMIT`).
    pub body_limit: usize,
    /// Deadline for reading an inbox body (`INBOX_READ_TIMEOUT_SECS`).
    pub read_timeout: Duration,
    /// `INBOX_DEFAULT_LANGUAGE` and `INBOX_MAX_IDLE_MAPS`.
    pub resolver: ResolverConfig,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3210)),
            body_limit: DEFAULT_BODY_LIMIT,
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            resolver: ResolverConfig::default(),
        }
    }
}

impl InboxConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take the default; values that
    /// do not parse take the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read_timeout_secs = parsed(&lookup, "INBOX_READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS);

        Self {
            addr: parsed(&lookup, "INBOX_ADDR", defaults.addr),
            body_limit: parsed(&lookup, "INBOX_BODY_LIMIT", defaults.body_limit),
            read_timeout: Duration::from_secs(read_timeout_secs),
            resolver: ResolverConfig {
                default_language: lookup("INBOX_DEFAULT_LANGUAGE")
                    .filter(|tag| {
                        let valid = federation_core::normalize::is_language_tag(tag);
                        if !valid {
                            warn!("INBOX_DEFAULT_LANGUAGE={tag:?} is not a language tag, using default");
                        }
                        valid
                    })
                    .unwrap_or(defaults.resolver.default_language),
                max_idle_maps: parsed(&lookup, "INBOX_MAX_IDLE_MAPS", defaults.resolver.max_idle_maps),
            },
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("{key}={raw:?} is invalid, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> InboxConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        InboxConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.addr.to_string(), "0.0.0.0:3210");
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.resolver, ResolverConfig::default());
    }

    #[test]
    fn reads_every_key() {
        let config = config(&[
            ("INBOX_ADDR", "127.0.0.1:8080"),
            ("INBOX_BODY_LIMIT", "4096"),
            ("INBOX_READ_TIMEOUT_SECS", "3"),
            ("INBOX_DEFAULT_LANGUAGE", "en-GB"),
            ("INBOX_MAX_IDLE_MAPS", "8"),
        ]);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.body_limit, 4096);
        assert_eq!(config.read_timeout, Duration::from_secs(3));
        assert_eq!(config.resolver.default_language, "en-GB");
        assert_eq!(config.resolver.max_idle_maps, 8);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config(&[
            ("INBOX_ADDR", "nowhere"),
            ("INBOX_BODY_LIMIT", "-1"),
            ("INBOX_DEFAULT_LANGUAGE", "not a tag"),
        ]);
        assert_eq!(config.addr.to_string(), "0.0.0.0:3210");
        assert_eq!(config.body_limit, DEFAULT_BODY_LIMIT);
        assert_eq!(config.resolver.default_language, "und");
    }
}
