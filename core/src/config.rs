//! Settings for the default ureq-backed transport.

use std::env;

pub const DEFAULT_USER_AGENT: &str = concat!("reqkit/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

pub const USER_AGENT_ENV: &str = "REQKIT_USER_AGENT";
pub const MAX_REDIRECTS_ENV: &str = "REQKIT_MAX_REDIRECTS";

/// Agent-level settings. Timeouts are deliberately absent; the transport's
/// own defaults apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub user_agent: String,
    pub max_redirects: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by `REQKIT_USER_AGENT` and `REQKIT_MAX_REDIRECTS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|v| !v.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup(MAX_REDIRECTS_ENV) {
            match raw.trim().parse() {
                Ok(n) => config.max_redirects = n,
                Err(e) => tracing::warn!(
                    value = %raw,
                    error = %e,
                    "ignoring invalid {MAX_REDIRECTS_ENV}, using {DEFAULT_MAX_REDIRECTS}"
                ),
            }
        }
        config
    }
}
