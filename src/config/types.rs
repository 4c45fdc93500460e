//! Config types for apptail.
//!
//! Defines structures for parsing and representing configuration files.

use crate::endpoint::TransportPreference;
use crate::tail::ReconnectPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of historical lines.
pub const DEFAULT_LINES: i64 = 20;

/// Field names accepted at the top level of a config file.
pub const KNOWN_FIELDS: &[&str] = &["api_url", "api_token", "color", "lines", "transport", "reconnect"];

/// Raw config file structure (used for parsing).
///
/// Mirrors the YAML file. Unknown fields are rejected with an error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Base URL of the platform API.
    pub api_url: Option<String>,
    /// Opaque API token, sent as a bearer token.
    pub api_token: Option<String>,
    /// Colorize output (default: true).
    pub color: Option<bool>,
    /// Default number of historical lines.
    pub lines: Option<i64>,
    /// Live transport preference.
    pub transport: Option<TransportPreference>,
    /// Reconnection settings for live tails.
    pub reconnect: Option<RawReconnect>,
}

/// Raw `reconnect:` section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawReconnect {
    pub interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

/// Effective configuration after merging files and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub color: bool,
    pub lines: i64,
    pub transport: TransportPreference,
    pub reconnect: ReconnectPolicy,
    /// Files the values were read from, lowest precedence first.
    pub loaded_from: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_token: None,
            color: true,
            lines: DEFAULT_LINES,
            transport: TransportPreference::Auto,
            reconnect: ReconnectPolicy::default(),
            loaded_from: Vec::new(),
        }
    }
}

impl Config {
    /// Overlay the values set in `raw`.
    pub fn apply(&mut self, raw: RawConfig) {
        if raw.api_url.is_some() {
            self.api_url = raw.api_url;
        }
        if raw.api_token.is_some() {
            self.api_token = raw.api_token;
        }
        if let Some(color) = raw.color {
            self.color = color;
        }
        if let Some(lines) = raw.lines {
            self.lines = lines;
        }
        if let Some(transport) = raw.transport {
            self.transport = transport;
        }
        if let Some(reconnect) = raw.reconnect {
            if let Some(ms) = reconnect.interval_ms {
                self.reconnect.interval = Duration::from_millis(ms);
            }
            if reconnect.max_attempts.is_some() {
                self.reconnect.max_attempts = reconnect.max_attempts;
            }
        }
    }

    /// Token with everything but the last four characters hidden.
    pub fn masked_token(&self) -> Option<String> {
        self.api_token.as_ref().map(|token| {
            let visible: String = token
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            if token.chars().count() <= 4 {
                "****".to_string()
            } else {
                format!("****{}", visible)
            }
        })
    }
}
