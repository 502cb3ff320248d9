//! Configuration for syncpoint
//!
//! Settings are layered: built-in defaults, an optional TOML file, then
//! `SYNCPOINT_*` environment variables. The binary applies `--endpoint` last.

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default store endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:4001";

/// Environment prefix (`SYNCPOINT_ENDPOINT` selects the store)
pub const ENV_PREFIX: &str = "SYNCPOINT";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "syncpoint.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the store's HTTP key API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Deadline for probe, read and write requests (never the watch)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// TCP connect deadline
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Logging level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_request_timeout() -> u64 {
    5_000
}
fn default_connect_timeout() -> u64 {
    2_000
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            request_timeout_ms: default_request_timeout(),
            connect_timeout_ms: default_connect_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings. An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Replace the endpoint (command-line override) and revalidate.
    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Result<Self> {
        if let Some(endpoint) = endpoint {
            self.endpoint = endpoint;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidConfig(format!("endpoint '{}': {}", self.endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "endpoint '{}' must use http or https",
                self.endpoint
            )));
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "request_timeout_ms and connect_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
