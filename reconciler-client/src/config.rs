//! Client configuration

use crate::error::{ReconcilerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the service base URL.
pub const URL_ENV: &str = "RECONCILER_URL";
/// Environment variable holding the per-request timeout in seconds.
pub const TIMEOUT_ENV: &str = "RECONCILER_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the reconciler service, e.g. `http://reconciler:8080`
    #[serde(rename = "URL", alias = "url")]
    pub url: String,
    /// Per-request deadline; the transport's own timeout applies when unset
    #[serde(
        rename = "timeout_secs",
        default,
        skip_serializing_if = "Option::is_none",
        with = "timeout_secs"
    )]
    pub timeout: Option<Duration>,
}

/// Timeout on the wire: seconds, fractional allowed ("0.5" is 500ms)
mod timeout_secs {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) if d.subsec_nanos() == 0 => serializer.serialize_u64(d.as_secs()),
            Some(d) => serializer.serialize_f64(d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|_| de::Error::custom(format!("invalid timeout {} seconds", secs)))
            })
            .transpose()
    }
}

impl Config {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from `RECONCILER_URL` and `RECONCILER_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(URL_ENV)
            .map_err(|_| ReconcilerError::InvalidConfig(format!("{} is not set", URL_ENV)))?;

        let timeout = match std::env::var(TIMEOUT_ENV) {
            Ok(raw) => Some(parse_timeout_secs(&raw)?),
            Err(_) => None,
        };

        let config = Self { url, timeout };
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(ReconcilerError::InvalidConfig("URL must not be empty".to_string()));
        }

        let parsed = url::Url::parse(self.base_url())
            .map_err(|e| ReconcilerError::InvalidConfig(format!("URL '{}': {}", self.url, e)))?;

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ReconcilerError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ReconcilerError::InvalidConfig(format!(
                "URL scheme '{}' is not supported",
                other
            ))),
        }
    }
}

/// Parse a timeout given in seconds, e.g. "30" or "0.5"
pub fn parse_timeout_secs(raw: &str) -> Result<Duration> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| {
            ReconcilerError::InvalidConfig(format!("{} must be a number of seconds", TIMEOUT_ENV))
        })
}
