//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use shared::storage::StorageFormat;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Per-client request limit for submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Window over which `max_requests` are replenished.
    pub window: Duration,
}

/// Mail relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfig {
    /// Relay endpoint receiving JSON messages.
    pub relay_url: String,
    /// Optional bearer token for the relay.
    pub token: Option<String>,
    /// Sender address.
    pub from: String,
    /// Fixed recipient; when unset reports go to the submitter.
    pub to: Option<String>,
}

/// Server configuration.
///
/// Configuration values can be set via environment variables (a `.env` file
/// is honoured):
/// - `FITREPORT_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `FITREPORT_PORT`: The port to listen on (default: 3000)
/// - `FITREPORT_DATA_DIR`: Directory reports are written to (default: "data")
/// - `FITREPORT_PUBLIC_DIR`: Directory served as static files (default: "public")
/// - `FITREPORT_STORAGE_FORMAT`: `json` or `text` (default: json)
/// - `FITREPORT_REQUIRE_EMAIL`: Whether submissions must carry an email (default: false)
/// - `FITREPORT_RATE_LIMIT_MAX`: Submissions per client per window; unset disables limiting
/// - `FITREPORT_RATE_LIMIT_WINDOW_SECS`: Rate limit window (default: 900)
/// - `FITREPORT_MAIL_RELAY_URL`: Mail relay endpoint; unset disables delivery
/// - `FITREPORT_MAIL_TOKEN`, `FITREPORT_MAIL_FROM`, `FITREPORT_MAIL_TO`: Relay options
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Directory reports are written to.
    pub data_dir: PathBuf,
    /// Directory served as static files.
    pub public_dir: PathBuf,
    /// Content format of stored reports.
    pub storage_format: StorageFormat,
    /// Whether an email address is mandatory.
    pub require_email: bool,
    /// Submission rate limit, if enabled.
    pub rate_limit: Option<RateLimitConfig>,
    /// Mail delivery settings, if enabled.
    pub mail: Option<MailConfig>,
}

const DEFAULT_WINDOW_SECS: u64 = 900;
const DEFAULT_MAIL_FROM: &str = "reports@fitreport.local";

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let var = |name: &str| {
            lookup(&format!("FITREPORT_{name}")).filter(|value| !value.trim().is_empty())
        };

        let host = var("HOST").unwrap_or(defaults.host);

        let port = var("PORT")
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("FITREPORT_PORT must be a valid port number")?
            .unwrap_or(defaults.port);

        let data_dir = var("DATA_DIR").map_or(defaults.data_dir, PathBuf::from);
        let public_dir = var("PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from);

        let storage_format = var("STORAGE_FORMAT")
            .map(|f| f.parse::<StorageFormat>())
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("FITREPORT_STORAGE_FORMAT must be 'json' or 'text'")?
            .unwrap_or_default();

        let require_email = var("REQUIRE_EMAIL")
            .map(|v| parse_bool(&v))
            .transpose()
            .context("FITREPORT_REQUIRE_EMAIL must be a boolean")?
            .unwrap_or(false);

        let window_secs = var("RATE_LIMIT_WINDOW_SECS")
            .map(|w| w.parse::<u64>())
            .transpose()
            .context("FITREPORT_RATE_LIMIT_WINDOW_SECS must be a number of seconds")?
            .unwrap_or(DEFAULT_WINDOW_SECS);

        let rate_limit = var("RATE_LIMIT_MAX")
            .map(|m| m.parse::<u32>())
            .transpose()
            .context("FITREPORT_RATE_LIMIT_MAX must be a positive integer")?
            .filter(|max| *max > 0)
            .map(|max_requests| RateLimitConfig {
                max_requests,
                window: Duration::from_secs(window_secs.max(1)),
            });

        let mail = var("MAIL_RELAY_URL").map(|relay_url| MailConfig {
            relay_url,
            token: var("MAIL_TOKEN"),
            from: var("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            to: var("MAIL_TO"),
        });

        Ok(Self {
            host,
            port,
            data_dir,
            public_dir,
            storage_format,
            require_email,
            rate_limit,
            mail,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("public"),
            storage_format: StorageFormat::Json,
            require_email: false,
            rate_limit: None,
            mail: None,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: {other}"),
    }
}
