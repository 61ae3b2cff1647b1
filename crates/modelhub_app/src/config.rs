//! Process configuration, read once from the environment at startup.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use hub_logging::LogDestination;
use modelhub_core::normalize_bucket_key;

const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com";
const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_WWWROOT: &str = "wwwroot";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Immutable process configuration. The only cross-request shared state.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    /// Backend base URL without a trailing slash.
    pub base_url: String,
    /// Default bucket used when a request names none.
    pub bucket: String,
    pub bind: SocketAddr,
    pub wwwroot: PathBuf,
    pub log_destination: LogDestination,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let client_id = require("MODELHUB_CLIENT_ID")?;
        let client_secret = require("MODELHUB_CLIENT_SECRET")?;

        let base_url = env::var("MODELHUB_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let bucket = match env::var("MODELHUB_BUCKET") {
            Ok(name) => normalize_bucket_key(&name).map_err(|err| ConfigError::Invalid {
                var: "MODELHUB_BUCKET",
                message: err.to_string(),
            })?,
            Err(_) => default_bucket(&client_id)?,
        };

        let bind = env::var("MODELHUB_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND.to_string())
            .parse()
            .map_err(|err| ConfigError::Invalid {
                var: "MODELHUB_BIND",
                message: format!("{err}"),
            })?;

        let wwwroot = PathBuf::from(
            env::var("MODELHUB_WWWROOT").unwrap_or_else(|_| DEFAULT_WWWROOT.to_string()),
        );

        let log_destination = parse_log_destination(
            env::var("MODELHUB_LOG").as_deref().unwrap_or("terminal"),
        );

        Ok(Self {
            client_id,
            client_secret,
            base_url,
            bucket,
            bind,
            wwwroot,
            log_destination,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

fn default_bucket(client_id: &str) -> Result<String, ConfigError> {
    normalize_bucket_key(&format!("{}-modelhub", client_id.to_lowercase())).map_err(|err| {
        ConfigError::Invalid {
            var: "MODELHUB_CLIENT_ID",
            message: format!("cannot derive a default bucket name: {err}"),
        }
    })
}

fn parse_log_destination(raw: &str) -> LogDestination {
    match raw {
        "file" => LogDestination::File,
        "both" => LogDestination::Both,
        _ => LogDestination::Terminal,
    }
}
