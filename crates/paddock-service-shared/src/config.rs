//! Service configuration read from the environment.
//!
//! - `PADDOCK_DATA_DIR`: session data directory (default: platform data dir + `sessions`)
//! - `SERVICE_PORT`: listening port (default: 8080)
//! - `REPLAY_INTERVAL_POLICY`: `carry-last-known` (default) or `immediate-predecessor`

use std::path::PathBuf;

use paddock_lib::{default_data_dir, Error as LibError, IntervalPolicy};

pub const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration of the HTTP service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub port: u16,
    pub interval_policy: IntervalPolicy,
}

/// Invalid configuration value.
#[derive(Debug)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    Invalid { var: &'static str, message: String },
    /// No data directory was given and none could be derived.
    DataDir(LibError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { var, message } => write!(f, "invalid {}: {}", var, message),
            Self::DataDir(e) => write!(f, "cannot determine data directory: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DataDir(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

impl ServiceConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match set("PADDOCK_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir().map_err(ConfigError::DataDir)?,
        };

        let port = match set("SERVICE_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                ConfigError::Invalid {
                    var: "SERVICE_PORT",
                    message: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let interval_policy = match set("REPLAY_INTERVAL_POLICY") {
            Some(raw) => raw.parse::<IntervalPolicy>().map_err(|message| ConfigError::Invalid {
                var: "REPLAY_INTERVAL_POLICY",
                message,
            })?,
            None => IntervalPolicy::default(),
        };

        Ok(Self {
            data_dir,
            port,
            interval_policy,
        })
    }
}
