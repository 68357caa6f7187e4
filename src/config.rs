// Settings for talking to Cloudsquid: API key, base endpoint and the
// source/agent id that scopes uploads and runs. Resolved once at startup
// and passed to the client explicitly.

use std::fmt;
use std::path::Path;

use tracing::info;

use crate::error::{CloudsquidError, Result};

pub const API_KEY_VAR: &str = "CLOUDSQUID_API_KEY";
pub const ENDPOINT_VAR: &str = "CLOUDSQUID_API_ENDPOINT";
pub const SOURCE_ID_VAR: &str = "CLOUDSQUID_AGENT_ID";

#[derive(Clone)]
pub struct Config {
    api_key: String,
    pub endpoint: String,
    pub source_id: String,
}

impl Config {
    pub fn new(api_key: &str, endpoint: &str, source_id: &str) -> Self {
        Config {
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
            source_id: source_id.to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Overlay a dotenv file onto the process environment, then read the
    /// three settings from it. Values in the file win over variables that
    /// are already set. An explicit `env_file` must exist; without one a
    /// `.env` in the working directory is used when present.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path_override(path).map_err(|source| CloudsquidError::EnvFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            None => match dotenvy::dotenv_override() {
                Ok(path) => info!(path = %path.display(), "Loaded env file"),
                Err(e) if e.not_found() => {}
                Err(source) => {
                    return Err(CloudsquidError::EnvFile {
                        path: ".env".into(),
                        source,
                    })
                }
            },
        }

        let config = Self::from_lookup(|name| std::env::var(name).ok())?;
        info!(config = ?config, "Loaded config");
        Ok(config)
    }

    /// Resolve settings through `lookup`. Unset and empty values are both
    /// reported as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(CloudsquidError::MissingSetting { name })
        };

        Ok(Config {
            api_key: required(API_KEY_VAR)?,
            endpoint: required(ENDPOINT_VAR)?,
            source_id: required(SOURCE_ID_VAR)?,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("source_id", &self.source_id)
            .finish()
    }
}
