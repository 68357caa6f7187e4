// Error surface for the library. The client and the orchestrator return
// these; only the binary decides that an error ends the process.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CloudsquidError>;

#[derive(Debug, Error)]
pub enum CloudsquidError {
    #[error("Missing required setting: {name}")]
    MissingSetting { name: &'static str },

    #[error("Failed to load env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("Invalid API endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Deliberately carries no detail: the rejected value is the key itself.
    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {what} request body: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} request failed: {source}")]
    Transport {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{what} response body couldn't be decoded (status {status}): {source}; body: {body}")]
    Decode {
        what: &'static str,
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error in file processing for run {run_id}: {detail}")]
    RunFailed {
        run_id: String,
        detail: serde_json::Value,
    },
}
