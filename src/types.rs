// Wire records exchanged with the Cloudsquid API. They live only for the
// duration of one run.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Value sent as `file_type` for every upload.
pub const BINARY_FILE_TYPE: &str = "binary";

/// Body of `POST /datasources/{source}/documents`. Empty fields are left
/// out of the JSON entirely.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filename: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_type: String,
    /// Base64 (standard alphabet, padded) file content.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
}

/// Read a string field that may be absent or `null`; both become "".
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl UploadRequest {
    pub fn new(bytes: &[u8], filename: &str, mimetype: &str) -> Self {
        UploadRequest {
            mimetype: mimetype.to_string(),
            filename: filename.to_string(),
            file_type: BINARY_FILE_TYPE.to_string(),
            file: STANDARD.encode(bytes),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file_id: String,
}

/// Body of `POST /datasources/{source}/run`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub file_id: String,
    pub pipeline: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RunResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub run_id: String,
}

/// Response of `GET /datasources/{source}/run/{run_id}`. `result` is
/// whatever the pipeline produced and is never interpreted here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StatusResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Done,
    Error,
    /// Any other value, including an empty one.
    Pending(String),
}

impl From<&str> for RunStatus {
    fn from(s: &str) -> Self {
        match s {
            "done" => RunStatus::Done,
            "error" => RunStatus::Error,
            other => RunStatus::Pending(other.to_string()),
        }
    }
}

impl StatusResponse {
    pub fn run_status(&self) -> RunStatus {
        RunStatus::from(self.status.as_str())
    }
}

/// A response as the client hands it back: status code plus the unparsed
/// body. Decoding is the caller's job.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
