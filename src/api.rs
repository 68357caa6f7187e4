// API client module: a small blocking HTTP client for the Cloudsquid
// document API. It knows how to build URLs, bodies and auth headers for the
// three calls (upload, run, status) and hands raw responses back; deciding
// what a response means is left to the runner.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use tracing::debug;

use crate::config::Config;
use crate::error::{CloudsquidError, Result};
use crate::types::{RawResponse, RunRequest, UploadRequest};

const API_KEY_HEADER: &str = "x-api-key";

/// The three remote operations the runner needs. `CloudsquidClient` is the
/// HTTP implementation; tests script their own.
pub trait CloudsquidApi {
    /// Upload file bytes as a base64 document into the configured source.
    fn upload(&self, file: &[u8], filename: &str, mimetype: &str) -> Result<RawResponse>;

    /// Start `pipeline` on a previously uploaded file.
    fn run(&self, file_id: &str, pipeline: &str) -> Result<RawResponse>;

    /// Fetch the current state of a run.
    fn get_status(&self, run_id: &str) -> Result<RawResponse>;
}

/// Blocking client bound to one endpoint and one source/agent id.
#[derive(Clone)]
pub struct CloudsquidClient {
    client: Client,
    endpoint: String,
    source_id: String,
    api_key: HeaderValue,
}

impl CloudsquidClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut api_key =
            HeaderValue::from_str(config.api_key()).map_err(|_| CloudsquidError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .build()
            .map_err(|source| CloudsquidError::Transport {
                what: "client setup",
                source,
            })?;

        Ok(CloudsquidClient {
            client,
            endpoint: config.endpoint.clone(),
            source_id: config.source_id.clone(),
            api_key,
        })
    }

    fn url(&self, tail: &[&str]) -> Result<Url> {
        let mut segments = vec!["datasources", self.source_id.as_str()];
        segments.extend_from_slice(tail);
        endpoint_url(&self.endpoint, &segments)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers
    }

    /// Attach headers, send, and read the whole body as text.
    fn send(&self, what: &'static str, req: RequestBuilder) -> Result<RawResponse> {
        let transport = |source: reqwest::Error| CloudsquidError::Transport { what, source };

        let res = req.headers(self.headers()).send().map_err(transport)?;
        let status = res.status().as_u16();
        let body = res.text().map_err(transport)?;
        debug!(what, status, bytes = body.len(), "Received response");
        Ok(RawResponse { status, body })
    }
}

impl CloudsquidApi for CloudsquidClient {
    fn upload(&self, file: &[u8], filename: &str, mimetype: &str) -> Result<RawResponse> {
        let url = self.url(&["documents"])?;
        let payload = UploadRequest::new(file, filename, mimetype);
        let body = serde_json::to_vec(&payload).map_err(|source| CloudsquidError::Encode {
            what: "upload",
            source,
        })?;

        debug!(%url, filename, mimetype, size = file.len(), "Uploading file");
        let res = self.send("upload", self.client.post(url).body(body))?;
        debug!("Successfully sent out upload request");
        Ok(res)
    }

    fn run(&self, file_id: &str, pipeline: &str) -> Result<RawResponse> {
        let url = self.url(&["run"])?;
        let payload = RunRequest {
            file_id: file_id.to_string(),
            pipeline: pipeline.to_string(),
        };
        let body = serde_json::to_vec(&payload).map_err(|source| CloudsquidError::Encode {
            what: "run",
            source,
        })?;

        debug!(%url, file_id, pipeline, "Running file");
        self.send("run", self.client.post(url).body(body))
    }

    fn get_status(&self, run_id: &str) -> Result<RawResponse> {
        let url = self.url(&["run", run_id])?;
        debug!(%url, "Getting status");
        self.send("status", self.client.get(url))
    }
}

/// Join `segments` onto the path of `endpoint` the way a path join would:
/// the base path is kept, empty segments from trailing or doubled slashes
/// collapse, and the query string (if any) is left alone.
pub fn endpoint_url(endpoint: &str, segments: &[&str]) -> Result<Url> {
    let invalid = |reason: String| CloudsquidError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason,
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".into()));
    }

    let parts: Vec<&str> = url
        .path()
        .split('/')
        .chain(segments.iter().flat_map(|s| s.split('/')))
        .filter(|p| !p.is_empty())
        .collect();
    let path = format!("/{}", parts.join("/"));
    url.set_path(&path);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documents(endpoint: &str) -> String {
        endpoint_url(endpoint, &["datasources", "abc", "documents"])
            .unwrap()
            .to_string()
    }

    #[test]
    fn joins_onto_base_path() {
        assert_eq!(
            documents("https://api.example.com/v1"),
            "https://api.example.com/v1/datasources/abc/documents"
        );
        assert_eq!(
            endpoint_url("https://api.example.com/v1", &["datasources", "abc", "run", "r-42"])
                .unwrap()
                .as_str(),
            "https://api.example.com/v1/datasources/abc/run/r-42"
        );
    }

    #[test]
    fn trailing_and_doubled_slashes_collapse() {
        let want = "https://api.example.com/v1/datasources/abc/documents";
        assert_eq!(documents("https://api.example.com/v1/"), want);
        assert_eq!(documents("https://api.example.com//v1//"), want);
    }

    #[test]
    fn bare_host() {
        assert_eq!(
            documents("https://api.example.com"),
            "https://api.example.com/datasources/abc/documents"
        );
    }

    #[test]
    fn keeps_query_string() {
        assert_eq!(
            documents("http://localhost:8080/api?tenant=x"),
            "http://localhost:8080/api/datasources/abc/documents?tenant=x"
        );
    }

    #[test]
    fn rejects_malformed_endpoints() {
        for bad in ["", "api.example.com/v1", "mailto:ops@example.com"] {
            let err = endpoint_url(bad, &["run"]).unwrap_err();
            assert!(
                matches!(err, CloudsquidError::InvalidEndpoint { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn client_fails_fast_on_bad_endpoint() {
        let config = Config::new("key", "not a url", "abc");
        let client = CloudsquidClient::new(&config).unwrap();
        let err = client.get_status("r-1").unwrap_err();
        assert!(matches!(err, CloudsquidError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_api_key_with_control_chars() {
        let config = Config::new("bad\nkey", "https://api.example.com", "abc");
        let err = CloudsquidClient::new(&config).err().unwrap();
        assert!(matches!(err, CloudsquidError::InvalidApiKey));
        assert!(!err.to_string().contains("bad"));
    }

    #[test]
    fn headers_carry_key_and_content_type() {
        let config = Config::new("secret-key", "https://api.example.com", "abc");
        let client = CloudsquidClient::new(&config).unwrap();
        let headers = client.headers();
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers[API_KEY_HEADER], "secret-key");
        assert!(headers[API_KEY_HEADER].is_sensitive());
        assert!(!format!("{headers:?}").contains("secret-key"));
    }
}
