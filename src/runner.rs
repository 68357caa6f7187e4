// Orchestration of one document run: upload the file, start the pipeline
// on it, then poll the run until it reports a terminal status. Every step
// returns a typed error; the binary decides to exit on it.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::api::CloudsquidApi;
use crate::error::{CloudsquidError, Result};
use crate::types::{RawResponse, RunResponse, RunStatus, StatusResponse, UploadResponse};
use crate::ui;

pub const DEFAULT_MIMETYPE: &str = "application/pdf";
pub const DEFAULT_PIPELINE: &str = "cloudsquid-flash";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub mimetype: String,
    pub pipeline: String,
    /// Fixed delay between two status polls. There is no deadline.
    pub poll_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            mimetype: DEFAULT_MIMETYPE.to_string(),
            pipeline: DEFAULT_PIPELINE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Upload `path`, run the configured pipeline on it and wait for the
/// result. `sleep` is called between polls with `options.poll_interval`.
pub fn process_file<A, S>(
    api: &A,
    path: &Path,
    options: &RunOptions,
    sleep: S,
) -> Result<serde_json::Value>
where
    A: CloudsquidApi + ?Sized,
    S: FnMut(Duration),
{
    let file_id = upload_file(api, path, &options.mimetype)?;
    let run_id = start_run(api, &file_id, &options.pipeline)?;
    poll_until_done(api, &run_id, options.poll_interval, sleep)
}

/// Read and upload a file, returning the remote file id.
pub fn upload_file<A>(api: &A, path: &Path, mimetype: &str) -> Result<String>
where
    A: CloudsquidApi + ?Sized,
{
    let bytes = fs::read(path).map_err(|source| CloudsquidError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = file_name(path);
    info!(filename = %filename, size = bytes.len(), "Uploading file");

    let spinner = ui::spinner(format!("Uploading {}...", filename));
    let raw = api.upload(&bytes, &filename, mimetype);
    spinner.finish_and_clear();

    let raw = raw?;
    let body: UploadResponse = decode("upload", &raw)?;
    ui::print_response(raw.status, &body);

    // An empty id is forwarded as is; the server decides what that means.
    if body.file_id.is_empty() {
        warn!(status = raw.status, "Upload response carried no file_id");
    }
    Ok(body.file_id)
}

/// Start `pipeline` on an uploaded file, returning the run id.
pub fn start_run<A>(api: &A, file_id: &str, pipeline: &str) -> Result<String>
where
    A: CloudsquidApi + ?Sized,
{
    info!(file_id, pipeline, "Starting run");
    let raw = api.run(file_id, pipeline)?;
    let body: RunResponse = decode("run", &raw)?;
    ui::print_response(raw.status, &body);

    if body.run_id.is_empty() {
        warn!(status = raw.status, "Run response carried no run_id");
    }
    Ok(body.run_id)
}

/// Poll a run until it is `done` (its `result` is returned) or `error`
/// (its `result` becomes the error detail). Any other status means the run
/// is still going: wait `interval` and ask again, indefinitely.
pub fn poll_until_done<A, S>(
    api: &A,
    run_id: &str,
    interval: Duration,
    mut sleep: S,
) -> Result<serde_json::Value>
where
    A: CloudsquidApi + ?Sized,
    S: FnMut(Duration),
{
    let spinner = ui::spinner(format!("Waiting for run {}...", run_id));
    let mut attempt: u64 = 0;

    let outcome = loop {
        attempt += 1;
        let body = match fetch_status(api, run_id) {
            Ok((status, body)) => {
                spinner.suspend(|| ui::print_response(status, &body));
                body
            }
            Err(e) => break Err(e),
        };

        match body.run_status() {
            RunStatus::Done => {
                info!(run_id, attempt, "Run finished");
                break Ok(body.result);
            }
            RunStatus::Error => {
                break Err(CloudsquidError::RunFailed {
                    run_id: run_id.to_string(),
                    detail: body.result,
                });
            }
            RunStatus::Pending(status) => {
                spinner.set_message(format!("Run {} is {}...", run_id, display_status(&status)));
                sleep(interval);
            }
        }
    };

    spinner.finish_and_clear();
    outcome
}

fn fetch_status<A>(api: &A, run_id: &str) -> Result<(u16, StatusResponse)>
where
    A: CloudsquidApi + ?Sized,
{
    let raw = api.get_status(run_id)?;
    let body = decode("status", &raw)?;
    Ok((raw.status, body))
}

/// Decode a response body, keeping the raw text around when it isn't the
/// JSON we expect.
fn decode<T: DeserializeOwned>(what: &'static str, raw: &RawResponse) -> Result<T> {
    if !raw.is_success() {
        warn!(what, status = raw.status, "Non-success HTTP status");
    }
    serde_json::from_str(&raw.body).map_err(|source| CloudsquidError::Decode {
        what,
        status: raw.status,
        body: raw.body.clone(),
        source,
    })
}

/// Last path component, or the whole path when there is none.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn display_status(status: &str) -> &str {
    if status.is_empty() {
        "pending"
    } else {
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_is_last_component() {
        assert_eq!(file_name(Path::new("/tmp/in/invoice.pdf")), "invoice.pdf");
        assert_eq!(file_name(Path::new("scan.pdf")), "scan.pdf");
        assert_eq!(file_name(Path::new("/")), "/");
    }

    #[test]
    fn decode_error_keeps_raw_body() {
        let raw = RawResponse {
            status: 502,
            body: "<html>Bad Gateway</html>".into(),
        };
        let err = decode::<RunResponse>("run", &raw).unwrap_err();
        match err {
            CloudsquidError::Decode {
                what, status, body, ..
            } => {
                assert_eq!(what, "run");
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let options = RunOptions::default();
        assert_eq!(options.mimetype, "application/pdf");
        assert_eq!(options.pipeline, "cloudsquid-flash");
        assert_eq!(options.poll_interval, Duration::from_secs(2));
    }
}
