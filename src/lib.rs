// Library root
// -----------
// The binary (`main.rs`) is a thin wrapper around these modules.
//
// Module responsibilities:
// - `cli`: argument parsing.
// - `config`: API key, endpoint and source id from the environment.
// - `api`: the blocking HTTP client for upload, run and status calls,
//   behind the `CloudsquidApi` trait.
// - `types`: request/response bodies of the remote API.
// - `runner`: upload -> run -> poll orchestration.
// - `ui`: terminal output.
// - `error`: the error type shared by all of the above.
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod types;
pub mod ui;

pub use api::{CloudsquidApi, CloudsquidClient};
pub use config::Config;
pub use error::{CloudsquidError, Result};
pub use runner::{process_file, RunOptions};
