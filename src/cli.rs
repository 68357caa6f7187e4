// Command line arguments. Parsed once in `main` and turned into the
// options the runner takes.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{CommandFactory, Parser};

use crate::runner::{RunOptions, DEFAULT_MIMETYPE, DEFAULT_PIPELINE};

#[derive(Parser, Debug)]
#[command(
    name = "cloudsquid",
    version,
    about = "Upload a document to Cloudsquid, run a pipeline on it and print the result"
)]
pub struct CliArgs {
    /// File path to upload
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Dotenv file overlaid on the environment (defaults to ./.env when present)
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Mimetype declared for the uploaded file
    #[arg(long, default_value = DEFAULT_MIMETYPE)]
    pub mimetype: String,

    /// Pipeline to run on the uploaded file
    #[arg(long, default_value = DEFAULT_PIPELINE)]
    pub pipeline: String,

    /// Seconds to wait between status polls
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,
}

impl CliArgs {
    /// The file to upload, or `None` after writing usage to `out` when
    /// `-f` was not given. A missing file is not an error.
    pub fn file_or_usage<W: Write>(&self, out: &mut W) -> io::Result<Option<&Path>> {
        match self.file.as_deref() {
            Some(file) => Ok(Some(file)),
            None => {
                writeln!(out, "{}", Self::command().render_help())?;
                Ok(None)
            }
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            mimetype: self.mimetype.clone(),
            pipeline: self.pipeline.clone(),
            poll_interval: Duration::from_secs(self.poll_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_file_flag() {
        let args = CliArgs::try_parse_from(["cloudsquid", "-f", "invoice.pdf"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("invoice.pdf")));
        assert_eq!(args.run_options(), RunOptions::default());
    }

    #[test]
    fn missing_file_prints_usage() {
        let args = CliArgs::try_parse_from(["cloudsquid"]).unwrap();
        let mut out = Vec::new();

        assert_eq!(args.file_or_usage(&mut out).unwrap(), None);
        let usage = String::from_utf8(out).unwrap();
        assert!(usage.contains("Usage:"));
        assert!(usage.contains("--file"));
    }

    #[test]
    fn given_file_prints_nothing() {
        let args = CliArgs::try_parse_from(["cloudsquid", "-f", "scan.pdf"]).unwrap();
        let mut out = Vec::new();

        assert_eq!(
            args.file_or_usage(&mut out).unwrap(),
            Some(Path::new("scan.pdf"))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn overrides() {
        let args = CliArgs::try_parse_from([
            "cloudsquid",
            "--file",
            "a.png",
            "--mimetype",
            "image/png",
            "--pipeline",
            "cloudsquid-pro",
            "--poll-interval",
            "5",
            "--env-file",
            "config.env",
        ])
        .unwrap();
        let options = args.run_options();
        assert_eq!(options.mimetype, "image/png");
        assert_eq!(options.pipeline, "cloudsquid-pro");
        assert_eq!(options.poll_interval, Duration::from_secs(5));
        assert_eq!(args.env_file, Some(PathBuf::from("config.env")));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        assert!(CliArgs::try_parse_from(["cloudsquid", "--poll-interval", "0"]).is_err());
    }
}
