// Entrypoint for the CLI application.
// - Parses flags, loads config, builds the client and hands off to the
//   runner. Any error ends the process with a non-zero status.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cloudsquid_cli::cli::CliArgs;
use cloudsquid_cli::{process_file, ui, CloudsquidClient, Config};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cloudsquid_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let Some(file) = args.file_or_usage(&mut std::io::stdout())? else {
        return Ok(());
    };

    let config = Config::load(args.env_file.as_deref()).context("Failed to load config")?;
    let client = CloudsquidClient::new(&config)?;

    let result = process_file(&client, file, &args.run_options(), std::thread::sleep)?;
    ui::print_final_result(&result).context("Rendering final result")?;
    Ok(())
}
