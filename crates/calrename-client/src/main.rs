//! calrename CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use calrename_client::cli::Cli;
use calrename_client::commands::rename;
use calrename_client::config::{Settings, tracing_config};
use calrename_core::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::resolve(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let log_config = match tracing_config(&cli, &settings) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_tracing(log_config) {
        eprintln!("warning: {}", e);
    }

    match rename::run(&cli, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
