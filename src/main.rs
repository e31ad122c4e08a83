// MomConnect - Maternal health registration backend
// Copyright (c) 2025 MomConnect Contributors
// Licensed under the MIT License

use clap::Parser;
use momconnect::cli::Cli;
use momconnect::config::{load_config, LoggingConfig};
use momconnect::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config when it loads; the console is always on
    let file_config = load_config(&cli.config).ok();
    let logging_config = file_config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.map(|c| c.application.log_level))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "MomConnect - Maternal health registration backend"
    );

    let exit_code = match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            5
        }
    };

    // process::exit skips destructors
    drop(guard);
    process::exit(exit_code);
}
