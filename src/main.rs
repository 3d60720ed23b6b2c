use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use ra_launcher::cli::Cli;
use ra_launcher::lifecycle::{signals, startup};
use ra_launcher::observability::init_logging;
use ra_launcher::{ProcessRuntime, Shutdown};

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let prepared = startup::prepare_launch(&cli);

    // Configuration decides the log level, so logging starts once it is known.
    let level = match &prepared {
        Ok(prepared) => prepared.config.observability.log_level.clone(),
        Err(_) => cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
    };
    init_logging(&level);

    tracing::info!("ra-launcher v{} starting", env!("CARGO_PKG_VERSION"));

    let prepared = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&prepared.plan)?);
        return Ok(ExitCode::SUCCESS);
    }

    // Process-wide env and cwd changes happen before any runtime thread starts.
    if let Err(e) = startup::apply(&prepared) {
        tracing::error!("Startup failed: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let shutdown = Arc::new(Shutdown::new());
        let signal_task = signals::spawn_signal_handler(shutdown.clone());
        let result = startup::run(prepared, &ProcessRuntime::new(), shutdown).await;
        signal_task.abort();
        result
    });

    match result {
        Ok(outcome) => {
            tracing::info!("Shutdown complete");
            Ok(ExitCode::from(outcome.exit_code()))
        }
        Err(e) => {
            tracing::error!("Launcher failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
