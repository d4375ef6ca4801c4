//! smrv - Automated malware verification for mod registry uploads
//!
//! Polls the mod registry for unapproved versions, scans their executables
//! with the malware scanner and approves the versions that come back clean.

mod cli;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use clap::Parser;
use smrv_config::Config;
use smrv_events::EventReceiver;
use smrv_ops::{ApprovalDriver, OpsContextBuilder, OpsCtx, VerificationReport};
use std::fs::OpenOptions;
use std::process;
use std::sync::Mutex;
use tokio::select;
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    if cli.global.debug {
        config.general.debug = true;
    }

    init_tracing(&config)?;
    info!("Starting smrv v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let (event_sender, event_receiver) = smrv_events::channel();
    let ops_ctx = OpsContextBuilder::new()
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    let command = cli.command.name();
    execute_command_with_events(cli.command, ops_ctx, event_receiver).await?;

    info!(command, "Command completed");
    Ok(())
}

/// Execute command while logging its events as they arrive
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
) -> Result<(), CliError> {
    let mut command_future = Box::pin(execute_command(command, &ops_ctx));
    let mut events_open = true;

    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(message) = event_receiver.try_recv() {
                    logging::log_event_with_tracing(&message);
                }
                return result;
            }

            // Event received
            message = event_receiver.recv(), if events_open => {
                match message {
                    Some(message) => logging::log_event_with_tracing(&message),
                    None => events_open = false,
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: &OpsCtx) -> Result<(), CliError> {
    match command {
        Commands::Run => {
            let mut driver = ApprovalDriver::new(
                ctx.registry.clone(),
                ctx.verifier.clone(),
                ctx.tx.clone(),
            );
            let interval = ctx.config.general.poll_interval();
            info!(poll_interval = ?interval, "Initialized");

            let shutdown = select! {
                () = driver.run(interval) => Ok(()),
                result = tokio::signal::ctrl_c() => result,
            };
            shutdown?;

            // In-flight versions were never approved; the next start sees them again
            let abandoned = driver.in_flight();
            if abandoned > 0 {
                warn!(abandoned, "Shutting down with versions still being verified");
            }
            Ok(())
        }

        Commands::Verify { version_ids } => {
            let reports = smrv_ops::verify_versions(ctx, &version_ids).await?;
            print_reports(&reports);
            Ok(())
        }

        Commands::Sample {
            limit,
            offset,
            versions,
        } => {
            let reports = smrv_ops::sample_versions(ctx, limit, offset, versions).await?;
            print_reports(&reports);
            Ok(())
        }
    }
}

fn print_reports(reports: &[VerificationReport]) {
    for report in reports {
        let millis = report.duration.as_millis();
        match &report.result {
            Err(e) => println!("{}: {} ({millis} ms): {e}", report.version, report.verdict()),
            Ok(_) => println!("{}: {} ({millis} ms)", report.version, report.verdict()),
        }
    }
}

/// Log to stderr and append JSON records to the configured log file
fn init_tracing(config: &Config) -> Result<(), CliError> {
    let default_directives = if config.general.debug {
        "info,smrv=debug,smrv_ops=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    let log_file = &config.general.log_file;
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }
    }

    let file_layer = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!(
                "Warning: Failed to open log file {}: {e}",
                log_file.display()
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
