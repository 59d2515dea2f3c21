//! ntlm-soap: SOAP over HTTP with NTLM authentication
//!
//! Entry point for the ntlm-soap command line client.

use ntlm_soap::config::{Cli, Command, RunConfig, write_default_config};
use std::io::Write;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(output);
    }

    // Load and validate configuration
    let config = match RunConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(config)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs the call and writes the raw response body to stdout.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: RunConfig) -> ExitCode {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    match runtime.block_on(run::execute(config)) {
        Ok(outcome) => {
            if let Err(e) = std::io::stdout().write_all(&outcome.body) {
                tracing::error!("Failed to write response: {e}");
                return exit_code::call_error();
            }
            if outcome.is_ok() {
                exit_code::SUCCESS
            } else {
                tracing::error!("Endpoint returned HTTP {}", outcome.status);
                exit_code::call_error()
            }
        }
        Err(run::RunError::Client(ntlm_soap::client::ClientError::Config(e))) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            exit_code::CONFIG_ERROR
        }
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::call_error()
        }
    }
}
