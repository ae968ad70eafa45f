//! Dugout - command-line access to youth league data.
//!
//! Reads and writes teams, schedule, inventory, concessions and event usage
//! through either the local store or the league server, as configured.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Command, Options, USAGE};
use dugout_core::auth::{is_league_email, Session, SessionData};
use dugout_core::{build_backend, open_local_store, BackendMode, Config};

// ============================================================================
// Constants
// ============================================================================

/// Set to enable the daily log file in the data directory
const ENV_LOG_FILE: &str = "DUGOUT_LOG_FILE";

/// Log file name prefix (the appender adds the date)
const LOG_FILE_PREFIX: &str = "dugout.log";

/// Initialize the tracing subscriber for logging.
/// Returns the file writer guard, which must live until exit.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn apply_options(config: &mut Config, options: &Options) {
    if let Some(mode) = options.mode {
        config.mode = mode;
    }
    config.ephemeral = options.ephemeral;
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (options, command) = commands::parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load()?;
    config.apply_env_overrides()?;
    apply_options(&mut config, &options);

    let log_dir = match std::env::var(ENV_LOG_FILE) {
        Ok(_) => Some(config.data_dir()?),
        Err(_) => None,
    };
    let _guard = init_tracing(log_dir);
    debug!(mode = %config.mode, namespace = %config.namespace(), "Configuration loaded");

    let mut session = Session::new(config.data_dir()?);
    if let Err(e) = session.load() {
        warn!(error = %e, "Ignoring unreadable session file");
    }

    match command {
        Command::Init => {
            if config.mode != BackendMode::Local {
                bail!("init only applies to the local store");
            }
            let store = open_local_store(&config)?;
            let seeded: Vec<&str> = store.initialize_store().iter().map(|k| k.as_str()).collect();
            info!(count = seeded.len(), "Store initialized");
            print_json(&serde_json::json!({ "seeded": seeded }))
        }
        Command::Login { token, email, role } => {
            if !is_league_email(&email, config.league_domain()) {
                bail!("{} is not a {} address", email, config.league_domain());
            }
            session.update(SessionData::new(token, email.clone(), role));
            session.save()?;
            config.last_email = Some(email.clone());
            config.save()?;
            info!(email = %email, role = %role, "Session saved");
            print_json(&serde_json::json!({ "status": "success", "email": email, "role": role }))
        }
        Command::Logout => {
            session.clear()?;
            print_json(&serde_json::json!({ "status": "success" }))
        }
        command => {
            commands::authorize(&command, session.role())?;

            let token = session.token().map(String::from);
            let backend = build_backend(&config, token)?;
            let value = commands::execute(backend.as_ref(), command).await?;
            print_json(&value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_options() {
        let mut config = Config::default();
        apply_options(
            &mut config,
            &Options {
                mode: Some(BackendMode::Remote),
                ephemeral: true,
            },
        );
        assert_eq!(config.mode, BackendMode::Remote);
        assert!(config.ephemeral);

        // No flag leaves the configured mode alone
        apply_options(&mut config, &Options::default());
        assert_eq!(config.mode, BackendMode::Remote);
        assert!(!config.ephemeral);
    }
}
