//! CLI command implementations
//!
//! `init` only prepares the database file. `serve` resolves configuration
//! (file, then flags and environment), opens the store and runs the HTTP
//! server on a Tokio runtime until Ctrl-C.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::http_server::{AppState, HttpServer, HttpServerConfig};
use crate::observability::init_tracing;
use crate::storage::RecordStore;

use super::args::{Cli, Command, ServeArgs};
use super::errors::{CliError, CliResult};

/// Legacy environment variable holding the signing secret
pub const LEGACY_SECRET_VAR: &str = "TOKEN";

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { db } => init(&db),
        Command::Serve(args) => serve(args),
    }
}

/// Create the database file if missing
pub fn init(db_path: &Path) -> CliResult<()> {
    RecordStore::open(db_path)?;
    tracing::info!(database = %db_path.display(), "database ready");
    Ok(())
}

/// Merge the config file, flags and environment into one config
///
/// A signing secret is mandatory. `legacy_secret` is consulted only when
/// neither the file nor `--jwt-secret`/`JWT_SECRET` provide one.
pub fn resolve_config(args: &ServeArgs, legacy_secret: Option<String>) -> CliResult<HttpServerConfig> {
    let mut config = match &args.config {
        Some(path) => HttpServerConfig::load(path).map_err(CliError::config_error)?,
        None => HttpServerConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(db) = &args.db {
        config.database_path = db.clone();
    }
    if let Some(dir) = &args.static_dir {
        config.static_dir = dir.clone();
    }
    if let Some(secret) = &args.jwt_secret {
        config.jwt_secret = Some(secret.clone());
    }
    if config.jwt_secret.is_none() {
        config.jwt_secret = legacy_secret;
    }

    config.validate().map_err(CliError::config_error)?;
    if config.jwt_secret.is_none() {
        return Err(CliError::config_error(
            "JWT secret not set (use --jwt-secret, JWT_SECRET or TOKEN)",
        ));
    }

    Ok(config)
}

/// Start the HTTP server
pub fn serve(args: ServeArgs) -> CliResult<()> {
    let config = resolve_config(&args, std::env::var(LEGACY_SECRET_VAR).ok())?;

    if args.debug {
        reset_database(&config.database_path)?;
    }

    let jwt = config
        .jwt_config()
        .ok_or_else(|| CliError::config_error("JWT secret not set"))?;
    let store = RecordStore::open(&config.database_path)?;
    let server = HttpServer::new(config, AppState::new(store, jwt));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Remove the database file (debug mode)
fn reset_database(path: &Path) -> CliResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::warn!(database = %path.display(), "debug mode: database deleted");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CliError::io_error(format!(
            "Failed to delete {}: {}",
            path.display(),
            e
        ))),
    }
}
