//! CLI argument definitions using clap
//!
//! Commands:
//! - chirpy init [--db <path>]
//! - chirpy serve [--config <path>] [--host] [--port] [--db] [--static-dir] [--jwt-secret] [--debug]

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Chirpy - short posts over a JSON file store
#[derive(Parser, Debug)]
#[command(name = "chirpy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database file if it does not exist
    Init {
        /// Path to the database file
        #[arg(long, default_value = "database.json")]
        db: PathBuf,
    },

    /// Start the HTTP server
    Serve(ServeArgs),
}

/// Options for `serve`; flags override the config file
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to a JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the database file
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Directory served under /app
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Token signing secret (falls back to the TOKEN variable)
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Delete the database file before starting
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "chirpy", "serve", "--port", "9000", "--db", "/tmp/x.json", "--debug",
        ])
        .unwrap();

        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.db, Some(PathBuf::from("/tmp/x.json")));
                assert!(args.debug);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_init_default_db() {
        let cli = Cli::try_parse_from(["chirpy", "init"]).unwrap();
        match cli.command {
            Command::Init { db } => assert_eq!(db, PathBuf::from("database.json")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
