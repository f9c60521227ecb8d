//! RoomChat Server — realtime room chat over WebSocket
//!
//! Main entry point that loads configuration, initializes logging, and
//! starts the server.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use roomchat_core::config::AppConfig;
use roomchat_core::error::AppError;

/// RoomChat realtime server.
#[derive(Debug, Parser)]
#[command(name = "roomchat-server", version, about)]
struct Args {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    config: String,

    /// Environment overlay loaded from the same directory as the base file
    #[arg(short, long, env = "ROOMCHAT_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match load_configuration(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(
        config = %args.config,
        env = %args.env,
        "Starting RoomChat v{}",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = roomchat_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(args: &Args) -> Result<AppConfig, AppError> {
    AppConfig::load(&args.config, &args.env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
