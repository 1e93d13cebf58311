//! Console Server — browser-facing admin gateway for the document platform.
//!
//! Main entry point that loads configuration, initializes logging, and
//! starts the gateway.

use tracing_subscriber::{EnvFilter, fmt};

use console_core::config::AppConfig;
use console_gateway::run_server;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, console_core::AppError> {
    let env = std::env::var("CONSOLE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
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
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), console_core::AppError> {
    tracing::info!("Starting Admin Console v{}", env!("CARGO_PKG_VERSION"));
    run_server(config).await
}
