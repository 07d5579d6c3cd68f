//! Onion Rates - CLI server
//!
//! ```sh
//! # Run with default config (~/.config/onion-rates/config.toml)
//! onion-rates
//!
//! # Custom config path and port
//! onion-rates --config /etc/onion-rates/config.toml --port 8081
//!
//! # Validate config without starting
//! onion-rates --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use onion_rates::config::AppConfig;
use onion_rates::server::{init_tracing, ServerHandle, ServerOptions};

/// Onion market rates API with a live change stream.
#[derive(Parser, Debug)]
#[command(
    name = "onion-rates",
    version,
    about = "Onion market rates REST API and event stream",
    long_about = "Serves daily onion rates, the admin back-office API and \
                  a server-sent event stream of rate changes.\n\n\
                  Default config: ~/.config/onion-rates/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ONION_RATES_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(onion_rates::default_config_path);

    // A broken config file is fatal; a missing one yields defaults.
    let mut config = AppConfig::load(&config_path)?;

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = cli.port {
        info!(port, "CLI override: port");
        config.server.port = port;
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        println!("   Admin auth  : {}", if config.admin.auth_disabled { "disabled" } else { "enabled" });
        return Ok(());
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!(error = %e, "Startup failed");
            return Err(e);
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully");

    handle.wait().await;
    Ok(())
}
