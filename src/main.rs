// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum Oracle Server
//!
//! Serves `POST /oracle` and a few inspection endpoints.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! quantum-oracle serve
//!
//! # Start with custom config
//! quantum-oracle serve --config /path/to/config.yaml
//!
//! # Show which providers have credentials
//! quantum-oracle providers
//!
//! # Show which device a request would run on
//! quantum-oracle select --qpu-mode full
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use quantum_oracle::{
    config::Config,
    device::{DeviceSelector, QpuMode},
    provider::{has_provider_key, Provider, PROVIDERS},
    server, Result, VERSION,
};

/// Quantum oracle for hybrid VQE routines
#[derive(Parser)]
#[command(name = "quantum-oracle")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "HTTP oracle dispatching hybrid variational quantum routines")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to logging.level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the oracle server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// HTTP port
        #[arg(long, env = "ORACLE_PORT")]
        port: Option<u16>,
    },

    /// List providers and whether their credentials are configured
    Providers,

    /// Show the device a request would be routed to
    Select {
        /// classical, hybrid or full
        #[arg(long)]
        qpu_mode: Option<String>,

        /// Preferred provider for full mode
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    // Initialize logging
    let level = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    init_logging(level);

    match cli.command {
        Commands::Serve { host, port } => {
            // Override config with CLI args
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            config.validate()?;

            info!(
                version = VERSION,
                host = %config.server.host,
                port = config.server.port,
                "Starting quantum oracle"
            );

            server::run_server(config).await?;
        }

        Commands::Providers => {
            println!("Providers:");
            for provider in PROVIDERS {
                let status = if has_provider_key(&config.providers, provider) {
                    "configured"
                } else {
                    "missing credentials"
                };
                let default_marker = if config.defaults.provider == Some(provider) {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "  {} [{}]{} keys: {}",
                    provider,
                    status,
                    default_marker,
                    provider.required_keys().join(", ")
                );
            }
            println!("force_free_qpu: {}", config.providers.force_free_qpu);
        }

        Commands::Select { qpu_mode, provider } => {
            let qpu_mode = match qpu_mode {
                Some(mode) => mode.parse::<QpuMode>()?,
                None => config.defaults.qpu_mode,
            };
            let provider = match provider {
                Some(name) => Some(name.parse::<Provider>()?),
                None => config.defaults.provider,
            };

            let selection =
                DeviceSelector::new(&config.providers, &config.vqe).select(qpu_mode, provider)?;
            for skip in &selection.fallbacks {
                let name = skip.provider.map(|p| p.to_string()).unwrap_or_default();
                println!("skipped {} {}: {}", skip.tier, name, skip.reason);
            }
            println!("{}", serde_yaml::to_string(&selection.device.info())?);
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => {
            // Validate configuration
            match config.validate() {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    eprintln!("Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}
