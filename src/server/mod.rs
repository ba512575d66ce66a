// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Oracle HTTP server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              Oracle Server               │
//! ├──────────────────────────────────────────┤
//! │  REST (8000)                             │
//! │  POST /oracle  GET /health /version      │
//! │                GET /providers            │
//! └──────────────┬───────────────────────────┘
//!                │ per request
//!     DeviceSelector ─▶ RunContext ─▶ HybridSolver
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use quantum_oracle::config::Config;
//! use quantum_oracle::server::run_server;
//!
//! let config = Config::load(None)?;
//! run_server(config).await?;
//! ```

pub mod rest;

pub use rest::RestServer;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::hybrid::{HybridSolver, Oracle};

/// Shared state for the server.
pub struct ServerState {
    /// Configuration loaded at startup
    pub config: Arc<Config>,

    /// Hybrid routines
    pub solver: Arc<dyn HybridSolver>,

    /// Shutdown signal sender
    shutdown_tx: watch::Sender<bool>,

    /// Shutdown signal receiver
    shutdown_rx: watch::Receiver<bool>,
}

impl ServerState {
    /// Create new server state.
    pub fn new(config: Config, solver: Arc<dyn HybridSolver>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            config: Arc::new(config),
            solver,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Get a shutdown receiver.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Signal shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Run the REST server until Ctrl-C, then drain in-flight requests for at
/// most `server.shutdown_timeout_sec`.
pub async fn run_server(config: Config) -> Result<()> {
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_sec);
    let server_config = config.server.clone();
    let state = Arc::new(ServerState::new(config, Arc::new(Oracle)));

    info!(
        host = %server_config.host,
        port = server_config.port,
        qpu_mode = %state.config.defaults.qpu_mode,
        wires = state.config.vqe.wires,
        "Starting oracle server"
    );

    // Set up signal handler for graceful shutdown
    let state_for_signal = state.clone();
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received shutdown signal, initiating graceful shutdown");
            state_for_signal.shutdown();
        }
    });

    let mut shutdown_rx = state.shutdown_receiver();
    let server = RestServer::new(state).serve(&server_config);
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = shutdown_rx.changed() => {}
    }

    info!(timeout_secs = server_config.shutdown_timeout_sec, "Waiting for shutdown to complete");
    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Shutdown timeout elapsed with requests still in flight");
            Ok(())
        }
    }
}
