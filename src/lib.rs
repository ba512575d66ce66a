// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum oracle service.
//!
//! An HTTP service that answers `POST /oracle` by running one of six hybrid
//! variational routines on a device picked from a tiered fallback ladder.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           REST Service (axum)           │
//! ├─────────────────────────────────────────┤
//! │  Device Selector  │  Hybrid Dispatch    │
//! ├───────────────────┼─────────────────────┤
//! │  Devices          │  VQE Optimizer      │
//! │  (statevector,    │  (parameter shift,  │
//! │   sampled, remote)│   finite diff)      │
//! └───────────────────┴─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`server`]: REST server
//! - [`device`]: Device trait, simulators and tier selection
//! - [`hybrid`]: The six hybrid routines and request dispatch
//! - [`vqe`]: Gradient-descent VQE loop
//! - [`quantum`]: Pauli Hamiltonians, state vectors and ansätze
//! - [`provider`]: Cloud providers and credential checks
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod device;
pub mod error;
pub mod hybrid;
pub mod provider;
pub mod quantum;
pub mod server;
pub mod validation;
pub mod vqe;

pub use config::Config;
pub use error::{Error, Result};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
