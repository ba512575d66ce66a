// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum devices and tiered device selection.
//!
//! This module provides the [`QuantumDevice`] trait and its implementations:
//!
//! - [`StateVectorDevice`]: local simulator, analytic (classical tier) or
//!   shot-sampled (hybrid tier)
//! - [`RemoteDevice`]: provider QPU or cloud simulator descriptor (free and
//!   paid tiers)
//!
//! [`DeviceSelector`] walks the tiers in priority order.

pub mod remote;
pub mod selector;
pub mod statevector;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DeviceError, ValidationError};
use crate::provider::Provider;
use crate::quantum::{Ansatz, PauliSum};

pub use remote::RemoteDevice;
pub use selector::{DeviceSelector, Selection, TierSkip};
pub use statevector::StateVectorDevice;

/// Execution mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QpuMode {
    /// Classical simulation only
    Classical,
    /// Simulated quantum measurements with classical optimization
    Hybrid,
    /// Provider QPU (free tier first unless disabled)
    Full,
}

impl fmt::Display for QpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QpuMode::Classical => write!(f, "classical"),
            QpuMode::Hybrid => write!(f, "hybrid"),
            QpuMode::Full => write!(f, "full"),
        }
    }
}

impl FromStr for QpuMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "classical" => Ok(QpuMode::Classical),
            "hybrid" => Ok(QpuMode::Hybrid),
            "full" => Ok(QpuMode::Full),
            other => Err(ValidationError::field(
                "qpu_mode",
                format!(
                    "unknown mode '{}', expected classical, hybrid or full",
                    other
                ),
            )),
        }
    }
}

/// Rung of the device fallback ladder, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Classical,
    HybridSimulated,
    FreeQpu,
    PaidQpu,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Classical => write!(f, "classical"),
            Tier::HybridSimulated => write!(f, "hybrid_simulated"),
            Tier::FreeQpu => write!(f, "free_qpu"),
            Tier::PaidQpu => write!(f, "paid_qpu"),
        }
    }
}

/// Health status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Device can execute circuits
    Healthy,
    /// Device exists but cannot execute circuits from this service
    Unavailable,
}

/// Descriptive snapshot of a device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub tier: Tier,
    pub provider: Option<Provider>,
    pub target: Option<String>,
    pub wires: usize,
    pub shots: Option<u32>,
}

/// The trait that all quantum devices must implement.
#[async_trait]
pub trait QuantumDevice: Send + Sync {
    /// Device name (e.g. `default.qubit`).
    fn name(&self) -> &str;

    /// Tier this device belongs to.
    fn tier(&self) -> Tier;

    /// Cloud provider, `None` for local simulators.
    fn provider(&self) -> Option<Provider> {
        None
    }

    /// Number of wires the device was created with.
    fn num_wires(&self) -> usize;

    /// Shots per measurement, `None` for analytic expectation values.
    fn shots(&self) -> Option<u32> {
        None
    }

    /// `⟨ψ(θ)|H|ψ(θ)⟩` for the prepared ansatz.
    async fn expectation(
        &self,
        ansatz: &Ansatz,
        params: &[f64],
        observable: &PauliSum,
    ) -> Result<f64, DeviceError>;

    /// Probability of each computational basis state.
    async fn probabilities(&self, ansatz: &Ansatz, params: &[f64])
        -> Result<Vec<f64>, DeviceError>;

    /// Check device health.
    async fn health_check(&self) -> Result<HealthStatus, DeviceError>;

    /// Descriptive snapshot.
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.name().to_string(),
            tier: self.tier(),
            provider: self.provider(),
            target: None,
            wires: self.num_wires(),
            shots: self.shots(),
        }
    }
}

/// Reject circuits or observables wider than the device.
pub(crate) fn check_fits(
    device_wires: usize,
    ansatz: &Ansatz,
    observable: Option<&PauliSum>,
) -> Result<(), DeviceError> {
    if ansatz.wires() != device_wires {
        return Err(DeviceError::InvalidRequest(format!(
            "ansatz uses {} wires, device has {}",
            ansatz.wires(),
            device_wires
        )));
    }
    if let Some(obs) = observable {
        if obs.num_qubits() > device_wires {
            return Err(DeviceError::InvalidRequest(format!(
                "observable acts on {} wires, device has {}",
                obs.num_qubits(),
                device_wires
            )));
        }
    }
    Ok(())
}
