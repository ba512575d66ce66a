// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Provider-hosted devices.
//!
//! A [`RemoteDevice`] records which provider target the fallback ladder
//! resolved to: IBM Quantum, AWS Braket, Azure Quantum or Google Quantum AI,
//! on either the free (simulator) or the paid (QPU) tier. This service does
//! not ship provider job-submission clients, so executing on a remote device
//! yields [`DeviceError::Unavailable`].

use async_trait::async_trait;
use tracing::warn;

use super::{DeviceInfo, HealthStatus, QuantumDevice, Tier};
use crate::config::ProvidersConfig;
use crate::error::DeviceError;
use crate::provider::Provider;
use crate::quantum::{Ansatz, PauliSum};

/// Resolved provider target.
#[derive(Debug, Clone)]
pub struct RemoteDevice {
    name: String,
    provider: Provider,
    target: String,
    tier: Tier,
    wires: usize,
}

impl RemoteDevice {
    /// Resolve the free or paid target for `provider`.
    ///
    /// Callers check credential presence first; this only fails when a
    /// configured value cannot form a valid target.
    pub fn for_provider(
        provider: Provider,
        free: bool,
        providers: &ProvidersConfig,
        wires: usize,
    ) -> Result<Self, DeviceError> {
        let tier = if free { Tier::FreeQpu } else { Tier::PaidQpu };

        let (name, target) = match provider {
            Provider::Ibm => {
                let backend = if free { "ibmq_qasm_simulator" } else { "ibmq_manila" };
                ("qiskit.ibmq", backend.to_string())
            }
            Provider::AwsBraket => {
                let region = providers.aws_braket.region.as_deref().unwrap_or_default();
                validate_region(region)?;
                let device = if free {
                    "quantum-simulator/amazon/sv1"
                } else {
                    "qpu/ionq/Harmony"
                };
                (
                    "braket.aws.qubit",
                    format!("arn:aws:braket::{}:device/{}", region, device),
                )
            }
            Provider::Azure => {
                let target = if free { "microsoft.estimator" } else { "ionq.qpu.aria-1" };
                ("azure.quantum", target.to_string())
            }
            Provider::Google => {
                if free {
                    ("cirq.simulator", "cirq.simulator".to_string())
                } else {
                    let project = providers.google.project_id.as_deref().unwrap_or_default();
                    (
                        "cirq.google",
                        format!("projects/{}/processors/sycamore", project),
                    )
                }
            }
        };

        Ok(Self {
            name: name.to_string(),
            provider,
            target,
            tier,
            wires,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn unavailable(&self) -> DeviceError {
        DeviceError::Unavailable(format!(
            "{} target '{}' cannot execute circuits from this service",
            self.provider, self.target
        ))
    }
}

/// AWS region names are lowercase words joined by dashes ending in a digit,
/// e.g. `us-east-1`.
fn validate_region(region: &str) -> Result<(), DeviceError> {
    let parts: Vec<&str> = region.split('-').collect();
    let well_formed = parts.len() >= 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()))
        && parts
            .last()
            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));
    if well_formed {
        Ok(())
    } else {
        Err(DeviceError::InvalidRequest(format!(
            "AWS_REGION '{}' is not a valid region name",
            region
        )))
    }
}

#[async_trait]
impl QuantumDevice for RemoteDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    fn provider(&self) -> Option<Provider> {
        Some(self.provider)
    }

    fn num_wires(&self) -> usize {
        self.wires
    }

    async fn expectation(
        &self,
        _ansatz: &Ansatz,
        _params: &[f64],
        _observable: &PauliSum,
    ) -> Result<f64, DeviceError> {
        warn!(provider = %self.provider, target = %self.target, "Remote execution requested");
        Err(self.unavailable())
    }

    async fn probabilities(&self, _ansatz: &Ansatz, _params: &[f64]) -> Result<Vec<f64>, DeviceError> {
        Err(self.unavailable())
    }

    async fn health_check(&self) -> Result<HealthStatus, DeviceError> {
        Ok(HealthStatus::Unavailable)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.name.clone(),
            tier: self.tier,
            provider: Some(self.provider),
            target: Some(self.target.clone()),
            wires: self.wires,
            shots: None,
        }
    }
}
