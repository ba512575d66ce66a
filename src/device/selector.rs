// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tiered device selection.
//!
//! Priority: classical simulator, shot-sampled simulator, free provider tier,
//! paid provider tier. Each tier attempt yields one of:
//!
//! - a device, which ends the search
//! - [`TierSkip`]: the tier has no credentials configured, and
//!   the search continues
//! - a [`DeviceError`]: the tier failed unexpectedly, and the error is
//!   returned to the caller
//!
//! Full mode with no credentialed provider falls back to the classical
//! simulator.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{QpuMode, QuantumDevice, RemoteDevice, StateVectorDevice, Tier};
use crate::config::{ProvidersConfig, VqeSettings};
use crate::error::DeviceError;
use crate::provider::{has_provider_key, Provider, PROVIDERS};

/// A tier that was passed over.
#[derive(Debug, Clone, Serialize)]
pub struct TierSkip {
    pub tier: Tier,
    pub provider: Option<Provider>,
    pub reason: String,
}

/// Outcome of device selection.
pub struct Selection {
    pub device: Arc<dyn QuantumDevice>,
    pub tier: Tier,
    pub fallbacks: Vec<TierSkip>,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("device", &self.device.name())
            .field("tier", &self.tier)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}

enum TierOutcome {
    Selected(Arc<dyn QuantumDevice>),
    Unavailable(TierSkip),
}

/// Picks a device for a request.
pub struct DeviceSelector<'a> {
    providers: &'a ProvidersConfig,
    settings: &'a VqeSettings,
}

impl<'a> DeviceSelector<'a> {
    pub fn new(providers: &'a ProvidersConfig, settings: &'a VqeSettings) -> Self {
        Self {
            providers,
            settings,
        }
    }

    fn wires(&self) -> usize {
        self.settings.wires as usize
    }

    /// Select a device for `mode`, preferring `preferred` in full mode.
    pub fn select(
        &self,
        mode: QpuMode,
        preferred: Option<Provider>,
    ) -> Result<Selection, DeviceError> {
        let mut fallbacks = Vec::new();

        let device = match mode {
            QpuMode::Classical => self.classical(),
            QpuMode::Hybrid => self.hybrid()?,
            QpuMode::Full => {
                let tier = if self.providers.force_free_qpu {
                    Tier::FreeQpu
                } else {
                    Tier::PaidQpu
                };
                let candidates: Vec<Provider> = match preferred {
                    Some(p) => vec![p],
                    None => PROVIDERS.to_vec(),
                };

                let mut selected = None;
                for provider in candidates {
                    match self.provider_tier(provider, tier)? {
                        TierOutcome::Selected(device) => {
                            selected = Some(device);
                            break;
                        }
                        TierOutcome::Unavailable(skip) => {
                            debug!(provider = %provider, reason = %skip.reason, "Provider tier unavailable");
                            fallbacks.push(skip);
                        }
                    }
                }

                match selected {
                    Some(device) => device,
                    None => {
                        warn!(
                            skipped = fallbacks.len(),
                            "No provider credentials configured, falling back to classical simulator"
                        );
                        self.classical()
                    }
                }
            }
        };

        let tier = device.tier();
        info!(
            mode = %mode,
            device = %device.name(),
            tier = %tier,
            fallbacks = fallbacks.len(),
            "Device selected"
        );
        Ok(Selection {
            device,
            tier,
            fallbacks,
        })
    }

    fn classical(&self) -> Arc<dyn QuantumDevice> {
        Arc::new(StateVectorDevice::analytic(self.wires()))
    }

    fn hybrid(&self) -> Result<Arc<dyn QuantumDevice>, DeviceError> {
        let device =
            StateVectorDevice::sampled(self.wires(), self.settings.shots, self.settings.seed)?;
        Ok(Arc::new(device))
    }

    fn provider_tier(&self, provider: Provider, tier: Tier) -> Result<TierOutcome, DeviceError> {
        if !has_provider_key(self.providers, provider) {
            return Ok(TierOutcome::Unavailable(TierSkip {
                tier,
                provider: Some(provider),
                reason: format!(
                    "missing credentials ({})",
                    provider.required_keys().join(", ")
                ),
            }));
        }

        let device = RemoteDevice::for_provider(
            provider,
            tier == Tier::FreeQpu,
            self.providers,
            self.wires(),
        )?;
        Ok(TierOutcome::Selected(Arc::new(device)))
    }
}
