// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! VQE configuration and result types.

use serde::Serialize;

use crate::config::VqeSettings;
use crate::error::ValidationError;

/// Configuration for the VQE loop.
#[derive(Debug, Clone)]
pub struct VqeOptions {
    /// Number of gradient-descent steps, always run to completion.
    pub steps: usize,
    /// Gradient-descent step size.
    pub stepsize: f64,
}

impl Default for VqeOptions {
    fn default() -> Self {
        Self {
            steps: 100,
            stepsize: 0.1,
        }
    }
}

impl From<&VqeSettings> for VqeOptions {
    fn from(settings: &VqeSettings) -> Self {
        Self {
            steps: settings.steps as usize,
            stepsize: settings.stepsize,
        }
    }
}

impl VqeOptions {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.stepsize.is_finite() || self.stepsize <= 0.0 {
            return Err(ValidationError::field("stepsize", "must be > 0"));
        }
        Ok(())
    }
}

/// Result of a VQE run.
#[derive(Debug, Clone, Serialize)]
pub struct VqeResult {
    /// Final circuit parameters.
    pub params: Vec<f64>,
    /// Energy at the final parameters.
    pub energy: f64,
    /// Energy before the first step and after every step (`steps + 1` entries).
    pub energy_history: Vec<f64>,
    /// Number of steps executed.
    pub steps: usize,
    /// Device the circuit ran on.
    pub device: String,
}
