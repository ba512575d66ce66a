// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! VQE optimizer implementation.

use std::f64::consts::{FRAC_PI_2, PI};
use tracing::{debug, info};

use super::types::{VqeOptions, VqeResult};
use crate::device::QuantumDevice;
use crate::error::{DeviceError, Result, ValidationError};
use crate::quantum::{Ansatz, PauliSum};

/// Central-difference step on analytic devices.
const FD_STEP_ANALYTIC: f64 = 1e-5;

/// Central-difference step on shot-sampled devices. Shot noise swamps
/// small differences.
const FD_STEP_SAMPLED: f64 = 0.25;

/// Minimize `⟨ψ(θ)|H|ψ(θ)⟩` over the ansatz parameters.
///
/// Runs exactly `options.steps` updates `θ ← θ − η ∇E(θ)`.
///
/// # Arguments
/// * `device` - Device that evaluates expectation values
/// * `hamiltonian` - Cost observable
/// * `ansatz` - Parameterized circuit
/// * `initial_params` - Starting point, [`default_initial_params`] when `None`
/// * `options` - Step count and step size
pub async fn custom_vqe(
    device: &dyn QuantumDevice,
    hamiltonian: &PauliSum,
    ansatz: &Ansatz,
    initial_params: Option<Vec<f64>>,
    options: &VqeOptions,
) -> Result<VqeResult> {
    options.validate()?;

    let num_params = ansatz.num_params();
    let mut params = initial_params.unwrap_or_else(|| default_initial_params(num_params));
    if params.len() != num_params {
        return Err(ValidationError::field(
            "initial_params",
            format!("ansatz expects {} parameters, got {}", num_params, params.len()),
        )
        .into());
    }
    if params.iter().any(|p| !p.is_finite()) {
        return Err(ValidationError::field("initial_params", "must be finite").into());
    }

    debug!(
        device = %device.name(),
        wires = ansatz.wires(),
        params = num_params,
        terms = hamiltonian.terms().len(),
        steps = options.steps,
        "Starting VQE"
    );

    let mut energy = finite_energy(device.expectation(ansatz, &params, hamiltonian).await?, 0)?;
    let mut energy_history = Vec::with_capacity(options.steps + 1);
    energy_history.push(energy);

    for step in 0..options.steps {
        let grad = gradient(device, hamiltonian, ansatz, &params).await?;
        for (p, g) in params.iter_mut().zip(&grad) {
            *p -= options.stepsize * g;
        }
        if params.iter().any(|p| !p.is_finite()) {
            return Err(DeviceError::ExecutionFailed(format!(
                "VQE parameters diverged at step {}",
                step + 1
            ))
            .into());
        }
        energy = finite_energy(
            device.expectation(ansatz, &params, hamiltonian).await?,
            step + 1,
        )?;
        energy_history.push(energy);

        if (step + 1) % 25 == 0 {
            debug!(step = step + 1, energy, "VQE progress");
        }
    }

    info!(
        device = %device.name(),
        steps = options.steps,
        energy,
        "VQE finished"
    );

    Ok(VqeResult {
        params,
        energy,
        energy_history,
        steps: options.steps,
        device: device.name().to_string(),
    })
}

fn finite_energy(energy: f64, step: usize) -> Result<f64> {
    if energy.is_finite() {
        Ok(energy)
    } else {
        Err(DeviceError::ExecutionFailed(format!("energy is not finite at step {}", step)).into())
    }
}

/// Gradient of the energy with respect to each parameter.
///
/// Uses the two-term parameter-shift rule
/// `∂E/∂θ_k = (E(θ + π/2·e_k) − E(θ − π/2·e_k)) / 2` when the ansatz allows
/// it, and central finite differences otherwise.
pub async fn gradient(
    device: &dyn QuantumDevice,
    hamiltonian: &PauliSum,
    ansatz: &Ansatz,
    params: &[f64],
) -> Result<Vec<f64>> {
    let (shift, scale) = if ansatz.supports_parameter_shift() {
        (FRAC_PI_2, 0.5)
    } else {
        let h = if device.shots().is_some() {
            FD_STEP_SAMPLED
        } else {
            FD_STEP_ANALYTIC
        };
        (h, 1.0 / (2.0 * h))
    };

    let mut grad = Vec::with_capacity(params.len());
    let mut shifted = params.to_vec();
    for k in 0..params.len() {
        shifted[k] = params[k] + shift;
        let plus = device.expectation(ansatz, &shifted, hamiltonian).await?;
        shifted[k] = params[k] - shift;
        let minus = device.expectation(ansatz, &shifted, hamiltonian).await?;
        shifted[k] = params[k];
        grad.push(scale * (plus - minus));
    }
    Ok(grad)
}

/// Golden-ratio sequence `θ_k = π·frac((k+1)·φ) − π/2`, in `[-π/2, π/2)`.
///
/// Deterministic and free of the symmetric saddle at `θ = 0`.
pub fn default_initial_params(n: usize) -> Vec<f64> {
    let phi = 1.618033988749895;
    (1..=n)
        .map(|k| PI * (k as f64 * phi).fract() - FRAC_PI_2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StateVectorDevice;
    use crate::quantum::{Pauli, PauliTerm};
    use crate::test_utils::{FailingDevice, MockDevice};

    fn sum(terms: &[(&str, f64)]) -> PauliSum {
        PauliSum::new(
            terms
                .iter()
                .map(|(p, c)| PauliTerm::parse(p, *c).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_default_initial_params_range() {
        let params = default_initial_params(32);
        assert_eq!(params.len(), 32);
        assert!(params.iter().all(|p| (-FRAC_PI_2..FRAC_PI_2).contains(p)));
        assert_eq!(params, default_initial_params(32));
    }

    #[tokio::test]
    async fn test_single_qubit_ground_state() {
        let dev = StateVectorDevice::analytic(1);
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let options = VqeOptions {
            steps: 100,
            stepsize: 0.4,
        };
        let result = custom_vqe(&dev, &h, &ansatz, None, &options).await.unwrap();
        assert!(result.energy < -0.999, "energy = {}", result.energy);
        assert_eq!(result.energy_history.len(), 101);
        assert_eq!(result.steps, 100);
        assert_eq!(result.device, "default.qubit");
        assert_eq!(result.energy, *result.energy_history.last().unwrap());
    }

    #[tokio::test]
    async fn test_two_qubit_product_ground_state() {
        let dev = StateVectorDevice::analytic(2);
        let h = sum(&[("ZI", 1.0), ("IZ", 1.0), ("II", 0.5)]);
        let ansatz = Ansatz::hardware_efficient(2, 0);
        let options = VqeOptions {
            steps: 150,
            stepsize: 0.3,
        };
        let result = custom_vqe(&dev, &h, &ansatz, None, &options).await.unwrap();
        assert!((result.energy - (-1.5)).abs() < 1e-3, "energy = {}", result.energy);
    }

    #[tokio::test]
    async fn test_qaoa_uses_finite_differences() {
        let dev = StateVectorDevice::analytic(1);
        let cost = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::qaoa(1, 1, &cost, &PauliSum::transverse_field(1));
        assert!(!ansatz.supports_parameter_shift());
        let options = VqeOptions {
            steps: 100,
            stepsize: 0.2,
        };
        let result = custom_vqe(&dev, &cost, &ansatz, None, &options).await.unwrap();
        assert!(result.energy < -0.99, "energy = {}", result.energy);
        assert!(result.energy < result.energy_history[0]);
    }

    #[tokio::test]
    async fn test_sampled_device_converges() {
        let dev = StateVectorDevice::sampled(1, 4000, Some(5)).unwrap();
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let options = VqeOptions {
            steps: 60,
            stepsize: 0.4,
        };
        let result = custom_vqe(&dev, &h, &ansatz, None, &options).await.unwrap();
        assert!(result.energy < -0.9, "energy = {}", result.energy);
        assert_eq!(result.device, "default.qubit.shots");
    }

    #[tokio::test]
    async fn test_zero_steps_reports_initial_energy() {
        let dev = StateVectorDevice::analytic(1);
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let options = VqeOptions {
            steps: 0,
            stepsize: 0.1,
        };
        let result = custom_vqe(&dev, &h, &ansatz, Some(vec![0.0]), &options)
            .await
            .unwrap();
        assert_eq!(result.params, vec![0.0]);
        assert!((result.energy - 1.0).abs() < 1e-12);
        assert_eq!(result.energy_history.len(), 1);
    }

    #[tokio::test]
    async fn test_parameter_count_mismatch() {
        let dev = StateVectorDevice::analytic(2);
        let h = sum(&[("ZZ", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(2, 1);
        let err = custom_vqe(&dev, &h, &ansatz, Some(vec![0.0; 3]), &VqeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(err.to_string().contains("expects 4 parameters"));
    }

    #[tokio::test]
    async fn test_observable_wider_than_device() {
        let dev = StateVectorDevice::analytic(2);
        let h = sum(&[("ZZZ", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(2, 0);
        let err = custom_vqe(&dev, &h, &ansatz, None, &VqeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "device");
    }

    #[tokio::test]
    async fn test_runs_every_step() {
        let dev = MockDevice::new(2, -0.25);
        let h = sum(&[("ZZ", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(2, 1);
        let options = VqeOptions {
            steps: 5,
            stepsize: 0.1,
        };
        let result = custom_vqe(&dev, &h, &ansatz, None, &options).await.unwrap();
        // flat landscape: no early stop, parameters unchanged
        assert_eq!(result.params, default_initial_params(4));
        assert_eq!(result.energy_history, vec![-0.25; 6]);
        // initial + per step (2 per parameter + 1)
        assert_eq!(dev.evaluations(), 1 + 5 * (2 * 4 + 1));
    }

    #[tokio::test]
    async fn test_device_errors_propagate() {
        let dev = FailingDevice { wires: 1 };
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let err = custom_vqe(&dev, &h, &ansatz, None, &VqeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "device");
        assert!(err.to_string().contains("mock execution failure"));
    }

    #[tokio::test]
    async fn test_non_finite_energy_is_an_error() {
        let dev = MockDevice::new(1, f64::NAN);
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let err = custom_vqe(&dev, &h, &ansatz, None, &VqeOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "device");
        assert!(err.to_string().contains("not finite at step 0"));
    }

    #[tokio::test]
    async fn test_diverging_parameters_are_an_error() {
        // gradient ~1e308 overflows the update
        let dev = StateVectorDevice::analytic(1);
        let h = PauliSum::new(vec![PauliTerm {
            coeff: 1.7e308,
            ops: vec![Pauli::Z],
        }]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let options = VqeOptions {
            steps: 3,
            stepsize: 10.0,
        };
        let err = custom_vqe(&dev, &h, &ansatz, None, &options).await.unwrap_err();
        assert_eq!(err.kind(), "device");
        assert!(err.to_string().contains("diverged at step 1"));
    }

    #[tokio::test]
    async fn test_rejects_bad_stepsize() {
        let dev = StateVectorDevice::analytic(1);
        let h = sum(&[("Z", 1.0)]);
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let options = VqeOptions {
            steps: 1,
            stepsize: 0.0,
        };
        assert!(custom_vqe(&dev, &h, &ansatz, None, &options).await.is_err());
    }
}
