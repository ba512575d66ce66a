// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Local state-vector device.
//!
//! Without shots it returns exact expectation values (`default.qubit`, the
//! classical tier). With shots every Pauli term is estimated from that many
//! simulated ±1 measurement outcomes (`default.qubit.shots`, the hybrid tier).

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::distributions::{Bernoulli, Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use super::{check_fits, HealthStatus, QuantumDevice, Tier};
use crate::error::DeviceError;
use crate::quantum::{Ansatz, PauliSum};

/// Local simulator device.
pub struct StateVectorDevice {
    name: String,
    wires: usize,
    shots: Option<u32>,
    rng: Mutex<StdRng>,
}

impl StateVectorDevice {
    /// Analytic simulator.
    pub fn analytic(wires: usize) -> Self {
        Self {
            name: "default.qubit".to_string(),
            wires,
            shots: None,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Shot-sampled simulator. A seed makes sampling reproducible.
    pub fn sampled(wires: usize, shots: u32, seed: Option<u64>) -> Result<Self, DeviceError> {
        if shots == 0 {
            return Err(DeviceError::InvalidRequest("shots must be > 0".into()));
        }
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            name: "default.qubit.shots".to_string(),
            wires,
            shots: Some(shots),
            rng: Mutex::new(rng),
        })
    }
}

#[async_trait]
impl QuantumDevice for StateVectorDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        if self.shots.is_some() {
            Tier::HybridSimulated
        } else {
            Tier::Classical
        }
    }

    fn num_wires(&self) -> usize {
        self.wires
    }

    fn shots(&self) -> Option<u32> {
        self.shots
    }

    async fn expectation(
        &self,
        ansatz: &Ansatz,
        params: &[f64],
        observable: &PauliSum,
    ) -> Result<f64, DeviceError> {
        check_fits(self.wires, ansatz, Some(observable))?;
        let psi = ansatz.prepare(params)?;

        let Some(shots) = self.shots else {
            return Ok(psi.expectation(observable));
        };

        let mut rng = self.rng.lock();
        let mut total = 0.0;
        for term in observable.terms() {
            if term.is_identity() {
                total += term.coeff;
                continue;
            }
            let exact = psi.expectation_term(term);
            let p_plus = ((1.0 + exact) / 2.0).clamp(0.0, 1.0);
            let outcome = Bernoulli::new(p_plus).map_err(|_| {
                DeviceError::ExecutionFailed(format!("expectation of '{}' is not finite", term))
            })?;
            let plus = (0..shots).filter(|_| outcome.sample(&mut *rng)).count();
            let estimate = 2.0 * plus as f64 / shots as f64 - 1.0;
            total += term.coeff * estimate;
        }
        trace!(shots, energy = total, "sampled expectation");
        Ok(total)
    }

    async fn probabilities(&self, ansatz: &Ansatz, params: &[f64]) -> Result<Vec<f64>, DeviceError> {
        check_fits(self.wires, ansatz, None)?;
        let exact = ansatz.prepare(params)?.probabilities();

        let Some(shots) = self.shots else {
            return Ok(exact);
        };

        let dist = WeightedIndex::new(&exact)
            .map_err(|e| DeviceError::ExecutionFailed(format!("invalid distribution: {e}")))?;
        let mut counts = vec![0u32; exact.len()];
        let mut rng = self.rng.lock();
        for _ in 0..shots {
            counts[dist.sample(&mut *rng)] += 1;
        }
        Ok(counts
            .into_iter()
            .map(|c| c as f64 / shots as f64)
            .collect())
    }

    async fn health_check(&self) -> Result<HealthStatus, DeviceError> {
        Ok(HealthStatus::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::PauliTerm;
    use std::f64::consts::PI;

    fn zz() -> PauliSum {
        PauliSum::new(vec![
            PauliTerm::parse("ZI", 1.0).unwrap(),
            PauliTerm::parse("II", 0.5).unwrap(),
        ])
    }

    #[tokio::test]
    async fn test_analytic_expectation() {
        let dev = StateVectorDevice::analytic(2);
        assert_eq!(dev.tier(), Tier::Classical);
        let ansatz = Ansatz::hardware_efficient(2, 0);
        let e = dev.expectation(&ansatz, &[PI, 0.0], &zz()).await.unwrap();
        assert!((e - (-1.0 + 0.5)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_sampled_expectation_is_close() {
        let dev = StateVectorDevice::sampled(2, 20_000, Some(7)).unwrap();
        assert_eq!(dev.tier(), Tier::HybridSimulated);
        assert_eq!(dev.shots(), Some(20_000));
        let ansatz = Ansatz::hardware_efficient(2, 0);
        // ⟨Z⟩ = cos(π/3) = 0.5
        let e = dev.expectation(&ansatz, &[PI / 3.0, 0.0], &zz()).await.unwrap();
        assert!((e - 1.0).abs() < 0.05, "got {e}");
    }

    #[tokio::test]
    async fn test_sampled_deterministic_outcome_is_exact() {
        let dev = StateVectorDevice::sampled(2, 100, Some(1)).unwrap();
        let ansatz = Ansatz::hardware_efficient(2, 0);
        let e = dev.expectation(&ansatz, &[0.0, 0.0], &zz()).await.unwrap();
        assert!((e - 1.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_sampled_probabilities_sum_to_one() {
        let dev = StateVectorDevice::sampled(2, 500, Some(3)).unwrap();
        let ansatz = Ansatz::hardware_efficient(2, 0);
        let probs = dev.probabilities(&ansatz, &[PI / 2.0, 0.0]).await.unwrap();
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(probs[0b01], 0.0);
        assert!(probs[0b00] > 0.3 && probs[0b10] > 0.3);
    }

    #[tokio::test]
    async fn test_sampled_non_finite_expectation_is_an_error() {
        let dev = StateVectorDevice::sampled(1, 100, Some(2)).unwrap();
        let ansatz = Ansatz::hardware_efficient(1, 0);
        let z = PauliSum::new(vec![PauliTerm::parse("Z", 1.0).unwrap()]);
        let err = dev.expectation(&ansatz, &[f64::INFINITY], &z).await.unwrap_err();
        assert!(matches!(err, DeviceError::ExecutionFailed(_)));
        assert!(err.to_string().contains("+1 Z"));
    }

    #[tokio::test]
    async fn test_rejects_mismatched_ansatz() {
        let dev = StateVectorDevice::analytic(3);
        let ansatz = Ansatz::hardware_efficient(2, 0);
        assert!(dev.expectation(&ansatz, &[0.0, 0.0], &zz()).await.is_err());
    }

    #[test]
    fn test_zero_shots_rejected() {
        assert!(StateVectorDevice::sampled(2, 0, None).is_err());
    }
}
