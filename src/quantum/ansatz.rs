// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Parameterized circuits prepared by the hybrid routines.

use ndarray::Array2;
use num_complex::Complex64;

use super::expm::evolution;
use super::pauli::PauliSum;
use super::state::StateVector;
use crate::error::DeviceError;

/// A parameterized state-preparation circuit.
#[derive(Debug, Clone)]
pub enum Ansatz {
    /// RY rotation layer, then `layers` × (CZ chain, RY layer).
    ///
    /// Parameters: `wires * (layers + 1)`.
    HardwareEfficient {
        wires: usize,
        layers: usize,
        /// Basis state prepared with X gates before the first rotation layer
        initial_state: usize,
    },
    /// `|+⟩^n`, then `depth` × (`exp(-iγH_C)`, `exp(-iβH_M)`).
    ///
    /// Parameters: `[γ_0, β_0, γ_1, β_1, ...]`.
    Qaoa {
        wires: usize,
        depth: usize,
        cost: Array2<Complex64>,
        mixer: Array2<Complex64>,
    },
}

impl Ansatz {
    pub fn hardware_efficient(wires: usize, layers: usize) -> Self {
        Ansatz::HardwareEfficient {
            wires,
            layers,
            initial_state: 0,
        }
    }

    /// Hardware-efficient ansatz starting from basis state `initial_state`.
    pub fn hardware_efficient_from(wires: usize, layers: usize, initial_state: usize) -> Self {
        Ansatz::HardwareEfficient {
            wires,
            layers,
            initial_state,
        }
    }

    /// QAOA ansatz. Both operators are densified on `wires` qubits up front.
    pub fn qaoa(wires: usize, depth: usize, cost: &PauliSum, mixer: &PauliSum) -> Self {
        Ansatz::Qaoa {
            wires,
            depth,
            cost: cost.to_matrix(wires),
            mixer: mixer.to_matrix(wires),
        }
    }

    pub fn wires(&self) -> usize {
        match self {
            Ansatz::HardwareEfficient { wires, .. } | Ansatz::Qaoa { wires, .. } => *wires,
        }
    }

    pub fn num_params(&self) -> usize {
        match self {
            Ansatz::HardwareEfficient { wires, layers, .. } => wires * (layers + 1),
            Ansatz::Qaoa { depth, .. } => 2 * depth,
        }
    }

    /// Whether every parameter enters through a single Pauli rotation, so the
    /// two-term parameter-shift rule gives exact gradients.
    pub fn supports_parameter_shift(&self) -> bool {
        matches!(self, Ansatz::HardwareEfficient { .. })
    }

    /// Prepare the state for `params`.
    pub fn prepare(&self, params: &[f64]) -> Result<StateVector, DeviceError> {
        if params.len() != self.num_params() {
            return Err(DeviceError::InvalidRequest(format!(
                "ansatz expects {} parameters, got {}",
                self.num_params(),
                params.len()
            )));
        }

        match self {
            Ansatz::HardwareEfficient {
                wires,
                layers,
                initial_state,
            } => {
                if *initial_state >= 1usize << wires {
                    return Err(DeviceError::InvalidRequest(format!(
                        "initial state {} does not fit on {} wires",
                        initial_state, wires
                    )));
                }
                let mut psi = StateVector::basis(*wires, *initial_state);
                let mut theta = params.iter();
                for w in 0..*wires {
                    psi.ry(w, *theta.next().unwrap_or(&0.0));
                }
                for _ in 0..*layers {
                    for w in 0..wires.saturating_sub(1) {
                        psi.cz(w, w + 1);
                    }
                    for w in 0..*wires {
                        psi.ry(w, *theta.next().unwrap_or(&0.0));
                    }
                }
                Ok(psi)
            }
            Ansatz::Qaoa {
                wires,
                cost,
                mixer,
                ..
            } => {
                let mut psi = StateVector::zero(*wires);
                for w in 0..*wires {
                    psi.h(w);
                }
                for pair in params.chunks_exact(2) {
                    psi.apply_unitary(&evolution(cost, pair[0]));
                    psi.apply_unitary(&evolution(mixer, pair[1]));
                }
                Ok(psi)
            }
        }
    }
}
