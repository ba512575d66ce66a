// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_krylov`: VQE ground state refined in a Krylov subspace.
//!
//! After VQE prepares `|ψ⟩`, the subspace `span{|ψ⟩, H|ψ⟩, …, H^{m-1}|ψ⟩}`
//! is described entirely by the moments `μ_k = ⟨ψ|H^k|ψ⟩`, which the device
//! measures as ordinary expectation values. The projected problem
//! `H̃c = E·Sc` with `S_ij = μ_{i+j}` and `H̃_ij = μ_{i+j+1}` is solved by
//! canonical orthogonalization, dropping directions where `S` is
//! numerically singular.

use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info};

use super::RunContext;
use crate::error::{DeviceError, Result, ValidationError};
use crate::quantum::pauli::MAX_DENSE_QUBITS;
use crate::quantum::{symmetric_eigen, PauliSum};
use crate::validation::validate_width;
use crate::vqe::{custom_vqe, VqeResult};

/// Relative cutoff for overlap-matrix eigenvalues.
const OVERLAP_CUTOFF: f64 = 1e-10;

/// Arguments for `vqe_krylov`.
#[derive(Debug, Clone)]
pub struct KrylovArgs {
    /// `H`
    pub hamiltonian: PauliSum,
    /// `subspace_size`
    pub subspace_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KrylovOutcome {
    pub vqe_energy: f64,
    pub krylov_energy: f64,
    pub subspace_size: usize,
    /// Subspace directions kept after orthogonalization.
    pub effective_dimension: usize,
    /// `⟨ψ|H^k|ψ⟩` for `k = 0..2m`.
    pub moments: Vec<f64>,
    pub vqe: VqeResult,
}

/// Lowest generalized eigenvalue of the Krylov pencil built from `moments`
/// (`2m` entries). Returns the energy and the number of kept directions.
pub fn lowest_krylov_energy(moments: &[f64], m: usize) -> Option<(f64, usize)> {
    if m == 0 || moments.len() < 2 * m {
        return None;
    }
    let s = Array2::from_shape_fn((m, m), |(i, j)| moments[i + j]);
    let h = Array2::from_shape_fn((m, m), |(i, j)| moments[i + j + 1]);

    let (s_vals, s_vecs) = symmetric_eigen(&s);
    let max = s_vals.iter().fold(0.0f64, |a, v| a.max(v.abs()));
    let kept: Vec<usize> = (0..m)
        .filter(|&k| s_vals[k] > OVERLAP_CUTOFF * max)
        .collect();
    if kept.is_empty() {
        return None;
    }

    // X = V_kept · diag(1/√λ), then H' = Xᵀ H X
    let r = kept.len();
    let x = Array2::from_shape_fn((m, r), |(i, c)| {
        s_vecs[[i, kept[c]]] / s_vals[kept[c]].sqrt()
    });
    let projected = x.t().dot(&h).dot(&x);
    let symmetric = Array2::from_shape_fn((r, r), |(i, j)| {
        0.5 * (projected[[i, j]] + projected[[j, i]])
    });
    let (energies, _) = symmetric_eigen(&symmetric);
    energies.first().map(|e| (*e, r))
}

pub async fn run(ctx: &RunContext, args: KrylovArgs) -> Result<KrylovOutcome> {
    validate_width(&args.hamiltonian, ctx.wires, "H")?;
    if ctx.wires > MAX_DENSE_QUBITS {
        return Err(ValidationError::ResourceLimit {
            resource: "krylov_wires".into(),
            limit: MAX_DENSE_QUBITS as u64,
            requested: ctx.wires as u64,
        }
        .into());
    }

    let ansatz = ctx.ansatz();
    let device = ctx.device.as_ref();
    let vqe = custom_vqe(device, &args.hamiltonian, &ansatz, None, &ctx.options).await?;

    // Work with H / ‖H‖ so powers stay bounded.
    let norm = args.hamiltonian.coefficient_norm();
    let norm = if norm > 0.0 { norm } else { 1.0 };
    let h = args
        .hamiltonian
        .to_matrix(ctx.wires)
        .mapv(|x| x / Complex64::new(norm, 0.0));

    let m = args.subspace_size;
    let mut scaled = Vec::with_capacity(2 * m);
    scaled.push(1.0);
    let mut power = h.clone();
    for _ in 1..2 * m {
        let observable = PauliSum::from_hermitian(&power)?;
        scaled.push(device.expectation(&ansatz, &vqe.params, &observable).await?);
        power = power.dot(&h);
    }
    let moments: Vec<f64> = scaled
        .iter()
        .enumerate()
        .map(|(k, mu)| mu * norm.powi(k as i32))
        .collect();
    debug!(?moments, "Krylov moments measured");

    let (lowest, effective_dimension) = lowest_krylov_energy(&scaled, m)
        .ok_or_else(|| DeviceError::ExecutionFailed("Krylov overlap matrix is singular".into()))?;
    let krylov_energy = lowest * norm;

    info!(
        vqe_energy = vqe.energy,
        krylov_energy,
        effective_dimension,
        "Krylov refinement finished"
    );

    Ok(KrylovOutcome {
        vqe_energy: vqe.energy,
        krylov_energy,
        subspace_size: m,
        effective_dimension,
        moments,
        vqe,
    })
}
