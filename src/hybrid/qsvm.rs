// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_qsvm`: binary-weight SVM training as a diagonal QUBO.
//!
//! Each training sample `i` gets a weight `αᵢ ∈ {0, 1}` on wire `i`. The
//! dual objective `½ Σᵢⱼ αᵢαⱼyᵢyⱼKᵢⱼ − Σᵢ αᵢ` is minimized by VQE and the
//! most probable assignment selects the support vectors.

use serde::Serialize;
use tracing::info;

use super::{most_probable, normalized_diagonal, RunContext};
use crate::error::Result;
use crate::quantum::bitstring;
use crate::validation::validate_kernel;
use crate::vqe::{custom_vqe, VqeResult};

/// Arguments for `vqe_qsvm`.
#[derive(Debug, Clone)]
pub struct QsvmArgs {
    /// `kernel_matrix`
    pub kernel: Vec<Vec<f64>>,
    /// `labels`, each `1` or `-1`
    pub labels: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QsvmOutcome {
    /// `αᵢ` per training sample.
    pub alphas: Vec<u8>,
    pub support_vectors: Vec<usize>,
    /// Dual objective of the selected assignment.
    pub objective: f64,
    /// Average margin offset over support vectors, `None` when there are none.
    pub bias: Option<f64>,
    pub bitstring: String,
    pub probability: f64,
    pub cost_scale: f64,
    pub vqe: VqeResult,
}

/// Dual objective for a weight assignment.
pub fn dual_objective(kernel: &[Vec<f64>], labels: &[f64], alphas: &[u8]) -> f64 {
    let n = labels.len();
    let mut quad = 0.0;
    for i in 0..n {
        for j in 0..n {
            quad += f64::from(alphas[i] * alphas[j]) * labels[i] * labels[j] * kernel[i][j];
        }
    }
    0.5 * quad - alphas.iter().map(|&a| f64::from(a)).sum::<f64>()
}

/// Weights of samples `0..n` encoded in a basis index on `wires` wires.
fn alphas(index: usize, n: usize, wires: usize) -> Vec<u8> {
    (0..n)
        .map(|i| ((index >> (wires - 1 - i)) & 1) as u8)
        .collect()
}

/// `b = mean_s (y_s − Σᵢ αᵢyᵢKᵢₛ)` over support vectors `s`.
fn bias(kernel: &[Vec<f64>], labels: &[f64], alphas: &[u8]) -> Option<f64> {
    let support: Vec<usize> = (0..alphas.len()).filter(|&i| alphas[i] == 1).collect();
    if support.is_empty() {
        return None;
    }
    let total: f64 = support
        .iter()
        .map(|&s| {
            let margin: f64 = support.iter().map(|&i| labels[i] * kernel[i][s]).sum();
            labels[s] - margin
        })
        .sum();
    Some(total / support.len() as f64)
}

pub async fn run(ctx: &RunContext, args: QsvmArgs) -> Result<QsvmOutcome> {
    validate_kernel(&args.kernel, &args.labels, ctx.wires)?;
    let n = args.labels.len();

    let values: Vec<f64> = (0..1usize << ctx.wires)
        .map(|x| dual_objective(&args.kernel, &args.labels, &alphas(x, n, ctx.wires)))
        .collect();
    let (hamiltonian, cost_scale) = normalized_diagonal(ctx.wires, &values);

    let ansatz = ctx.ansatz();
    let vqe = custom_vqe(ctx.device.as_ref(), &hamiltonian, &ansatz, None, &ctx.options).await?;

    let probs = ctx.device.probabilities(&ansatz, &vqe.params).await?;
    let (index, probability) = most_probable(&probs);
    let alphas = alphas(index, n, ctx.wires);
    let support_vectors: Vec<usize> = (0..n).filter(|&i| alphas[i] == 1).collect();
    let objective = dual_objective(&args.kernel, &args.labels, &alphas);
    let bias = bias(&args.kernel, &args.labels, &alphas);

    info!(
        samples = n,
        support_vectors = support_vectors.len(),
        objective,
        "QSVM training finished"
    );

    Ok(QsvmOutcome {
        alphas,
        support_vectors,
        objective,
        bias,
        bitstring: bitstring(index, ctx.wires),
        probability,
        cost_scale,
        vqe,
    })
}
