// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_vqf`: variational factoring of `N ≤ 49`.
//!
//! Both factors are odd three-bit numbers encoded on wires 0..4:
//! `p = 1 + 2b₀ + 4b₁`, `q = 1 + 2b₂ + 4b₃`. The cost is the diagonal
//! operator `(N − p·q)²`, scaled to unit norm.

use serde::Serialize;
use tracing::info;

use super::{most_probable, normalized_diagonal, RunContext};
use crate::error::{Result, ValidationError};
use crate::quantum::bitstring;
use crate::vqe::{custom_vqe, VqeResult};

/// Wires that carry factor bits.
pub const FACTOR_WIRES: usize = 4;

/// Largest product representable by two encoded factors (7 × 7).
pub const MAX_N: u64 = 49;

/// Arguments for `vqe_vqf`, from `multiplication_circuit`.
#[derive(Debug, Clone)]
pub struct VqfArgs {
    /// Number to factor.
    pub n: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct VqfOutcome {
    pub n: u64,
    pub p: u64,
    pub q: u64,
    pub product: u64,
    /// `N − p·q` for the decoded factors.
    pub residual: i64,
    pub solved: bool,
    pub bitstring: String,
    pub probability: f64,
    /// Factor dividing the raw cost before optimization.
    pub cost_scale: f64,
    pub vqe: VqeResult,
}

/// Decode `(p, q)` from a basis index on `wires` wires.
pub fn decode_factors(index: usize, wires: usize) -> (u64, u64) {
    let bit = |k: usize| ((index >> (wires - 1 - k)) & 1) as u64;
    (1 + 2 * bit(0) + 4 * bit(1), 1 + 2 * bit(2) + 4 * bit(3))
}

/// Raw cost `(N − p·q)²` for every basis state on `wires` wires.
pub fn factoring_cost(n: u64, wires: usize) -> Vec<f64> {
    (0..1usize << wires)
        .map(|x| {
            let (p, q) = decode_factors(x, wires);
            let diff = n as f64 - (p * q) as f64;
            diff * diff
        })
        .collect()
}

pub async fn run(ctx: &RunContext, args: VqfArgs) -> Result<VqfOutcome> {
    if ctx.wires < FACTOR_WIRES {
        return Err(ValidationError::ResourceLimit {
            resource: "wires".into(),
            limit: FACTOR_WIRES as u64,
            requested: ctx.wires as u64,
        }
        .into());
    }
    if args.n == 0 || args.n > MAX_N {
        return Err(ValidationError::Field {
            field: "multiplication_circuit.n".into(),
            message: format!("must be between 1 and {}", MAX_N),
        }
        .into());
    }

    let (hamiltonian, cost_scale) = normalized_diagonal(ctx.wires, &factoring_cost(args.n, ctx.wires));
    let ansatz = ctx.ansatz();
    let vqe = custom_vqe(ctx.device.as_ref(), &hamiltonian, &ansatz, None, &ctx.options).await?;

    let probs = ctx.device.probabilities(&ansatz, &vqe.params).await?;
    let (index, probability) = most_probable(&probs);
    let (p, q) = decode_factors(index, ctx.wires);
    let product = p * q;
    let residual = args.n as i64 - product as i64;

    info!(n = args.n, p, q, residual, "Variational factoring finished");

    Ok(VqfOutcome {
        n: args.n,
        p,
        q,
        product,
        residual,
        solved: residual == 0,
        bitstring: bitstring(index, ctx.wires),
        probability,
        cost_scale,
        vqe,
    })
}
