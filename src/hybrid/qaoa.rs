// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_qaoa`: QAOA ansatz of depth `p` minimizing a problem Hamiltonian.
//!
//! Ref: Farhi, Goldstone, Gutmann (2014), arXiv:1411.4028.

use serde::Serialize;
use tracing::info;

use super::{basis_energy, most_probable, RunContext};
use crate::error::Result;
use crate::quantum::{bitstring, Ansatz, PauliSum};
use crate::validation::validate_width;
use crate::vqe::{custom_vqe, VqeResult};

/// Arguments for `vqe_qaoa`.
#[derive(Debug, Clone)]
pub struct QaoaArgs {
    /// `H_problem`
    pub problem: PauliSum,
    /// `H_mixer`, `Σ X_i` when absent
    pub mixer: Option<PauliSum>,
    /// `p`
    pub depth: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct QaoaOutcome {
    #[serde(flatten)]
    pub vqe: VqeResult,
    /// `[γ_0, ..., γ_{p-1}]`
    pub gammas: Vec<f64>,
    /// `[β_0, ..., β_{p-1}]`
    pub betas: Vec<f64>,
    /// Most probable computational basis state, wire 0 first.
    pub bitstring: String,
    pub probability: f64,
    /// `⟨x|H_problem|x⟩` for that bitstring.
    pub cost: f64,
}

pub async fn run(ctx: &RunContext, args: QaoaArgs) -> Result<QaoaOutcome> {
    validate_width(&args.problem, ctx.wires, "H_problem")?;
    let mixer = match args.mixer {
        Some(m) => {
            validate_width(&m, ctx.wires, "H_mixer")?;
            m
        }
        None => PauliSum::transverse_field(ctx.wires),
    };

    let ansatz = Ansatz::qaoa(ctx.wires, args.depth, &args.problem, &mixer);
    let vqe = custom_vqe(
        ctx.device.as_ref(),
        &args.problem,
        &ansatz,
        None,
        &ctx.options,
    )
    .await?;

    let probs = ctx.device.probabilities(&ansatz, &vqe.params).await?;
    let (index, probability) = most_probable(&probs);
    let cost = basis_energy(&args.problem, ctx.wires, index);
    let bitstring = bitstring(index, ctx.wires);

    info!(depth = args.depth, %bitstring, cost, "QAOA finished");

    let gammas = vqe.params.iter().step_by(2).copied().collect();
    let betas = vqe.params.iter().skip(1).step_by(2).copied().collect();
    Ok(QaoaOutcome {
        vqe,
        gammas,
        betas,
        bitstring,
        probability,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::PauliTerm;
    use crate::test_utils::context;

    #[tokio::test]
    async fn test_finds_lowest_cost_bitstring() {
        // Z0 + Z1 is minimized by |11⟩ with cost -2.
        let mut ctx = context(2);
        ctx.options.steps = 80;
        ctx.options.stepsize = 0.2;
        let args = QaoaArgs {
            problem: PauliSum::new(vec![
                PauliTerm::parse("ZI", 1.0).unwrap(),
                PauliTerm::parse("IZ", 1.0).unwrap(),
            ]),
            mixer: None,
            depth: 1,
        };
        let out = run(&ctx, args).await.unwrap();
        assert!(out.vqe.energy < -1.99, "energy = {}", out.vqe.energy);
        assert_eq!(out.bitstring, "11");
        assert!(out.probability > 0.99);
        assert!((out.cost + 2.0).abs() < 1e-12);
        assert_eq!(out.gammas.len(), 1);
        assert_eq!(out.betas.len(), 1);
        assert_eq!(out.vqe.energy_history.len(), 81);
    }

    #[tokio::test]
    async fn test_rejects_wide_problem() {
        let ctx = context(2);
        let args = QaoaArgs {
            problem: PauliSum::new(vec![PauliTerm::parse("ZZZ", 1.0).unwrap()]),
            mixer: None,
            depth: 1,
        };
        let err = run(&ctx, args).await.unwrap_err();
        assert!(err.to_string().contains("H_problem"));
    }
}
