// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_qpe`: variational eigenphase estimation.
//!
//! Minimizing `H = I − (U + U†)/2` drives the state toward the eigenvector
//! of `U` whose eigenphase is closest to zero. The phase is then read off as
//! `atan2(⟨B⟩, ⟨A⟩)` with `A = (U + U†)/2` and `B = (U − U†)/2i`, so that
//! `⟨U⟩ = ⟨A⟩ + i⟨B⟩`.

use ndarray::Array2;
use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::TAU;
use tracing::info;

use super::RunContext;
use crate::error::Result;
use crate::quantum::{Ansatz, PauliSum};
use crate::validation::{parse_bitstring, validate_unitary};
use crate::vqe::{custom_vqe, VqeResult};

/// Arguments for `vqe_qpe`.
#[derive(Debug, Clone)]
pub struct QpeArgs {
    /// `U`
    pub unitary: Array2<Complex64>,
    /// `initial_state` bitstring, wire 0 first
    pub initial_state: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QpeOutcome {
    /// Eigenphase in `(-π, π]`.
    pub eigenphase: f64,
    /// Eigenphase as a fraction of a full turn, in `[0, 1)`.
    pub phase_fraction: f64,
    /// `[Re⟨U⟩, Im⟨U⟩]`
    pub expectation: [f64; 2],
    /// `|⟨U⟩|`, 1 for an exact eigenstate.
    pub overlap: f64,
    /// Qubits `U` acts on.
    pub qubits: usize,
    pub vqe: VqeResult,
}

/// Split `U` into its Hermitian parts `(A, B)` with `U = A + iB`.
fn hermitian_parts(u: &Array2<Complex64>) -> (Array2<Complex64>, Array2<Complex64>) {
    let u_dag = u.t().mapv(|x| x.conj());
    let a = (u + &u_dag).mapv(|x| x * 0.5);
    let b = (u - &u_dag).mapv(|x| x * Complex64::new(0.0, -0.5));
    (a, b)
}

pub async fn run(ctx: &RunContext, args: QpeArgs) -> Result<QpeOutcome> {
    let qubits = validate_unitary(&args.unitary, ctx.wires)?;
    let initial = match &args.initial_state {
        Some(bits) => parse_bitstring(bits, ctx.wires, "initial_state")?,
        None => 0,
    };

    let (a, b) = hermitian_parts(&args.unitary);
    let identity = Array2::<Complex64>::eye(a.nrows());
    let cost = PauliSum::from_hermitian(&(&identity - &a))?;
    let real_part = PauliSum::from_hermitian(&a)?;
    let imag_part = PauliSum::from_hermitian(&b)?;

    let ansatz = Ansatz::hardware_efficient_from(ctx.wires, ctx.layers, initial);
    let device = ctx.device.as_ref();
    let vqe = custom_vqe(device, &cost, &ansatz, None, &ctx.options).await?;

    let re = device.expectation(&ansatz, &vqe.params, &real_part).await?;
    let im = device.expectation(&ansatz, &vqe.params, &imag_part).await?;
    let eigenphase = im.atan2(re);
    let phase_fraction = (eigenphase / TAU).rem_euclid(1.0);

    info!(qubits, eigenphase, overlap = re.hypot(im), "Eigenphase estimated");

    Ok(QpeOutcome {
        eigenphase,
        phase_fraction,
        expectation: [re, im],
        overlap: re.hypot(im),
        qubits,
        vqe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::context;
    use std::f64::consts::{FRAC_PI_4, PI};

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_hermitian_parts_recombine() {
        let u = Array2::from_shape_vec((2, 2), vec![c(0.0, 1.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)])
            .unwrap();
        let (a, b) = hermitian_parts(&u);
        let recombined = &a + &b.mapv(|x| x * c(0.0, 1.0));
        for (x, y) in recombined.iter().zip(u.iter()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[tokio::test]
    async fn test_global_phase() {
        let ctx = context(1);
        let phase = c(FRAC_PI_4.cos(), FRAC_PI_4.sin());
        let u = Array2::from_shape_vec((2, 2), vec![phase, c(0.0, 0.0), c(0.0, 0.0), phase]).unwrap();
        let out = run(
            &ctx,
            QpeArgs {
                unitary: u,
                initial_state: None,
            },
        )
        .await
        .unwrap();
        assert!((out.eigenphase - FRAC_PI_4).abs() < 1e-9);
        assert!((out.phase_fraction - 0.125).abs() < 1e-9);
        assert!((out.overlap - 1.0).abs() < 1e-9);
        assert_eq!(out.qubits, 1);
    }

    #[tokio::test]
    async fn test_finds_plus_eigenvector_of_x() {
        let mut ctx = context(1);
        ctx.layers = 0;
        ctx.options.steps = 100;
        ctx.options.stepsize = 0.4;
        let u = Array2::from_shape_vec((2, 2), vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
            .unwrap();
        let out = run(
            &ctx,
            QpeArgs {
                unitary: u,
                initial_state: Some("1".into()),
            },
        )
        .await
        .unwrap();
        assert!(out.vqe.energy < 1e-3, "energy = {}", out.vqe.energy);
        assert!(out.eigenphase.abs() < 1e-3);
        assert!(out.expectation[0] > 0.999);
    }

    #[tokio::test]
    async fn test_unitary_on_subset_of_wires() {
        let ctx = context(2);
        // Z on wire 0: eigenphases 0 and π
        let u = Array2::from_shape_vec((2, 2), vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)])
            .unwrap();
        let out = run(
            &ctx,
            QpeArgs {
                unitary: u,
                initial_state: Some("00".into()),
            },
        )
        .await
        .unwrap();
        assert!(out.eigenphase.abs() < PI);
        assert_eq!(out.qubits, 1);
    }

    #[tokio::test]
    async fn test_rejects_non_unitary_and_bad_state() {
        let ctx = context(1);
        let m = Array2::from_shape_vec((2, 2), vec![c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)])
            .unwrap();
        let err = run(
            &ctx,
            QpeArgs {
                unitary: m,
                initial_state: None,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("unitary"));

        let err = run(
            &ctx,
            QpeArgs {
                unitary: Array2::eye(2),
                initial_state: Some("10".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("initial_state"));
    }
}
