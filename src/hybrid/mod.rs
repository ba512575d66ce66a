// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hybrid routines behind `POST /oracle`.
//!
//! Each routine builds a problem Hamiltonian from request parameters and
//! hands it to [`custom_vqe`](crate::vqe::custom_vqe):
//!
//! | mode         | module       |
//! |--------------|--------------|
//! | `vqe_qaoa`   | [`qaoa`]     |
//! | `vqe_vqf`    | [`vqf`]      |
//! | `vqe_qgans`  | [`qgans`]    |
//! | `vqe_qsvm`   | [`qsvm`]     |
//! | `vqe_qpe`    | [`qpe`]      |
//! | `vqe_krylov` | [`krylov`]   |
//!
//! [`dispatch`] maps a mode string and its `params` object to typed
//! arguments and calls the matching [`HybridSolver`] method.

pub mod krylov;
pub mod qaoa;
pub mod qgans;
pub mod qpe;
pub mod qsvm;
pub mod vqf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::config::{ResourceLimits, VqeSettings};
use crate::device::QuantumDevice;
use crate::error::{Result, ValidationError};
use crate::quantum::pauli::complex_matrix;
use crate::quantum::{Ansatz, HamiltonianSpec, PauliSum, StateVector};
use crate::validation::{self, Params};
use crate::vqe::VqeOptions;

pub use krylov::KrylovArgs;
pub use qaoa::QaoaArgs;
pub use qgans::QganArgs;
pub use qpe::QpeArgs;
pub use qsvm::QsvmArgs;
pub use vqf::VqfArgs;

/// One of the six hybrid routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleMode {
    Qaoa,
    Vqf,
    Qgans,
    Qsvm,
    Qpe,
    Krylov,
}

impl OracleMode {
    /// All modes, in dispatch order.
    pub const ALL: [OracleMode; 6] = [
        OracleMode::Qaoa,
        OracleMode::Vqf,
        OracleMode::Qgans,
        OracleMode::Qsvm,
        OracleMode::Qpe,
        OracleMode::Krylov,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OracleMode::Qaoa => "vqe_qaoa",
            OracleMode::Vqf => "vqe_vqf",
            OracleMode::Qgans => "vqe_qgans",
            OracleMode::Qsvm => "vqe_qsvm",
            OracleMode::Qpe => "vqe_qpe",
            OracleMode::Krylov => "vqe_krylov",
        }
    }
}

impl fmt::Display for OracleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OracleMode {
    type Err = ValidationError;

    /// Exact match only.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        OracleMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownMode(s.to_string()))
    }
}

/// Everything a routine needs besides its own arguments.
#[derive(Clone)]
pub struct RunContext {
    pub device: Arc<dyn QuantumDevice>,
    pub wires: usize,
    pub layers: usize,
    pub options: VqeOptions,
    pub limits: ResourceLimits,
}

impl RunContext {
    pub fn new(
        device: Arc<dyn QuantumDevice>,
        settings: &VqeSettings,
        limits: &ResourceLimits,
    ) -> Self {
        let wires = device.num_wires();
        Self {
            device,
            wires,
            layers: settings.layers as usize,
            options: VqeOptions::from(settings),
            limits: limits.clone(),
        }
    }

    /// Hardware-efficient ansatz on the full register.
    pub fn ansatz(&self) -> Ansatz {
        Ansatz::hardware_efficient(self.wires, self.layers)
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("device", &self.device.name())
            .field("wires", &self.wires)
            .field("layers", &self.layers)
            .field("options", &self.options)
            .finish()
    }
}

/// The six hybrid routines. Each returns the JSON `result` value.
#[async_trait]
pub trait HybridSolver: Send + Sync {
    async fn qaoa(&self, ctx: &RunContext, args: QaoaArgs) -> Result<Value>;
    async fn vqf(&self, ctx: &RunContext, args: VqfArgs) -> Result<Value>;
    async fn qgans(&self, ctx: &RunContext, args: QganArgs) -> Result<Value>;
    async fn qsvm(&self, ctx: &RunContext, args: QsvmArgs) -> Result<Value>;
    async fn qpe(&self, ctx: &RunContext, args: QpeArgs) -> Result<Value>;
    async fn krylov(&self, ctx: &RunContext, args: KrylovArgs) -> Result<Value>;
}

/// Solver backed by [`custom_vqe`](crate::vqe::custom_vqe) on the context's
/// device.
#[derive(Debug, Default, Clone, Copy)]
pub struct Oracle;

#[async_trait]
impl HybridSolver for Oracle {
    async fn qaoa(&self, ctx: &RunContext, args: QaoaArgs) -> Result<Value> {
        Ok(serde_json::to_value(qaoa::run(ctx, args).await?)?)
    }

    async fn vqf(&self, ctx: &RunContext, args: VqfArgs) -> Result<Value> {
        Ok(serde_json::to_value(vqf::run(ctx, args).await?)?)
    }

    async fn qgans(&self, ctx: &RunContext, args: QganArgs) -> Result<Value> {
        Ok(serde_json::to_value(qgans::run(ctx, args).await?)?)
    }

    async fn qsvm(&self, ctx: &RunContext, args: QsvmArgs) -> Result<Value> {
        Ok(serde_json::to_value(qsvm::run(ctx, args).await?)?)
    }

    async fn qpe(&self, ctx: &RunContext, args: QpeArgs) -> Result<Value> {
        Ok(serde_json::to_value(qpe::run(ctx, args).await?)?)
    }

    async fn krylov(&self, ctx: &RunContext, args: KrylovArgs) -> Result<Value> {
        Ok(serde_json::to_value(krylov::run(ctx, args).await?)?)
    }
}

/// Square matrix in request parameters: complex `[re, im]` entries or
/// plain reals.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MatrixParam {
    Complex(Vec<Vec<[f64; 2]>>),
    Real(Vec<Vec<f64>>),
}

impl MatrixParam {
    fn into_complex_rows(self) -> Vec<Vec<[f64; 2]>> {
        match self {
            MatrixParam::Complex(rows) => rows,
            MatrixParam::Real(rows) => rows
                .into_iter()
                .map(|row| row.into_iter().map(|re| [re, 0.0]).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MultiplicationCircuit {
    n: u64,
}

fn hamiltonian(params: &Params, field: &str) -> Result<PauliSum> {
    let spec: HamiltonianSpec = validation::required(params, field)?;
    PauliSum::try_from(spec).map_err(|e| rename_field(e, field).into())
}

fn optional_hamiltonian(params: &Params, field: &str) -> Result<Option<PauliSum>> {
    match validation::optional::<HamiltonianSpec>(params, field)? {
        Some(spec) => PauliSum::try_from(spec)
            .map(Some)
            .map_err(|e| rename_field(e, field).into()),
        None => Ok(None),
    }
}

/// Report Hamiltonian parse errors against the request field.
fn rename_field(err: ValidationError, field: &str) -> ValidationError {
    match err {
        ValidationError::Field { message, .. } => ValidationError::Field {
            field: field.into(),
            message,
        },
        other => other,
    }
}

/// Parse `mode`, extract its arguments from `params`, and run it.
pub async fn dispatch(
    solver: &dyn HybridSolver,
    ctx: &RunContext,
    mode: &str,
    params: &Params,
) -> Result<Value> {
    let mode: OracleMode = mode.parse()?;
    debug!(mode = %mode, device = %ctx.device.name(), "Dispatching hybrid routine");

    match mode {
        OracleMode::Qaoa => {
            let depth = validation::optional::<u64>(params, "p")?.unwrap_or(1);
            let args = QaoaArgs {
                problem: hamiltonian(params, "H_problem")?,
                mixer: optional_hamiltonian(params, "H_mixer")?,
                depth: validation::validate_qaoa_depth(depth, &ctx.limits)?,
            };
            solver.qaoa(ctx, args).await
        }
        OracleMode::Vqf => {
            let circuit: MultiplicationCircuit =
                validation::required(params, "multiplication_circuit")?;
            solver.vqf(ctx, VqfArgs { n: circuit.n }).await
        }
        OracleMode::Qgans => {
            let args = QganArgs {
                generator: hamiltonian(params, "generator")?,
                discriminator: hamiltonian(params, "discriminator")?,
                params_g: validation::optional(params, "params_g")?,
                params_d: validation::optional(params, "params_d")?,
            };
            solver.qgans(ctx, args).await
        }
        OracleMode::Qsvm => {
            let args = QsvmArgs {
                kernel: validation::required(params, "kernel_matrix")?,
                labels: validation::required(params, "labels")?,
            };
            solver.qsvm(ctx, args).await
        }
        OracleMode::Qpe => {
            let rows = validation::required::<MatrixParam>(params, "U")?.into_complex_rows();
            let unitary = complex_matrix(&rows).map_err(|e| rename_field(e, "U"))?;
            let args = QpeArgs {
                unitary,
                initial_state: validation::optional(params, "initial_state")?,
            };
            solver.qpe(ctx, args).await
        }
        OracleMode::Krylov => {
            let size = validation::optional::<u64>(params, "subspace_size")?.unwrap_or(3);
            let args = KrylovArgs {
                hamiltonian: hamiltonian(params, "H")?,
                subspace_size: validation::validate_subspace_size(size, &ctx.limits)?,
            };
            solver.krylov(ctx, args).await
        }
    }
}

/// Most probable basis state. Ties go to the lowest index.
pub(crate) fn most_probable(probs: &[f64]) -> (usize, f64) {
    probs
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, p)| {
            if p > best.1 {
                (i, p)
            } else {
                best
            }
        })
}

/// Diagonal cost `Σ_x f(x)|x⟩⟨x|` scaled so `max |f| = 1`. Returns the
/// scaled Hamiltonian and the scale factor.
pub(crate) fn normalized_diagonal(wires: usize, values: &[f64]) -> (PauliSum, f64) {
    let scale = values.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let scaled: Vec<f64> = values.iter().map(|v| v / scale).collect();
    (PauliSum::from_diagonal(wires, &scaled), scale)
}

/// Energy of a basis state.
pub(crate) fn basis_energy(hamiltonian: &PauliSum, wires: usize, index: usize) -> f64 {
    StateVector::basis(wires, index).expectation(hamiltonian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::StateVectorDevice;
    use crate::test_utils::{context, RecordingSolver, SolverCall};
    use serde_json::json;

    fn params(v: Value) -> Params {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_modes() {
        for mode in OracleMode::ALL {
            assert_eq!(mode.as_str().parse::<OracleMode>().unwrap(), mode);
        }
        let err = "vqe_nope".parse::<OracleMode>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid mode: vqe_nope");
        assert!("VQE_QAOA".parse::<OracleMode>().is_err());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_mode() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let err = dispatch(&solver, &ctx, "shor", &Params::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(solver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_qaoa_extracts_fields() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({
            "H_problem": [{"coeff": 1.0, "pauli": "ZZ"}],
            "H_mixer": {"terms": [{"coeff": 1.0, "pauli": "XI"}]},
            "p": 3
        }));
        let result = dispatch(&solver, &ctx, "vqe_qaoa", &p).await.unwrap();
        assert_eq!(result["mode"], "vqe_qaoa");

        let calls = solver.calls();
        assert_eq!(calls.len(), 1);
        let SolverCall::Qaoa(args) = &calls[0] else {
            panic!("expected qaoa call, got {:?}", calls[0]);
        };
        assert_eq!(args.depth, 3);
        assert_eq!(args.problem.terms()[0].to_string(), "+1 ZZ");
        assert!(args.mixer.is_some());
    }

    #[tokio::test]
    async fn test_dispatch_qaoa_defaults() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({"H_problem": [{"coeff": 1.0, "pauli": "Z"}]}));
        dispatch(&solver, &ctx, "vqe_qaoa", &p).await.unwrap();
        let calls = solver.calls();
        let SolverCall::Qaoa(args) = &calls[0] else {
            panic!("expected qaoa call");
        };
        assert_eq!(args.depth, 1);
        assert!(args.mixer.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_qaoa_rejects_bad_depth() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({"H_problem": [{"coeff": 1.0, "pauli": "Z"}], "p": "two"}));
        let err = dispatch(&solver, &ctx, "vqe_qaoa", &p).await.unwrap_err();
        assert!(err.to_string().contains("Field 'p'"));

        let p = params(json!({"H_problem": [{"coeff": 1.0, "pauli": "Z"}], "p": 99}));
        assert!(dispatch(&solver, &ctx, "vqe_qaoa", &p).await.is_err());
        assert!(solver.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_missing_field_is_named() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let err = dispatch(&solver, &ctx, "vqe_qaoa", &Params::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Field 'H_problem': is required"));

        let err = dispatch(&solver, &ctx, "vqe_krylov", &Params::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Field 'H'"));
    }

    #[tokio::test]
    async fn test_dispatch_vqf() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({"multiplication_circuit": {"n": 15}}));
        dispatch(&solver, &ctx, "vqe_vqf", &p).await.unwrap();
        let calls = solver.calls();
        let SolverCall::Vqf(args) = &calls[0] else {
            panic!("expected vqf call");
        };
        assert_eq!(args.n, 15);

        let bad = params(json!({"multiplication_circuit": 15}));
        assert!(dispatch(&solver, &ctx, "vqe_vqf", &bad).await.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_qgans() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({
            "generator": [{"coeff": 1.0, "pauli": "Z"}],
            "discriminator": [{"coeff": -1.0, "pauli": "X"}],
            "params_g": [0.1, 0.2]
        }));
        dispatch(&solver, &ctx, "vqe_qgans", &p).await.unwrap();
        let calls = solver.calls();
        let SolverCall::Qgans(args) = &calls[0] else {
            panic!("expected qgans call");
        };
        assert_eq!(args.params_g.as_deref(), Some(&[0.1, 0.2][..]));
        assert!(args.params_d.is_none());
        assert_eq!(args.discriminator.terms()[0].coeff, -1.0);
    }

    #[tokio::test]
    async fn test_dispatch_qsvm() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({
            "kernel_matrix": [[1.0, 0.2], [0.2, 1.0]],
            "labels": [1, -1]
        }));
        dispatch(&solver, &ctx, "vqe_qsvm", &p).await.unwrap();
        let calls = solver.calls();
        let SolverCall::Qsvm(args) = &calls[0] else {
            panic!("expected qsvm call");
        };
        assert_eq!(args.kernel.len(), 2);
        assert_eq!(args.labels, vec![1.0, -1.0]);
    }

    #[tokio::test]
    async fn test_dispatch_qpe_accepts_real_and_complex() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let real = params(json!({"U": [[0.0, 1.0], [1.0, 0.0]], "initial_state": "1"}));
        dispatch(&solver, &ctx, "vqe_qpe", &real).await.unwrap();
        let complex = params(json!({"U": [[[1.0, 0.0], [0.0, 0.0]], [[0.0, 0.0], [0.0, 1.0]]]}));
        dispatch(&solver, &ctx, "vqe_qpe", &complex).await.unwrap();

        let calls = solver.calls();
        let SolverCall::Qpe(first) = &calls[0] else {
            panic!("expected qpe call");
        };
        assert_eq!(first.unitary[[0, 1]].re, 1.0);
        assert_eq!(first.initial_state.as_deref(), Some("1"));
        let SolverCall::Qpe(second) = &calls[1] else {
            panic!("expected qpe call");
        };
        assert_eq!(second.unitary[[1, 1]].im, 1.0);
        assert!(second.initial_state.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_krylov_default_subspace() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({"H": [{"coeff": 1.0, "pauli": "ZZ"}]}));
        dispatch(&solver, &ctx, "vqe_krylov", &p).await.unwrap();
        let calls = solver.calls();
        let SolverCall::Krylov(args) = &calls[0] else {
            panic!("expected krylov call");
        };
        assert_eq!(args.subspace_size, 3);
    }

    #[tokio::test]
    async fn test_each_mode_reaches_its_method() {
        let solver = RecordingSolver::default();
        let ctx = context(4);
        let p = params(json!({
            "H_problem": [{"coeff": 1.0, "pauli": "Z"}],
            "multiplication_circuit": {"n": 21},
            "generator": [{"coeff": 1.0, "pauli": "Z"}],
            "discriminator": [{"coeff": 1.0, "pauli": "Z"}],
            "kernel_matrix": [[1.0]],
            "labels": [1],
            "U": [[1.0, 0.0], [0.0, 1.0]],
            "H": [{"coeff": 1.0, "pauli": "Z"}]
        }));
        for mode in OracleMode::ALL {
            let result = dispatch(&solver, &ctx, mode.as_str(), &p).await.unwrap();
            assert_eq!(result["mode"], mode.as_str());
        }
        assert_eq!(solver.calls().len(), 6);
    }

    #[test]
    fn test_most_probable() {
        assert_eq!(most_probable(&[0.1, 0.6, 0.3]), (1, 0.6));
        assert_eq!(most_probable(&[0.5, 0.5]), (0, 0.5));
    }

    #[test]
    fn test_normalized_diagonal() {
        let (h, scale) = normalized_diagonal(1, &[4.0, -2.0]);
        assert_eq!(scale, 4.0);
        assert!((basis_energy(&h, 1, 0) - 1.0).abs() < 1e-12);
        assert!((basis_energy(&h, 1, 1) + 0.5).abs() < 1e-12);

        let (_, unit) = normalized_diagonal(1, &[0.0, 0.0]);
        assert_eq!(unit, 1.0);
    }

    #[test]
    fn test_run_context_from_device() {
        let device = Arc::new(StateVectorDevice::analytic(3));
        let settings = VqeSettings {
            layers: 1,
            steps: 7,
            ..VqeSettings::default()
        };
        let ctx = RunContext::new(device, &settings, &ResourceLimits::default());
        assert_eq!(ctx.wires, 3);
        assert_eq!(ctx.options.steps, 7);
        assert_eq!(ctx.ansatz().num_params(), 6);
    }
}
