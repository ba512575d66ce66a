// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities for oracle tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::config::{ResourceLimits, VqeSettings};
use crate::device::{HealthStatus, QuantumDevice, StateVectorDevice, Tier};
use crate::error::{DeviceError, Result};
use crate::hybrid::{
    HybridSolver, KrylovArgs, QaoaArgs, QganArgs, QpeArgs, QsvmArgs, RunContext, VqfArgs,
};
use crate::quantum::{Ansatz, PauliSum};

/// Run context on an analytic simulator with default VQE settings.
pub fn context(wires: usize) -> RunContext {
    RunContext::new(
        Arc::new(StateVectorDevice::analytic(wires)),
        &VqeSettings::default(),
        &ResourceLimits::default(),
    )
}

/// Mock device that returns a fixed energy and counts evaluations.
pub struct MockDevice {
    pub name: String,
    pub wires: usize,
    pub energy: f64,
    evaluations: AtomicUsize,
}

impl MockDevice {
    pub fn new(wires: usize, energy: f64) -> Self {
        Self {
            name: "mock.device".to_string(),
            wires,
            energy,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuantumDevice for MockDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        Tier::Classical
    }

    fn num_wires(&self) -> usize {
        self.wires
    }

    async fn expectation(
        &self,
        _ansatz: &Ansatz,
        _params: &[f64],
        _observable: &PauliSum,
    ) -> std::result::Result<f64, DeviceError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        Ok(self.energy)
    }

    async fn probabilities(
        &self,
        _ansatz: &Ansatz,
        _params: &[f64],
    ) -> std::result::Result<Vec<f64>, DeviceError> {
        let dim = 1usize << self.wires;
        Ok(vec![1.0 / dim as f64; dim])
    }

    async fn health_check(&self) -> std::result::Result<HealthStatus, DeviceError> {
        Ok(HealthStatus::Healthy)
    }
}

/// Mock device whose executions always fail.
pub struct FailingDevice {
    pub wires: usize,
}

#[async_trait]
impl QuantumDevice for FailingDevice {
    fn name(&self) -> &str {
        "failing.device"
    }

    fn tier(&self) -> Tier {
        Tier::Classical
    }

    fn num_wires(&self) -> usize {
        self.wires
    }

    async fn expectation(
        &self,
        _ansatz: &Ansatz,
        _params: &[f64],
        _observable: &PauliSum,
    ) -> std::result::Result<f64, DeviceError> {
        Err(DeviceError::ExecutionFailed("mock execution failure".to_string()))
    }

    async fn probabilities(
        &self,
        _ansatz: &Ansatz,
        _params: &[f64],
    ) -> std::result::Result<Vec<f64>, DeviceError> {
        Err(DeviceError::ExecutionFailed("mock execution failure".to_string()))
    }

    async fn health_check(&self) -> std::result::Result<HealthStatus, DeviceError> {
        Err(DeviceError::Unavailable("mock device unavailable".to_string()))
    }
}

/// A call received by [`RecordingSolver`].
#[derive(Debug, Clone)]
pub enum SolverCall {
    Qaoa(QaoaArgs),
    Vqf(VqfArgs),
    Qgans(QganArgs),
    Qsvm(QsvmArgs),
    Qpe(QpeArgs),
    Krylov(KrylovArgs),
}

/// Solver that records its arguments and returns `{"mode", "device"}`.
#[derive(Default)]
pub struct RecordingSolver {
    calls: Mutex<Vec<SolverCall>>,
}

impl RecordingSolver {
    pub fn calls(&self) -> Vec<SolverCall> {
        self.calls.lock().clone()
    }

    fn record(&self, ctx: &RunContext, mode: &str, call: SolverCall) -> Result<Value> {
        self.calls.lock().push(call);
        Ok(json!({"mode": mode, "device": ctx.device.name(), "wires": ctx.wires}))
    }
}

#[async_trait]
impl HybridSolver for RecordingSolver {
    async fn qaoa(&self, ctx: &RunContext, args: QaoaArgs) -> Result<Value> {
        self.record(ctx, "vqe_qaoa", SolverCall::Qaoa(args))
    }

    async fn vqf(&self, ctx: &RunContext, args: VqfArgs) -> Result<Value> {
        self.record(ctx, "vqe_vqf", SolverCall::Vqf(args))
    }

    async fn qgans(&self, ctx: &RunContext, args: QganArgs) -> Result<Value> {
        self.record(ctx, "vqe_qgans", SolverCall::Qgans(args))
    }

    async fn qsvm(&self, ctx: &RunContext, args: QsvmArgs) -> Result<Value> {
        self.record(ctx, "vqe_qsvm", SolverCall::Qsvm(args))
    }

    async fn qpe(&self, ctx: &RunContext, args: QpeArgs) -> Result<Value> {
        self.record(ctx, "vqe_qpe", SolverCall::Qpe(args))
    }

    async fn krylov(&self, ctx: &RunContext, args: KrylovArgs) -> Result<Value> {
        self.record(ctx, "vqe_krylov", SolverCall::Krylov(args))
    }
}
