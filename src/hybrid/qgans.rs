// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! `vqe_qgans`: generator and discriminator circuits, each trained against
//! its own Hamiltonian.

use serde::Serialize;
use tracing::info;

use super::RunContext;
use crate::error::Result;
use crate::quantum::PauliSum;
use crate::validation::{validate_initial_params, validate_width};
use crate::vqe::{custom_vqe, VqeResult};

/// Arguments for `vqe_qgans`.
#[derive(Debug, Clone)]
pub struct QganArgs {
    pub generator: PauliSum,
    pub discriminator: PauliSum,
    pub params_g: Option<Vec<f64>>,
    pub params_d: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QganOutcome {
    pub generator: VqeResult,
    pub discriminator: VqeResult,
}

pub async fn run(ctx: &RunContext, args: QganArgs) -> Result<QganOutcome> {
    validate_width(&args.generator, ctx.wires, "generator")?;
    validate_width(&args.discriminator, ctx.wires, "discriminator")?;

    let ansatz = ctx.ansatz();
    if let Some(p) = &args.params_g {
        validate_initial_params(p, ansatz.num_params(), "params_g")?;
    }
    if let Some(p) = &args.params_d {
        validate_initial_params(p, ansatz.num_params(), "params_d")?;
    }

    let device = ctx.device.as_ref();
    let generator = custom_vqe(device, &args.generator, &ansatz, args.params_g, &ctx.options).await?;
    let discriminator =
        custom_vqe(device, &args.discriminator, &ansatz, args.params_d, &ctx.options).await?;

    info!(
        generator_energy = generator.energy,
        discriminator_energy = discriminator.energy,
        "QGAN circuits trained"
    );

    Ok(QganOutcome {
        generator,
        discriminator,
    })
}
