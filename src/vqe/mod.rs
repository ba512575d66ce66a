// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Variational quantum eigensolver loop shared by every hybrid routine.
//!
//! # Architecture
//!
//! - [`custom_vqe`]: fixed-length gradient descent on `⟨ψ(θ)|H|ψ(θ)⟩`
//! - [`gradient`]: parameter-shift or central-difference gradient
//! - [`default_initial_params`]: deterministic starting point
//!
//! # References
//!
//! - Peruzzo et al. (2014), "A variational eigenvalue solver on a photonic
//!   quantum processor", Nat. Commun. 5, 4213. arXiv:1304.3061
//! - Schuld et al. (2019), "Evaluating analytic gradients on quantum
//!   hardware", Phys. Rev. A 99, 032331. arXiv:1811.11184

pub mod optimize;
pub mod types;

pub use optimize::{custom_vqe, default_initial_params, gradient};
pub use types::{VqeOptions, VqeResult};
