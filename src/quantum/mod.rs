// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum primitives for the hybrid routines.
//!
//! Dense simulation of the built-in ansätze on a handful of wires.
//!
//! - [`PauliSum`]: Hamiltonians as weighted Pauli strings
//! - [`StateVector`]: dense pure state with RY, CZ, X, H and dense unitaries
//! - [`Ansatz`]: hardware-efficient and QAOA state preparation
//! - [`matrix_exp`]: scaling-and-squaring exponential for QAOA layers
//! - [`symmetric_eigen`]: Jacobi eigensolver for Krylov refinement

pub mod ansatz;
pub mod expm;
pub mod linalg;
pub mod pauli;
pub mod state;

pub use ansatz::Ansatz;
pub use expm::{evolution, matrix_exp};
pub use linalg::symmetric_eigen;
pub use pauli::{HamiltonianSpec, Pauli, PauliSum, PauliTerm};
pub use state::{bitstring, StateVector};
