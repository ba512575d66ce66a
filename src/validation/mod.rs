// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for oracle requests.

use ndarray::Array2;
use num_complex::Complex64;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ResourceLimits;
use crate::error::{Result, ValidationError};
use crate::quantum::PauliSum;

/// Request parameters as sent in the `params` object.
pub type Params = Map<String, Value>;

/// Extract a required field from request parameters.
pub fn required<T: DeserializeOwned>(params: &Params, field: &str) -> Result<T> {
    match params.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Field {
            field: field.into(),
            message: "is required".into(),
        }
        .into()),
        Some(value) => decode(field, value),
    }
}

/// Extract an optional field. `null` counts as absent.
pub fn optional<T: DeserializeOwned>(params: &Params, field: &str) -> Result<Option<T>> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(field, value).map(Some),
    }
}

fn decode<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T> {
    T::deserialize(value).map_err(|e| {
        ValidationError::Field {
            field: field.into(),
            message: e.to_string(),
        }
        .into()
    })
}

/// Validate QAOA depth `p`.
pub fn validate_qaoa_depth(depth: u64, limits: &ResourceLimits) -> Result<usize> {
    if depth == 0 {
        return Err(ValidationError::field("p", "must be greater than 0").into());
    }
    if depth > limits.max_qaoa_depth as u64 {
        return Err(ValidationError::ResourceLimit {
            resource: "qaoa_depth".into(),
            limit: limits.max_qaoa_depth as u64,
            requested: depth,
        }
        .into());
    }
    Ok(depth as usize)
}

/// Validate Krylov subspace size.
pub fn validate_subspace_size(size: u64, limits: &ResourceLimits) -> Result<usize> {
    if size == 0 {
        return Err(ValidationError::field("subspace_size", "must be greater than 0").into());
    }
    if size > limits.max_subspace_size as u64 {
        return Err(ValidationError::ResourceLimit {
            resource: "subspace_size".into(),
            limit: limits.max_subspace_size as u64,
            requested: size,
        }
        .into());
    }
    Ok(size as usize)
}

/// Validate that a Hamiltonian fits on the device register.
pub fn validate_width(hamiltonian: &PauliSum, wires: usize, field: &str) -> Result<()> {
    if hamiltonian.num_qubits() > wires {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!(
                "acts on {} wires, device has {}",
                hamiltonian.num_qubits(),
                wires
            ),
        }
        .into());
    }
    Ok(())
}

/// Validate optional initial parameters: finite and of the expected length.
pub fn validate_initial_params(params: &[f64], expected: usize, field: &str) -> Result<()> {
    if params.len() != expected {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("expected {} values, got {}", expected, params.len()),
        }
        .into());
    }
    if let Some(i) = params.iter().position(|p| !p.is_finite()) {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("non-finite value at index {}", i),
        }
        .into());
    }
    Ok(())
}

/// Parse a computational-basis bitstring, wire 0 first, into a basis index
/// on `wires` wires. Unspecified trailing wires start in `|0⟩`.
pub fn parse_bitstring(bits: &str, wires: usize, field: &str) -> Result<usize> {
    let bits = bits.trim();
    if bits.is_empty() || bits.len() > wires {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("must have between 1 and {} bits", wires),
        }
        .into());
    }
    let mut index = 0usize;
    for (wire, c) in bits.chars().enumerate() {
        match c {
            '0' => {}
            '1' => index |= 1 << (wires - 1 - wire),
            other => {
                return Err(ValidationError::Field {
                    field: field.into(),
                    message: format!("invalid character '{}'", other),
                }
                .into())
            }
        }
    }
    Ok(index)
}

/// Validate an SVM kernel matrix and its labels.
///
/// The kernel must be square, symmetric and finite, with one `±1` label per
/// row and no more rows than wires.
pub fn validate_kernel(kernel: &[Vec<f64>], labels: &[f64], wires: usize) -> Result<()> {
    let n = kernel.len();
    if n == 0 || kernel.iter().any(|row| row.len() != n) {
        return Err(ValidationError::field("kernel_matrix", "must be a non-empty square matrix").into());
    }
    if n > wires {
        return Err(ValidationError::ResourceLimit {
            resource: "kernel_matrix_size".into(),
            limit: wires as u64,
            requested: n as u64,
        }
        .into());
    }
    for i in 0..n {
        for j in 0..n {
            if !kernel[i][j].is_finite() {
                return Err(ValidationError::Field {
                    field: "kernel_matrix".into(),
                    message: format!("non-finite entry at ({}, {})", i, j),
                }
                .into());
            }
            if (kernel[i][j] - kernel[j][i]).abs() > 1e-9 {
                return Err(ValidationError::field("kernel_matrix", "must be symmetric").into());
            }
        }
    }

    if labels.len() != n {
        return Err(ValidationError::Field {
            field: "labels".into(),
            message: format!("expected {} labels, got {}", n, labels.len()),
        }
        .into());
    }
    if let Some(i) = labels.iter().position(|&y| y != 1.0 && y != -1.0) {
        return Err(ValidationError::Field {
            field: "labels".into(),
            message: format!("label at index {} must be 1 or -1", i),
        }
        .into());
    }
    Ok(())
}

/// Validate that `u` is unitary and fits on `wires` wires. Returns the
/// number of qubits it acts on.
pub fn validate_unitary(u: &Array2<Complex64>, wires: usize) -> Result<usize> {
    let dim = u.nrows();
    if dim < 2 || !dim.is_power_of_two() || u.ncols() != dim {
        return Err(ValidationError::Field {
            field: "U".into(),
            message: format!("must be a 2^k x 2^k matrix, got {}x{}", dim, u.ncols()),
        }
        .into());
    }
    let qubits = dim.trailing_zeros() as usize;
    if qubits > wires {
        return Err(ValidationError::Field {
            field: "U".into(),
            message: format!("acts on {} wires, device has {}", qubits, wires),
        }
        .into());
    }

    let product = u.dot(&u.t().mapv(|x| x.conj()));
    for i in 0..dim {
        for j in 0..dim {
            let expected = if i == j { 1.0 } else { 0.0 };
            if (product[[i, j]] - Complex64::new(expected, 0.0)).norm() > 1e-8 {
                return Err(ValidationError::field("U", "must be unitary").into());
            }
        }
    }
    Ok(qubits)
}
