// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Matrix exponential via scaling-and-squaring with a truncated Taylor series.
//!
//! The ansätze only exponentiate small Hermitian generators (`2^n ≤ 64`), so
//! after scaling the norm below 1/2 an 18-term Taylor series is accurate to
//! double precision.
//!
//! Ref: Moler & Van Loan (2003), "Nineteen Dubious Ways to Compute the
//! Exponential of a Matrix, Twenty-Five Years Later", SIAM Review 45(1), 3.

use ndarray::Array2;
use num_complex::Complex64;

const TAYLOR_TERMS: usize = 18;
const SCALED_NORM: f64 = 0.5;

/// Compute `exp(A)` for a square complex matrix.
///
/// # Panics
/// Panics if `a` is not square.
pub fn matrix_exp(a: &Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "matrix_exp requires a square matrix");

    if n == 0 {
        return Array2::zeros((0, 0));
    }

    let norm = one_norm(a);
    let squarings = if norm > SCALED_NORM {
        (norm / SCALED_NORM).log2().ceil() as i32
    } else {
        0
    };
    let scaled = a * Complex64::new(0.5f64.powi(squarings), 0.0);

    // Horner form: I + A(I + A/2(I + A/3(...)))
    let identity = Array2::from_diag_elem(n, Complex64::new(1.0, 0.0));
    let mut result = identity.clone();
    for k in (1..=TAYLOR_TERMS).rev() {
        result = &identity + &(scaled.dot(&result) * Complex64::new(1.0 / k as f64, 0.0));
    }

    for _ in 0..squarings {
        result = result.dot(&result);
    }
    result
}

/// `exp(-i·t·H)` for a Hermitian generator `H`.
pub fn evolution(h: &Array2<Complex64>, t: f64) -> Array2<Complex64> {
    matrix_exp(&(h * Complex64::new(0.0, -t)))
}

/// Maximum absolute column sum.
fn one_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}
