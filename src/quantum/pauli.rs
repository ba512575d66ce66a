// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pauli-sum observables.
//!
//! A Hamiltonian is `H = Σ_k c_k P_k` with real coefficients and Pauli strings
//! over `I X Y Z`. Character `k` of a string acts on wire `k`; wire `k` maps to
//! bit `n - 1 - k` of a basis-state index so bitstrings read left to right by
//! wire.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Coefficients below this magnitude are dropped when decomposing matrices.
const COEFF_EPS: f64 = 1e-12;

/// Largest register a dense matrix may be decomposed on. The decomposition
/// visits all `4^n` Pauli strings.
pub const MAX_DENSE_QUBITS: usize = 6;

/// Largest accepted `|coeff|` for a parsed term.
pub const MAX_COEFFICIENT: f64 = 1e12;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pauli {
    I,
    X,
    Y,
    Z,
}

impl Pauli {
    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    fn as_char(&self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }
}

/// Weighted Pauli string.
#[derive(Debug, Clone, PartialEq)]
pub struct PauliTerm {
    pub coeff: f64,
    pub ops: Vec<Pauli>,
}

/// Bit masks describing how a Pauli string acts on `n`-qubit basis states.
///
/// `P|x⟩ = i^y_count · (-1)^popcount(x & phase_mask) · |x ^ flip_mask⟩`
#[derive(Debug, Clone, Copy)]
pub(crate) struct PauliMasks {
    pub flip_mask: usize,
    pub phase_mask: usize,
    pub y_count: u32,
}

impl PauliMasks {
    /// Phase picked up by basis state `x`.
    pub fn phase(&self, x: usize) -> Complex64 {
        let sign = if (x & self.phase_mask).count_ones() % 2 == 0 {
            1.0
        } else {
            -1.0
        };
        let i_pow = match self.y_count % 4 {
            0 => Complex64::new(1.0, 0.0),
            1 => Complex64::new(0.0, 1.0),
            2 => Complex64::new(-1.0, 0.0),
            _ => Complex64::new(0.0, -1.0),
        };
        i_pow * sign
    }
}

impl PauliTerm {
    /// Parse a term such as `("ZZI", 0.5)`.
    pub fn parse(pauli: &str, coeff: f64) -> Result<Self, ValidationError> {
        if !coeff.is_finite() {
            return Err(ValidationError::field(
                "coeff",
                format!("coefficient of '{}' is not finite", pauli),
            ));
        }
        if coeff.abs() > MAX_COEFFICIENT {
            return Err(ValidationError::field(
                "coeff",
                format!(
                    "coefficient of '{}' exceeds {:e} in magnitude",
                    pauli, MAX_COEFFICIENT
                ),
            ));
        }
        let ops = pauli
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                Pauli::from_char(c).ok_or_else(|| {
                    ValidationError::field(
                        "pauli",
                        format!("invalid character '{}' in Pauli string '{}'", c, pauli),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { coeff, ops })
    }

    /// Whether the term is a multiple of the identity.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|p| *p == Pauli::I)
    }

    /// Masks for this term on an `n`-qubit register.
    pub(crate) fn masks(&self, n: usize) -> PauliMasks {
        let mut flip_mask = 0;
        let mut phase_mask = 0;
        let mut y_count = 0;
        for (wire, op) in self.ops.iter().enumerate() {
            let bit = 1usize << (n - 1 - wire);
            match op {
                Pauli::I => {}
                Pauli::X => flip_mask |= bit,
                Pauli::Z => phase_mask |= bit,
                Pauli::Y => {
                    flip_mask |= bit;
                    phase_mask |= bit;
                    y_count += 1;
                }
            }
        }
        PauliMasks {
            flip_mask,
            phase_mask,
            y_count,
        }
    }
}

impl fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self.ops.iter().map(Pauli::as_char).collect();
        write!(f, "{:+} {}", self.coeff, s)
    }
}

/// Sum of weighted Pauli strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PauliSum {
    terms: Vec<PauliTerm>,
}

impl PauliSum {
    pub fn new(terms: Vec<PauliTerm>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of wires the widest term touches.
    pub fn num_qubits(&self) -> usize {
        self.terms.iter().map(|t| t.ops.len()).max().unwrap_or(0)
    }

    /// `Σ_i X_i` over `n` wires, the standard QAOA mixer.
    pub fn transverse_field(n: usize) -> Self {
        let terms = (0..n)
            .map(|wire| {
                let mut ops = vec![Pauli::I; n];
                ops[wire] = Pauli::X;
                PauliTerm { coeff: 1.0, ops }
            })
            .collect();
        Self { terms }
    }

    /// Dense `2^n × 2^n` matrix of the sum on an `n`-qubit register.
    ///
    /// # Panics
    /// Panics if a term is wider than `n`.
    pub fn to_matrix(&self, n: usize) -> Array2<Complex64> {
        assert!(self.num_qubits() <= n, "observable wider than register");
        let dim = 1usize << n;
        let mut m = Array2::<Complex64>::zeros((dim, dim));
        for term in &self.terms {
            let masks = term.masks(n);
            for x in 0..dim {
                m[[x ^ masks.flip_mask, x]] += masks.phase(x) * term.coeff;
            }
        }
        m
    }

    /// Decompose a Hermitian matrix into Pauli strings:
    /// `c_P = Re tr(P·M) / 2^n`.
    pub fn from_hermitian(m: &Array2<Complex64>) -> Result<Self, ValidationError> {
        let n = register_size(m.nrows())?;
        if m.ncols() != m.nrows() {
            return Err(ValidationError::field("matrix", "must be square"));
        }
        if n > MAX_DENSE_QUBITS {
            return Err(ValidationError::ResourceLimit {
                resource: "dense_matrix_qubits".into(),
                limit: MAX_DENSE_QUBITS as u64,
                requested: n as u64,
            });
        }
        let dim = m.nrows();
        let mut terms = Vec::new();
        for code in 0..(1usize << (2 * n)) {
            let ops: Vec<Pauli> = (0..n)
                .map(|wire| match (code >> (2 * wire)) & 0b11 {
                    0 => Pauli::I,
                    1 => Pauli::X,
                    2 => Pauli::Y,
                    _ => Pauli::Z,
                })
                .collect();
            let term = PauliTerm { coeff: 0.0, ops };
            let masks = term.masks(n);
            let trace: Complex64 = (0..dim)
                .map(|y| masks.phase(y) * m[[y, y ^ masks.flip_mask]])
                .sum();
            let coeff = trace.re / dim as f64;
            if !(coeff.abs() <= MAX_COEFFICIENT) {
                return Err(ValidationError::field(
                    "matrix",
                    format!("Pauli coefficient exceeds {:e} in magnitude", MAX_COEFFICIENT),
                ));
            }
            if coeff.abs() > COEFF_EPS {
                terms.push(PauliTerm { coeff, ..term });
            }
        }
        Ok(Self { terms })
    }

    /// Decompose a diagonal operator `Σ_x f(x) |x⟩⟨x|` into Z strings with a
    /// Walsh-Hadamard transform.
    pub fn from_diagonal(n: usize, values: &[f64]) -> Self {
        let dim = 1usize << n;
        assert_eq!(values.len(), dim, "diagonal length must be 2^n");
        let mut terms = Vec::new();
        for z in 0..dim {
            let sum: f64 = values
                .iter()
                .enumerate()
                .map(|(x, v)| {
                    if (x & z).count_ones() % 2 == 0 {
                        *v
                    } else {
                        -*v
                    }
                })
                .sum();
            let coeff = sum / dim as f64;
            if coeff.abs() > COEFF_EPS {
                let ops = (0..n)
                    .map(|wire| {
                        if z & (1 << (n - 1 - wire)) != 0 {
                            Pauli::Z
                        } else {
                            Pauli::I
                        }
                    })
                    .collect();
                terms.push(PauliTerm { coeff, ops });
            }
        }
        Self { terms }
    }

    /// 1-norm of the coefficient vector, an upper bound on the spectral radius.
    pub fn coefficient_norm(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.abs()).sum()
    }
}

/// `log2(dim)` for a power-of-two dimension.
pub(crate) fn register_size(dim: usize) -> Result<usize, ValidationError> {
    if dim < 2 || !dim.is_power_of_two() {
        return Err(ValidationError::field(
            "matrix",
            format!("dimension {} is not a power of two >= 2", dim),
        ));
    }
    Ok(dim.trailing_zeros() as usize)
}

/// JSON form of a Hamiltonian accepted in request parameters.
///
/// ```json
/// [{"coeff": 1.0, "pauli": "ZZ"}, {"coeff": 0.5, "pauli": "XI"}]
/// {"terms": [{"coeff": 1.0, "pauli": "ZZ"}]}
/// {"matrix": [[[1, 0], [0, 0]], [[0, 0], [-1, 0]]]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HamiltonianSpec {
    Terms(Vec<TermSpec>),
    Wrapped { terms: Vec<TermSpec> },
    Matrix { matrix: Vec<Vec<[f64; 2]>> },
}

/// One `{"coeff", "pauli"}` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermSpec {
    pub coeff: f64,
    pub pauli: String,
}

impl TryFrom<HamiltonianSpec> for PauliSum {
    type Error = ValidationError;

    fn try_from(spec: HamiltonianSpec) -> Result<Self, Self::Error> {
        let sum = match spec {
            HamiltonianSpec::Terms(terms) | HamiltonianSpec::Wrapped { terms } => {
                let terms = terms
                    .into_iter()
                    .map(|t| PauliTerm::parse(&t.pauli, t.coeff))
                    .collect::<Result<Vec<_>, _>>()?;
                PauliSum::new(terms)
            }
            HamiltonianSpec::Matrix { matrix } => {
                let m = complex_matrix(&matrix)?;
                if !is_hermitian(&m, 1e-9) {
                    return Err(ValidationError::field("matrix", "must be Hermitian"));
                }
                PauliSum::from_hermitian(&m)?
            }
        };
        if sum.is_empty() {
            return Err(ValidationError::field("hamiltonian", "has no terms"));
        }
        Ok(sum)
    }
}

/// Build a complex matrix from `[[ [re, im], ... ], ...]` rows.
pub fn complex_matrix(rows: &[Vec<[f64; 2]>]) -> Result<Array2<Complex64>, ValidationError> {
    let n = rows.len();
    if n == 0 || rows.iter().any(|r| r.len() != n) {
        return Err(ValidationError::field("matrix", "must be a non-empty square matrix"));
    }
    let mut m = Array2::<Complex64>::zeros((n, n));
    for (i, row) in rows.iter().enumerate() {
        for (j, [re, im]) in row.iter().enumerate() {
            if !re.is_finite() || !im.is_finite() {
                return Err(ValidationError::field(
                    "matrix",
                    format!("non-finite entry at ({}, {})", i, j),
                ));
            }
            m[[i, j]] = Complex64::new(*re, *im);
        }
    }
    Ok(m)
}

/// Whether `m == m†` within `tol`.
pub fn is_hermitian(m: &Array2<Complex64>, tol: f64) -> bool {
    let n = m.nrows();
    (0..n).all(|i| (0..n).all(|j| (m[[i, j]] - m[[j, i]].conj()).norm() <= tol))
}
