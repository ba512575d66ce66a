// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Dense state vector with the handful of gates the built-in ansätze use.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use super::pauli::{PauliSum, PauliTerm};

/// Pure state of an `n`-qubit register.
#[derive(Debug, Clone)]
pub struct StateVector {
    num_qubits: usize,
    amps: Array1<Complex64>,
}

impl StateVector {
    /// `|0...0⟩`
    pub fn zero(num_qubits: usize) -> Self {
        Self::basis(num_qubits, 0)
    }

    /// Computational basis state `|index⟩`.
    pub fn basis(num_qubits: usize, index: usize) -> Self {
        let dim = 1usize << num_qubits;
        assert!(index < dim, "basis index out of range");
        let mut amps = Array1::zeros(dim);
        amps[index] = Complex64::new(1.0, 0.0);
        Self { num_qubits, amps }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amps
    }

    fn bit(&self, wire: usize) -> usize {
        1usize << (self.num_qubits - 1 - wire)
    }

    /// Apply a 2×2 matrix `[[a, b], [c, d]]` to `wire`.
    fn apply_single(&mut self, wire: usize, a: Complex64, b: Complex64, c: Complex64, d: Complex64) {
        let bit = self.bit(wire);
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                let j = i | bit;
                let x = self.amps[i];
                let y = self.amps[j];
                self.amps[i] = a * x + b * y;
                self.amps[j] = c * x + d * y;
            }
        }
    }

    pub fn x(&mut self, wire: usize) {
        let bit = self.bit(wire);
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                self.amps.swap(i, i | bit);
            }
        }
    }

    pub fn h(&mut self, wire: usize) {
        let h = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        self.apply_single(wire, h, h, h, -h);
    }

    /// `RY(θ) = [[cos θ/2, -sin θ/2], [sin θ/2, cos θ/2]]`
    pub fn ry(&mut self, wire: usize, theta: f64) {
        let (s, c) = (theta / 2.0).sin_cos();
        let c = Complex64::new(c, 0.0);
        let s = Complex64::new(s, 0.0);
        self.apply_single(wire, c, -s, s, c);
    }

    pub fn cz(&mut self, a: usize, b: usize) {
        let mask = self.bit(a) | self.bit(b);
        for i in 0..self.amps.len() {
            if i & mask == mask {
                self.amps[i] = -self.amps[i];
            }
        }
    }

    /// Apply a dense unitary acting on the whole register.
    pub fn apply_unitary(&mut self, u: &Array2<Complex64>) {
        assert_eq!(u.nrows(), self.amps.len(), "unitary dimension mismatch");
        self.amps = u.dot(&self.amps);
    }

    /// `⟨ψ|P|ψ⟩` for a single Pauli string.
    pub fn expectation_term(&self, term: &PauliTerm) -> f64 {
        let masks = term.masks(self.num_qubits);
        let value: Complex64 = (0..self.amps.len())
            .map(|x| self.amps[x ^ masks.flip_mask].conj() * masks.phase(x) * self.amps[x])
            .sum();
        value.re
    }

    /// `⟨ψ|H|ψ⟩`
    pub fn expectation(&self, observable: &PauliSum) -> f64 {
        observable
            .terms()
            .iter()
            .map(|t| t.coeff * self.expectation_term(t))
            .sum()
    }

    /// Born-rule probabilities of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    pub fn norm(&self) -> f64 {
        self.amps.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt()
    }
}

/// Format basis-state `index` as a bitstring with wire 0 first.
pub fn bitstring(index: usize, num_qubits: usize) -> String {
    format!("{:0width$b}", index, width = num_qubits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn z_on(wire: usize, n: usize) -> PauliSum {
        let s: String = (0..n).map(|w| if w == wire { 'Z' } else { 'I' }).collect();
        PauliSum::new(vec![PauliTerm::parse(&s, 1.0).unwrap()])
    }

    #[test]
    fn test_zero_state_expectations() {
        let psi = StateVector::zero(3);
        for w in 0..3 {
            assert!((psi.expectation(&z_on(w, 3)) - 1.0).abs() < 1e-12);
        }
        assert_eq!(psi.probabilities()[0], 1.0);
    }

    #[test]
    fn test_x_flips_expected_bit() {
        let mut psi = StateVector::zero(3);
        psi.x(0);
        let probs = psi.probabilities();
        assert_eq!(probs[0b100], 1.0);
        assert!((psi.expectation(&z_on(0, 3)) + 1.0).abs() < 1e-12);
        assert_eq!(bitstring(0b100, 3), "100");
    }

    #[test]
    fn test_ry_pi_is_bit_flip() {
        let mut psi = StateVector::zero(1);
        psi.ry(0, PI);
        assert!((psi.probabilities()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ry_expectation_is_cosine() {
        for theta in [0.0, 0.3, 1.2, 2.5] {
            let mut psi = StateVector::zero(2);
            psi.ry(1, theta);
            assert!((psi.expectation(&z_on(1, 2)) - theta.cos()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hadamard_gives_plus_state() {
        let mut psi = StateVector::zero(1);
        psi.h(0);
        let x = PauliSum::new(vec![PauliTerm::parse("X", 1.0).unwrap()]);
        assert!((psi.expectation(&x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bell_state_correlations() {
        let mut psi = StateVector::zero(2);
        psi.h(0);
        psi.h(1);
        psi.cz(0, 1);
        psi.h(1);
        let zz = PauliSum::new(vec![PauliTerm::parse("ZZ", 1.0).unwrap()]);
        let xx = PauliSum::new(vec![PauliTerm::parse("XX", 1.0).unwrap()]);
        let yy = PauliSum::new(vec![PauliTerm::parse("YY", 1.0).unwrap()]);
        assert!((psi.expectation(&zz) - 1.0).abs() < 1e-12);
        assert!((psi.expectation(&xx) - 1.0).abs() < 1e-12);
        assert!((psi.expectation(&yy) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_expectation_matches_dense_matrix() {
        let mut psi = StateVector::zero(2);
        psi.ry(0, 0.7);
        psi.ry(1, -1.1);
        psi.cz(0, 1);
        let h = PauliSum::new(vec![
            PauliTerm::parse("XY", 0.4).unwrap(),
            PauliTerm::parse("ZX", -0.9).unwrap(),
        ]);
        let m = h.to_matrix(2);
        let amps = psi.amplitudes();
        let hv = m.dot(amps);
        let dense: Complex64 = amps.iter().zip(hv.iter()).map(|(a, b)| a.conj() * b).sum();
        assert!((psi.expectation(&h) - dense.re).abs() < 1e-12);
        assert!((psi.norm() - 1.0).abs() < 1e-12);
    }
}
