//! Statevector simulation engine.
//!
//! Qubit `i` is bit `i` of the amplitude index.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use qpu_ir::{GateOperation, NoiseChannel};

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// Matrix of `X^t`, `Y^t` or `Z^t` (power-gate convention).
fn pauli_power(op: &GateOperation, t: f64) -> Matrix2 {
    let phase = Complex64::from_polar(1.0, PI * t);
    let c = (ONE + phase) / 2.0;
    let s = (ONE - phase) / 2.0;
    match op {
        GateOperation::X { .. } => [[c, s], [s, c]],
        GateOperation::Y { .. } => [[c, -I * s], [I * s, c]],
        _ => [[ONE, ZERO], [ZERO, phase]],
    }
}

/// A statevector representing a quantum state.
#[derive(Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    ///
    /// Callers bound `num_qubits` by [`MAX_SIMULATOR_QUBITS`](crate::MAX_SIMULATOR_QUBITS).
    pub fn new(num_qubits: usize) -> Self {
        debug_assert!(num_qubits <= crate::MAX_SIMULATOR_QUBITS as usize);
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Apply a unitary gate. Measurements are ignored here; see [`Self::measure`].
    pub fn apply(&mut self, op: &GateOperation) {
        match op {
            GateOperation::H { qubit } => self.apply_h(qubit.index()),
            GateOperation::X { qubit, exponent: None } => self.apply_x(qubit.index()),
            GateOperation::Z { qubit, exponent: None } => self.apply_z(qubit.index()),
            GateOperation::X { qubit, exponent }
            | GateOperation::Y { qubit, exponent }
            | GateOperation::Z { qubit, exponent } => {
                let m = pauli_power(op, exponent.unwrap_or(1.0));
                self.apply_matrix(qubit.index(), &m);
            }
            GateOperation::Cnot { control, target } => {
                self.apply_cx(control.index(), target.index());
            }
            GateOperation::Measure { .. } => {}
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_matrix(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -I * self.amplitudes[j];
                self.amplitudes[j] = I * tmp;
            }
        }
    }

    fn apply_z(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask != 0 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    // =========================================================================
    // Two-qubit gate implementations
    // =========================================================================

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Measurement and noise
    // =========================================================================

    /// Probability of reading 1 on `qubit`.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Keep only amplitudes where `qubit` reads `outcome`, then renormalize.
    fn project(&mut self, qubit: usize, outcome: u8) {
        let mask = 1 << qubit;
        let keep_set = outcome == 1;
        let mut norm_sq = 0.0;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == keep_set {
                norm_sq += amp.norm_sqr();
            } else {
                *amp = ZERO;
            }
        }
        self.renormalize(norm_sq);
    }

    fn renormalize(&mut self, norm_sq: f64) {
        let norm = norm_sq.sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Projective measurement of `qubit`; collapses the state.
    pub fn measure<R: Rng + ?Sized>(&mut self, qubit: usize, rng: &mut R) -> u8 {
        let p1 = self.probability_one(qubit);
        let outcome = u8::from(rng.r#gen::<f64>() < p1);
        self.project(qubit, outcome);
        outcome
    }

    /// Apply one stochastic trajectory step of `channel` to `qubit`.
    pub fn apply_channel<R: Rng + ?Sized>(
        &mut self,
        channel: &NoiseChannel,
        qubit: usize,
        rng: &mut R,
    ) {
        match *channel {
            NoiseChannel::Depolarizing { p } => {
                if rng.r#gen::<f64>() < p {
                    match rng.gen_range(0..3) {
                        0 => self.apply_x(qubit),
                        1 => self.apply_y(qubit),
                        _ => self.apply_z(qubit),
                    }
                }
            }
            NoiseChannel::BitFlip { p } => {
                if rng.r#gen::<f64>() < p {
                    self.apply_x(qubit);
                }
            }
            NoiseChannel::PhaseFlip { p } => {
                if rng.r#gen::<f64>() < p {
                    self.apply_z(qubit);
                }
            }
            NoiseChannel::AmplitudeDamping { gamma } => self.amplitude_damp(qubit, gamma, rng),
        }
    }

    fn amplitude_damp<R: Rng + ?Sized>(&mut self, qubit: usize, gamma: f64, rng: &mut R) {
        let mask = 1 << qubit;
        let p_jump = gamma * self.probability_one(qubit);
        if rng.r#gen::<f64>() < p_jump {
            // Decay |1⟩ → |0⟩.
            for i in 0..(1 << self.num_qubits) {
                if i & mask != 0 {
                    let j = i & !mask;
                    self.amplitudes[j] = self.amplitudes[i];
                    self.amplitudes[i] = ZERO;
                }
            }
        } else {
            let damp = (1.0 - gamma).sqrt();
            for (i, amp) in self.amplitudes.iter_mut().enumerate() {
                if i & mask != 0 {
                    *amp *= damp;
                }
            }
        }
        let norm_sq = self.amplitudes.iter().map(Complex64::norm_sqr).sum();
        self.renormalize(norm_sq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qpu_ir::QubitId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], ONE));
        assert!(approx_eq(sv.amplitudes[1], ZERO));
        assert!(approx_eq(sv.amplitudes[2], ZERO));
        assert!(approx_eq(sv.amplitudes[3], ZERO));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply(&GateOperation::h(QubitId(0)));

        assert!(approx_eq(sv.amplitudes[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply(&GateOperation::h(QubitId(0)));
        sv.apply(&GateOperation::cnot(QubitId(0), QubitId(1)));

        assert!(approx_eq(sv.amplitudes[0], Complex64::new(FRAC_1_SQRT_2, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], ZERO));
        assert!(approx_eq(sv.amplitudes[2], ZERO));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(FRAC_1_SQRT_2, 0.0)));
    }

    #[test]
    fn test_x_gate_and_unit_exponent_agree() {
        let mut plain = Statevector::new(1);
        plain.apply(&GateOperation::x(QubitId(0)));
        let mut pow = Statevector::new(1);
        pow.apply(&GateOperation::x_pow(QubitId(0), 1.0));

        assert!(approx_eq(plain.amplitudes[1], ONE));
        assert!(approx_eq(pow.amplitudes[0], ZERO));
        assert!(approx_eq(pow.amplitudes[1], ONE));
    }

    #[test]
    fn test_fractional_powers() {
        // X^0.5 and Y^0.5 on |0⟩ give an even superposition.
        for op in [
            GateOperation::x_pow(QubitId(0), 0.5),
            GateOperation::y_pow(QubitId(0), 0.5),
        ] {
            let mut sv = Statevector::new(1);
            sv.apply(&op);
            assert!((sv.probability_one(0) - 0.5).abs() < 1e-10);
        }

        // Z^t only changes phase.
        let mut sv = Statevector::new(1);
        sv.apply(&GateOperation::h(QubitId(0)));
        sv.apply(&GateOperation::z_pow(QubitId(0), 0.3));
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_y_gate_matches_matrix() {
        let mut a = Statevector::new(1);
        a.apply_h(0);
        a.apply_y(0);
        let mut b = Statevector::new(1);
        b.apply_h(0);
        b.apply(&GateOperation::y_pow(QubitId(0), 1.0));
        assert!(approx_eq(a.amplitudes[0], b.amplitudes[0]));
        assert!(approx_eq(a.amplitudes[1], b.amplitudes[1]));
    }

    #[test]
    fn test_measure_collapses() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sv = Statevector::new(2);
        sv.apply(&GateOperation::h(QubitId(0)));
        sv.apply(&GateOperation::cnot(QubitId(0), QubitId(1)));

        let first = sv.measure(0, &mut rng);
        // Bell partner must agree after collapse.
        assert_eq!(sv.measure(1, &mut rng), first);
    }

    #[test]
    fn test_measure_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sv = Statevector::new(1);
        sv.apply_x(0);
        for _ in 0..100 {
            assert_eq!(sv.measure(0, &mut rng), 1);
        }
    }

    #[test]
    fn test_full_amplitude_damping_resets() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut sv = Statevector::new(1);
        sv.apply_x(0);
        sv.apply_channel(&NoiseChannel::AmplitudeDamping { gamma: 1.0 }, 0, &mut rng);
        assert!(sv.probability_one(0) < 1e-10);
    }

    #[test]
    fn test_certain_bit_flip() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sv = Statevector::new(2);
        sv.apply_channel(&NoiseChannel::BitFlip { p: 1.0 }, 1, &mut rng);
        assert!((sv.probability_one(1) - 1.0).abs() < 1e-10);
        assert!(sv.probability_one(0) < 1e-10);
    }
}
