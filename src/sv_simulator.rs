use nalgebra::{Complex, DVector, Matrix2};

use crate::{
    gate::{Gate, QBits},
    simulator::{zero_state, Backend, Register, SimulatorError},
};

/// # StateVectorEnv
/// Environment handing out state-vector registers of at most
/// `max_qubits` qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateVectorEnv {
    max_qubits: usize,
}

impl StateVectorEnv {
    /// 2^28 amplitudes of 16 bytes, 4 GiB per register
    pub const DEFAULT_MAX_QUBITS: usize = 28;

    pub fn new() -> Self {
        Self::with_max_qubits(Self::DEFAULT_MAX_QUBITS)
    }

    pub fn with_max_qubits(max_qubits: usize) -> Self {
        Self { max_qubits }
    }
}

impl Default for StateVectorEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StateVectorEnv {
    type Register = StateVectorRegister;

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn create_register(&self, n_qubits: usize) -> Result<Self::Register, SimulatorError> {
        if n_qubits > self.max_qubits {
            return Err(SimulatorError::TooManyQubits {
                requested: n_qubits,
                max: self.max_qubits,
            });
        }

        Ok(StateVectorRegister {
            state_vector: DVector::from_vec(zero_state(n_qubits)?),
            n_qubits,
        })
    }
}

/// # StateVectorRegister
/// Full amplitude vector of `2^n_qubits` entries; qubit `q` is bit `q`
/// of the basis index.
#[derive(Debug, Clone)]
pub struct StateVectorRegister {
    state_vector: DVector<Complex<f64>>,
    n_qubits: usize,
}

impl StateVectorRegister {
    /// Get current state of the quantum system
    pub fn state_vector(&self) -> &DVector<Complex<f64>> {
        &self.state_vector
    }

    /// Checks that all control bits are 1
    fn controls_active(i: usize, controls: QBits) -> bool {
        let control_mask = controls.get_bitstring();
        (i & control_mask) == control_mask
    }

    /// Checks that all target bits are 0
    fn is_block_base(i: usize, targets: QBits) -> bool {
        let target_mask = targets.get_bitstring();
        (i & target_mask) == 0
    }

    /// Applies a 2x2 unitary to every amplitude pair (|..0..>, |..1..>)
    /// of the target whose controls are all set
    fn apply_matrix(&mut self, u: &Matrix2<Complex<f64>>, controls: QBits, targets: QBits) {
        let partner = targets.get_bitstring();

        // State vector is length 2^n , n=num qubits
        for i in 0..self.state_vector.len() {
            if !Self::is_block_base(i, targets) {
                continue;
            }

            if !Self::controls_active(i, controls) {
                continue;
            }

            let j = i | partner;
            let (a, b) = (self.state_vector[i], self.state_vector[j]);
            self.state_vector[i] = u[(0, 0)] * a + u[(0, 1)] * b;
            self.state_vector[j] = u[(1, 0)] * a + u[(1, 1)] * b;
        }
    }

    /// Negates every amplitude whose basis index has all of `qubits` set
    fn flip_phase(&mut self, qubits: QBits) {
        for (i, amp) in self.state_vector.iter_mut().enumerate() {
            if Self::controls_active(i, qubits) {
                *amp = -*amp;
            }
        }
    }
}

impl Register for StateVectorRegister {
    fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    fn apply(&mut self, gate: &Gate) -> Result<(), SimulatorError> {
        self.check_gate(gate)?;

        if gate.get_type().is_diagonal() {
            // Z on the target under controls is -1 exactly where every qubit is 1
            self.flip_phase(gate.qubits());
        } else {
            self.apply_matrix(
                &gate.get_type().matrix(),
                gate.get_control_bits(),
                gate.get_target_bits(),
            );
        }

        Ok(())
    }

    fn amplitude(&self, index: usize) -> Result<Complex<f64>, SimulatorError> {
        self.state_vector
            .get(index)
            .copied()
            .ok_or(SimulatorError::BasisStateOutOfRange {
                index,
                dim: self.state_vector.len(),
            })
    }
}
