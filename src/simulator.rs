use std::collections::TryReserveError;

use nalgebra::Complex;

use crate::{
    circuit::Circuit,
    gate::{Gate, GateError},
};

#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("Qubit {qubit} is out of range for a {n_qubits}-qubit register")]
    QubitOutOfRange { qubit: usize, n_qubits: usize },
    #[error("Basis state {index} is out of range for a state of dimension {dim}")]
    BasisStateOutOfRange { index: usize, dim: usize },
    #[error("{requested} qubits requested, the environment allows at most {max}")]
    TooManyQubits { requested: usize, max: usize },
    #[error("Circuit is over {circuit} qubits but the register has {register}")]
    RegisterMismatch { circuit: usize, register: usize },
    #[error("Could not allocate the state of a {n_qubits}-qubit register")]
    Allocation {
        n_qubits: usize,
        #[source]
        source: TryReserveError,
    },
    #[error(transparent)]
    Gate(#[from] GateError),
}

/// # Backend
/// The simulation environment. It is created once, shared read-only
/// between evaluations, and hands out a fresh register for each one.
pub trait Backend {
    type Register: Register;

    /// Largest register this environment will allocate
    fn max_qubits(&self) -> usize;

    /// Allocates a register of `n_qubits` qubits in the state |0..0>
    fn create_register(&self, n_qubits: usize) -> Result<Self::Register, SimulatorError>;
}

/// # Register
/// A quantum register owned by exactly one evaluation. Gates mutate
/// it in place; dropping it releases the state.
pub trait Register {
    fn n_qubits(&self) -> usize;

    fn apply(&mut self, gate: &Gate) -> Result<(), SimulatorError>;

    /// Amplitude of the computational basis state `index`, where bit
    /// `q` of `index` is the value of qubit `q`
    fn amplitude(&self, index: usize) -> Result<Complex<f64>, SimulatorError>;

    /// Probability of observing the basis state `index`
    fn prob_amp(&self, index: usize) -> Result<f64, SimulatorError> {
        Ok(self.amplitude(index)?.norm_sqr())
    }

    fn apply_circuit(&mut self, circuit: &Circuit) -> Result<(), SimulatorError> {
        if circuit.n_qubits() != self.n_qubits() {
            return Err(SimulatorError::RegisterMismatch {
                circuit: circuit.n_qubits(),
                register: self.n_qubits(),
            });
        }
        circuit.gates().iter().try_for_each(|gate| self.apply(gate))
    }

    fn hadamard(&mut self, qubit: usize) -> Result<(), SimulatorError> {
        self.apply(&Gate::hadamard(qubit)?)
    }

    fn pauli_z(&mut self, qubit: usize) -> Result<(), SimulatorError> {
        self.apply(&Gate::pauli_z(qubit)?)
    }

    fn controlled_phase_flip(&mut self, control: usize, target: usize) -> Result<(), SimulatorError> {
        self.apply(&Gate::controlled_phase_flip(control, target)?)
    }

    fn multi_controlled_phase_flip(&mut self, qubits: &[usize]) -> Result<(), SimulatorError> {
        self.apply(&Gate::multi_controlled_phase_flip(qubits)?)
    }

    /// Checks that every qubit of `gate` exists in this register
    fn check_gate(&self, gate: &Gate) -> Result<(), SimulatorError> {
        match gate.qubits().highest() {
            Some(qubit) if qubit >= self.n_qubits() => Err(SimulatorError::QubitOutOfRange {
                qubit,
                n_qubits: self.n_qubits(),
            }),
            _ => Ok(()),
        }
    }
}

/// Allocates the |0..0> state of `n_qubits` qubits, reporting allocation
/// failure instead of aborting
pub(crate) fn zero_state(n_qubits: usize) -> Result<Vec<Complex<f64>>, SimulatorError> {
    if n_qubits >= usize::BITS as usize {
        return Err(SimulatorError::TooManyQubits {
            requested: n_qubits,
            max: usize::BITS as usize - 1,
        });
    }
    let dim = 1usize << n_qubits;

    let mut state = Vec::new();
    state
        .try_reserve_exact(dim)
        .map_err(|source| SimulatorError::Allocation { n_qubits, source })?;
    state.resize(dim, Complex::new(0.0, 0.0));
    state[0] = Complex::new(1.0, 0.0);
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::{zero_state, Register};
    use crate::{
        cart, ext::equal_to_matrix_c, Backend, Circuit, SimulatorError, StateVectorEnv,
    };
    use nalgebra::DVector;
    use std::f64::consts::FRAC_1_SQRT_2;

    #[test]
    fn zero_state_is_normalised() {
        let state = zero_state(3).unwrap();
        assert_eq!(state.len(), 8);
        assert_eq!(state[0], cart!(1.0));
        assert!(state[1..].iter().all(|&a| a == cart!(0.0)));
    }

    #[test]
    fn zero_state_rejects_unaddressable() {
        assert!(matches!(
            zero_state(usize::BITS as usize),
            Err(SimulatorError::TooManyQubits { .. })
        ));
    }

    #[test]
    fn named_gates_match_circuit() {
        let env = StateVectorEnv::new();
        let mut by_name = env.create_register(3).unwrap();
        by_name.hadamard(0).unwrap();
        by_name.hadamard(1).unwrap();
        by_name.controlled_phase_flip(0, 1).unwrap();
        by_name.multi_controlled_phase_flip(&[0, 1, 2]).unwrap();
        by_name.pauli_z(1).unwrap();

        let circ = Circuit::new(3)
            .hadamard(0)
            .and_then(|c| c.hadamard(1))
            .and_then(|c| c.cz(0, 1))
            .and_then(|c| c.mcz(&[0, 1, 2]))
            .and_then(|c| c.z(1))
            .unwrap();
        let mut by_circuit = env.create_register(3).unwrap();
        by_circuit.apply_circuit(&circ).unwrap();

        assert!(equal_to_matrix_c(
            by_name.state_vector(),
            by_circuit.state_vector(),
            1e-12
        ));
    }

    #[test]
    fn plus_states_with_phase() {
        // H0 H1 CZ(0,1): (|00> + |01> + |10> - |11>) / 2
        let env = StateVectorEnv::new();
        let mut reg = env.create_register(2).unwrap();
        reg.hadamard(0).unwrap();
        reg.hadamard(1).unwrap();
        reg.controlled_phase_flip(0, 1).unwrap();
        let half = FRAC_1_SQRT_2 * FRAC_1_SQRT_2;
        let expected = DVector::from_vec(vec![cart!(half), cart!(half), cart!(half), cart!(-half)]);
        assert!(equal_to_matrix_c(reg.state_vector(), &expected, 1e-12));
        assert!((reg.prob_amp(3).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn circuit_size_must_match() {
        let env = StateVectorEnv::new();
        let mut reg = env.create_register(2).unwrap();
        assert!(matches!(
            reg.apply_circuit(&Circuit::new(3)),
            Err(SimulatorError::RegisterMismatch {
                circuit: 3,
                register: 2
            })
        ));
    }

    #[test]
    fn out_of_range_qubit() {
        let env = StateVectorEnv::new();
        let mut reg = env.create_register(2).unwrap();
        assert!(matches!(
            reg.pauli_z(2),
            Err(SimulatorError::QubitOutOfRange {
                qubit: 2,
                n_qubits: 2
            })
        ));
        assert!(matches!(
            reg.amplitude(4),
            Err(SimulatorError::BasisStateOutOfRange { index: 4, dim: 4 })
        ));
    }
}
