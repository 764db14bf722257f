use std::fmt::{self, Display};

use crate::gate::{Gate, GateError};

/// # Circuit
/// An ordered list of gates over `n_qubits` qubits, all starting in |0>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    gates: Vec<Gate>,
    n_qubits: usize,
}

impl Circuit {
    pub fn new(n_qubits: usize) -> Self {
        Circuit {
            gates: Vec::default(),
            n_qubits,
        }
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    // Functions for extending with a single gate below

    pub fn hadamard(mut self, target: usize) -> Result<Self, GateError> {
        self.gates.push(Gate::hadamard(target)?);
        Ok(self)
    }

    pub fn z(mut self, target: usize) -> Result<Self, GateError> {
        self.gates.push(Gate::pauli_z(target)?);
        Ok(self)
    }

    pub fn cz(mut self, control: usize, target: usize) -> Result<Self, GateError> {
        self.gates.push(Gate::controlled_phase_flip(control, target)?);
        Ok(self)
    }

    pub fn mcz(mut self, qubits: &[usize]) -> Result<Self, GateError> {
        self.gates.push(Gate::multi_controlled_phase_flip(qubits)?);
        Ok(self)
    }
}

impl Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "qubits {}", self.n_qubits)?;
        for gate in &self.gates {
            writeln!(f, "{}", gate)?;
        }
        Ok(())
    }
}
