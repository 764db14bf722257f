//! Reference backend that builds the full `2^n x 2^n` operator of every
//! gate from Kronecker products. Exponentially wasteful, only meant to
//! check the state-vector backend on a handful of qubits.

use nalgebra::{dmatrix, Complex, DMatrix, DVector};

use crate::{
    cart,
    gate::Gate,
    simulator::{zero_state, Backend, Register, SimulatorError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DenseEnv {
    max_qubits: usize,
}

impl DenseEnv {
    pub const DEFAULT_MAX_QUBITS: usize = 10;

    pub fn new() -> Self {
        Self::with_max_qubits(Self::DEFAULT_MAX_QUBITS)
    }

    pub fn with_max_qubits(max_qubits: usize) -> Self {
        Self { max_qubits }
    }
}

impl Default for DenseEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for DenseEnv {
    type Register = DenseRegister;

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

        Ok(DenseRegister {
            state: DVector::from_vec(zero_state(n_qubits)?),
            n_qubits,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DenseRegister {
    state: DVector<Complex<f64>>,
    n_qubits: usize,
}

impl DenseRegister {
    pub fn state_vector(&self) -> &DVector<Complex<f64>> {
        &self.state
    }

    fn identity_tensor_factors(n_factors: usize) -> Vec<DMatrix<Complex<f64>>> {
        vec![DMatrix::<Complex<f64>>::identity(2, 2); n_factors]
    }

    fn eval_tensor_product(tensor_factors: &[DMatrix<Complex<f64>>]) -> DMatrix<Complex<f64>> {
        tensor_factors.iter().fold(
            DMatrix::<Complex<f64>>::identity(1, 1),
            |product, factor| product.kronecker(factor),
        )
    }

    /// Full operator of `matrix_2x2` on `targets`, applied when every
    /// qubit in `controls` is |1>.
    ///
    /// The first Kronecker factor is the most significant bit of the
    /// basis index, so qubit `q` sits at factor `n_qubits - 1 - q`.
    pub fn expand_matrix(
        matrix_2x2: &DMatrix<Complex<f64>>,
        controls: &[usize],
        targets: &[usize],
        n_qubits: usize,
    ) -> DMatrix<Complex<f64>> {
        let ketbra = [
            dmatrix![cart!(1.0), cart!(0.0); cart!(0.0), cart!(0.0)], // |0><0|
            dmatrix![cart!(0.0), cart!(0.0); cart!(0.0), cart!(1.0)], // |1><1|
        ];
        let factor = |qubit: usize| n_qubits - 1 - qubit;

        // one term for each entry in a 'classical truth-table'
        let n_terms = 1 << controls.len();
        let mut terms = vec![Self::identity_tensor_factors(n_qubits); n_terms];
        for (i, term) in terms.iter_mut().enumerate() {
            for (j, &control) in controls.iter().enumerate() {
                term[factor(control)] = ketbra[(i >> j) & 1].clone();
            }
        }

        // Several controls -> all controls == 1 for gates to be applied.
        for &target in targets {
            terms[n_terms - 1][factor(target)] = matrix_2x2.clone();
        }

        let dim = 1 << n_qubits;
        terms
            .iter()
            .fold(DMatrix::<Complex<f64>>::zeros(dim, dim), |sum, term| {
                sum + Self::eval_tensor_product(term)
            })
    }

    fn expand_gate(gate: &Gate, n_qubits: usize) -> DMatrix<Complex<f64>> {
        let u = gate.get_type().matrix();
        Self::expand_matrix(
            &DMatrix::from_iterator(2, 2, u.iter().copied()),
            &gate.get_controls(),
            &gate.get_targets(),
            n_qubits,
        )
    }
}

impl Register for DenseRegister {
    fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    fn apply(&mut self, gate: &Gate) -> Result<(), SimulatorError> {
        self.check_gate(gate)?;
        let mat = Self::expand_gate(gate, self.n_qubits);
        self.state = mat * &self.state;
        Ok(())
    }

    fn amplitude(&self, index: usize) -> Result<Complex<f64>, SimulatorError> {
        self.state
            .get(index)
            .copied()
            .ok_or(SimulatorError::BasisStateOutOfRange {
                index,
                dim: self.state.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;

    use nalgebra::{dmatrix, Complex, DMatrix};

    use super::{DenseEnv, DenseRegister};
    use crate::{
        cart, ext::equal_to_matrix_c, Backend, GateType, Register, StateVectorEnv,
    };

    fn textbook_cz() -> DMatrix<Complex<f64>> {
        #[rustfmt::skip]
        let textbook_cz: DMatrix::<Complex<f64>> = dmatrix![
            cart!(1.0),cart!(0.0),cart!(0.0),cart!(0.0);
            cart!(0.0),cart!(1.0),cart!(0.0),cart!(0.0);
            cart!(0.0),cart!(0.0),cart!(1.0),cart!(0.0);
            cart!(0.0),cart!(0.0),cart!(0.0),cart!(-1.0);
        ];
        textbook_cz
    }

    fn z_data() -> DMatrix<Complex<f64>> {
        DMatrix::from_row_slice(2, 2, &GateType::PAULI_Z_DATA)
    }

    #[test]
    fn test_textbook_cz() {
        let mat = DenseRegister::expand_matrix(&z_data(), &[0], &[1], 2);
        assert!(equal_to_matrix_c(&mat, &textbook_cz(), 1e-12));
        let mat = DenseRegister::expand_matrix(&z_data(), &[1], &[0], 2);
        assert!(equal_to_matrix_c(&mat, &textbook_cz(), 1e-12));
    }

    #[test]
    fn test_ccz_is_diagonal() {
        let mat = DenseRegister::expand_matrix(&z_data(), &[0, 1], &[2], 3);
        for i in 0..8 {
            for j in 0..8 {
                let expected = match (i == j, i) {
                    (false, _) => cart!(0.0),
                    (true, 7) => cart!(-1.0),
                    (true, _) => cart!(1.0),
                };
                assert!((mat[(i, j)] - expected).norm() < 1e-12);
            }
        }
    }

    fn h_0() -> DMatrix<Complex<f64>> {
        // Qubit 0 is the least significant bit
        #[rustfmt::skip]
        let h_0: DMatrix::<Complex<f64>> = dmatrix![
            cart!(FRAC_1_SQRT_2), cart!(FRAC_1_SQRT_2), cart!(0.0), cart!(0.0);
            cart!(FRAC_1_SQRT_2),-cart!(FRAC_1_SQRT_2), cart!(0.0), cart!(0.0);
            cart!(0.0), cart!(0.0), cart!(FRAC_1_SQRT_2), cart!(FRAC_1_SQRT_2);
            cart!(0.0), cart!(0.0), cart!(FRAC_1_SQRT_2),-cart!(FRAC_1_SQRT_2);
        ];
        h_0
    }

    #[test]
    fn test_h_0() {
        let h = DMatrix::from_row_slice(2, 2, &GateType::HADAMARD_DATA);
        let mat = DenseRegister::expand_matrix(&h, &[], &[0], 2);
        assert!(equal_to_matrix_c(&mat, &h_0(), 1e-12));
    }

    #[test]
    fn agrees_with_state_vector() {
        let dense = DenseEnv::new();
        let sv = StateVectorEnv::new();
        let mut a = dense.create_register(3).unwrap();
        let mut b = sv.create_register(3).unwrap();
        for reg in [&mut a as &mut dyn Register, &mut b as &mut dyn Register] {
            reg.hadamard(0).unwrap();
            reg.hadamard(2).unwrap();
            reg.controlled_phase_flip(2, 0).unwrap();
            reg.hadamard(1).unwrap();
            reg.multi_controlled_phase_flip(&[1, 2, 0]).unwrap();
            reg.pauli_z(1).unwrap();
            reg.hadamard(0).unwrap();
        }
        assert!(equal_to_matrix_c(a.state_vector(), b.state_vector(), 1e-12));
    }

    #[test]
    fn env_limits_register_size() {
        assert!(DenseEnv::with_max_qubits(2).create_register(3).is_err());
    }
}
