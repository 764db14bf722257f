//! IQP circuits estimating the gap of degree-3 polynomials.
//!
//! Hadamard on every qubit, one phase flip per monomial, Hadamard on
//! every qubit again: the amplitude of |0..0> is then
//! `gap(p) / 2^variables`.
//!
//! See Bremner, Montanaro and Shepherd, "Average-case complexity versus
//! approximate simulation of commuting quantum computations" (2015).

use crate::{
    circuit::Circuit,
    gate::{Gate, GateError},
    polynomial::{Monomial, Polynomial},
    simulator::{Backend, Register, SimulatorError},
};

#[derive(Debug, thiserror::Error)]
pub enum IqpError {
    #[error("Unsupported monomial {index} of degree {degree}: {monomial}")]
    UnsupportedMonomial {
        index: usize,
        degree: usize,
        monomial: Monomial,
    },
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Simulator(#[from] SimulatorError),
}

/// Phase flip encoding one monomial
pub fn monomial_gate(index: usize, monomial: &Monomial) -> Result<Gate, IqpError> {
    let gate = match monomial.variables() {
        [x] => Gate::pauli_z(*x)?,
        [x, y] => Gate::controlled_phase_flip(*x, *y)?,
        [_, _, _] => Gate::multi_controlled_phase_flip(monomial.variables())?,
        _ => {
            return Err(IqpError::UnsupportedMonomial {
                index,
                degree: monomial.degree(),
                monomial: *monomial,
            })
        }
    };
    Ok(gate)
}

/// Compiles `polynomial` into its IQP circuit over `variables` qubits
pub fn compile(polynomial: &Polynomial) -> Result<Circuit, IqpError> {
    let n_qubits = polynomial.variables();
    let mut circuit = Circuit::new(n_qubits);

    for qubit in 0..n_qubits {
        circuit.push(Gate::hadamard(qubit)?);
    }
    for (index, monomial) in polynomial.iter().enumerate() {
        circuit.push(monomial_gate(index, monomial)?);
    }
    for qubit in 0..n_qubits {
        circuit.push(Gate::hadamard(qubit)?);
    }

    Ok(circuit)
}

/// Probability of measuring |0..0> after running the IQP circuit of
/// `polynomial` on a fresh register of `env`
///
/// The register lives only for the duration of the call.
pub fn evaluate_circuit<B>(polynomial: &Polynomial, env: &B) -> Result<f64, IqpError>
where
    B: Backend + ?Sized,
{
    let circuit = compile(polynomial)?;
    let mut register = env.create_register(circuit.n_qubits())?;
    register.apply_circuit(&circuit)?;
    Ok(register.prob_amp(0)?)
}

#[cfg(test)]
mod tests {
    use super::{compile, evaluate_circuit, monomial_gate, IqpError};
    use crate::{
        expected_probability, gap, DenseEnv, Monomial, Polynomial, SimulatorError, StateVectorEnv,
    };

    fn m(variables: &[usize]) -> Monomial {
        Monomial::new(variables).unwrap()
    }

    #[test]
    fn circuit_layout() {
        let p = Polynomial::new(3, vec![m(&[1]), m(&[0, 2]), m(&[2, 1, 0])]).unwrap();
        let circ = compile(&p).unwrap();
        assert_eq!(circ.n_qubits(), 3);
        assert_eq!(
            circ.to_string(),
            "qubits 3\nh 0\nh 1\nh 2\nz 1\ncz 0 2\nccz 1 2 0\nh 0\nh 1\nh 2\n"
        );
    }

    #[test]
    fn unfilled_monomial_is_unsupported() {
        assert!(matches!(
            monomial_gate(4, &Monomial::default()),
            Err(IqpError::UnsupportedMonomial {
                index: 4,
                degree: 0,
                ..
            })
        ));
    }

    #[test]
    fn zero_polynomial_is_certain() {
        let env = StateVectorEnv::new();
        let p = Polynomial::zero(4).unwrap();
        assert!((evaluate_circuit(&p, &env).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn balanced_polynomial_never_returns() {
        let env = StateVectorEnv::new();
        let p = Polynomial::new(1, vec![m(&[0])]).unwrap();
        assert!(evaluate_circuit(&p, &env).unwrap().abs() < 1e-12);
    }

    #[test]
    fn known_gaps() {
        let env = StateVectorEnv::new();
        // x*y*z + x*z + y*z + x over four variables: amplitude 4 / 2^4
        let p = Polynomial::new(4, vec![m(&[0, 1, 2]), m(&[0, 2]), m(&[1, 2]), m(&[0])]).unwrap();
        assert!((evaluate_circuit(&p, &env).unwrap() - 0.0625).abs() < 1e-12);
        assert_eq!(gap(&p), 4);
        // x*y + x*z + y*z + x over four variables: amplitude 8 / 2^4
        let p = Polynomial::new(4, vec![m(&[0, 1]), m(&[0, 2]), m(&[1, 2]), m(&[0])]).unwrap();
        assert!((evaluate_circuit(&p, &env).unwrap() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn backends_agree() {
        let p = Polynomial::new(
            4,
            vec![m(&[3]), m(&[0, 3]), m(&[1, 2, 3]), m(&[2]), m(&[0, 1])],
        )
        .unwrap();
        let dense = evaluate_circuit(&p, &DenseEnv::new()).unwrap();
        let sv = evaluate_circuit(&p, &StateVectorEnv::new()).unwrap();
        assert!((dense - sv).abs() < 1e-12);
        assert!((sv - expected_probability(gap(&p), 4)).abs() < 1e-12);
    }

    #[test]
    fn register_too_large_for_env() {
        let p = Polynomial::zero(5).unwrap();
        assert!(matches!(
            evaluate_circuit(&p, &StateVectorEnv::with_max_qubits(4)),
            Err(IqpError::Simulator(SimulatorError::TooManyQubits {
                requested: 5,
                max: 4
            }))
        ));
    }
}
