use std::{
    f64::consts::FRAC_1_SQRT_2,
    fmt::{self, Display},
};

use nalgebra::{Complex, Matrix2};

use crate::cart;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct QBits(usize);

impl QBits {
    /// Specify qubits from bitstring
    pub fn from_bitstring(bits: usize) -> Self {
        Self(bits)
    }

    /// Specify qubits from a list of indices
    pub fn from_indices<'a, I>(indices: I) -> Self
    where
        I: IntoIterator<Item = &'a usize>,
    {
        let mut bits = 0;
        for i in indices {
            bits |= 1 << i;
        }
        Self(bits)
    }

    pub fn get_bitstring(&self) -> usize {
        self.0
    }

    pub fn get_indices(&self) -> Vec<usize> {
        let mut bits = self.0;
        let mut vec = Vec::new();
        let mut index = 0;

        while bits != 0 {
            if bits & 1 == 1 {
                vec.push(index);
            }
            bits >>= 1;
            index += 1;
        }

        vec
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Highest qubit index in the set
    pub fn highest(&self) -> Option<usize> {
        (self.0 != 0).then(|| (usize::BITS - 1 - self.0.leading_zeros()) as usize)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateType {
    /// Hadamard
    H,
    /// Pauli-Z, a phase flip of |1>
    Z,
}

impl GateType {
    #[rustfmt::skip]
    pub const PAULI_Z_DATA: [Complex<f64>; 4] = [
        cart!(1.0), cart!(0.0),
        cart!(0.0), cart!(-1.0),
    ];

    #[rustfmt::skip]
    pub const HADAMARD_DATA: [Complex<f64>; 4] = [
        cart!(FRAC_1_SQRT_2), cart!(FRAC_1_SQRT_2),
        cart!(FRAC_1_SQRT_2), cart!(-FRAC_1_SQRT_2),
    ];

    pub fn matrix(&self) -> Matrix2<Complex<f64>> {
        let data = match self {
            Self::H => &Self::HADAMARD_DATA,
            Self::Z => &Self::PAULI_Z_DATA,
        };
        Matrix2::from_row_slice(data)
    }

    /// Diagonal gates only change phases, never move amplitude
    pub fn is_diagonal(&self) -> bool {
        matches!(self, Self::Z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("A gate needs exactly one target qubit")]
    InvalidTargets,
    #[error("Qubit {qubit} is used more than once by the same gate")]
    OverlappingQubits { qubit: usize },
    #[error("Qubit {qubit} cannot be addressed by a gate")]
    UnaddressableQubit { qubit: usize },
}

/// # Gate
/// A single-target gate applied when every control qubit is |1>.
///
/// Phase flips are symmetric in their qubits, so which of them ends
/// up as the target does not change the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    ty: GateType,
    controls: QBits,
    targets: QBits,
}

impl Gate {
    pub fn new(ty: GateType, controls: &[usize], targets: &[usize]) -> Result<Self, GateError> {
        if targets.len() != 1 {
            return Err(GateError::InvalidTargets);
        }

        let mut seen: Vec<usize> = Vec::with_capacity(controls.len() + 1);
        for &qubit in controls.iter().chain(targets) {
            if qubit >= usize::BITS as usize {
                return Err(GateError::UnaddressableQubit { qubit });
            }
            if seen.contains(&qubit) {
                return Err(GateError::OverlappingQubits { qubit });
            }
            seen.push(qubit);
        }

        Ok(Self {
            ty,
            controls: QBits::from_indices(controls),
            targets: QBits::from_indices(targets),
        })
    }

    pub fn hadamard(target: usize) -> Result<Self, GateError> {
        Self::new(GateType::H, &[], &[target])
    }

    pub fn pauli_z(target: usize) -> Result<Self, GateError> {
        Self::new(GateType::Z, &[], &[target])
    }

    pub fn controlled_phase_flip(control: usize, target: usize) -> Result<Self, GateError> {
        Self::new(GateType::Z, &[control], &[target])
    }

    /// Phase flip of the basis states where every listed qubit is |1>
    pub fn multi_controlled_phase_flip(qubits: &[usize]) -> Result<Self, GateError> {
        match qubits.split_last() {
            Some((target, controls)) => Self::new(GateType::Z, controls, &[*target]),
            None => Err(GateError::InvalidTargets),
        }
    }

    pub fn get_type(&self) -> GateType {
        self.ty
    }

    pub fn get_control_bits(&self) -> QBits {
        self.controls
    }

    pub fn get_target_bits(&self) -> QBits {
        self.targets
    }

    pub fn get_controls(&self) -> Vec<usize> {
        self.get_control_bits().get_indices()
    }

    pub fn get_targets(&self) -> Vec<usize> {
        self.get_target_bits().get_indices()
    }

    /// The single target qubit
    pub fn target(&self) -> usize {
        self.targets.highest().unwrap_or_default()
    }

    /// Every qubit touched by the gate
    pub fn qubits(&self) -> QBits {
        QBits::from_bitstring(self.controls.get_bitstring() | self.targets.get_bitstring())
    }
}

impl Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.ty {
            GateType::H => "h",
            GateType::Z => "z",
        };
        write!(f, "{}{}", "c".repeat(self.controls.count()), name)?;
        for qubit in self.get_controls().iter().chain(self.get_targets().iter()) {
            write!(f, " {}", qubit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Matrix2;

    use super::{Gate, GateError, GateType, QBits};
    use crate::{cart, ext::equal_to_matrix_c};

    #[test]
    fn qbits_round_trip() {
        let bits = QBits::from_indices(&[0, 3, 5]);
        assert_eq!(bits.get_bitstring(), 0b101001);
        assert_eq!(bits.get_indices(), vec![0, 3, 5]);
        assert_eq!(bits.count(), 3);
        assert_eq!(bits.highest(), Some(5));
        assert_eq!(QBits::default().highest(), None);
    }

    #[test]
    fn hadamard_is_involution() {
        let h = GateType::H.matrix();
        assert!(equal_to_matrix_c(&(h * h), &Matrix2::identity(), 1e-12));
    }

    #[test]
    fn z_is_diagonal() {
        let z = GateType::Z.matrix();
        assert!(GateType::Z.is_diagonal());
        assert!(!GateType::H.is_diagonal());
        assert_eq!(z[(1, 1)], cart!(-1.0));
        assert_eq!(z[(0, 1)], cart!(0.0));
    }

    #[test]
    fn multi_controlled_splits_last_as_target() {
        let g = Gate::multi_controlled_phase_flip(&[4, 0, 2]).unwrap();
        assert_eq!(g.get_controls(), vec![0, 4]);
        assert_eq!(g.target(), 2);
        assert_eq!(g.qubits().get_indices(), vec![0, 2, 4]);
        assert_eq!(g.to_string(), "ccz 0 4 2");
    }

    #[test]
    fn rejects_bad_qubits() {
        assert_eq!(
            Gate::controlled_phase_flip(1, 1),
            Err(GateError::OverlappingQubits { qubit: 1 })
        );
        assert_eq!(
            Gate::multi_controlled_phase_flip(&[]),
            Err(GateError::InvalidTargets)
        );
        assert_eq!(
            Gate::new(GateType::Z, &[0], &[1, 2]),
            Err(GateError::InvalidTargets)
        );
        assert_eq!(
            Gate::hadamard(64),
            Err(GateError::UnaddressableQubit { qubit: 64 })
        );
    }
}
