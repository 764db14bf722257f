use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolynomialError {
    #[error("Monomial degree {degree} is not supported (expected 1 to {max})", max = Monomial::MAX_DEGREE)]
    InvalidDegree { degree: usize },
    #[error("Variable x{variable} appears more than once in a monomial")]
    DuplicateVariable { variable: usize },
    #[error("Monomial {monomial} uses x{variable} but the polynomial has {variables} variables")]
    VariableOutOfRange {
        monomial: usize,
        variable: usize,
        variables: usize,
    },
    #[error("Monomial {monomial} was never filled in")]
    UnfilledMonomial { monomial: usize },
    #[error("Monomial index {index} is out of bounds for length {length}")]
    MonomialIndex { index: usize, length: usize },
    #[error("{variables} variables requested, at most {max} are supported")]
    TooManyVariables { variables: usize, max: usize },
    #[error("Valuation has {actual} values, expected {expected}")]
    ValuationLength { expected: usize, actual: usize },
    #[error("Variable x{variable} cannot be indexed, at most {max} variables are supported")]
    UnaddressableVariable { variable: usize, max: usize },
    #[error("Variable x{variable} has no value in a valuation of {length} values")]
    UnassignedVariable { variable: usize, length: usize },
}

/// # Monomial
/// A product of one to three distinct variables.
///
/// The default value has degree 0 and stands for a monomial that
/// has not been filled in yet; it is rejected when a polynomial is
/// built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Monomial {
    degree: usize,
    x: [usize; 3],
}

impl Monomial {
    pub const MAX_DEGREE: usize = 3;

    pub fn new(variables: &[usize]) -> Result<Self, PolynomialError> {
        let degree = variables.len();
        if degree == 0 || degree > Self::MAX_DEGREE {
            return Err(PolynomialError::InvalidDegree { degree });
        }

        let mut x = [0; Self::MAX_DEGREE];
        for (d, &variable) in variables.iter().enumerate() {
            if variable >= Polynomial::MAX_VARIABLES {
                return Err(PolynomialError::UnaddressableVariable {
                    variable,
                    max: Polynomial::MAX_VARIABLES,
                });
            }
            if variables[..d].contains(&variable) {
                return Err(PolynomialError::DuplicateVariable { variable });
            }
            x[d] = variable;
        }

        Ok(Self { degree, x })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Variable indices in the order they were given
    pub fn variables(&self) -> &[usize] {
        &self.x[..self.degree]
    }

    /// Bitmask with bit `i` set for every variable `x{i}`
    ///
    /// Indices are below `Polynomial::MAX_VARIABLES`, so every bit fits.
    pub fn mask(&self) -> u64 {
        self.variables()
            .iter()
            .fold(0, |mask, &variable| mask | (1 << variable))
    }

    /// Logical AND of the assigned values
    pub fn evaluate(&self, valuation: &[bool]) -> Result<bool, PolynomialError> {
        self.variables().iter().try_fold(true, |product, &variable| {
            let value = valuation
                .get(variable)
                .ok_or(PolynomialError::UnassignedVariable {
                    variable,
                    length: valuation.len(),
                })?;
            Ok(product && *value)
        })
    }
}

impl Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut variables = self.variables().iter();
        match variables.next() {
            Some(first) => write!(f, "x{}", first)?,
            None => return write!(f, "1"),
        }
        for variable in variables {
            write!(f, " * x{}", variable)?;
        }
        Ok(())
    }
}

/// # Polynomial
/// A multilinear polynomial over GF(2): the XOR of its monomials.
///
/// Monomial order carries no meaning but is preserved for display
/// and for the order of gates in the compiled circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    variables: usize,
    monomials: Vec<Monomial>,
}

impl Polynomial {
    /// Keeps valuations representable as a `u64` mask and the gap
    /// within `i64`
    pub const MAX_VARIABLES: usize = 62;

    pub fn new(variables: usize, monomials: Vec<Monomial>) -> Result<Self, PolynomialError> {
        if variables > Self::MAX_VARIABLES {
            return Err(PolynomialError::TooManyVariables {
                variables,
                max: Self::MAX_VARIABLES,
            });
        }

        for (index, monomial) in monomials.iter().enumerate() {
            if monomial.degree() == 0 {
                return Err(PolynomialError::UnfilledMonomial { monomial: index });
            }
            if let Some(&variable) = monomial.variables().iter().find(|&&v| v >= variables) {
                return Err(PolynomialError::VariableOutOfRange {
                    monomial: index,
                    variable,
                    variables,
                });
            }
        }

        Ok(Self {
            variables,
            monomials,
        })
    }

    /// The zero polynomial over `variables` variables
    pub fn zero(variables: usize) -> Result<Self, PolynomialError> {
        Self::new(variables, Vec::new())
    }

    pub fn variables(&self) -> usize {
        self.variables
    }

    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn monomials(&self) -> &[Monomial] {
        &self.monomials
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Monomial> {
        self.monomials.iter()
    }

    /// Value of the polynomial at one assignment of its variables
    pub fn evaluate(&self, valuation: &[bool]) -> Result<bool, PolynomialError> {
        if valuation.len() != self.variables {
            return Err(PolynomialError::ValuationLength {
                expected: self.variables,
                actual: valuation.len(),
            });
        }

        self.monomials
            .iter()
            .try_fold(false, |sum, monomial| Ok(sum ^ monomial.evaluate(valuation)?))
    }
}

impl<'a> IntoIterator for &'a Polynomial {
    type Item = &'a Monomial;
    type IntoIter = std::slice::Iter<'a, Monomial>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut monomials = self.monomials.iter();
        match monomials.next() {
            Some(first) => write!(f, "{}", first)?,
            None => return write!(f, "0"),
        }
        for monomial in monomials {
            write!(f, " + {}", monomial)?;
        }
        Ok(())
    }
}

/// # PolynomialBuilder
/// Allocates a polynomial of known length whose monomials are
/// filled in one by one, as a parser does.
#[derive(Debug, Clone)]
pub struct PolynomialBuilder {
    variables: usize,
    monomials: Vec<Monomial>,
}

impl PolynomialBuilder {
    pub fn new(length: usize, variables: usize) -> Self {
        Self {
            variables,
            monomials: vec![Monomial::default(); length],
        }
    }

    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn set(&mut self, index: usize, monomial: Monomial) -> Result<&mut Self, PolynomialError> {
        let length = self.monomials.len();
        let slot = self
            .monomials
            .get_mut(index)
            .ok_or(PolynomialError::MonomialIndex { index, length })?;
        *slot = monomial;
        Ok(self)
    }

    pub fn build(self) -> Result<Polynomial, PolynomialError> {
        Polynomial::new(self.variables, self.monomials)
    }
}
