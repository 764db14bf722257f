//! Random polynomials for property tests and benchmark instances.
//!
//! Every generator takes the random source explicitly so that a seeded
//! `StdRng` reproduces the same instances.

use std::collections::HashSet;

use rand::Rng;

use crate::{Monomial, Polynomial, PolynomialError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("Cannot draw a monomial over zero variables")]
    NoVariables,
    #[error("Maximum degree must be at least 1")]
    NoDegree,
    #[error("Maximum length must be at least 1")]
    NoLength,
    #[error("Only {available} distinct monomials exist over {variables} variables, {length} requested")]
    NotEnoughMonomials {
        length: usize,
        variables: usize,
        available: usize,
    },
    #[error(transparent)]
    Polynomial(#[from] PolynomialError),
}

/// Draws a monomial of degree uniform in `[1, min(max_degree, 3, variables)]`
/// whose variables are distinct and uniform in `[0, variables)`.
pub fn random_monomial<R>(
    rng: &mut R,
    variables: usize,
    max_degree: usize,
) -> Result<Monomial, GeneratorError>
where
    R: Rng + ?Sized,
{
    if variables == 0 {
        return Err(GeneratorError::NoVariables);
    }
    if max_degree == 0 {
        return Err(GeneratorError::NoDegree);
    }

    let max_degree = max_degree.min(Monomial::MAX_DEGREE).min(variables);
    let degree = rng.random_range(1..=max_degree);

    // The d-th variable is the rank-th one not taken yet
    let mut taken = vec![false; variables];
    let mut x = Vec::with_capacity(degree);
    for d in 0..degree {
        let rank = rng.random_range(0..variables - d);
        let index = taken
            .iter()
            .enumerate()
            .filter(|&(_, &taken)| !taken)
            .nth(rank)
            .map(|(i, _)| i)
            .ok_or(GeneratorError::NoVariables)?;
        taken[index] = true;
        x.push(index);
    }

    Ok(Monomial::new(&x)?)
}

/// Draws a polynomial with length uniform in `[0, max_length)`, variable
/// count uniform in `[1, max_variables]` and independent random monomials.
pub fn random_polynomial<R>(
    rng: &mut R,
    max_length: usize,
    max_variables: usize,
    max_degree: usize,
) -> Result<Polynomial, GeneratorError>
where
    R: Rng + ?Sized,
{
    if max_length == 0 {
        return Err(GeneratorError::NoLength);
    }
    if max_variables == 0 {
        return Err(GeneratorError::NoVariables);
    }

    let length = rng.random_range(0..max_length);
    let variables = rng.random_range(1..=max_variables);
    let monomials = (0..length)
        .map(|_| random_monomial(rng, variables, max_degree))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Polynomial::new(variables, monomials)?)
}

/// Draws a polynomial of exactly `length` pairwise distinct monomials
/// over `variables` variables, as used for benchmark instances.
pub fn random_distinct_polynomial<R>(
    rng: &mut R,
    length: usize,
    variables: usize,
) -> Result<Polynomial, GeneratorError>
where
    R: Rng + ?Sized,
{
    if variables == 0 {
        return Err(GeneratorError::NoVariables);
    }
    if variables > Polynomial::MAX_VARIABLES {
        return Err(PolynomialError::TooManyVariables {
            variables,
            max: Polynomial::MAX_VARIABLES,
        }
        .into());
    }
    let available = distinct_monomials(variables);
    if length > available {
        return Err(GeneratorError::NotEnoughMonomials {
            length,
            variables,
            available,
        });
    }

    let mut seen = HashSet::with_capacity(length);
    let mut monomials = Vec::with_capacity(length);
    while monomials.len() < length {
        let monomial = random_monomial(rng, variables, Monomial::MAX_DEGREE)?;
        if seen.insert(monomial.mask()) {
            monomials.push(monomial);
        }
    }

    Ok(Polynomial::new(variables, monomials)?)
}

/// Number of monomials of degree 1 to 3 over `variables` variables
pub fn distinct_monomials(variables: usize) -> usize {
    let n = variables;
    n + n * n.saturating_sub(1) / 2 + n * n.saturating_sub(1) * n.saturating_sub(2) / 6
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    use super::{
        distinct_monomials, random_distinct_polynomial, random_monomial, random_polynomial,
        GeneratorError,
    };

    #[test]
    fn rejects_empty_ranges() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(random_monomial(&mut rng, 0, 3), Err(GeneratorError::NoVariables));
        assert_eq!(random_monomial(&mut rng, 3, 0), Err(GeneratorError::NoDegree));
        assert_eq!(random_polynomial(&mut rng, 0, 3, 3), Err(GeneratorError::NoLength));
        assert_eq!(random_polynomial(&mut rng, 3, 0, 3), Err(GeneratorError::NoVariables));
    }

    #[test]
    fn same_seed_same_polynomial() {
        let a = random_polynomial(&mut StdRng::seed_from_u64(42), 16, 16, 3).unwrap();
        let b = random_polynomial(&mut StdRng::seed_from_u64(42), 16, 16, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_degree_is_reachable() {
        let mut rng = StdRng::seed_from_u64(7);
        let degrees: HashSet<usize> = (0..200)
            .map(|_| random_monomial(&mut rng, 5, 3).unwrap().degree())
            .collect();
        assert_eq!(degrees, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn counts_distinct_monomials() {
        assert_eq!(distinct_monomials(1), 1);
        assert_eq!(distinct_monomials(2), 3);
        assert_eq!(distinct_monomials(3), 7);
        assert_eq!(distinct_monomials(4), 4 + 6 + 4);
    }

    #[test]
    fn distinct_polynomial_exhausts_small_universe() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = random_distinct_polynomial(&mut rng, 7, 3).unwrap();
        let masks: HashSet<u64> = p.iter().map(|m| m.mask()).collect();
        assert_eq!(p.len(), 7);
        assert_eq!(masks.len(), 7);
    }

    #[test]
    fn distinct_polynomial_too_long() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            random_distinct_polynomial(&mut rng, 4, 2),
            Err(GeneratorError::NotEnoughMonomials {
                length: 4,
                variables: 2,
                available: 3
            })
        );
    }

    proptest! {
        #[test]
        fn monomial_degree_and_distinctness(
            seed in any::<u64>(),
            variables in 1usize..20,
            max_degree in 1usize..6,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let monomial = random_monomial(&mut rng, variables, max_degree).unwrap();
            prop_assert!(monomial.degree() >= 1);
            prop_assert!(monomial.degree() <= variables);
            prop_assert!(monomial.degree() <= max_degree);
            let unique: HashSet<usize> = monomial.variables().iter().copied().collect();
            prop_assert_eq!(unique.len(), monomial.degree());
            prop_assert!(monomial.variables().iter().all(|&x| x < variables));
        }

        #[test]
        fn polynomial_bounds(
            seed in any::<u64>(),
            max_length in 1usize..17,
            max_variables in 1usize..17,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = random_polynomial(&mut rng, max_length, max_variables, 3).unwrap();
            prop_assert!(p.len() < max_length);
            prop_assert!(p.variables() >= 1 && p.variables() <= max_variables);
            for monomial in &p {
                prop_assert!(monomial.variables().iter().all(|&x| x < p.variables()));
            }
        }
    }
}
