use std::cmp::Ordering;

use nalgebra::{Complex, Dim, Matrix, RawStorage};

/// Builds a `Complex<f64>` from cartesian components.
///
/// `cart!(re)` is a purely real number, `cart!(re, im)` the full form.
/// Usable in `const` context.
#[macro_export]
macro_rules! cart {
    ($re:expr) => {
        ::nalgebra::Complex::<f64>::new($re, 0.0)
    };
    ($re:expr, $im:expr) => {
        ::nalgebra::Complex::<f64>::new($re, $im)
    };
}

/// Compares two complex numbers
///
/// Equality is determined by the real and imaginary parts both
/// being within `margin` of each other
///
/// Otherwise the numbers are ordered by norm, and by phase on
/// [-π, π) when the norms are equal
///
/// If any component is `NAN` then `None` will be returned
pub fn cmp_c(lhs: Complex<f64>, rhs: Complex<f64>, margin: f64) -> Option<Ordering> {
    if lhs.re.is_nan() || lhs.im.is_nan() || rhs.re.is_nan() || rhs.im.is_nan() {
        return None;
    }
    if (lhs.re - rhs.re).abs() <= margin.abs() && (lhs.im - rhs.im).abs() <= margin.abs() {
        return Some(Ordering::Equal);
    }
    match lhs.norm().partial_cmp(&rhs.norm()) {
        Some(Ordering::Equal) => lhs.arg().partial_cmp(&rhs.arg()),
        ord => ord,
    }
}

/// Compares complex elements using ´cmp_c´
///
/// Equality is determined by every element being equal
///
/// Returns the ordering of the first element that differs
pub fn cmp_elements<R, C, S>(
    lhs: &Matrix<Complex<f64>, R, C, S>,
    rhs: &Matrix<Complex<f64>, R, C, S>,
    margin: f64,
) -> Option<Ordering>
where
    R: Dim,
    C: Dim,
    S: RawStorage<Complex<f64>, R, C>,
{
    if lhs.shape() != rhs.shape() {
        return None;
    }
    for (lel, rel) in lhs.iter().zip(rhs.iter()) {
        match cmp_c(*lel, *rel, margin) {
            Some(Ordering::Equal) => continue,
            ord => return ord,
        }
    }

    Some(Ordering::Equal)
}

/// True when both matrices have the same shape and every element
/// is within `margin`
pub fn equal_to_matrix_c<R, C, S>(
    lhs: &Matrix<Complex<f64>, R, C, S>,
    rhs: &Matrix<Complex<f64>, R, C, S>,
    margin: f64,
) -> bool
where
    R: Dim,
    C: Dim,
    S: RawStorage<Complex<f64>, R, C>,
{
    cmp_elements(lhs, rhs, margin) == Some(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use nalgebra::dvector;

    use super::{cmp_c, equal_to_matrix_c};

    #[test]
    fn close_numbers_are_equal() {
        assert_eq!(
            cmp_c(cart!(0.5, 0.25), cart!(0.5 + 1e-9, 0.25), 1e-6),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn ordered_by_norm() {
        assert_eq!(cmp_c(cart!(2.0), cart!(1.0), 1e-6), Some(Ordering::Greater));
        assert_eq!(cmp_c(cart!(0.0, 1.0), cart!(-3.0), 1e-6), Some(Ordering::Less));
    }

    #[test]
    fn nan_is_unordered() {
        assert_eq!(cmp_c(cart!(f64::NAN), cart!(1.0), 1e-6), None);
    }

    #[test]
    fn vectors() {
        let a = dvector![cart!(1.0), cart!(0.0, -1.0)];
        let b = dvector![cart!(1.0), cart!(0.0, -1.0 + 1e-8)];
        let c = dvector![cart!(1.0), cart!(0.0, 1.0)];
        assert!(equal_to_matrix_c(&a, &b, 1e-6));
        assert!(!equal_to_matrix_c(&a, &c, 1e-6));
    }
}
