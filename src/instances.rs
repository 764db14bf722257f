//! Text format for benchmark instances.
//!
//! ```text
//! # length: 3, variables: 3
//! x0 * x1 + x2 + x0 * x1 * x2
//! x1 + x0 * x2 + x2
//!
//! # length: 0, variables: 2
//! 0
//! ```
//!
//! A header declares the length and variable count of every polynomial
//! line until the next header. Blank lines and other `#` comments are
//! ignored.

use std::io::{self, BufRead, Write};

use crate::{Monomial, Polynomial, PolynomialBuilder, PolynomialError};

#[derive(Debug, thiserror::Error)]
pub enum InstanceError {
    #[error("line {line}: polynomial before any '# length: L, variables: V' header")]
    MissingHeader { line: usize },
    #[error("line {line}: malformed header {text:?}")]
    MalformedHeader { line: usize, text: String },
    #[error("line {line}: malformed term {term:?}")]
    MalformedTerm { line: usize, term: String },
    #[error("line {line}: {found} monomials, header declares {declared}")]
    LengthMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },
    #[error("line {line}: {source}")]
    Polynomial {
        line: usize,
        #[source]
        source: PolynomialError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Declared shape of the polynomials following a header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceHeader {
    pub length: usize,
    pub variables: usize,
}

impl InstanceHeader {
    /// Parses `# length: L, variables: V`; `None` for other comments
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('#')?.trim();
        let (length, variables) = rest.split_once(',')?;
        let length = length.trim().strip_prefix("length:")?.trim().parse().ok()?;
        let variables = variables
            .trim()
            .strip_prefix("variables:")?
            .trim()
            .parse()
            .ok()?;
        Some(Self { length, variables })
    }
}

/// Parses one polynomial line such as `x0 * x2 + x1`
///
/// `line` is only used to locate errors.
pub fn parse_polynomial(
    text: &str,
    header: InstanceHeader,
    line: usize,
) -> Result<Polynomial, InstanceError> {
    let text = text.trim();
    let polynomial_error = |source| InstanceError::Polynomial { line, source };

    if text == "0" {
        if header.length != 0 {
            return Err(InstanceError::LengthMismatch {
                line,
                declared: header.length,
                found: 0,
            });
        }
        return Polynomial::zero(header.variables).map_err(polynomial_error);
    }

    let terms: Vec<&str> = text.split('+').collect();
    if terms.len() != header.length {
        return Err(InstanceError::LengthMismatch {
            line,
            declared: header.length,
            found: terms.len(),
        });
    }

    let mut builder = PolynomialBuilder::new(header.length, header.variables);
    for (index, term) in terms.into_iter().enumerate() {
        let variables = term
            .split('*')
            .map(|factor| parse_variable(factor.trim()))
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| InstanceError::MalformedTerm {
                line,
                term: term.trim().to_string(),
            })?;
        let monomial = Monomial::new(&variables).map_err(polynomial_error)?;
        builder.set(index, monomial).map_err(polynomial_error)?;
    }

    builder.build().map_err(polynomial_error)
}

fn parse_variable(factor: &str) -> Option<usize> {
    let digits = factor.strip_prefix('x')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Reads every polynomial of an instance file
pub fn read_instances<R: BufRead>(reader: R) -> Result<Vec<Polynomial>, InstanceError> {
    let mut header = None;
    let mut polynomials = Vec::new();

    for (number, text) in reader.lines().enumerate() {
        let text = text?;
        let line = number + 1;
        let trimmed = text.trim();

        if trimmed.is_empty() {
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            match InstanceHeader::parse(trimmed) {
                Some(parsed) => header = Some(parsed),
                None if comment.trim_start().starts_with("length") => {
                    return Err(InstanceError::MalformedHeader {
                        line,
                        text: trimmed.to_string(),
                    })
                }
                // Other comments
                None => {}
            }
            continue;
        }

        let header = header.ok_or(InstanceError::MissingHeader { line })?;
        polynomials.push(parse_polynomial(trimmed, header, line)?);
    }

    Ok(polynomials)
}

/// Writes one header followed by one polynomial per line and a blank line
pub fn write_instance_group<W: Write>(
    out: &mut W,
    header: InstanceHeader,
    polynomials: &[Polynomial],
) -> io::Result<()> {
    writeln!(
        out,
        "# length: {}, variables: {}",
        header.length, header.variables
    )?;
    for polynomial in polynomials {
        writeln!(out, "{}", polynomial)?;
    }
    writeln!(out)
}
