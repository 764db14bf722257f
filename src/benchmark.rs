//! Benchmark driver: evaluates every instance a few times, checks the
//! repetitions agree, and records the mean wall-clock time.

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    io::{self, BufRead, Write},
    str::FromStr,
    time::Instant,
};

use tracing::{debug, info};

use crate::{evaluate_circuit, expected_probability, gap, Backend, IqpError, Polynomial};

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("Instance {instance} ({polynomial}): repetition gave {other}, first run gave {first}")]
    Inconsistent {
        instance: usize,
        polynomial: String,
        first: f64,
        other: f64,
    },
    #[error("Instance {instance} ({polynomial}): {source}")]
    Evaluation {
        instance: usize,
        polynomial: String,
        #[source]
        source: IqpError,
    },
    #[error("malformed result {text:?}, expected 'skipped' or '<probability> <nanos>'")]
    MalformedRecord { text: String },
    #[error("line {line}: {source}")]
    MalformedResult {
        line: usize,
        #[source]
        source: Box<BenchmarkError>,
    },
    #[error("{name}: {found} results for {expected} instances")]
    ResultCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Instance {instance} ({polynomial}): {name} gave {probability}, {reference_name} gave {reference}")]
    Disagreement {
        instance: usize,
        polynomial: String,
        name: String,
        probability: f64,
        reference_name: String,
        reference: f64,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// How each instance is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Simulate the IQP circuit and read the probability of |0..0>
    #[default]
    Circuit,
    /// Enumerate every valuation
    Exact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    /// Evaluations per instance; the reported time is their mean
    pub repetitions: usize,
    /// Instances with more variables are skipped
    pub max_variables: Option<usize>,
    /// Largest allowed difference between repetitions
    pub tolerance: f64,
    pub method: Method,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            repetitions: 4,
            max_variables: None,
            tolerance: 1e-5,
            method: Method::Circuit,
        }
    }
}

/// One line of a result file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BenchmarkRecord {
    Skipped,
    Measured { probability: f64, nanos: u128 },
}

impl Display for BenchmarkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Measured { probability, nanos } => write!(f, "{:.6} {}", probability, nanos),
        }
    }
}

impl FromStr for BenchmarkRecord {
    type Err = BenchmarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "skipped" {
            return Ok(Self::Skipped);
        }
        let malformed = || BenchmarkError::MalformedRecord {
            text: s.to_string(),
        };
        let (probability, nanos) = s.split_once(' ').ok_or_else(malformed)?;
        Ok(Self::Measured {
            probability: probability.parse().map_err(|_| malformed())?,
            nanos: nanos.trim().parse().map_err(|_| malformed())?,
        })
    }
}

/// Probability of |0..0> for `polynomial` by the configured method
pub fn evaluate<B>(polynomial: &Polynomial, env: &B, method: Method) -> Result<f64, IqpError>
where
    B: Backend + ?Sized,
{
    match method {
        Method::Circuit => evaluate_circuit(polynomial, env),
        Method::Exact => Ok(expected_probability(gap(polynomial), polynomial.variables())),
    }
}

/// Benchmarks one instance
pub fn benchmark_instance<F>(
    instance: usize,
    polynomial: &Polynomial,
    config: &BenchmarkConfig,
    evaluate: &mut F,
) -> Result<BenchmarkRecord, BenchmarkError>
where
    F: FnMut(&Polynomial) -> Result<f64, IqpError>,
{
    if config
        .max_variables
        .is_some_and(|max| polynomial.variables() > max)
    {
        debug!(instance, variables = polynomial.variables(), "skipped");
        return Ok(BenchmarkRecord::Skipped);
    }

    let evaluation_error = |source| BenchmarkError::Evaluation {
        instance,
        polynomial: polynomial.to_string(),
        source,
    };

    let repetitions = config.repetitions.max(1);
    let start = Instant::now();
    let probability = evaluate(polynomial).map_err(evaluation_error)?;
    for _ in 1..repetitions {
        let other = evaluate(polynomial).map_err(evaluation_error)?;
        if (probability - other).abs() >= config.tolerance {
            return Err(BenchmarkError::Inconsistent {
                instance,
                polynomial: polynomial.to_string(),
                first: probability,
                other,
            });
        }
    }
    let nanos = start.elapsed().as_nanos() / repetitions as u128;

    debug!(
        instance,
        variables = polynomial.variables(),
        length = polynomial.len(),
        probability,
        nanos,
        "measured"
    );
    Ok(BenchmarkRecord::Measured { probability, nanos })
}

/// Benchmarks every instance, writing one result line per instance
pub fn run_benchmark<F, W>(
    polynomials: &[Polynomial],
    config: &BenchmarkConfig,
    out: &mut W,
    mut evaluate: F,
) -> Result<Vec<BenchmarkRecord>, BenchmarkError>
where
    F: FnMut(&Polynomial) -> Result<f64, IqpError>,
    W: Write,
{
    info!(
        instances = polynomials.len(),
        repetitions = config.repetitions,
        method = ?config.method,
        "starting benchmark"
    );

    let mut records = Vec::with_capacity(polynomials.len());
    for (instance, polynomial) in polynomials.iter().enumerate() {
        let record = benchmark_instance(instance, polynomial, config, &mut evaluate)?;
        writeln!(out, "{}", record)?;
        records.push(record);
    }
    out.flush()?;

    let skipped = records
        .iter()
        .filter(|r| matches!(r, BenchmarkRecord::Skipped))
        .count();
    info!(measured = records.len() - skipped, skipped, "benchmark done");
    Ok(records)
}

/// Reads back a result file written by `run_benchmark`
pub fn read_results<R: BufRead>(reader: R) -> Result<Vec<BenchmarkRecord>, BenchmarkError> {
    let mut records = Vec::new();
    for (number, text) in reader.lines().enumerate() {
        let text = text?;
        if text.trim().is_empty() {
            continue;
        }
        let record = text
            .parse()
            .map_err(|source| BenchmarkError::MalformedResult {
                line: number + 1,
                source: Box::new(source),
            })?;
        records.push(record);
    }
    Ok(records)
}

/// Mean time per variable count of several result sets over the same
/// instances
#[derive(Debug, Clone, PartialEq)]
pub struct TimingTable {
    pub names: Vec<String>,
    /// Mean nanoseconds of each result set, `None` where it skipped every
    /// instance of that size
    pub rows: BTreeMap<usize, Vec<Option<f64>>>,
}

impl Display for TimingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>9}", "variables")?;
        for name in &self.names {
            write!(f, " {:>14}", name)?;
        }
        writeln!(f)?;
        for (variables, means) in &self.rows {
            write!(f, "{:>9}", variables)?;
            for mean in means {
                match mean {
                    Some(nanos) => write!(f, " {:>14.0}", nanos)?,
                    None => write!(f, " {:>14}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Checks that result sets of the same instances report the same
/// probabilities and averages their timings per variable count
///
/// The first set measuring an instance is the reference for it; skipped
/// instances are left out of both the check and the timings.
pub fn compare_results(
    polynomials: &[Polynomial],
    results: &[(String, Vec<BenchmarkRecord>)],
    tolerance: f64,
) -> Result<TimingTable, BenchmarkError> {
    let mut reference: Vec<Option<(f64, &str)>> = vec![None; polynomials.len()];
    let mut totals: Vec<BTreeMap<usize, (u128, u128)>> = Vec::with_capacity(results.len());

    for (name, records) in results {
        if records.len() != polynomials.len() {
            return Err(BenchmarkError::ResultCount {
                name: name.clone(),
                expected: polynomials.len(),
                found: records.len(),
            });
        }

        let mut sums: BTreeMap<usize, (u128, u128)> = BTreeMap::new();
        for (instance, (polynomial, record)) in polynomials.iter().zip(records).enumerate() {
            let BenchmarkRecord::Measured { probability, nanos } = *record else {
                continue;
            };
            let current = reference[instance];
            match current {
                None => reference[instance] = Some((probability, name.as_str())),
                Some((expected, reference_name)) if (expected - probability).abs() >= tolerance => {
                    return Err(BenchmarkError::Disagreement {
                        instance,
                        polynomial: polynomial.to_string(),
                        name: name.clone(),
                        probability,
                        reference_name: reference_name.to_string(),
                        reference: expected,
                    });
                }
                Some(_) => {}
            }
            let (total, count) = sums.entry(polynomial.variables()).or_insert((0, 0));
            *total += nanos;
            *count += 1;
        }
        debug!(%name, sizes = sums.len(), "results agree");
        totals.push(sums);
    }

    let mut rows: BTreeMap<usize, Vec<Option<f64>>> = BTreeMap::new();
    for sums in &totals {
        for &variables in sums.keys() {
            rows.entry(variables).or_insert_with(|| {
                totals
                    .iter()
                    .map(|sums| {
                        sums.get(&variables)
                            .map(|&(total, count)| total as f64 / count as f64)
                    })
                    .collect()
            });
        }
    }

    info!(sets = results.len(), sizes = rows.len(), "results compared");
    Ok(TimingTable {
        names: results.iter().map(|(name, _)| name.clone()).collect(),
        rows,
    })
}

/// Exact and simulated evaluations of the same polynomial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossCheck {
    pub gap: i64,
    pub expected: f64,
    pub simulated: f64,
}

impl CrossCheck {
    pub fn error(&self) -> f64 {
        (self.expected - self.simulated).abs()
    }

    pub fn agrees(&self, tolerance: f64) -> bool {
        self.error() <= tolerance
    }
}

/// Evaluates `polynomial` both ways; the caller decides what tolerance
/// counts as agreement
pub fn cross_check<B>(polynomial: &Polynomial, env: &B) -> Result<CrossCheck, IqpError>
where
    B: Backend + ?Sized,
{
    let gap = gap(polynomial);
    let simulated = evaluate_circuit(polynomial, env)?;
    Ok(CrossCheck {
        gap,
        expected: expected_probability(gap, polynomial.variables()),
        simulated,
    })
}
