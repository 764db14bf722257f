//! `iqp-gap` binary: generates benchmark instances, times gap evaluation
//! over an instance file, compares result files of several backends, and
//! cross-checks the circuit against the exact solver on random polynomials.
//!
//! ```bash
//! iqp-gap generate --max-variables 20 --output instances.txt
//! iqp-gap benchmark instances.txt sv.txt --variables 16
//! iqp-gap benchmark instances.txt exact.txt --method exact
//! iqp-gap compare instances.txt statevector:sv.txt exact:exact.txt
//! iqp-gap check --instances 256 --seed 7
//! ```

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use iqp_gap::{
    compare_results, cross_check, distinct_monomials, evaluate, random_distinct_polynomial,
    random_polynomial, read_instances, read_results, run_benchmark, write_instance_group, Backend,
    BenchmarkConfig, DenseEnv, InstanceHeader, Method, Polynomial, StateVectorEnv,
};

#[derive(Parser, Debug)]
#[command(
    name = "iqp-gap",
    version,
    about = "Gap of degree-3 GF(2) polynomials, exactly and through IQP circuits",
    long_about = None,
)]
struct Args {
    /// Log level used when RUST_LOG is unset: trace, debug, info, warn, error.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Time the evaluation of every polynomial in an instance file
    Benchmark {
        /// Instance file
        source: PathBuf,
        /// Result file, one line per instance
        target: PathBuf,
        /// Skip instances with more variables than this
        #[arg(long)]
        variables: Option<usize>,
        #[arg(long, default_value_t = 4)]
        repetitions: usize,
        /// Largest allowed difference between repetitions
        #[arg(long, default_value_t = 1e-5)]
        tolerance: f64,
        #[arg(long, value_enum, default_value_t = MethodArg::Circuit)]
        method: MethodArg,
        #[arg(long, value_enum, default_value_t = BackendArg::Statevector)]
        backend: BackendArg,
        /// Largest register the backend may allocate
        #[arg(long)]
        max_qubits: Option<usize>,
    },
    /// Write random instances with pairwise distinct monomials
    Generate {
        #[arg(long, default_value_t = 2)]
        min_variables: usize,
        #[arg(long, default_value_t = 29)]
        max_variables: usize,
        /// Monomials per polynomial; defaults to the variable count
        #[arg(long)]
        length: Option<usize>,
        /// Polynomials per variable count
        #[arg(long, default_value_t = 8)]
        instances: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Check that result files of several backends agree and print their
    /// mean time per variable count
    Compare {
        /// Instance file the results were measured on
        instances: PathBuf,
        /// Result files as `name:path`
        #[arg(required = true, value_parser = parse_named_path)]
        results: Vec<(String, PathBuf)>,
        /// Largest allowed difference between probabilities
        #[arg(long, default_value_t = 1.5e-5)]
        tolerance: f64,
    },
    /// Compare the circuit against the exact gap on random polynomials
    Check {
        #[arg(long, default_value_t = 64)]
        instances: usize,
        #[arg(long, default_value_t = 16)]
        max_length: usize,
        #[arg(long, default_value_t = 16)]
        max_variables: usize,
        #[arg(long, default_value_t = 3)]
        max_degree: usize,
        #[arg(long, default_value_t = 1e-4)]
        tolerance: f64,
        #[arg(long, value_enum, default_value_t = BackendArg::Statevector)]
        backend: BackendArg,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MethodArg {
    Circuit,
    Exact,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Circuit => Method::Circuit,
            MethodArg::Exact => Method::Exact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Statevector,
    Dense,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Benchmark {
            source,
            target,
            variables,
            repetitions,
            tolerance,
            method,
            backend,
            max_qubits,
        } => {
            let config = BenchmarkConfig {
                repetitions,
                max_variables: variables,
                tolerance,
                method: method.into(),
            };
            match backend {
                BackendArg::Statevector => benchmark(
                    &source,
                    &target,
                    &config,
                    &max_qubits.map_or_else(StateVectorEnv::new, StateVectorEnv::with_max_qubits),
                )?,
                BackendArg::Dense => benchmark(
                    &source,
                    &target,
                    &config,
                    &max_qubits.map_or_else(DenseEnv::new, DenseEnv::with_max_qubits),
                )?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate {
            min_variables,
            max_variables,
            length,
            instances,
            seed,
            output,
        } => {
            generate(
                min_variables..=max_variables,
                length,
                instances,
                &mut rng(seed),
                &output,
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Compare {
            instances,
            results,
            tolerance,
        } => {
            compare(&instances, &results, tolerance)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check {
            instances,
            max_length,
            max_variables,
            max_degree,
            tolerance,
            backend,
            seed,
        } => {
            let mut rng = rng(seed);
            let agreed = match backend {
                BackendArg::Statevector => check(
                    instances,
                    (max_length, max_variables, max_degree),
                    tolerance,
                    &StateVectorEnv::new(),
                    &mut rng,
                )?,
                BackendArg::Dense => check(
                    instances,
                    (max_length, max_variables, max_degree),
                    tolerance,
                    &DenseEnv::new(),
                    &mut rng,
                )?,
            };
            Ok(if agreed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

fn parse_named_path(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once(':') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected name:path, got {arg:?}")),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!(seed, "random source");
    StdRng::seed_from_u64(seed)
}

fn load_instances(source: &Path) -> anyhow::Result<Vec<Polynomial>> {
    let file = File::open(source)
        .with_context(|| format!("could not open instances {}", source.display()))?;
    let polynomials = read_instances(BufReader::new(file))
        .with_context(|| format!("could not read instances {}", source.display()))?;
    info!(
        instances = polynomials.len(),
        source = %source.display(),
        "loaded instances"
    );
    Ok(polynomials)
}

fn compare(
    source: &Path,
    results: &[(String, PathBuf)],
    tolerance: f64,
) -> anyhow::Result<()> {
    let polynomials = load_instances(source)?;
    let results = results
        .iter()
        .map(|(name, path)| {
            let file = File::open(path)
                .with_context(|| format!("could not open results {}", path.display()))?;
            let records = read_results(BufReader::new(file))
                .with_context(|| format!("could not read results {}", path.display()))?;
            Ok((name.clone(), records))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let table = compare_results(&polynomials, &results, tolerance)?;
    print!("{}", table);
    Ok(())
}

fn benchmark<B: Backend>(
    source: &Path,
    target: &Path,
    config: &BenchmarkConfig,
    env: &B,
) -> anyhow::Result<()> {
    let polynomials = load_instances(source)?;
    debug!(max_qubits = env.max_qubits(), "backend ready");

    let file = File::create(target)
        .with_context(|| format!("could not create results {}", target.display()))?;
    let mut out = BufWriter::new(file);
    run_benchmark(&polynomials, config, &mut out, |p| {
        evaluate(p, env, config.method)
    })?;
    Ok(())
}

fn generate(
    variables: std::ops::RangeInclusive<usize>,
    length: Option<usize>,
    instances: usize,
    rng: &mut StdRng,
    output: &Path,
) -> anyhow::Result<()> {
    if variables.is_empty() {
        bail!("empty variable range {:?}", variables);
    }
    let file = File::create(output)
        .with_context(|| format!("could not create {}", output.display()))?;
    let mut out = BufWriter::new(file);

    for variables in variables {
        let length = length.unwrap_or(variables);
        if length > distinct_monomials(variables) {
            warn!(
                variables,
                length,
                available = distinct_monomials(variables),
                "not enough distinct monomials, group skipped"
            );
            continue;
        }
        let polynomials = (0..instances)
            .map(|_| random_distinct_polynomial(rng, length, variables))
            .collect::<Result<Vec<_>, _>>()?;
        write_instance_group(&mut out, InstanceHeader { length, variables }, &polynomials)
            .with_context(|| format!("could not write {}", output.display()))?;
        debug!(variables, length, instances, "group written");
    }
    info!(output = %output.display(), "instances written");
    Ok(())
}

fn check<B: Backend>(
    instances: usize,
    (max_length, max_variables, max_degree): (usize, usize, usize),
    tolerance: f64,
    env: &B,
    rng: &mut StdRng,
) -> anyhow::Result<bool> {
    let mut disagreements = 0;
    for instance in 0..instances {
        let p = random_polynomial(rng, max_length, max_variables, max_degree)?;
        let check = cross_check(&p, env).with_context(|| format!("instance {instance}: {p}"))?;
        if check.agrees(tolerance) {
            debug!(instance, gap = check.gap, simulated = check.simulated, "agrees");
        } else {
            disagreements += 1;
            warn!(
                instance,
                polynomial = %p,
                gap = check.gap,
                expected = check.expected,
                simulated = check.simulated,
                error = check.error(),
                "disagreement"
            );
        }
    }
    info!(instances, disagreements, "cross check done");
    Ok(disagreements == 0)
}
