//! Run a step function for a number of iterations, compress the resulting
//! accumulator and verify the compressed proof.

use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::{debug, error, info};
use rand::rngs::OsRng;
use sangria::{
    circuits::{CubicCircuit, FibonacciCircuit, StepCircuit},
    compression::CompressedSnark,
    curve::PastaCycle,
    ivc::RecursiveSnark,
    setup::{PublicParams, SetupConfig},
    Result, SangriaError,
};
use sangria_curves::pasta::Fq;
use std::time::Instant;
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, Debug, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
enum StepFunction {
    Cubic,
    Fibonacci,
}

#[derive(Parser, Debug)]
#[command(name = "sangria", about = "Incrementally verifiable computation over the Pasta cycle")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prove `n` iterations of a step function, starting from `start`
    Execute {
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        n_iterations: u64,
        #[arg(long, default_value_t = 1)]
        start: u64,
        /// cubic or fibonacci
        #[arg(long, default_value = "cubic")]
        circuit: StepFunction,
    },
}

fn execute<SC: StepCircuit<Fq>>(step_circuit: &SC, n_iterations: u64, start: u64) -> Result<()> {
    let mut rng = OsRng;
    let z0 = vec![Fq::from(start); step_circuit.arity()];

    let pp = PublicParams::<PastaCycle>::setup(step_circuit, &SetupConfig::default())?;

    let start_proving = Instant::now();
    let mut snark = RecursiveSnark::new(&pp, step_circuit, &z0, &mut rng)?;
    while snark.num_steps() < n_iterations {
        info!("Run iteration: {}/{}", snark.num_steps(), n_iterations);
        snark = snark.prove_step(&pp, step_circuit, &mut rng)?;
    }
    info!(
        "Proved {} iterations of {} in {:?}",
        n_iterations,
        SC::NAME,
        start_proving.elapsed()
    );
    snark.verify(&pp, n_iterations, &z0)?;

    let (pk, vk) = CompressedSnark::setup(&pp)?;
    let compressed = CompressedSnark::prove(&pp, &pk, &snark, &mut rng)?;
    let bytes =
        rmp_serde::to_vec(&compressed).map_err(|e| SangriaError::Serialization(e.to_string()))?;
    info!("Compressed proof of {} bytes", bytes.len());

    let start_verifying = Instant::now();
    let zn = compressed.verify(&vk, n_iterations, &z0)?;
    debug!("Compressed proof verified in {:?}", start_verifying.elapsed());
    info!("z_{} = [{}]", n_iterations, zn.iter().join(", "));
    Ok(())
}

pub fn main() {
    // See https://github.com/rust-lang/log
    env_logger::init();

    let cli = Cli::parse();
    let Command::Execute {
        n_iterations,
        start,
        circuit,
    } = cli.command;
    info!("Executing {circuit} {n_iterations} times from {start}");

    let result = match circuit {
        StepFunction::Cubic => execute(&CubicCircuit::<Fq>::new(), n_iterations, start),
        StepFunction::Fibonacci => execute(&FibonacciCircuit::<Fq>::new(1), n_iterations, start),
    };
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
