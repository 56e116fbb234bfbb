//! Draws a seeded dollar-unit sample from a small ledger and prints a text
//! histogram of how often each line item was selected.
//!
//! Usage: `dollar-unit-sampling [SEED]`. Set `RUST_LOG=trace` to see each draw.

use std::process::ExitCode;

use dollar_unit_sampling::{DollarUnitSample, Population, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;

const DEFAULT_SEED: u64 = 20;
const DRAWS: usize = 1_000;
const BAR_WIDTH: u64 = 50;

// (id, reported amount in cents)
const LEDGER: [(u32, i64); 6] = [
    (1, 125_000),
    (2, 40_050),
    (3, 0),
    (4, 310_075),
    (5, 9_999),
    (6, 515_000),
];

fn ledger() -> Result<Population> {
    let mut population = Population::new();
    for (id, cents) in LEDGER {
        population.add(id, Decimal::new(cents, 2))?;
    }
    Ok(population)
}

fn print_histogram(population: &Population, drawn: &DollarUnitSample) {
    let counts = drawn.sample().counts(population.len());
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    for (item, count) in population.items().iter().zip(counts) {
        let bar = "#".repeat((count * BAR_WIDTH / peak) as usize);
        println!("{:>4} {:>12} {:>6} {}", item.id, item.reported.to_string(), count, bar);
    }
    println!(
        "{} draws over {} distinct items, total reported {}",
        drawn.len(),
        drawn.distinct().len(),
        population.total_reported()
    );
}

fn main() -> ExitCode {
    env_logger::init();

    let seed = match std::env::args().nth(1).map(|arg| arg.parse::<u64>()) {
        None => DEFAULT_SEED,
        Some(Ok(seed)) => seed,
        Some(Err(err)) => {
            eprintln!("invalid seed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let drawn = ledger().and_then(|population| {
        let drawn = population.draw(DRAWS, &mut rng)?;
        Ok((population, drawn))
    });

    match drawn {
        Ok((population, drawn)) => {
            print_histogram(&population, &drawn);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
