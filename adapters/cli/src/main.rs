#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the shape arena headless.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::RunnerConfig;
use simulation::Simulation;

/// Population seed is derived from the arena seed when only `--seed` is given.
const POPULATION_SEED_SALT: u64 = 0xa076_1d64_78bd_642f;

#[derive(Debug, Parser)]
#[command(name = "shape-arena", about = "Runs the shape arena simulation headless")]
struct Args {
    /// TOML file describing the arena, population and scenario.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 250)]
    ticks: u64,
    /// Overrides the arena and population seeds.
    #[arg(long)]
    seed: Option<u64>,
    /// Ticks between progress reports; zero disables them.
    #[arg(long, default_value_t = 25)]
    report_every: u64,
}

/// Entry point for the shape arena command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.arena.seed = seed;
        config.population.seed = seed ^ POPULATION_SEED_SALT;
    }

    let mut simulation = Simulation::new(config.arena, config.population, &config.scenario)?;
    tracing::info!(
        target: "shape_arena::cli",
        ticks = args.ticks,
        wanted_shapes = config.population.wanted_shapes,
        bosses = config.scenario.bosses.len(),
        tanks = config.scenario.tanks.len(),
        "starting simulation"
    );

    for tick in 1..=args.ticks {
        simulation.step();
        if args.report_every > 0 && tick % args.report_every == 0 {
            let summary = simulation.summary();
            tracing::info!(
                target: "shape_arena::cli",
                tick = summary.tick,
                entities = summary.entities,
                shapes = summary.shapes,
                minions = summary.minions,
                "progress"
            );
        }
    }

    let summary = simulation.summary();
    println!(
        "tick {}: {} entities, {} shapes ({} alpha pentagons), {} minions, {} drones",
        summary.tick,
        summary.entities,
        summary.shapes,
        summary.alpha_pentagons,
        summary.minions,
        summary.drones
    );
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
