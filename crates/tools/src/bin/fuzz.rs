use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use towergen::{GenConfig, TowerGenerator};
use towergen_tools::audit::audit_tower;
use towergen_tools::{format_fingerprint, init_tracing};
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about = "Generate many towers and audit each one", long_about = None)]
struct Args {
    /// Seeds every run seed of the batch
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 50)]
    runs: u32,
    #[arg(short, long, default_value_t = 4)]
    floors: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    println!("Fuzzing {} towers of {} floors from batch seed {}...", args.runs, args.floors, args.seed);
    let config = GenConfig { floor_count: args.floors, ..GenConfig::default() };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut failures = 0_u32;

    for run in 0..args.runs {
        let run_seed = rng.next_u64();
        let tower = match TowerGenerator::new(config.clone(), run_seed).generate() {
            Ok(tower) => tower,
            Err(error) => {
                failures += 1;
                println!("run {run} seed {run_seed}: generation failed: {error}");
                continue;
            }
        };
        let violations = audit_tower(&tower, config.start, config.stages.len());
        if violations.is_empty() {
            debug!(run, run_seed, fingerprint = %format_fingerprint(tower.fingerprint()), "tools.fuzz.passed");
            continue;
        }
        failures += 1;
        for violation in violations {
            println!("run {run} seed {run_seed}: {violation}");
        }
    }

    info!(runs = args.runs, failures, "tools.fuzz.done");
    if failures > 0 {
        bail!("{failures} of {} runs broke a tower invariant", args.runs);
    }
    println!("All {} towers passed.", args.runs);
    Ok(())
}
