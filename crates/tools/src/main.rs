use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use towergen::{GenConfig, TowerGenerator};
use towergen_tools::audit::audit_tower;
use towergen_tools::config_file::load_config;
use towergen_tools::render::{render_stats, render_tower};
use towergen_tools::seed::SeedChoice;
use towergen_tools::{format_fingerprint, init_tracing};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Stats,
}

#[derive(Parser)]
#[command(author, version, about = "Generate a procedural tower", long_about = None)]
struct Args {
    /// Run seed. A fresh one is drawn when omitted.
    #[arg(short, long)]
    seed: Option<u64>,
    /// TOML or JSON generation config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the configured floor count
    #[arg(short, long)]
    floors: Option<usize>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => GenConfig::default(),
    };
    if let Some(floors) = args.floors {
        config.floor_count = floors;
    }
    let start = config.start;
    let stage_count = config.stages.len();

    let seed = SeedChoice::resolve(args.seed);
    info!(seed = seed.value(), generated = matches!(seed, SeedChoice::Generated(_)), "tools.generate.start");
    let tower = TowerGenerator::new(config, seed.value())
        .generate()
        .with_context(|| format!("generation failed for seed {}", seed.value()))?;
    for violation in audit_tower(&tower, start, stage_count) {
        warn!(seed = seed.value(), %violation, "tools.audit.violation");
    }

    match args.format {
        OutputFormat::Text => {
            println!("seed: {}", seed.value());
            println!("fingerprint: {}", format_fingerprint(tower.fingerprint()));
            print!("{}", render_tower(&tower));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tower).context("failed to encode tower as JSON")?);
        }
        OutputFormat::Stats => print!("{}", render_stats(&tower)),
    }
    Ok(())
}
