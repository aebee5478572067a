//! Flock simulation command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use creature_flock::{FlockParams, FlockSimulator};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::utils::{
    add_table_row, create_progress_bar, create_table, format_seconds, format_vec3, load_document,
};

#[derive(Subcommand)]
pub enum FlockCommands {
    /// Spawn a flock and run it for a number of ticks
    Simulate {
        /// Flock parameters (.json, .yaml or .yml); defaults are used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of boids to spawn
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Number of ticks to run
        #[arg(short, long, default_value_t = 1000)]
        ticks: u64,

        /// Seed for spawning; random when omitted
        #[arg(short, long, env = "CREATURE_SEED")]
        seed: Option<u64>,
    },

    /// Print the default flock parameters as YAML
    Defaults,
}

pub fn execute(cmd: FlockCommands, quiet: bool) -> Result<()> {
    match cmd {
        FlockCommands::Simulate {
            config,
            count,
            ticks,
            seed,
        } => handle_simulate(config.as_deref(), count, ticks, seed, quiet),
        FlockCommands::Defaults => handle_defaults(),
    }
}

fn load_params(path: Option<&Path>) -> Result<FlockParams> {
    match path {
        Some(path) => load_document(path),
        None => Ok(FlockParams::default()),
    }
}

fn handle_simulate(
    config: Option<&Path>,
    count: usize,
    ticks: u64,
    seed: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let params = load_params(config)?;
    let mut flock = FlockSimulator::new(params).context("Invalid flock parameters")?;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!("Spawning {count} boids with seed {seed}");
    flock.spawn(count, &mut StdRng::seed_from_u64(seed));

    let pb = create_progress_bar(ticks, "Simulating", quiet);
    let started = Instant::now();
    for _ in 0..ticks {
        flock.update();
        pb.inc(1);
    }
    pb.finish_and_clear();
    let elapsed = started.elapsed().as_secs_f32();

    let mut table = create_table(&["Property", "Value"]);
    add_table_row(&mut table, vec!["Boids".to_string(), flock.len().to_string()]);
    add_table_row(&mut table, vec!["Ticks".to_string(), flock.ticks().to_string()]);
    add_table_row(&mut table, vec!["Seed".to_string(), seed.to_string()]);
    add_table_row(
        &mut table,
        vec![
            "Centroid".to_string(),
            flock
                .centroid()
                .map_or_else(|| "-".to_string(), format_vec3),
        ],
    );
    add_table_row(
        &mut table,
        vec![
            "Average speed".to_string(),
            format!("{:.5}", flock.average_speed()),
        ],
    );
    add_table_row(
        &mut table,
        vec!["Outside bounds".to_string(), flock.escaped().to_string()],
    );
    add_table_row(&mut table, vec!["Elapsed".to_string(), format_seconds(elapsed)]);
    table.printstd();

    Ok(())
}

fn handle_defaults() -> Result<()> {
    let yaml = serde_yaml_ng::to_string(&FlockParams::default())?;
    print!("{yaml}");
    Ok(())
}
