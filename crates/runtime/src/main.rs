//! # Runtime
//!
//! Headless entry point: loads a JSON scene (or the built-in one), steps the
//! world and logs where the named bodies ended up.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;
use runtime::{simulate, LoadedScene, Scene};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Scene file. The built-in demo scene is used when omitted.
    #[arg(long)]
    scene: Option<PathBuf>,

    /// Frame time in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    #[arg(long, default_value_t = 600)]
    steps: usize,

    /// Log progress every N steps. Zero disables it.
    #[arg(long, default_value_t = 60)]
    report_every: usize,

    /// Override the scene's worker count.
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    ensure!(args.dt.is_finite() && args.dt > 0.0, "--dt must be a positive number");

    let mut scene = match &args.scene {
        Some(path) => Scene::load(path)?,
        None => {
            tracing::info!("No scene given; using the built-in scene.");
            Scene::builtin()
        }
    };
    if let Some(workers) = args.workers {
        scene.world.workers = workers;
    }

    let LoadedScene { mut world, ids } = scene.into_world()?;
    simulate(&mut world, args.dt, args.steps, args.report_every);

    let mut names: Vec<_> = ids.into_iter().collect();
    names.sort_by_key(|(_, id)| *id);
    for (name, id) in names {
        if let Some(body) = world.body(id) {
            tracing::info!(body = %name, position = ?body.position, velocity = ?body.linear_velocity, "Final state.");
        }
    }
    Ok(())
}
