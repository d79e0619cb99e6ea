#![deny(clippy::all, clippy::pedantic)]
//! # Runtime
//!
//! Loads a scene, steps it and reports progress through `tracing`.

pub mod scene;

use physics::World;

pub use scene::{LoadedScene, Scene};

/// What a run ended with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub asleep: usize,
    pub contacts: usize,
}

/// Step `world` `steps` times, logging every `report_every` steps
/// (zero disables the periodic report).
pub fn simulate(world: &mut World, dt: f32, steps: usize, report_every: usize) -> RunSummary {
    tracing::info!(bodies = world.len(), steps, dt, "Starting simulation loop.");
    for i in 0..steps {
        world.step(dt);
        if report_every > 0 && (i + 1) % report_every == 0 {
            tracing::info!(
                step = i + 1,
                asleep = asleep_count(world),
                contacts = world.last_contact_count(),
                momentum = ?world.total_momentum(),
                "Simulation progress."
            );
        }
    }
    let summary = RunSummary {
        steps,
        asleep: asleep_count(world),
        contacts: world.last_contact_count(),
    };
    tracing::info!(?summary, "Simulation loop finished.");
    summary
}

fn asleep_count(world: &World) -> usize {
    world.bodies().iter().filter(|cell| cell.is_asleep()).count()
}
