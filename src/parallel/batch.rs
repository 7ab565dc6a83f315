//! Slate execution across worker threads.
//!
//! A slate is a set of independent matchup simulations (one per scheduled
//! game). Each slate entry owns its own generator and aggregates, so the
//! entries parallelize without shared state; seeds are derived per entry so
//! a seeded slate stays deterministic regardless of worker count.

use rayon::prelude::*;

use crate::data::team::Team;
use crate::sim::config::SimulationConfig;
use crate::sim::engine::{GameContext, SimResult, SimulationEngine};
use crate::sim::models::SimulationResult;

use super::pool::WorkerPool;

/// One scheduled game on a slate.
pub struct SlateGame<'a> {
    pub config: SimulationConfig,
    pub home_team: &'a Team,
    pub away_team: &'a Team,
}

/// Simulate every game on a slate in parallel. When `base_seed` is set,
/// entry `i` runs with seed `base_seed + i` (wrapping), overriding any seed
/// in the entry's own config; results come back in slate order.
pub fn simulate_slate(
    engine: &SimulationEngine<'_>,
    slate: &[SlateGame<'_>],
    context: &GameContext<'_>,
    base_seed: Option<u64>,
    pool: &WorkerPool,
) -> Vec<SimResult<SimulationResult>> {
    pool.install(|| {
        slate
            .par_iter()
            .enumerate()
            .map(|(i, game)| {
                let mut config = game.config.clone();
                if let Some(seed) = base_seed {
                    config.random_seed = Some(seed.wrapping_add(i as u64));
                }
                engine.simulate(&config, game.home_team, game.away_team, context)
            })
            .collect()
    })
}
