//! puckcast: Monte Carlo NHL game outcome prediction.
//!
//! The crate converts pre-aggregated team, line, and player rate statistics
//! into per-zone expected goals, analyzes the line-on-line matchup once per
//! call, and then runs thousands of randomized game trials to estimate win
//! probabilities, score distributions, and overtime rates. Series mode
//! repeats the game trial inside a best-of-N wrapper. All feature data is
//! resolved before a simulation call begins; the iteration loop performs no
//! I/O and owns its generator, so independent calls parallelize freely (see
//! [parallel]).

pub mod cli;
pub mod data;
pub mod parallel;
pub mod sim;

pub use data::{Player, PlayerId, PlayerMap, Team, TeamId};
pub use sim::{
    GameContext, SimulationConfig, SimulationEngine, SimulationError, SimulationMode,
    SimulationResult,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
