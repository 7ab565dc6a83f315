//! Pre-computed analytics snapshots consumed by the adjustment calculator
//! and matchup analyzer.
//!
//! Each feature is a capability trait with a null object ([NoAnalytics]) so
//! that a missing upstream pipeline degrades to identity modifiers at one
//! decision point instead of presence checks scattered through the
//! calculators. All sources are `Sync` so independent simulation calls can
//! share them across workers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::player::PlayerId;
use crate::data::team::TeamId;

/// Per-player clutch scores (high-leverage late-game rating, roughly 0-4).
pub trait ClutchSource: Sync {
    fn clutch_score(&self, player: PlayerId) -> Option<f64>;

    /// Whether this source carries real data. The null object reports false;
    /// the confidence score uses this.
    fn available(&self) -> bool {
        true
    }
}

/// Per-player fatigue indicators (late/early per-60 production ratio;
/// below 1.0 signals late-game decline).
pub trait StaminaSource: Sync {
    fn fatigue_indicator(&self, player: PlayerId) -> Option<f64>;

    fn available(&self) -> bool {
        true
    }
}

/// Line-level chemistry (0-1) for an ordered set of skaters.
pub trait SynergySource: Sync {
    fn line_synergy(&self, players: &[PlayerId]) -> Option<f64>;

    fn available(&self) -> bool {
        true
    }
}

/// Per-player hot/cold streak modifiers (multiplicative, around 1.0).
pub trait MomentumSource: Sync {
    fn momentum_modifier(&self, player: PlayerId) -> Option<f64>;

    fn available(&self) -> bool {
        true
    }
}

/// Team-level resilience ratings from the lead-protection/comeback pipeline.
pub trait ResilienceSource: Sync {
    fn resilience(&self, team: TeamId) -> Option<ResilienceMetrics>;

    fn available(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResilienceMetrics {
    /// Share of held third-period leads (0-1).
    pub lead_protection_rate: f64,
    /// Share of completed comebacks from third-period deficits (0-1).
    pub comeback_rate: f64,
    pub third_period_goal_differential: i32,
    pub is_resilient: bool,
    pub is_collapse_prone: bool,
}

/// Schedule context for one team entering one game. A plain data record;
/// the adjustment calculator owns the factor lookup tables.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScheduleContext {
    /// Days since the previous game. None = season opener / unknown.
    pub days_rest: Option<u32>,
    pub games_in_7_days: u32,
    pub win_streak: u32,
    pub loss_streak: u32,
}

/// Null object: reports no data for every feature, which the calculators
/// turn into identity (1.0) modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnalytics;

pub static NO_ANALYTICS: NoAnalytics = NoAnalytics;

impl ClutchSource for NoAnalytics {
    fn clutch_score(&self, _player: PlayerId) -> Option<f64> {
        None
    }

    fn available(&self) -> bool {
        false
    }
}

impl StaminaSource for NoAnalytics {
    fn fatigue_indicator(&self, _player: PlayerId) -> Option<f64> {
        None
    }

    fn available(&self) -> bool {
        false
    }
}

impl SynergySource for NoAnalytics {
    fn line_synergy(&self, _players: &[PlayerId]) -> Option<f64> {
        None
    }

    fn available(&self) -> bool {
        false
    }
}

impl MomentumSource for NoAnalytics {
    fn momentum_modifier(&self, _player: PlayerId) -> Option<f64> {
        None
    }

    fn available(&self) -> bool {
        false
    }
}

impl ResilienceSource for NoAnalytics {
    fn resilience(&self, _team: TeamId) -> Option<ResilienceMetrics> {
        None
    }

    fn available(&self) -> bool {
        false
    }
}

/// Map-backed clutch score snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClutchScores(pub BTreeMap<PlayerId, f64>);

impl ClutchSource for ClutchScores {
    fn clutch_score(&self, player: PlayerId) -> Option<f64> {
        self.0.get(&player).copied()
    }
}

/// Map-backed fatigue indicator snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FatigueIndicators(pub BTreeMap<PlayerId, f64>);

impl StaminaSource for FatigueIndicators {
    fn fatigue_indicator(&self, player: PlayerId) -> Option<f64> {
        self.0.get(&player).copied()
    }
}

/// Map-backed line synergy snapshot, keyed by sorted player ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynergyScores(pub BTreeMap<Vec<PlayerId>, f64>);

impl SynergyScores {
    pub fn insert(&mut self, players: &[PlayerId], synergy: f64) {
        let mut key = players.to_vec();
        key.sort_unstable();
        self.0.insert(key, synergy);
    }
}

impl SynergySource for SynergyScores {
    fn line_synergy(&self, players: &[PlayerId]) -> Option<f64> {
        let mut key = players.to_vec();
        key.sort_unstable();
        self.0.get(&key).copied()
    }
}

/// Map-backed hot/cold streak modifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MomentumModifiers(pub BTreeMap<PlayerId, f64>);

impl MomentumSource for MomentumModifiers {
    fn momentum_modifier(&self, player: PlayerId) -> Option<f64> {
        self.0.get(&player).copied()
    }
}

/// Map-backed team resilience ratings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResilienceRatings(pub BTreeMap<TeamId, ResilienceMetrics>);

impl ResilienceSource for ResilienceRatings {
    fn resilience(&self, team: TeamId) -> Option<ResilienceMetrics> {
        self.0.get(&team).copied()
    }
}

/// Borrowed bundle of analytics sources for one engine instance. Defaults
/// to [NoAnalytics] everywhere; callers override what they have.
#[derive(Clone, Copy)]
pub struct AnalyticsInputs<'a> {
    pub clutch: &'a dyn ClutchSource,
    pub stamina: &'a dyn StaminaSource,
    pub synergy: &'a dyn SynergySource,
    pub momentum: &'a dyn MomentumSource,
    pub resilience: &'a dyn ResilienceSource,
}

impl AnalyticsInputs<'static> {
    pub fn neutral() -> Self {
        Self {
            clutch: &NO_ANALYTICS,
            stamina: &NO_ANALYTICS,
            synergy: &NO_ANALYTICS,
            momentum: &NO_ANALYTICS,
            resilience: &NO_ANALYTICS,
        }
    }
}

impl Default for AnalyticsInputs<'static> {
    fn default() -> Self {
        Self::neutral()
    }
}

impl<'a> AnalyticsInputs<'a> {
    pub fn with_clutch(mut self, source: &'a dyn ClutchSource) -> Self {
        self.clutch = source;
        self
    }

    pub fn with_stamina(mut self, source: &'a dyn StaminaSource) -> Self {
        self.stamina = source;
        self
    }

    pub fn with_synergy(mut self, source: &'a dyn SynergySource) -> Self {
        self.synergy = source;
        self
    }

    pub fn with_momentum(mut self, source: &'a dyn MomentumSource) -> Self {
        self.momentum = source;
        self
    }

    pub fn with_resilience(mut self, source: &'a dyn ResilienceSource) -> Self {
        self.resilience = source;
        self
    }
}
