pub mod analytics;
pub mod player;
pub mod team;

pub use analytics::{
    AnalyticsInputs, ClutchScores, ClutchSource, FatigueIndicators, MomentumModifiers,
    MomentumSource, NoAnalytics, ResilienceMetrics, ResilienceRatings, ResilienceSource,
    ScheduleContext, StaminaSource, SynergyScores, SynergySource, NO_ANALYTICS,
};
pub use player::{GoalieStats, Player, PlayerId, PlayerMap, PlayerStats, Position, ZoneStats};
pub use team::{LineConfiguration, LineType, Team, TeamId, TeamRoster, TeamStats, Zone};
