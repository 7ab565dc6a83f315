use puckcast::data::{
    AnalyticsInputs, ClutchScores, FatigueIndicators, LineConfiguration, LineType, Player,
    PlayerMap, Position, Team, TeamRoster, TeamStats,
};
use puckcast::sim::{
    AdjustmentCalculator, CancelToken, ConfigError, GameContext, ScoreDistribution, Segment,
    SegmentWeights, SimulationConfig, SimulationEngine, SimulationError, SimulationMode,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

/// Two statistically identical teams; only home ice separates them.
fn balanced_team(team_id: u32) -> Team {
    let mut team = Team::new(team_id, format!("Team {team_id}"));
    team.stats = TeamStats {
        games_played: 60,
        wins: 30,
        losses: 24,
        overtime_losses: 6,
        goals_for: 180,
        goals_against: 180,
        shots_for: 1800,
        shots_against: 1800,
        corsi_percentage: 0.50,
        power_play_percentage: 20.0,
        power_play_opportunities: 170,
        penalty_kill_percentage: 80.0,
        penalty_kill_opportunities: 170,
        early_game_goals_for: 54,
        early_game_goals_against: 54,
        mid_game_goals_for: 63,
        mid_game_goals_against: 63,
        late_game_goals_for: 63,
        late_game_goals_against: 63,
        ..TeamStats::default()
    };

    let id_base = team_id * 100;
    let mut forwards = Vec::new();
    for line_number in 1..=4u8 {
        let mut line = LineConfiguration::new(line_number, LineType::Forward);
        let first = id_base + u32::from(line_number) * 3;
        line.player_ids = vec![first, first + 1, first + 2];
        line.expected_goals_percentage = 0.50;
        line.corsi_percentage = 0.50;
        line.goals_for = 30;
        line.goals_against = 30;
        line.time_on_ice_seconds = 3600 * 12;
        forwards.extend_from_slice(&line.player_ids);
        team.forward_lines.push(line);
    }
    let mut defensemen = Vec::new();
    for pair_number in 1..=3u8 {
        let mut pair = LineConfiguration::new(pair_number, LineType::Defense);
        let first = id_base + 20 + u32::from(pair_number) * 2;
        pair.player_ids = vec![first, first + 1];
        pair.expected_goals_percentage = 0.50;
        pair.corsi_percentage = 0.50;
        pair.time_on_ice_seconds = 3600 * 14;
        defensemen.extend_from_slice(&pair.player_ids);
        team.defense_pairs.push(pair);
    }
    team.roster = TeamRoster {
        forwards,
        defensemen,
        goalies: vec![id_base + 30],
    };
    team
}

fn roster_players(team: &Team) -> PlayerMap {
    let mut players = PlayerMap::new();
    for player_id in team.roster.all_skaters() {
        let mut player = Player::new(player_id, format!("Skater {player_id}"), Position::Center);
        player.career_stats.games_played = 55;
        players.insert(player_id, player);
    }
    players
}

#[test]
fn win_probabilities_sum_to_one() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2).with_iterations(500).with_seed(17);
    let result = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &GameContext::new())
        .expect("simulation");

    approx_eq(
        result.home_win_probability + result.away_win_probability,
        1.0,
        1e-9,
    );
    assert_eq!(result.home_wins + result.away_wins, 500);
}

#[test]
fn completed_games_never_tie_in_regulation() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2).with_iterations(300).with_seed(23);
    let result = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &GameContext::new())
        .expect("simulation");

    for game in &result.sample_games {
        assert!(
            game.home_score != game.away_score || game.went_to_overtime,
            "regulation tie survived in game {}",
            game.game_number
        );
        assert!(game.home_score != game.away_score);
    }
}

#[test]
fn identical_seed_reproduces_aggregates_bit_for_bit() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2).with_iterations(400).with_seed(99);
    let home = balanced_team(1);
    let away = balanced_team(2);

    let first = engine
        .simulate(&config, &home, &away, &GameContext::new())
        .expect("first run");
    let second = engine
        .simulate(&config, &home, &away, &GameContext::new())
        .expect("second run");

    assert_eq!(first.home_wins, second.home_wins);
    assert_eq!(first.away_wins, second.away_wins);
    assert_eq!(first.overtime_games, second.overtime_games);
    assert_eq!(first.shootout_games, second.shootout_games);
    assert_eq!(
        first.average_home_xg.to_bits(),
        second.average_home_xg.to_bits()
    );
    assert_eq!(
        first.average_away_xg.to_bits(),
        second.average_away_xg.to_bits()
    );
    assert_eq!(
        first.score_distribution.most_likely_score(),
        second.score_distribution.most_likely_score()
    );
    assert_eq!(first.segment_win_rates, second.segment_win_rates);
}

#[test]
fn different_seeds_diverge() {
    let engine = SimulationEngine::new();
    let home = balanced_team(1);
    let away = balanced_team(2);
    let base = SimulationConfig::new(1, 2).with_iterations(400);

    let first = engine
        .simulate(&base.clone().with_seed(1), &home, &away, &GameContext::new())
        .expect("first run");
    let second = engine
        .simulate(&base.with_seed(2), &home, &away, &GameContext::new())
        .expect("second run");

    // Identical draws across two 400-iteration runs would mean the seed is
    // being ignored
    assert!(
        first.home_wins != second.home_wins
            || first.overtime_games != second.overtime_games
            || first.average_home_xg.to_bits() != second.average_home_xg.to_bits()
    );
}

#[test]
fn balanced_matchup_shows_home_ice_edge_only() {
    let engine = SimulationEngine::new();
    let home = balanced_team(1);
    let away = balanced_team(2);

    // The home-ice edge is a couple of points, inside sampling noise for any
    // one 2000-iteration run; average a handful of seeded runs instead of
    // asserting a per-seed ordering
    let seeds = [7u64, 11, 42, 97, 131];
    let mut probability_sum = 0.0;
    let mut first_run = None;
    for seed in seeds {
        let config = SimulationConfig::new(1, 2).with_iterations(2000).with_seed(seed);
        let result = engine
            .simulate(&config, &home, &away, &GameContext::new())
            .expect("simulation");
        approx_eq(
            result.home_win_probability + result.away_win_probability,
            1.0,
            1e-9,
        );
        probability_sum += result.home_win_probability;
        first_run.get_or_insert(result);
    }

    let mean_home_probability = probability_sum / seeds.len() as f64;
    assert!(
        mean_home_probability > 0.50 && mean_home_probability < 0.56,
        "mean home probability {mean_home_probability} outside home-ice band"
    );

    let result = first_run.expect("at least one run");
    assert!(result.overtime_rate() > 0.0);
    assert!(result.overtime_rate() < 0.5);
    assert!(result.shootout_games <= result.overtime_games);
}

#[test]
fn series_reporting_normalizes_by_games_played() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2)
        .with_iterations(200)
        .with_seed(19)
        .with_mode(SimulationMode::Series);
    let result = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &GameContext::new())
        .expect("series simulation");

    // Every best-of-seven series plays at least four games
    assert!(result.games_recorded() >= 800);
    assert!(result.overtime_rate() <= 1.0);
    assert!(result.shootout_rate() <= result.overtime_rate());

    // Per-game averages stay at hockey scale even though many more games
    // than iterations were recorded
    let summary = result.summary();
    let average_home_goals = summary["average_home_goals"].as_f64().expect("average");
    assert!(
        average_home_goals > 0.5 && average_home_goals < 8.0,
        "average home goals {average_home_goals} not a per-game figure"
    );
}

#[test]
fn clutch_and_fatigue_bands_order_late_game_modifier() {
    let team = balanced_team(1);

    let mut poor_clutch = ClutchScores::default();
    let mut severe_fatigue = FatigueIndicators::default();
    let mut elite_clutch = ClutchScores::default();
    let mut minimal_fatigue = FatigueIndicators::default();
    for player_id in team.roster.all_skaters() {
        poor_clutch.0.insert(player_id, 0.2);
        severe_fatigue.0.insert(player_id, 0.55);
        elite_clutch.0.insert(player_id, 3.4);
        minimal_fatigue.0.insert(player_id, 0.98);
    }

    let struggling = AnalyticsInputs::neutral()
        .with_clutch(&poor_clutch)
        .with_stamina(&severe_fatigue);
    let thriving = AnalyticsInputs::neutral()
        .with_clutch(&elite_clutch)
        .with_stamina(&minimal_fatigue);

    let weights = SegmentWeights::default();
    let players = PlayerMap::new();
    let low = AdjustmentCalculator::new(struggling, weights)
        .calculate_team_adjustments(&team, &players);
    let high = AdjustmentCalculator::new(thriving, weights)
        .calculate_team_adjustments(&team, &players);

    assert!(low.late_game.total_modifier() < high.late_game.total_modifier());
    approx_eq(low.late_game.total_modifier(), 1.10 * 0.90 * 0.82, 1e-9);
    approx_eq(high.late_game.total_modifier(), 1.10 * 1.15 * 1.00, 1e-9);
}

#[test]
fn score_distribution_is_order_independent() {
    let results = [(4, 1), (2, 3), (4, 1), (0, 0), (2, 3), (4, 1), (5, 5)];

    let mut forward = ScoreDistribution::new();
    let mut reversed = ScoreDistribution::new();
    for &(h, a) in &results {
        forward.add_result(h, a);
    }
    for &(h, a) in results.iter().rev() {
        reversed.add_result(h, a);
    }

    assert_eq!(forward.most_likely_score(), reversed.most_likely_score());
    assert_eq!(forward.most_likely_score(), (4, 1));
    assert_eq!(forward.recorded_games(), reversed.recorded_games());
    for score in [(4, 1), (2, 3), (0, 0), (5, 5)] {
        assert_eq!(
            forward.score_count(score.0, score.1),
            reversed.score_count(score.0, score.1)
        );
    }
}

#[test]
fn confidence_score_stays_clamped() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2).with_iterations(100).with_seed(5);

    // Bare teams: no games, no lines, no players
    let bare_home = Team::new(1, "Expansion Home");
    let bare_away = Team::new(2, "Expansion Away");
    let sparse = engine
        .simulate(&config, &bare_home, &bare_away, &GameContext::new())
        .expect("sparse simulation");
    approx_eq(sparse.confidence_score, 0.5, 1e-9);

    // Fully covered teams with synergy and clutch data supplied
    let home = balanced_team(1);
    let away = balanced_team(2);
    let mut players = roster_players(&home);
    players.extend(roster_players(&away));

    let clutch = ClutchScores::default();
    let synergy = puckcast::data::SynergyScores::default();
    let analytics = AnalyticsInputs::neutral()
        .with_clutch(&clutch)
        .with_synergy(&synergy);
    let rich_engine = SimulationEngine::with_analytics(analytics);
    let context = GameContext::new().with_players(&players);
    let rich = rich_engine
        .simulate(&config, &home, &away, &context)
        .expect("rich simulation");

    assert!(rich.confidence_score <= 1.0);
    approx_eq(rich.confidence_score, 1.0, 1e-9);
}

#[test]
fn series_mode_respects_resume_score() {
    let engine = SimulationEngine::new();
    let home = balanced_team(1);
    let away = balanced_team(2);

    let mut config = SimulationConfig::new(1, 2)
        .with_iterations(300)
        .with_seed(31)
        .with_mode(SimulationMode::Series);
    config.current_series_score = (3, 0);

    let result = engine
        .simulate(&config, &home, &away, &GameContext::new())
        .expect("series simulation");
    assert!(
        result.home_win_probability > 0.8,
        "team up 3-0 won only {:.2}",
        result.home_win_probability
    );
    approx_eq(
        result.home_win_probability + result.away_win_probability,
        1.0,
        1e-9,
    );
}

#[test]
fn best_of_one_series_matches_iteration_count() {
    let engine = SimulationEngine::new();
    let mut config = SimulationConfig::new(1, 2)
        .with_iterations(200)
        .with_seed(13)
        .with_mode(SimulationMode::Series);
    config.series_games_to_win = 1;

    let result = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &GameContext::new())
        .expect("series simulation");
    assert_eq!(result.home_wins + result.away_wins, 200);
    assert_eq!(result.score_distribution.recorded_games(), 200);
}

#[test]
fn config_validation_rejects_bad_inputs() {
    let engine = SimulationEngine::new();
    let home = balanced_team(1);
    let away = balanced_team(2);

    let too_few = SimulationConfig::new(1, 2).with_iterations(10);
    assert!(matches!(
        engine.simulate(&too_few, &home, &away, &GameContext::new()),
        Err(SimulationError::Config(ConfigError::IterationsOutOfRange(10)))
    ));

    let mut wild_variance = SimulationConfig::new(1, 2).with_iterations(500);
    wild_variance.variance_factor = 0.9;
    assert!(matches!(
        engine.simulate(&wild_variance, &home, &away, &GameContext::new()),
        Err(SimulationError::Config(ConfigError::VarianceOutOfRange(_)))
    ));

    let mut decided = SimulationConfig::new(1, 2)
        .with_iterations(500)
        .with_mode(SimulationMode::Series);
    decided.current_series_score = (4, 4);
    assert!(matches!(
        engine.simulate(&decided, &home, &away, &GameContext::new()),
        Err(SimulationError::Config(ConfigError::SeriesAlreadyDecided { .. }))
    ));
}

#[test]
fn cancellation_aborts_without_partial_results() {
    let engine = SimulationEngine::new();
    let token = CancelToken::new();
    token.cancel();
    let context = GameContext::new().with_cancel(&token);
    let config = SimulationConfig::new(1, 2).with_iterations(500).with_seed(3);

    let err = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &context)
        .expect_err("cancelled run must not produce a result");
    assert_eq!(err, SimulationError::Cancelled);
}

#[test]
fn disabling_adjustments_changes_only_adjusted_runs() {
    let team = balanced_team(1);
    let mut elite_clutch = ClutchScores::default();
    for player_id in team.roster.all_skaters() {
        elite_clutch.0.insert(player_id, 3.4);
    }
    let analytics = AnalyticsInputs::neutral().with_clutch(&elite_clutch);
    let engine = SimulationEngine::with_analytics(analytics);
    let home = balanced_team(1);
    let away = balanced_team(2);

    let enabled = SimulationConfig::new(1, 2).with_iterations(300).with_seed(77);
    let mut disabled = enabled.clone();
    disabled.use_clutch_adjustments = false;

    let with_clutch = engine
        .simulate(&enabled, &home, &away, &GameContext::new())
        .expect("clutch run");
    let without_clutch = engine
        .simulate(&disabled, &home, &away, &GameContext::new())
        .expect("neutral run");

    // Home carries the elite clutch band; disabling it must lower (or at
    // minimum change) the home xG average produced from the same seed
    assert!(
        with_clutch.average_home_xg.to_bits() != without_clutch.average_home_xg.to_bits()
    );
}

#[test]
fn segment_win_rates_cover_regulation() {
    let engine = SimulationEngine::new();
    let config = SimulationConfig::new(1, 2).with_iterations(300).with_seed(8);
    let result = engine
        .simulate(&config, &balanced_team(1), &balanced_team(2), &GameContext::new())
        .expect("simulation");

    for segment in Segment::REGULATION {
        let home_key = format!("{}_home_win_rate", segment.as_str());
        let away_key = format!("{}_away_win_rate", segment.as_str());
        let home_rate = result.segment_win_rates[&home_key];
        let away_rate = result.segment_win_rates[&away_key];
        assert!((0.0..=1.0).contains(&home_rate));
        assert!((0.0..=1.0).contains(&away_rate));
        // Ties make up the remainder
        assert!(home_rate + away_rate <= 1.0 + 1e-9);
    }
}
