use crate::data::player::{Player, PlayerMap, Position};
use crate::data::team::{LineConfiguration, LineType, Team, TeamId, TeamRoster, TeamStats, Zone};
use crate::sim::config::{SimulationConfig, SimulationMode};
use crate::sim::engine::{GameContext, SimulationEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Simulate,
    Series,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("simulate") => Some(Command::Simulate),
        Some("series") => Some(Command::Series),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Simulate) => handle_simulate(args, SimulationMode::SingleGame),
        Some(Command::Series) => handle_simulate(args, SimulationMode::Series),
        None => {
            eprintln!("usage: puckcast <simulate|series> [iterations] [seed]");
            2
        }
    }
}

fn handle_simulate(args: &[String], mode: SimulationMode) -> i32 {
    let iterations = parse_u32_arg(args.get(2), "iterations", 10_000);
    let seed = parse_u64_arg(args.get(3), "seed", 42);

    let home_team = demo_home_team();
    let away_team = demo_away_team();
    let players = demo_players(&home_team, &away_team);

    let config = SimulationConfig::new(home_team.team_id, away_team.team_id)
        .with_iterations(iterations)
        .with_seed(seed)
        .with_mode(mode);

    let engine = SimulationEngine::new();
    let context = GameContext::new().with_players(&players);
    let result = match engine.simulate(&config, &home_team, &away_team, &context) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("simulation failed: {err}");
            return 1;
        }
    };

    match serde_json::to_string_pretty(&result.summary()) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize simulation summary: {err}");
            1
        }
    }
}

/// Built-in matchup for exercising the engine without a data feed. The
/// home side is a strong possession team; the away side leans on its
/// goaltending.
fn demo_home_team() -> Team {
    let mut team = Team::new(1, "Riverside Otters");
    team.abbreviation = "RIV".to_string();
    team.stats = TeamStats {
        games_played: 60,
        wins: 36,
        losses: 18,
        overtime_losses: 6,
        goals_for: 205,
        goals_against: 168,
        shots_for: 1950,
        shots_against: 1740,
        corsi_percentage: 0.53,
        power_play_percentage: 23.5,
        power_play_opportunities: 180,
        penalty_kill_percentage: 81.0,
        penalty_kill_opportunities: 175,
        early_game_goals_for: 60,
        early_game_goals_against: 52,
        mid_game_goals_for: 72,
        mid_game_goals_against: 58,
        late_game_goals_for: 73,
        late_game_goals_against: 58,
        ..TeamStats::default()
    };
    team.offensive_heat_map.insert(Zone::Slot, 0.7);
    team.offensive_heat_map.insert(Zone::HighSlot, 0.6);
    team.defensive_heat_map.insert(Zone::Slot, 0.55);
    populate_demo_lines(&mut team, 100);
    team.starting_goalie_id = Some(130);
    team
}

fn demo_away_team() -> Team {
    let mut team = Team::new(2, "Harbor City Admirals");
    team.abbreviation = "HCA".to_string();
    team.stats = TeamStats {
        games_played: 60,
        wins: 33,
        losses: 21,
        overtime_losses: 6,
        goals_for: 188,
        goals_against: 175,
        shots_for: 1820,
        shots_against: 1850,
        corsi_percentage: 0.49,
        power_play_percentage: 20.1,
        power_play_opportunities: 172,
        penalty_kill_percentage: 83.5,
        penalty_kill_opportunities: 181,
        early_game_goals_for: 55,
        early_game_goals_against: 57,
        mid_game_goals_for: 66,
        mid_game_goals_against: 60,
        late_game_goals_for: 67,
        late_game_goals_against: 58,
        ..TeamStats::default()
    };
    team.offensive_heat_map.insert(Zone::LeftCircle, 0.6);
    team.defensive_heat_map.insert(Zone::Slot, 0.7);
    populate_demo_lines(&mut team, 200);
    team.starting_goalie_id = Some(230);
    team
}

fn populate_demo_lines(team: &mut Team, id_base: TeamId) {
    let mut forwards = Vec::new();
    for line_number in 1..=4u8 {
        let mut line = LineConfiguration::new(line_number, LineType::Forward);
        let first = id_base + u32::from(line_number) * 3;
        line.player_ids = vec![first, first + 1, first + 2];
        line.chemistry_score = 0.7 - f64::from(line_number - 1) * 0.1;
        line.expected_goals_percentage = 0.56 - f64::from(line_number - 1) * 0.03;
        line.corsi_percentage = 0.54 - f64::from(line_number - 1) * 0.02;
        line.goals_for = 40 - u32::from(line_number) * 6;
        line.goals_against = 24 + u32::from(line_number) * 2;
        line.time_on_ice_seconds = 3600 * (16 - u32::from(line_number) * 2);
        forwards.extend_from_slice(&line.player_ids);
        team.forward_lines.push(line);
    }

    let mut defensemen = Vec::new();
    for pair_number in 1..=3u8 {
        let mut pair = LineConfiguration::new(pair_number, LineType::Defense);
        let first = id_base + 20 + u32::from(pair_number) * 2;
        pair.player_ids = vec![first, first + 1];
        pair.chemistry_score = 0.6 - f64::from(pair_number - 1) * 0.1;
        pair.expected_goals_percentage = 0.52 - f64::from(pair_number - 1) * 0.02;
        pair.corsi_percentage = 0.51 - f64::from(pair_number - 1) * 0.02;
        pair.goals_for = 12 - u32::from(pair_number) * 2;
        pair.goals_against = 18 + u32::from(pair_number) * 2;
        pair.time_on_ice_seconds = 3600 * (20 - u32::from(pair_number) * 3);
        defensemen.extend_from_slice(&pair.player_ids);
        team.defense_pairs.push(pair);
    }

    team.roster = TeamRoster {
        forwards,
        defensemen,
        goalies: vec![id_base + 30],
    };
}

fn demo_players(home_team: &Team, away_team: &Team) -> PlayerMap {
    let mut players = PlayerMap::new();
    for team in [home_team, away_team] {
        for (i, player_id) in team.roster.all_skaters().enumerate() {
            let position = if team.roster.forwards.contains(&player_id) {
                Position::Center
            } else {
                Position::Defense
            };
            let mut player = Player::new(player_id, format!("Skater {player_id}"), position);
            player.career_stats.games_played = 55;
            player.career_stats.goals = 18u32.saturating_sub(i as u32);
            player.career_stats.shots = 150;
            player.career_stats.expected_goals_for = 14.0 - i as f64 * 0.5;
            players.insert(player_id, player);
        }
        if let Some(goalie_id) = team.starting_goalie_id {
            let mut goalie = Player::new(goalie_id, format!("Goalie {goalie_id}"), Position::Goalie);
            goalie.goalie_stats = Some(crate::data::player::GoalieStats {
                games_played: 45,
                save_percentage: if team.team_id == 1 { 0.908 } else { 0.917 },
                goals_against_average: if team.team_id == 1 { 2.8 } else { 2.5 },
            });
            players.insert(goalie_id, goalie);
        }
    }
    players
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
