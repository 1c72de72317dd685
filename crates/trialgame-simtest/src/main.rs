//! Trial Game Headless Harness
//!
//! Plays seeded games against the pure game logic and validates scenario
//! data, settlement arithmetic and phase invariants without SpacetimeDB.
//! Runs entirely in-process: no DB, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p trialgame-simtest
//!   cargo run -p trialgame-simtest -- --verbose
//!   cargo run -p trialgame-simtest -- --games 500 --seed 7

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trialgame_logic::config::{validate_config, GameConfig, Scenario};
use trialgame_logic::errors::GameError;
use trialgame_logic::phase::{Advance, GameState, Phase};
use trialgame_logic::probability_line::{LineLayout, ProbabilityLine};
use trialgame_logic::session::GameSession;
use trialgame_logic::settlement::{
    average_probability, is_success, settle_team, SettlementInput, ROLL_MAX, ROLL_MIN,
};
use trialgame_logic::standings::SubmissionCounts;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    games: u32,
    seed: u64,
}

fn parse_options() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let value_after = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .and_then(|v| v.parse::<u64>().ok())
    };
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        games: value_after("--games").unwrap_or(200) as u32,
        seed: value_after("--seed").unwrap_or(42),
    }
}

fn main() {
    let opts = parse_options();
    println!("=== Trial Game Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario data
    results.extend(validate_scenarios(opts.verbose));

    // 2. Settlement arithmetic
    results.extend(validate_settlement());

    // 3. Phase machine ordering
    results.extend(validate_phase_machine());

    // 4. Seeded full games
    for &scenario in Scenario::all() {
        results.extend(validate_full_games(scenario, &opts));
    }

    // 5. Strategy sweep
    results.extend(validate_strategies(&opts));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || opts.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load(scenario: Scenario) -> Result<GameConfig, String> {
    scenario
        .load()
        .map_err(|e| format!("{:?} JSON parse error: {}", scenario, e))
}

// ── 1. Scenario data ────────────────────────────────────────────────────

fn validate_scenarios(verbose: bool) -> Vec<TestResult> {
    println!("--- Scenario Data ---");
    let mut results = Vec::new();

    for &scenario in Scenario::all() {
        let tag = format!("{:?}", scenario).to_lowercase();
        let config = match load(scenario) {
            Ok(c) => c,
            Err(e) => {
                results.push(TestResult {
                    name: format!("{}_parse", tag),
                    passed: false,
                    detail: e,
                });
                continue;
            }
        };

        let errors = validate_config(&config);
        results.push(TestResult {
            name: format!("{}_valid", tag),
            passed: errors.is_empty(),
            detail: format!("{} rounds, errors: {:?}", config.round_count(), errors),
        });

        let all_have_comments = config
            .rounds
            .iter()
            .all(|r| r.consultant_comments.len() == r.consultants.len());
        results.push(TestResult {
            name: format!("{}_comments_per_consultant", tag),
            passed: all_have_comments,
            detail: "every consultant has a comment".into(),
        });

        if verbose {
            let layout = LineLayout::default();
            for (i, round) in config.rounds.iter().enumerate() {
                let avg = average_probability(&round.consultants);
                let line = ProbabilityLine::new(&layout, &round.consultants, avg, None);
                let ev = avg / 100.0 * round.profit as f64 - round.investment_amount as f64;
                println!(
                    "  R{} {:<20} avg {:>5.1}% |{}| EV(invest) {:>14.0}",
                    i + 1,
                    round.drug_name,
                    avg,
                    line.render_text(41),
                    ev
                );
            }
        }
    }

    results
}

// ── 2. Settlement ───────────────────────────────────────────────────────

fn validate_settlement() -> Vec<TestResult> {
    println!("--- Settlement ---");
    let mut results = Vec::new();

    let config = match load(Scenario::Pharma) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "settlement_config".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };
    let round = &config.rounds[0];
    let avg = average_probability(&round.consultants);

    // hire 3, invest, roll 35 vs average 40
    let example = settle_team(
        SettlementInput {
            consultants_hired: 3,
            invested: Some(true),
            total_money: 0,
        },
        round,
        is_success(35, avg),
    );
    results.push(TestResult {
        name: "settlement_reference_example".into(),
        passed: example.map(|s| s.round_profit) == Some(69_000_000),
        detail: format!("{:?}", example),
    });

    let mut independent = true;
    for hired in 0..=round.max_consultants() {
        let input = SettlementInput {
            consultants_hired: hired,
            invested: Some(false),
            total_money: 0,
        };
        let win = settle_team(input, round, true).map(|s| s.round_profit);
        let lose = settle_team(input, round, false).map(|s| s.round_profit);
        independent &= win == lose && win == Some(-(hired as i64) * round.consultant_cost);
    }
    results.push(TestResult {
        name: "settlement_pass_ignores_outcome".into(),
        passed: independent,
        detail: "not investing costs exactly the consultants".into(),
    });

    let boundary = is_success(40, avg) && !is_success(41, avg);
    results.push(TestResult {
        name: "settlement_roll_boundary".into(),
        passed: boundary,
        detail: format!("roll 40 succeeds, 41 fails at average {:.1}", avg),
    });

    results.push(TestResult {
        name: "settlement_empty_list_fails".into(),
        passed: !is_success(ROLL_MIN, average_probability(&[])),
        detail: "empty consultant list averages to 0".into(),
    });

    results
}

// ── 3. Phase machine ────────────────────────────────────────────────────

fn validate_phase_machine() -> Vec<TestResult> {
    println!("--- Phase Machine ---");
    let mut results = Vec::new();

    let mut state = GameState::initial();
    results.push(TestResult {
        name: "phase_start_needs_teams".into(),
        passed: state.start_game(0) == Err(GameError::NoTeams),
        detail: "start with zero teams is rejected".into(),
    });

    let mut order_ok = state.start_game(3).is_ok()
        && state.reveal_probabilities().is_err()
        && state.begin_investment().is_ok()
        && state.ensure_can_roll().is_err()
        && state.reveal_investment_decisions().is_ok()
        && state.ensure_can_roll().is_err()
        && state.reveal_probabilities().is_ok();
    order_ok &= state.can_roll();
    results.push(TestResult {
        name: "phase_reveal_order".into(),
        passed: order_ok,
        detail: "consultants → decisions → probabilities → roll".into(),
    });

    let finished = state.record_outcome(true, 12).is_ok()
        && state.advance_round(1) == Ok(Advance::GameOver)
        && state.phase == Phase::GameOver
        && state.advance_round(1).is_err();
    results.push(TestResult {
        name: "phase_single_round_game_over".into(),
        passed: finished,
        detail: format!("final phase {}", state.phase.as_str()),
    });

    results
}

// ── 4. Full games ───────────────────────────────────────────────────────

const TEAM_NAMES: [&str; 6] = ["Aurora", "Borealis", "Cascade", "Dynamo", "Ember", "Fathom"];

/// The console's pending list and its submission counter must agree.
fn check_pending(
    game: &GameSession,
    decided: impl Fn(&SubmissionCounts) -> usize,
) -> Result<(), String> {
    let counts = game.submission_counts();
    let pending = game.pending_teams().len();
    if pending + decided(&counts) != counts.teams {
        return Err(format!(
            "{} pending + {} decided != {} teams in {}",
            pending,
            decided(&counts),
            counts.teams,
            game.state().phase.as_str()
        ));
    }
    Ok(())
}

/// Play one seeded game to completion. Returns a failure description if
/// any invariant breaks along the way.
fn play_game(config: &GameConfig, rng: &mut StdRng) -> Result<GameSession, String> {
    let mut game = GameSession::new(config.clone());
    for name in TEAM_NAMES {
        game.register_team(name).map_err(|e| e.to_string())?;
    }
    game.start_game().map_err(|e| e.to_string())?;

    let mut last_round = game.state().current_round;
    while !game.state().phase.is_terminal() {
        let round = game.current_round().map_err(|e| e.to_string())?.clone();
        for name in TEAM_NAMES {
            if rng.gen_bool(0.95) {
                let hired = game
                    .submit_consultants(name, rng.gen_range(0..=round.max_consultants() + 2))
                    .map_err(|e| e.to_string())?;
                if hired > round.max_consultants() {
                    return Err(format!("{} hired {} (max {})", name, hired, round.max_consultants()));
                }
            }
        }
        check_pending(&game, |c| c.consultants_submitted)?;
        game.begin_investment().map_err(|e| e.to_string())?;
        for name in TEAM_NAMES {
            if rng.gen_bool(0.95) {
                game.submit_investment(name, rng.gen_bool(0.5))
                    .map_err(|e| e.to_string())?;
            }
        }
        check_pending(&game, |c| c.investment_decided)?;
        game.reveal_investment_decisions().map_err(|e| e.to_string())?;
        game.reveal_probabilities().map_err(|e| e.to_string())?;
        let report = game
            .roll_outcome(rng.gen_range(ROLL_MIN..=ROLL_MAX))
            .map_err(|e| e.to_string())?;
        if !report.skipped.is_empty() {
            return Err(format!("settlement skipped {:?}", report.skipped));
        }
        game.advance_round().map_err(|e| e.to_string())?;

        let now = game.state().current_round;
        if now < last_round || now > last_round + 1 {
            return Err(format!("round moved {} → {}", last_round, now));
        }
        last_round = now;
    }

    let start = config.starting_valuation;
    for team in game.teams() {
        let sum: i64 = team.round_history.values().map(|e| e.round_profit).sum();
        if team.total_money != start + sum {
            return Err(format!(
                "{} total {} != start {} + history {}",
                team.team_name, team.total_money, start, sum
            ));
        }
        if team.round_history.len() != config.rounds.len() {
            return Err(format!(
                "{} has {} history entries",
                team.team_name,
                team.round_history.len()
            ));
        }
    }
    Ok(game)
}

fn validate_full_games(scenario: Scenario, opts: &Options) -> Vec<TestResult> {
    let tag = format!("{:?}", scenario).to_lowercase();
    println!("--- Full Games ({}) ---", tag);
    let mut results = Vec::new();

    let config = match load(scenario) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: format!("{}_games_config", tag),
                passed: false,
                detail: e,
            });
            return results;
        }
    };

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut failures = Vec::new();
    let mut successes = 0u32;
    let mut last_game = None;
    for game_index in 0..opts.games {
        match play_game(&config, &mut rng) {
            Ok(game) => {
                successes += 1;
                last_game = Some(game);
            }
            Err(e) => failures.push(format!("game {}: {}", game_index, e)),
        }
    }
    results.push(TestResult {
        name: format!("{}_games_invariants", tag),
        passed: failures.is_empty(),
        detail: format!(
            "{}/{} games clean{}",
            successes,
            opts.games,
            failures.first().map(|f| format!(", first failure: {}", f)).unwrap_or_default()
        ),
    });

    if let Some(mut game) = last_game {
        if opts.verbose {
            for team in game.standings() {
                println!("  {:<10} {:>16}", team.team_name, team.total_money);
            }
        }
        game.reset_game();
        results.push(TestResult {
            name: format!("{}_reset", tag),
            passed: game.team_count() == 0 && game.state() == &GameState::initial(),
            detail: "reset clears teams and restores initial state".into(),
        });
    }

    results
}

// ── 5. Strategies ───────────────────────────────────────────────────────

/// Fixed team behaviours compared over many seeded rolls.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    /// Never hire, never invest.
    Idle,
    /// Hire nobody, always invest.
    BlindInvest,
    /// Hire everyone, invest when the full average beats break-even.
    FullResearch,
}

impl Strategy {
    fn all() -> [Strategy; 3] {
        [Strategy::Idle, Strategy::BlindInvest, Strategy::FullResearch]
    }

    fn name(&self) -> String {
        format!("{:?}", self)
    }
}

fn validate_strategies(opts: &Options) -> Vec<TestResult> {
    println!("--- Strategies ---");
    let mut results = Vec::new();

    let config = match load(Scenario::Pharma) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "strategy_config".into(),
                passed: false,
                detail: e,
            });
            return results;
        }
    };

    let mut rng = StdRng::seed_from_u64(opts.seed ^ 0x5eed);
    let mut totals = [0i128; 3];
    let mut idle_always_flat = true;
    let mut errors = Vec::new();

    for _ in 0..opts.games {
        let mut game = GameSession::new(config.clone());
        for strategy in Strategy::all() {
            if let Err(e) = game.register_team(&strategy.name()) {
                errors.push(e.to_string());
            }
        }
        if let Err(e) = play_strategies(&mut game, &mut rng) {
            errors.push(e);
            continue;
        }
        for (i, strategy) in Strategy::all().iter().enumerate() {
            let total = game
                .team(&strategy.name())
                .map(|t| t.total_money)
                .unwrap_or_default();
            totals[i] += total as i128;
            if matches!(strategy, Strategy::Idle) && total != config.starting_valuation {
                idle_always_flat = false;
            }
        }
    }

    results.push(TestResult {
        name: "strategy_games_complete".into(),
        passed: errors.is_empty(),
        detail: format!("{} errors", errors.len()),
    });
    results.push(TestResult {
        name: "strategy_idle_is_flat".into(),
        passed: idle_always_flat,
        detail: "a team that never spends never moves".into(),
    });

    let games = opts.games.max(1) as i128;
    for (i, strategy) in Strategy::all().iter().enumerate() {
        if opts.verbose {
            println!("  {:<14} mean final {:>16}", strategy.name(), totals[i] / games);
        }
    }

    results
}

fn play_strategies(game: &mut GameSession, rng: &mut StdRng) -> Result<(), String> {
    game.start_game().map_err(|e| e.to_string())?;
    while !game.state().phase.is_terminal() {
        let round = game.current_round().map_err(|e| e.to_string())?.clone();
        let avg = average_probability(&round.consultants);
        let worth_it = avg / 100.0 * round.profit as f64 > round.investment_amount as f64;

        for strategy in Strategy::all() {
            let hire = match strategy {
                Strategy::FullResearch => round.max_consultants(),
                _ => 0,
            };
            game.submit_consultants(&strategy.name(), hire)
                .map_err(|e| e.to_string())?;
        }
        game.begin_investment().map_err(|e| e.to_string())?;
        for strategy in Strategy::all() {
            let invest = match strategy {
                Strategy::Idle => false,
                Strategy::BlindInvest => true,
                Strategy::FullResearch => worth_it,
            };
            game.submit_investment(&strategy.name(), invest)
                .map_err(|e| e.to_string())?;
        }
        game.reveal_investment_decisions().map_err(|e| e.to_string())?;
        game.reveal_probabilities().map_err(|e| e.to_string())?;
        game.roll_outcome(rng.gen_range(ROLL_MIN..=ROLL_MAX))
            .map_err(|e| e.to_string())?;
        game.advance_round().map_err(|e| e.to_string())?;
    }
    Ok(())
}
