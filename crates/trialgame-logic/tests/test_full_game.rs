//! Integration tests playing whole games through `GameSession`.
//!
//! Exercises: registration → rounds (hire → invest → reveal → roll →
//! advance) → game over → reset, with seeded random decisions and rolls.
//!
//! All tests are pure logic, no SpacetimeDB.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trialgame_logic::config::{GameConfig, RoundDefinition, Scenario};
use trialgame_logic::errors::GameError;
use trialgame_logic::phase::{Advance, GameState, Phase};
use trialgame_logic::session::GameSession;
use trialgame_logic::settlement::{
    average_probability, is_success, settle_team, SettlementInput, ROLL_MAX, ROLL_MIN,
};

// ── Helpers ────────────────────────────────────────────────────────────

const TEAMS: [&str; 4] = ["Alpha", "Bravo", "Charlie", "Delta"];

fn pharma_game() -> GameSession {
    let mut game = GameSession::new(Scenario::Pharma.load().expect("pharma scenario"));
    for name in TEAMS {
        game.register_team(name).unwrap();
    }
    game
}

/// Phase order index, used to check that transitions only move forward
/// within a round.
fn phase_rank(phase: Phase) -> u8 {
    match phase {
        Phase::Registration => 0,
        Phase::Phase1 => 1,
        Phase::Phase2 => 2,
        Phase::Results => 3,
        Phase::GameOver => 4,
    }
}

fn assert_step(before: &GameState, after: &GameState) {
    assert!(after.current_round >= before.current_round);
    if after.current_round == before.current_round {
        let (b, a) = (phase_rank(before.phase), phase_rank(after.phase));
        assert!(a == b || a == b + 1 || (before.phase == Phase::Results && a == 4));
    } else {
        assert_eq!(after.current_round, before.current_round + 1);
        assert_eq!(before.phase, Phase::Results);
        assert_eq!(after.phase, Phase::Phase1);
    }
}

fn step(prev: &mut GameState, game: &GameSession) {
    assert_step(prev, game.state());
    *prev = game.state().clone();
}

/// Play one full round with random decisions; returns the roll used.
fn play_round(game: &mut GameSession, rng: &mut StdRng) -> u8 {
    let mut prev = game.state().clone();

    for name in TEAMS {
        if rng.gen_bool(0.9) {
            game.submit_consultants(name, rng.gen_range(0..=7)).unwrap();
        }
    }
    game.begin_investment().unwrap();
    step(&mut prev, game);
    for name in TEAMS {
        if rng.gen_bool(0.9) {
            game.submit_investment(name, rng.gen_bool(0.5)).unwrap();
        }
    }
    game.reveal_investment_decisions().unwrap();
    step(&mut prev, game);
    game.reveal_probabilities().unwrap();
    step(&mut prev, game);
    let roll = rng.gen_range(ROLL_MIN..=ROLL_MAX);
    game.roll_outcome(roll).unwrap();
    step(&mut prev, game);
    roll
}

// ── Full game tests ────────────────────────────────────────────────────

#[test]
fn full_game_reaches_game_over_after_configured_rounds() {
    let mut game = pharma_game();
    let mut rng = StdRng::seed_from_u64(7);
    game.start_game().unwrap();

    let rounds = game.config().round_count();
    for expected_round in 1..=rounds {
        assert_eq!(game.state().current_round, expected_round);
        assert_eq!(game.state().phase, Phase::Phase1);
        play_round(&mut game, &mut rng);
        let before = game.state().clone();
        let advance = game.advance_round().unwrap();
        assert_step(&before, game.state());
        if expected_round == rounds {
            assert_eq!(advance, Advance::GameOver);
        } else {
            assert_eq!(advance, Advance::NextRound(expected_round + 1));
        }
    }
    assert_eq!(game.state().phase, Phase::GameOver);
    for team in game.teams() {
        assert_eq!(team.round_history.len(), rounds as usize);
    }
}

#[test]
fn totals_equal_start_plus_history() {
    for seed in 0..20u64 {
        let mut game = pharma_game();
        let mut rng = StdRng::seed_from_u64(seed);
        game.start_game().unwrap();
        while game.state().phase != Phase::GameOver {
            play_round(&mut game, &mut rng);
            game.advance_round().unwrap();
        }
        let start = game.config().starting_valuation;
        for team in game.teams() {
            let sum: i64 = team.round_history.values().map(|e| e.round_profit).sum();
            assert_eq!(team.total_money, start + sum, "seed {}", seed);
            let last = team.round_history.values().last().unwrap();
            assert_eq!(last.total_after_round, team.total_money);
        }
    }
}

#[test]
fn settlement_matches_formula_for_every_team() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let mut game = pharma_game();
        game.start_game().unwrap();
        let round = game.current_round().unwrap().clone();
        let roll = play_round(&mut game, &mut rng);
        let success = roll as f64 <= average_probability(&round.consultants);
        assert_eq!(game.state().round_outcome, Some(success));

        for team in game.teams() {
            let entry = &team.round_history[&1];
            let hired = entry.consultants_hired as i64;
            let invested = entry.invested == Some(true);
            let expenses = hired * round.consultant_cost
                + if invested { round.investment_amount } else { 0 };
            let payout = if invested && success { round.profit } else { 0 };
            assert_eq!(entry.initial_expenses, -expenses);
            assert_eq!(entry.round_profit, -expenses + payout);
            assert!(entry.consultants_hired <= round.max_consultants());
        }
    }
}

#[test]
fn reference_round_example() {
    let round = RoundDefinition {
        drug_name: "GLP-X01".into(),
        drug_description: String::new(),
        consultants: vec![20, 30, 40, 50, 60],
        consultant_comments: Vec::new(),
        profit: 100_000_000,
        consultant_cost: 2_000_000,
        investment_amount: 25_000_000,
    };
    let mut game = GameSession::new(GameConfig {
        starting_valuation: 0,
        rounds: vec![round],
    });
    game.register_team("Acme").unwrap();
    game.start_game().unwrap();
    game.submit_consultants("Acme", 3).unwrap();
    game.begin_investment().unwrap();
    game.submit_investment("Acme", true).unwrap();
    game.reveal_investment_decisions().unwrap();
    game.reveal_probabilities().unwrap();
    let report = game.roll_outcome(35).unwrap();
    assert!(report.success);
    let acme = game.team("Acme").unwrap();
    assert_eq!(acme.current_round.round_profit, 69_000_000);
    assert_eq!(acme.total_money, 69_000_000);
    assert_eq!(game.advance_round().unwrap(), Advance::GameOver);
}

#[test]
fn second_game_after_initialize_replays_every_round() {
    let mut game = pharma_game();
    let mut rng = StdRng::seed_from_u64(11);
    game.start_game().unwrap();
    while !game.state().phase.is_terminal() {
        play_round(&mut game, &mut rng);
        game.advance_round().unwrap();
    }

    game.initialize_game();
    assert_eq!(game.team_count(), TEAMS.len());
    game.start_game().unwrap();
    let rounds = game.config().round_count();

    for number in 1..=rounds {
        let round = game.current_round().unwrap().clone();
        let before: Vec<i64> = TEAMS
            .iter()
            .map(|name| game.team(name).unwrap().total_money)
            .collect();
        for (i, name) in TEAMS.iter().enumerate() {
            let hired = game.submit_consultants(name, i as u32 + 1).unwrap();
            assert_eq!(hired, i as u32 + 1);
        }
        game.begin_investment().unwrap();
        for (i, name) in TEAMS.iter().enumerate() {
            game.submit_investment(name, i % 2 == 0).unwrap();
        }
        game.reveal_investment_decisions().unwrap();
        game.reveal_probabilities().unwrap();
        let report = game.roll_outcome(rng.gen_range(ROLL_MIN..=ROLL_MAX)).unwrap();
        assert_eq!(report.settled.len(), TEAMS.len());

        for (i, name) in TEAMS.iter().enumerate() {
            let team = game.team(name).unwrap();
            let invested = i % 2 == 0;
            let expenses = (i as i64 + 1) * round.consultant_cost
                + if invested { round.investment_amount } else { 0 };
            let payout = if invested && report.success { round.profit } else { 0 };
            let entry = &team.round_history[&number];
            assert_eq!(entry.invested, Some(invested));
            assert_eq!(entry.round_profit, payout - expenses);
            assert_eq!(team.total_money, before[i] + payout - expenses);
        }
        game.advance_round().unwrap();
    }

    assert_eq!(game.state().phase, Phase::GameOver);
    for team in game.teams() {
        // replayed rounds replace the first game's entries
        assert_eq!(team.round_history.len(), rounds as usize);
        let last = team.round_history.values().last().unwrap();
        assert_eq!(last.total_after_round, team.total_money);
    }
}

// ── Properties ─────────────────────────────────────────────────────────

#[test]
fn average_within_min_max() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..500 {
        let len = rng.gen_range(1..=10);
        let list: Vec<u8> = (0..len).map(|_| rng.gen_range(0..=100)).collect();
        let avg = average_probability(&list);
        let min = *list.iter().min().unwrap() as f64;
        let max = *list.iter().max().unwrap() as f64;
        assert!(avg >= min && avg <= max, "{:?} -> {}", list, avg);
    }
}

#[test]
fn not_invested_profit_independent_of_outcome() {
    let round = Scenario::Chem.load().unwrap().rounds[0].clone();
    for hired in 0..=5u32 {
        for invested in [None, Some(false)] {
            let input = SettlementInput {
                consultants_hired: hired,
                invested,
                total_money: 0,
            };
            let win = settle_team(input, &round, true).unwrap();
            let lose = settle_team(input, &round, false).unwrap();
            assert_eq!(win.round_profit, lose.round_profit);
            assert_eq!(win.round_profit, -(hired as i64) * round.consultant_cost);
        }
    }
}

#[test]
fn invested_profit_depends_on_roll() {
    let round = Scenario::Pharma.load().unwrap().rounds[2].clone();
    let average = average_probability(&round.consultants);
    let input = SettlementInput {
        consultants_hired: 2,
        invested: Some(true),
        total_money: 0,
    };
    let loss = -(2 * round.consultant_cost + round.investment_amount);
    for roll in ROLL_MIN..=ROLL_MAX {
        let s = settle_team(input, &round, is_success(roll, average)).unwrap();
        if (roll as f64) <= average {
            assert_eq!(s.round_profit, loss + round.profit);
        } else {
            assert_eq!(s.round_profit, loss);
        }
    }
}

// ── Operator misuse ────────────────────────────────────────────────────

#[test]
fn out_of_order_operator_actions_are_rejected() {
    let mut game = pharma_game();
    assert!(game.begin_investment().is_err());
    assert!(game.roll_outcome(1).is_err());
    assert!(game.advance_round().is_err());
    game.start_game().unwrap();
    assert!(game.start_game().is_err());
    assert!(game.reveal_probabilities().is_err());
    game.begin_investment().unwrap();
    assert_eq!(game.roll_outcome(1).unwrap_err(), GameError::RollNotReady);
    assert_eq!(game.state().phase, Phase::Phase2);
    assert!(game.teams().all(|t| t.round_history.is_empty()));
}

#[test]
fn reset_yields_empty_game() {
    let mut game = pharma_game();
    let mut rng = StdRng::seed_from_u64(3);
    game.start_game().unwrap();
    play_round(&mut game, &mut rng);
    game.reset_game();
    assert_eq!(game.team_count(), 0);
    assert_eq!(game.state(), &GameState::initial());
    // a reset game can be played again
    game.register_team("Echo").unwrap();
    game.start_game().unwrap();
    assert_eq!(game.state().current_round, 1);
}
