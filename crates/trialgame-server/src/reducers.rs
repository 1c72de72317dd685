//! Operator and team reducers.
//!
//! Each reducer runs as one transaction. Rejected actions are logged and
//! dropped without writing anything; subscribed clients simply see no
//! change.

use crate::tables::*;
use spacetimedb::rand::Rng;
use spacetimedb::{reducer, ReducerContext, Table};
use trialgame_logic::config::{validate_config, GameConfig, RoundDefinition, Scenario};
use trialgame_logic::errors::GameError;
use trialgame_logic::phase::{Advance, GameState as PhaseState, Phase};
use trialgame_logic::settlement::{settle_round, ROLL_MAX, ROLL_MIN};
use trialgame_logic::team::{normalize_team_name, TeamRecord};

#[cfg(feature = "chem")]
const SCENARIO: Scenario = Scenario::Chem;
#[cfg(not(feature = "chem"))]
const SCENARIO: Scenario = Scenario::Pharma;

// ============================================================================
// HELPERS
// ============================================================================

fn load_config() -> Result<GameConfig, String> {
    SCENARIO
        .load()
        .map_err(|e| format!("scenario {:?} failed to parse: {}", SCENARIO, e))
}

fn round_definition(config: &GameConfig, round: u32) -> Result<&RoundDefinition, String> {
    config
        .round(round)
        .ok_or_else(|| GameError::RoundNotConfigured(round).to_string())
}

/// Current game state; a missing row reads as the initial state.
fn load_state(ctx: &ReducerContext) -> PhaseState {
    ctx.db
        .game_state()
        .id()
        .find(GAME_STATE_ID)
        .map(|row| row.to_logic())
        .unwrap_or_default()
}

fn save_state(ctx: &ReducerContext, state: &PhaseState) {
    let row = GameState::from_logic(state);
    if ctx.db.game_state().id().find(GAME_STATE_ID).is_some() {
        ctx.db.game_state().id().update(row);
    } else {
        ctx.db.game_state().insert(row);
    }
}

/// The team registered by the calling client.
fn own_team(ctx: &ReducerContext) -> Result<Team, String> {
    ctx.db
        .team()
        .owner()
        .find(ctx.sender)
        .ok_or_else(|| "no team registered for this client".to_string())
}

fn log_rejected(action: &str, result: Result<(), String>) {
    if let Err(e) = result {
        log::warn!("{} rejected: {}", action, e);
    }
}

fn write_initial_state(ctx: &ReducerContext) {
    save_state(ctx, &PhaseState::initial());
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    match load_config() {
        Ok(config) => {
            for error in validate_config(&config) {
                log::warn!("Config problem in {:?}: {:?}", SCENARIO, error);
            }
            log::info!(
                "Loaded {:?} scenario with {} rounds",
                SCENARIO,
                config.round_count()
            );
        }
        Err(e) => log::warn!("{}", e),
    }
    write_initial_state(ctx);
}

/// Called when a client connects
#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    if ctx.db.connected_client().identity().find(ctx.sender).is_none() {
        ctx.db.connected_client().insert(ConnectedClient {
            identity: ctx.sender,
            connected_at: ctx.timestamp,
        });
    }
}

/// Called when a client disconnects
#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    ctx.db.connected_client().identity().delete(ctx.sender);
}

// ============================================================================
// TEAM REDUCERS
// ============================================================================

/// Register a team for the calling client (registration phase only)
#[reducer]
pub fn register_team(ctx: &ReducerContext, team_name: String) {
    log_rejected("register_team", try_register_team(ctx, &team_name));
}

fn try_register_team(ctx: &ReducerContext, raw_name: &str) -> Result<(), String> {
    let state = load_state(ctx);
    if state.phase != Phase::Registration {
        return Err(GameError::WrongPhase {
            expected: Phase::Registration,
            actual: state.phase,
        }
        .to_string());
    }
    let name = normalize_team_name(raw_name).map_err(|e| e.to_string())?;
    if ctx.db.team().team_name().find(&name).is_some() {
        return Err(GameError::DuplicateTeam(name).to_string());
    }
    if ctx.db.team().owner().find(ctx.sender).is_some() {
        return Err("this client already registered a team".to_string());
    }

    let config = load_config()?;
    let record = TeamRecord::new(name, config.starting_valuation);
    let mut row = Team {
        team_name: record.team_name.clone(),
        owner: ctx.sender,
        total_money: 0,
        consultants_hired: 0,
        consultants_submitted: false,
        invested: None,
        round_profit: 0,
        registered_at: ctx.timestamp,
    };
    row.apply_record(&record);
    ctx.db.team().insert(row);

    log::info!(
        "Team registered: {} (valuation {})",
        record.team_name,
        record.total_money
    );
    Ok(())
}

/// Hire consultants for the current round (phase 1, once per round)
#[reducer]
pub fn submit_consultants(ctx: &ReducerContext, count: u32) {
    log_rejected("submit_consultants", try_submit_consultants(ctx, count));
}

fn try_submit_consultants(ctx: &ReducerContext, count: u32) -> Result<(), String> {
    let state = load_state(ctx);
    let config = load_config()?;
    let round = round_definition(&config, state.current_round)?;
    let mut row = own_team(ctx)?;

    let mut record = row.to_record();
    let hired = record
        .submit_consultants(state.phase, round, count)
        .map_err(|e| e.to_string())?;
    row.apply_record(&record);

    log::info!(
        "Team {} hired {} consultants (requested {}) in round {}",
        row.team_name,
        hired,
        count,
        state.current_round
    );
    ctx.db.team().team_name().update(row);
    Ok(())
}

/// Invest or pass on the current candidate (phase 2, once per round)
#[reducer]
pub fn submit_investment(ctx: &ReducerContext, invest: bool) {
    log_rejected("submit_investment", try_submit_investment(ctx, invest));
}

fn try_submit_investment(ctx: &ReducerContext, invest: bool) -> Result<(), String> {
    let state = load_state(ctx);
    let config = load_config()?;
    let round = round_definition(&config, state.current_round)?;
    let mut row = own_team(ctx)?;

    let mut record = row.to_record();
    record
        .submit_investment(state.phase, round, invest)
        .map_err(|e| e.to_string())?;
    row.apply_record(&record);

    log::info!(
        "Team {} {} in round {}",
        row.team_name,
        if invest { "invested" } else { "passed" },
        state.current_round
    );
    ctx.db.team().team_name().update(row);
    Ok(())
}

// ============================================================================
// OPERATOR REDUCERS
// ============================================================================

/// Write the initial game state, keeping registered teams
#[reducer]
pub fn initialize_game(ctx: &ReducerContext) {
    write_initial_state(ctx);
    log::info!("Game state initialized");
}

/// Delete every team and its history, then write the initial game state
#[reducer]
pub fn reset_game(ctx: &ReducerContext) {
    let names: Vec<String> = ctx.db.team().iter().map(|t| t.team_name).collect();
    for name in &names {
        ctx.db.team().team_name().delete(name);
    }
    let history_ids: Vec<u64> = ctx.db.round_history().iter().map(|h| h.id).collect();
    for id in history_ids {
        ctx.db.round_history().id().delete(id);
    }
    write_initial_state(ctx);
    log::info!("Game reset ({} teams removed)", names.len());
}

/// registration → phase 1, clearing decisions left over from a previous game
#[reducer]
pub fn start_game(ctx: &ReducerContext) {
    log_rejected("start_game", try_start_game(ctx));
}

fn try_start_game(ctx: &ReducerContext) -> Result<(), String> {
    let mut state = load_state(ctx);
    let rows: Vec<Team> = ctx.db.team().iter().collect();
    state.start_game(rows.len()).map_err(|e| e.to_string())?;

    for mut row in rows {
        row.reset_round();
        ctx.db.team().team_name().update(row);
    }
    save_state(ctx, &state);
    log::info!("Game started with {} teams", ctx.db.team().count());
    Ok(())
}

/// phase 1 → phase 2, showing consultant counts
#[reducer]
pub fn begin_investment(ctx: &ReducerContext) {
    log_rejected("begin_investment", try_transition(ctx, |state| {
        state.begin_investment()
    }));
}

#[reducer]
pub fn reveal_investment_decisions(ctx: &ReducerContext) {
    log_rejected("reveal_investment_decisions", try_transition(ctx, |state| {
        state.reveal_investment_decisions()
    }));
}

#[reducer]
pub fn reveal_probabilities(ctx: &ReducerContext) {
    log_rejected("reveal_probabilities", try_transition(ctx, |state| {
        state.reveal_probabilities()
    }));
}

/// Apply a state-only transition and persist it.
fn try_transition(
    ctx: &ReducerContext,
    transition: impl FnOnce(&mut PhaseState) -> Result<(), GameError>,
) -> Result<(), String> {
    let mut state = load_state(ctx);
    transition(&mut state).map_err(|e| e.to_string())?;
    save_state(ctx, &state);
    log::info!(
        "Round {} now in {}",
        state.current_round,
        state.phase.as_str()
    );
    Ok(())
}

/// Roll the shared trial outcome and settle every team in one batch
#[reducer]
pub fn roll_outcome(ctx: &ReducerContext) {
    log_rejected("roll_outcome", try_roll_outcome(ctx));
}

fn try_roll_outcome(ctx: &ReducerContext) -> Result<(), String> {
    let mut state = load_state(ctx);
    state.ensure_can_roll().map_err(|e| e.to_string())?;
    let config = load_config()?;
    let round_number = state.current_round;
    let round = round_definition(&config, round_number)?;

    let roll = ctx.rng().gen_range(ROLL_MIN..=ROLL_MAX);
    let rows: Vec<Team> = ctx.db.team().iter().collect();
    let mut records: Vec<TeamRecord> = rows.iter().map(Team::to_record).collect();
    let report = settle_round(records.iter_mut(), round_number, round, roll);
    state
        .record_outcome(report.success, report.roll)
        .map_err(|e| e.to_string())?;

    for name in &report.skipped {
        log::warn!(
            "Settlement for team {} in round {} is invalid; total left unchanged",
            name,
            round_number
        );
    }

    for (mut row, record) in rows.into_iter().zip(records) {
        let Some(entry) = record.round_history.get(&round_number) else {
            continue;
        };
        replace_history(ctx, &row.team_name, round_number);
        ctx.db.round_history().insert(RoundHistory {
            id: 0,
            team_name: row.team_name.clone(),
            round: entry.round,
            drug_name: entry.drug_name.clone(),
            consultants_hired: entry.consultants_hired,
            invested: entry.invested,
            initial_expenses: entry.initial_expenses,
            round_profit: entry.round_profit,
            total_after_round: entry.total_after_round,
            settled_at: ctx.timestamp,
        });
        row.apply_record(&record);
        ctx.db.team().team_name().update(row);
    }

    save_state(ctx, &state);

    log::info!(
        "Round {} ({}): roll {} vs average {:.1} -> {} ({} settled, {} skipped)",
        round_number,
        round.drug_name,
        report.roll,
        report.average,
        if report.success { "SUCCESS" } else { "FAILURE" },
        report.settled.len(),
        report.skipped.len()
    );
    Ok(())
}

/// Drop a team's earlier entry for `round`, left by a game played before
/// `initialize_game`, so each team keeps one row per round.
fn replace_history(ctx: &ReducerContext, team_name: &String, round: u32) {
    let stale: Vec<u64> = ctx
        .db
        .round_history()
        .team_name()
        .filter(team_name)
        .filter(|h| h.round == round)
        .map(|h| h.id)
        .collect();
    for id in stale {
        ctx.db.round_history().id().delete(id);
    }
}

/// results → phase 1 of the next round, or game over after the last one
#[reducer]
pub fn advance_round(ctx: &ReducerContext) {
    log_rejected("advance_round", try_advance_round(ctx));
}

fn try_advance_round(ctx: &ReducerContext) -> Result<(), String> {
    let mut state = load_state(ctx);
    let config = load_config()?;
    let advance = state
        .advance_round(config.round_count())
        .map_err(|e| e.to_string())?;

    match advance {
        Advance::NextRound(round) => {
            let rows: Vec<Team> = ctx.db.team().iter().collect();
            for mut row in rows {
                row.reset_round();
                ctx.db.team().team_name().update(row);
            }
            log::info!("Round {} started", round);
        }
        Advance::GameOver => log::info!("All candidates evaluated. Game over"),
    }

    save_state(ctx, &state);
    Ok(())
}
