//! SpacetimeDB table definitions for the trial investment game.
//!
//! Each table mirrors a record from trialgame-logic, stored in SpacetimeDB
//! for persistence and live sync. All tables are public so the operator
//! console and team clients can subscribe to them.

use spacetimedb::{table, Identity, Timestamp};
use trialgame_logic::phase::{self, GameState as PhaseState};
use trialgame_logic::team::{CurrentRound, TeamRecord};

/// Row id of the game state singleton.
pub const GAME_STATE_ID: u32 = 0;

// ============================================================================
// GAME STATE
// ============================================================================

/// Shared game state singleton (id always 0)
#[table(name = game_state, public)]
#[derive(Clone)]
pub struct GameState {
    #[primary_key]
    pub id: u32,
    pub current_round: u32,
    pub phase: u8, // Phase as u8
    pub show_consultants_hired: bool,
    pub show_investment_decisions: bool,
    pub show_probabilities: bool,
    pub show_results: bool,
    pub round_outcome: Option<bool>,
    pub last_roll: Option<u8>,
}

impl GameState {
    pub fn from_logic(state: &PhaseState) -> Self {
        Self {
            id: GAME_STATE_ID,
            current_round: state.current_round,
            phase: phase::phase_to_u8(state.phase),
            show_consultants_hired: state.show_consultants_hired,
            show_investment_decisions: state.show_investment_decisions,
            show_probabilities: state.show_probabilities,
            show_results: state.show_results,
            round_outcome: state.round_outcome,
            last_roll: state.last_roll,
        }
    }

    pub fn to_logic(&self) -> PhaseState {
        PhaseState {
            current_round: self.current_round,
            phase: phase::u8_to_phase(self.phase),
            show_consultants_hired: self.show_consultants_hired,
            show_investment_decisions: self.show_investment_decisions,
            show_probabilities: self.show_probabilities,
            show_results: self.show_results,
            round_outcome: self.round_outcome,
            last_roll: self.last_roll,
        }
    }
}

// ============================================================================
// TEAMS
// ============================================================================

/// A registered team and its decisions for the current round
#[table(name = team, public)]
#[derive(Clone)]
pub struct Team {
    #[primary_key]
    pub team_name: String,
    /// Client that registered the team; only it may submit decisions.
    #[unique]
    pub owner: Identity,
    pub total_money: i64,
    pub consultants_hired: u32,
    pub consultants_submitted: bool,
    pub invested: Option<bool>, // None = undecided
    pub round_profit: i64,
    pub registered_at: Timestamp,
}

impl Team {
    /// Logic view of the row. History lives in its own table and is not
    /// needed for decisions or settlement.
    pub fn to_record(&self) -> TeamRecord {
        let mut record = TeamRecord::new(self.team_name.clone(), self.total_money);
        record.current_round = CurrentRound {
            consultants_hired: self.consultants_hired,
            consultants_submitted: self.consultants_submitted,
            invested: self.invested,
            round_profit: self.round_profit,
        };
        record
    }

    /// Copy balance and current-round fields back from a logic record.
    pub fn apply_record(&mut self, record: &TeamRecord) {
        self.total_money = record.total_money;
        self.consultants_hired = record.current_round.consultants_hired;
        self.consultants_submitted = record.current_round.consultants_submitted;
        self.invested = record.current_round.invested;
        self.round_profit = record.current_round.round_profit;
    }

    pub fn reset_round(&mut self) {
        let mut record = self.to_record();
        record.reset_round();
        self.apply_record(&record);
    }
}

/// Settled round snapshot, one row per team per round
#[table(name = round_history, public)]
pub struct RoundHistory {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    #[index(btree)]
    pub team_name: String,
    pub round: u32,
    pub drug_name: String,
    pub consultants_hired: u32,
    pub invested: Option<bool>,
    pub initial_expenses: i64,
    pub round_profit: i64,
    pub total_after_round: i64,
    pub settled_at: Timestamp,
}

// ============================================================================
// CLIENTS
// ============================================================================

/// Connected client session
#[table(name = connected_client, public)]
pub struct ConnectedClient {
    #[primary_key]
    pub identity: Identity,
    pub connected_at: Timestamp,
}
