//! In-memory game session.
//!
//! `GameSession` owns the config, the shared game state and every team
//! record, and is the single writer for all of them. It exposes the
//! operator and team actions one-to-one with the server reducers, which
//! makes it the reference for the server and the engine behind the
//! simtest harness.
//!
//! ```
//! use trialgame_logic::config::Scenario;
//! use trialgame_logic::phase::Phase;
//! use trialgame_logic::session::GameSession;
//!
//! let mut game = GameSession::new(Scenario::Pharma.load().unwrap());
//! game.register_team("Red").unwrap();
//! game.start_game().unwrap();
//! game.submit_consultants("Red", 3).unwrap();
//! game.begin_investment().unwrap();
//! game.submit_investment("Red", true).unwrap();
//! game.reveal_investment_decisions().unwrap();
//! game.reveal_probabilities().unwrap();
//! let report = game.roll_outcome(35).unwrap();
//! assert!(report.success);
//! assert_eq!(game.team("Red").unwrap().total_money, 69_000_000);
//! assert_eq!(game.state().phase, Phase::Results);
//! ```

use crate::config::{GameConfig, RoundDefinition};
use crate::errors::GameError;
use crate::phase::{Advance, GameState, Phase};
use crate::probability_line::{LineLayout, ProbabilityLine};
use crate::settlement::{average_probability, settle_round, RoundReport};
use crate::standings::{self, SubmissionCounts};
use crate::team::{normalize_team_name, ConsultantOpinion, TeamRecord};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    state: GameState,
    teams: BTreeMap<String, TeamRecord>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            state: GameState::initial(),
            teams: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn team(&self, name: &str) -> Option<&TeamRecord> {
        self.teams.get(name)
    }

    pub fn teams(&self) -> impl Iterator<Item = &TeamRecord> {
        self.teams.values()
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn standings(&self) -> Vec<&TeamRecord> {
        standings::standings(self.teams.values())
    }

    pub fn submission_counts(&self) -> SubmissionCounts {
        standings::submission_counts(self.teams.values())
    }

    /// Teams that still owe the decision the current phase asks for.
    pub fn pending_teams(&self) -> Vec<&str> {
        self.teams
            .values()
            .filter(|team| !standings::has_decided_this_phase(&self.state, team))
            .map(|team| team.team_name.as_str())
            .collect()
    }

    /// Definition of the round currently being played.
    pub fn current_round(&self) -> Result<&RoundDefinition, GameError> {
        self.config
            .round(self.state.current_round)
            .ok_or(GameError::RoundNotConfigured(self.state.current_round))
    }

    fn team_mut(&mut self, name: &str) -> Result<&mut TeamRecord, GameError> {
        self.teams
            .get_mut(name)
            .ok_or_else(|| GameError::UnknownTeam(name.to_string()))
    }

    // ── Team actions ────────────────────────────────────────────────────

    /// Register a team; returns the stored (trimmed) name.
    pub fn register_team(&mut self, raw_name: &str) -> Result<String, GameError> {
        if self.state.phase != Phase::Registration {
            return Err(GameError::WrongPhase {
                expected: Phase::Registration,
                actual: self.state.phase,
            });
        }
        let name = normalize_team_name(raw_name)?;
        if self.teams.contains_key(&name) {
            return Err(GameError::DuplicateTeam(name));
        }
        let record = TeamRecord::new(name.clone(), self.config.starting_valuation);
        self.teams.insert(name.clone(), record);
        Ok(name)
    }

    pub fn submit_consultants(&mut self, name: &str, count: u32) -> Result<u32, GameError> {
        let phase = self.state.phase;
        let round = self.current_round()?.clone();
        self.team_mut(name)?.submit_consultants(phase, &round, count)
    }

    pub fn submit_investment(&mut self, name: &str, invest: bool) -> Result<(), GameError> {
        let phase = self.state.phase;
        let round = self.current_round()?.clone();
        self.team_mut(name)?.submit_investment(phase, &round, invest)
    }

    pub fn visible_opinions(&self, name: &str) -> Result<Vec<ConsultantOpinion>, GameError> {
        let team = self
            .team(name)
            .ok_or_else(|| GameError::UnknownTeam(name.to_string()))?;
        Ok(team.visible_opinions(self.current_round()?))
    }

    // ── Operator actions ────────────────────────────────────────────────

    /// Start round 1. Teams kept by `initialize_game` begin with an empty
    /// sub-record, so leftover decisions from a previous game never count.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.state.start_game(self.teams.len())?;
        for team in self.teams.values_mut() {
            team.reset_round();
        }
        Ok(())
    }

    pub fn begin_investment(&mut self) -> Result<(), GameError> {
        self.state.begin_investment()
    }

    pub fn reveal_investment_decisions(&mut self) -> Result<(), GameError> {
        self.state.reveal_investment_decisions()
    }

    pub fn reveal_probabilities(&mut self) -> Result<(), GameError> {
        self.state.reveal_probabilities()
    }

    /// Settle the round against `roll` and move to results.
    pub fn roll_outcome(&mut self, roll: u8) -> Result<RoundReport, GameError> {
        self.state.ensure_can_roll()?;
        let round_number = self.state.current_round;
        let round = self.current_round()?.clone();
        let report = settle_round(self.teams.values_mut(), round_number, &round, roll);
        self.state.record_outcome(report.success, report.roll)?;
        Ok(report)
    }

    /// Next round (clearing every team's decisions) or game over.
    pub fn advance_round(&mut self) -> Result<Advance, GameError> {
        let advance = self.state.advance_round(self.config.round_count())?;
        if let Advance::NextRound(_) = advance {
            for team in self.teams.values_mut() {
                team.reset_round();
            }
        }
        Ok(advance)
    }

    /// Put the game state back to its initial values, keeping teams.
    pub fn initialize_game(&mut self) {
        self.state = GameState::initial();
    }

    /// Delete every team and put the game state back to its initial values.
    pub fn reset_game(&mut self) {
        self.teams.clear();
        self.state = GameState::initial();
    }

    /// Expert summary line, available once probabilities are revealed.
    pub fn probability_line(&self, layout: &LineLayout) -> Option<ProbabilityLine> {
        if !self.state.show_probabilities {
            return None;
        }
        let round = self.current_round().ok()?;
        Some(ProbabilityLine::new(
            layout,
            &round.consultants,
            average_probability(&round.consultants),
            self.state.last_roll,
        ))
    }
}
