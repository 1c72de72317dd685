//! Round phase state machine.
//!
//! ```text
//! registration → phase1 → phase2 → results ─┬→ phase1 (next round)
//!                                            └→ gameOver (last round)
//! ```
//!
//! Every transition is operator-triggered and checks its source phase
//! before touching anything, so a rejected call leaves the state as it
//! was. Within `phase2` the three reveal flags are set in order
//! (consultants hired → investment decisions → probability summary) and
//! the outcome roll is only permitted once all three are set.

use crate::errors::GameError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// Teams register; nothing else is open.
    Registration = 0,
    /// Teams choose how many consultants to hire.
    Phase1 = 1,
    /// Teams decide whether to invest; operator reveals information.
    Phase2 = 2,
    /// Outcome rolled and settled.
    Results = 3,
    /// All rounds played. Only a reset leaves this phase.
    GameOver = 4,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "registration",
            Self::Phase1 => "phase1",
            Self::Phase2 => "phase2",
            Self::Results => "results",
            Self::GameOver => "gameOver",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Convert phase to u8 for storage.
pub fn phase_to_u8(phase: Phase) -> u8 {
    phase as u8
}

/// Convert a stored u8 to a phase. Unknown values are read as
/// registration, the state a fresh or reset game is in.
pub fn u8_to_phase(val: u8) -> Phase {
    match val {
        1 => Phase::Phase1,
        2 => Phase::Phase2,
        3 => Phase::Results,
        4 => Phase::GameOver,
        _ => Phase::Registration,
    }
}

/// What `advance_round` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new round started; team sub-records must be cleared.
    NextRound(u32),
    GameOver,
}

/// Shared game state singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 1-based round number.
    pub current_round: u32,
    pub phase: Phase,
    pub show_consultants_hired: bool,
    pub show_investment_decisions: bool,
    pub show_probabilities: bool,
    pub show_results: bool,
    /// `Some(true)` when the trial succeeded, `None` before the roll.
    pub round_outcome: Option<bool>,
    /// The roll that produced `round_outcome`.
    pub last_roll: Option<u8>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_round: 1,
            phase: Phase::Registration,
            show_consultants_hired: false,
            show_investment_decisions: false,
            show_probabilities: false,
            show_results: false,
            round_outcome: None,
            last_roll: None,
        }
    }
}

impl GameState {
    /// Initial state, as written on initialization and full reset.
    pub fn initial() -> Self {
        Self::default()
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn clear_round_flags(&mut self) {
        self.show_consultants_hired = false;
        self.show_investment_decisions = false;
        self.show_probabilities = false;
        self.show_results = false;
        self.round_outcome = None;
        self.last_roll = None;
    }

    /// `registration → phase1`, starting at round 1.
    pub fn start_game(&mut self, team_count: usize) -> Result<(), GameError> {
        self.expect_phase(Phase::Registration)?;
        if team_count == 0 {
            return Err(GameError::NoTeams);
        }
        self.current_round = 1;
        self.phase = Phase::Phase1;
        self.clear_round_flags();
        Ok(())
    }

    /// `phase1 → phase2`; consultant counts become visible.
    pub fn begin_investment(&mut self) -> Result<(), GameError> {
        self.expect_phase(Phase::Phase1)?;
        self.phase = Phase::Phase2;
        self.show_consultants_hired = true;
        Ok(())
    }

    pub fn reveal_investment_decisions(&mut self) -> Result<(), GameError> {
        self.expect_phase(Phase::Phase2)?;
        if !self.show_consultants_hired {
            return Err(GameError::RevealOutOfOrder("investment decisions"));
        }
        if self.show_investment_decisions {
            return Err(GameError::AlreadyRevealed("investment decisions"));
        }
        self.show_investment_decisions = true;
        Ok(())
    }

    pub fn reveal_probabilities(&mut self) -> Result<(), GameError> {
        self.expect_phase(Phase::Phase2)?;
        if !self.show_investment_decisions {
            return Err(GameError::RevealOutOfOrder("probabilities"));
        }
        if self.show_probabilities {
            return Err(GameError::AlreadyRevealed("probabilities"));
        }
        self.show_probabilities = true;
        Ok(())
    }

    /// Whether the operator may roll the outcome now.
    pub fn can_roll(&self) -> bool {
        self.phase == Phase::Phase2
            && self.show_consultants_hired
            && self.show_investment_decisions
            && self.show_probabilities
    }

    pub fn ensure_can_roll(&self) -> Result<(), GameError> {
        self.expect_phase(Phase::Phase2)?;
        if !self.can_roll() {
            return Err(GameError::RollNotReady);
        }
        Ok(())
    }

    /// `phase2 → results` once the round has been settled.
    pub fn record_outcome(&mut self, success: bool, roll: u8) -> Result<(), GameError> {
        self.ensure_can_roll()?;
        self.phase = Phase::Results;
        self.round_outcome = Some(success);
        self.last_roll = Some(roll);
        self.show_results = true;
        Ok(())
    }

    /// `results → phase1` for the next round, or `results → gameOver`
    /// after the last configured round.
    pub fn advance_round(&mut self, round_count: u32) -> Result<Advance, GameError> {
        self.expect_phase(Phase::Results)?;
        if self.current_round >= round_count {
            self.phase = Phase::GameOver;
            return Ok(Advance::GameOver);
        }
        self.current_round += 1;
        self.phase = Phase::Phase1;
        self.clear_round_flags();
        Ok(Advance::NextRound(self.current_round))
    }
}
