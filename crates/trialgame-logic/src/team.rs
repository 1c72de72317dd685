//! Team records and the two decisions a team makes each round.
//!
//! A team writes only its own record. In phase 1 it picks how many
//! consultants to hire; in phase 2 it decides whether to invest. Each
//! decision is accepted once per round and accrues the matching expense
//! into `round_profit` (negative until settlement).

use crate::config::{RoundDefinition, MAX_TEAM_NAME_LEN};
use crate::errors::GameError;
use crate::phase::Phase;
use crate::settlement::accrued_expenses;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-round decisions, cleared when the next round starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRound {
    pub consultants_hired: u32,
    pub consultants_submitted: bool,
    /// `None` until the team decides in phase 2.
    pub invested: Option<bool>,
    /// Negative expenses while decisions accrue, net result after settlement.
    pub round_profit: i64,
}

/// Snapshot of a settled round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundHistoryEntry {
    pub round: u32,
    pub drug_name: String,
    pub consultants_hired: u32,
    pub invested: Option<bool>,
    /// Expenses before the outcome, as a negative number.
    pub initial_expenses: i64,
    pub round_profit: i64,
    pub total_after_round: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub team_name: String,
    pub total_money: i64,
    pub current_round: CurrentRound,
    #[serde(default)]
    pub round_history: BTreeMap<u32, RoundHistoryEntry>,
}

/// One consultant opinion revealed to a team that paid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsultantOpinion {
    /// 1-based consultant number (C1, C2, ...).
    pub number: u32,
    pub probability: u8,
    pub comment: Option<String>,
}

/// Trim and check a team name for registration.
pub fn normalize_team_name(raw: &str) -> Result<String, GameError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_LEN {
        return Err(GameError::InvalidTeamName(raw.to_string()));
    }
    Ok(name.to_string())
}

fn expect_phase(actual: Phase, expected: Phase) -> Result<(), GameError> {
    if actual == expected {
        Ok(())
    } else {
        Err(GameError::WrongPhase { expected, actual })
    }
}

impl TeamRecord {
    pub fn new(team_name: String, starting_valuation: i64) -> Self {
        Self {
            team_name,
            total_money: starting_valuation,
            current_round: CurrentRound::default(),
            round_history: BTreeMap::new(),
        }
    }

    /// Record the consultant count for this round. The count is clamped to
    /// the consultants available; the clamped value is returned.
    pub fn submit_consultants(
        &mut self,
        phase: Phase,
        round: &RoundDefinition,
        requested: u32,
    ) -> Result<u32, GameError> {
        expect_phase(phase, Phase::Phase1)?;
        if self.current_round.consultants_submitted {
            return Err(GameError::AlreadySubmitted("consultants"));
        }
        let hired = requested.min(round.max_consultants());
        self.current_round.consultants_hired = hired;
        self.current_round.consultants_submitted = true;
        self.current_round.round_profit = -accrued_expenses(hired, false, round);
        Ok(hired)
    }

    /// Record the invest / don't-invest decision for this round.
    pub fn submit_investment(
        &mut self,
        phase: Phase,
        round: &RoundDefinition,
        invest: bool,
    ) -> Result<(), GameError> {
        expect_phase(phase, Phase::Phase2)?;
        if self.current_round.invested.is_some() {
            return Err(GameError::AlreadySubmitted("investment decision"));
        }
        self.current_round.invested = Some(invest);
        self.current_round.round_profit =
            -accrued_expenses(self.current_round.consultants_hired, invest, round);
        Ok(())
    }

    /// Clear the per-round sub-record for a new round.
    pub fn reset_round(&mut self) {
        self.current_round = CurrentRound::default();
    }

    pub fn has_decided_investment(&self) -> bool {
        self.current_round.invested.is_some()
    }

    /// The opinions this team paid for: the first `consultants_hired`
    /// entries of the round's consultant list.
    pub fn visible_opinions(&self, round: &RoundDefinition) -> Vec<ConsultantOpinion> {
        round
            .consultants
            .iter()
            .take(self.current_round.consultants_hired as usize)
            .enumerate()
            .map(|(i, &probability)| ConsultantOpinion {
                number: i as u32 + 1,
                probability,
                comment: round.comment(i).map(str::to_string),
            })
            .collect()
    }
}
