//! Round definitions and game configuration.
//!
//! A game is a fixed, ordered list of drug candidates. Each candidate
//! carries the consultant opinions teams can pay for, the per-consultant
//! fee, the investment needed to enter the trial and the payout on
//! success. Scenarios ship as JSON under `data/` and are compiled in.
//!
//! ```
//! use trialgame_logic::config::{validate_config, Scenario};
//!
//! let config = Scenario::Pharma.load().unwrap();
//! assert_eq!(config.round_count(), 5);
//! assert!(validate_config(&config).is_empty());
//! ```

use serde::{Deserialize, Serialize};

const PHARMA_JSON: &str = include_str!("../../../data/rounds_pharma.json");
const CHEM_JSON: &str = include_str!("../../../data/rounds_chem.json");

/// Longest team name accepted at registration.
pub const MAX_TEAM_NAME_LEN: usize = 32;

/// One drug candidate, i.e. one round of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDefinition {
    pub drug_name: String,
    #[serde(default)]
    pub drug_description: String,
    /// Success probability reported by each consultant, in percent (0–100).
    pub consultants: Vec<u8>,
    /// One comment per consultant, or empty.
    #[serde(default)]
    pub consultant_comments: Vec<String>,
    /// Payout to an investing team when the trial succeeds.
    pub profit: i64,
    /// Fee per consultant hired.
    pub consultant_cost: i64,
    /// Cost of investing in the trial.
    pub investment_amount: i64,
}

impl RoundDefinition {
    /// Number of consultants a team may hire this round.
    pub fn max_consultants(&self) -> u32 {
        self.consultants.len() as u32
    }

    /// Comment for the consultant at `index`, if comments are configured.
    pub fn comment(&self, index: usize) -> Option<&str> {
        self.consultant_comments.get(index).map(String::as_str)
    }
}

/// Full game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Valuation every team starts with at registration.
    #[serde(default)]
    pub starting_valuation: i64,
    pub rounds: Vec<RoundDefinition>,
}

impl GameConfig {
    /// Parse a configuration from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn round_count(&self) -> u32 {
        self.rounds.len() as u32
    }

    /// Definition for a 1-based round number.
    pub fn round(&self, round: u32) -> Option<&RoundDefinition> {
        let index = round.checked_sub(1)?;
        self.rounds.get(index as usize)
    }
}

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Scenario {
    /// Drug development pipeline (Phase I through Phase III decisions).
    Pharma = 0,
    /// Industrial chemistry process development.
    Chem = 1,
}

impl Scenario {
    pub fn json(&self) -> &'static str {
        match self {
            Self::Pharma => PHARMA_JSON,
            Self::Chem => CHEM_JSON,
        }
    }

    pub fn load(&self) -> Result<GameConfig, serde_json::Error> {
        GameConfig::from_json(self.json())
    }

    pub fn all() -> &'static [Scenario] {
        &[Scenario::Pharma, Scenario::Chem]
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No rounds configured.
    NoRounds,
    /// Round (1-based) has no consultants, so its average is undefined.
    NoConsultants(u32),
    /// Round has a consultant probability above 100.
    ProbabilityOutOfRange { round: u32, value: u8 },
    /// Round has comments, but not one per consultant.
    CommentCountMismatch {
        round: u32,
        consultants: usize,
        comments: usize,
    },
    /// Round has a negative profit or cost.
    NegativeAmount(u32),
    /// Round has an empty drug name.
    EmptyDrugName(u32),
    StartingValuationNegative(i64),
}

/// Validate a game configuration, returning all errors found.
pub fn validate_config(config: &GameConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.rounds.is_empty() {
        errors.push(ConfigError::NoRounds);
    }
    if config.starting_valuation < 0 {
        errors.push(ConfigError::StartingValuationNegative(
            config.starting_valuation,
        ));
    }

    for (i, round) in config.rounds.iter().enumerate() {
        let number = i as u32 + 1;
        if round.drug_name.trim().is_empty() {
            errors.push(ConfigError::EmptyDrugName(number));
        }
        if round.consultants.is_empty() {
            errors.push(ConfigError::NoConsultants(number));
        }
        if let Some(&value) = round.consultants.iter().find(|&&p| p > 100) {
            errors.push(ConfigError::ProbabilityOutOfRange {
                round: number,
                value,
            });
        }
        if !round.consultant_comments.is_empty()
            && round.consultant_comments.len() != round.consultants.len()
        {
            errors.push(ConfigError::CommentCountMismatch {
                round: number,
                consultants: round.consultants.len(),
                comments: round.consultant_comments.len(),
            });
        }
        if round.profit < 0 || round.consultant_cost < 0 || round.investment_amount < 0 {
            errors.push(ConfigError::NegativeAmount(number));
        }
    }

    errors
}
