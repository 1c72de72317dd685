//! Errors returned by game operations.

use crate::phase::Phase;
use std::fmt;

/// Why an operator or team action was rejected. A rejected action leaves
/// all state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The action is not available in the current phase.
    WrongPhase { expected: Phase, actual: Phase },
    /// `start_game` with nobody registered.
    NoTeams,
    /// A reveal was requested before the one it depends on.
    RevealOutOfOrder(&'static str),
    /// The reveal flag is already set.
    AlreadyRevealed(&'static str),
    /// Roll requested before all three reveals.
    RollNotReady,
    /// The current round number has no definition in the config.
    RoundNotConfigured(u32),
    InvalidTeamName(String),
    DuplicateTeam(String),
    UnknownTeam(String),
    /// The team already submitted this decision for the round.
    AlreadySubmitted(&'static str),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongPhase { expected, actual } => write!(
                f,
                "action requires phase '{}' but game is in '{}'",
                expected.as_str(),
                actual.as_str()
            ),
            Self::NoTeams => write!(f, "no teams have registered yet"),
            Self::RevealOutOfOrder(what) => write!(f, "cannot reveal {} yet", what),
            Self::AlreadyRevealed(what) => write!(f, "{} already revealed", what),
            Self::RollNotReady => write!(f, "all reveals must happen before the roll"),
            Self::RoundNotConfigured(round) => write!(f, "round {} is not configured", round),
            Self::InvalidTeamName(name) => write!(f, "invalid team name '{}'", name),
            Self::DuplicateTeam(name) => write!(f, "team '{}' already registered", name),
            Self::UnknownTeam(name) => write!(f, "team '{}' not found", name),
            Self::AlreadySubmitted(what) => write!(f, "{} already submitted this round", what),
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_phase_message_names_both_phases() {
        let err = GameError::WrongPhase {
            expected: Phase::Phase2,
            actual: Phase::Results,
        };
        let msg = err.to_string();
        assert!(msg.contains("phase2"));
        assert!(msg.contains("results"));
    }
}
