//! Console standings and submission counters.

use crate::phase::{GameState, Phase};
use crate::team::TeamRecord;

/// Teams ordered by valuation, highest first; ties by name.
pub fn standings<'a>(teams: impl IntoIterator<Item = &'a TeamRecord>) -> Vec<&'a TeamRecord> {
    let mut sorted: Vec<&TeamRecord> = teams.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.total_money
            .cmp(&a.total_money)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    sorted
}

/// How many teams have made each decision this round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionCounts {
    pub teams: usize,
    pub consultants_submitted: usize,
    pub investment_decided: usize,
}

pub fn submission_counts<'a>(teams: impl IntoIterator<Item = &'a TeamRecord>) -> SubmissionCounts {
    teams
        .into_iter()
        .fold(SubmissionCounts::default(), |mut counts, team| {
            counts.teams += 1;
            if team.current_round.consultants_submitted {
                counts.consultants_submitted += 1;
            }
            if team.has_decided_investment() {
                counts.investment_decided += 1;
            }
            counts
        })
}

/// Whether a team has made the decision the current phase asks for.
/// Outside the two decision phases there is nothing pending.
pub fn has_decided_this_phase(state: &GameState, team: &TeamRecord) -> bool {
    match state.phase {
        Phase::Phase1 => team.current_round.consultants_submitted,
        Phase::Phase2 => team.has_decided_investment(),
        _ => true,
    }
}
