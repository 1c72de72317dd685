//! Round settlement: shared trial outcome and per-team profit.
//!
//! One roll in `[ROLL_MIN, ROLL_MAX]` is drawn per round. The trial
//! succeeds when the roll is at or below the mean of the round's full
//! consultant list, and that single outcome applies to every team.
//! Per team:
//!
//! ```text
//! expenses     = hired * consultant_cost + (invested ? investment_amount : 0)
//! round_profit = -expenses + (invested && success ? profit : 0)
//! ```

use crate::config::RoundDefinition;
use crate::team::{RoundHistoryEntry, TeamRecord};

pub const ROLL_MIN: u8 = 1;
pub const ROLL_MAX: u8 = 100;

/// Mean of the consultant probabilities. An empty list averages to 0,
/// which makes every roll a failure.
pub fn average_probability(probabilities: &[u8]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    let sum: u32 = probabilities.iter().map(|&p| p as u32).sum();
    sum as f64 / probabilities.len() as f64
}

/// Trial succeeds iff roll ≤ average.
pub fn is_success(roll: u8, average: f64) -> bool {
    (roll as f64) <= average
}

/// Bring an externally supplied roll into `[ROLL_MIN, ROLL_MAX]`.
pub fn clamp_roll(roll: u8) -> u8 {
    roll.clamp(ROLL_MIN, ROLL_MAX)
}

/// Expenses for a set of decisions, or `None` on overflow.
pub fn checked_expenses(hired: u32, invested: bool, round: &RoundDefinition) -> Option<i64> {
    let consultants = (hired as i64).checked_mul(round.consultant_cost)?;
    let investment = if invested { round.investment_amount } else { 0 };
    consultants.checked_add(investment)
}

/// Expenses shown while decisions accrue. Saturates instead of failing.
pub fn accrued_expenses(hired: u32, invested: bool, round: &RoundDefinition) -> i64 {
    let consultants = (hired as i64).saturating_mul(round.consultant_cost);
    let investment = if invested { round.investment_amount } else { 0 };
    consultants.saturating_add(investment)
}

/// Decisions and balance a team brings into settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementInput {
    pub consultants_hired: u32,
    /// Undecided is settled as not invested.
    pub invested: Option<bool>,
    pub total_money: i64,
}

/// Settled figures for one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamSettlement {
    /// Pre-outcome expenses, negative.
    pub initial_expenses: i64,
    pub round_profit: i64,
    pub total_after_round: i64,
}

/// Settle one team. Returns `None` when the arithmetic overflows; the
/// caller skips the team and leaves its total as it was.
pub fn settle_team(
    input: SettlementInput,
    round: &RoundDefinition,
    success: bool,
) -> Option<TeamSettlement> {
    let invested = input.invested.unwrap_or(false);
    let hired = input.consultants_hired.min(round.max_consultants());
    let expenses = checked_expenses(hired, invested, round)?;
    let initial_expenses = expenses.checked_neg()?;
    let payout = if invested && success { round.profit } else { 0 };
    let round_profit = initial_expenses.checked_add(payout)?;
    let total_after_round = input.total_money.checked_add(round_profit)?;
    Some(TeamSettlement {
        initial_expenses,
        round_profit,
        total_after_round,
    })
}

/// Outcome of settling a round across all teams.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReport {
    pub round: u32,
    pub roll: u8,
    pub average: f64,
    pub success: bool,
    pub settled: Vec<String>,
    /// Teams whose settlement was invalid and left untouched.
    pub skipped: Vec<String>,
}

impl TeamRecord {
    pub fn settlement_input(&self) -> SettlementInput {
        SettlementInput {
            consultants_hired: self.current_round.consultants_hired,
            invested: self.current_round.invested,
            total_money: self.total_money,
        }
    }

    /// Write a settlement into the record and its history.
    pub fn apply_settlement(
        &mut self,
        round_number: u32,
        round: &RoundDefinition,
        settlement: &TeamSettlement,
    ) {
        self.total_money = settlement.total_after_round;
        self.current_round.round_profit = settlement.round_profit;
        self.round_history.insert(
            round_number,
            RoundHistoryEntry {
                round: round_number,
                drug_name: round.drug_name.clone(),
                consultants_hired: self.current_round.consultants_hired,
                invested: self.current_round.invested,
                initial_expenses: settlement.initial_expenses,
                round_profit: settlement.round_profit,
                total_after_round: settlement.total_after_round,
            },
        );
    }
}

/// Settle every team against one roll. All settlements are computed
/// before any team is written, so a round is applied as one batch.
pub fn settle_round<'a>(
    teams: impl IntoIterator<Item = &'a mut TeamRecord>,
    round_number: u32,
    round: &RoundDefinition,
    roll: u8,
) -> RoundReport {
    let roll = clamp_roll(roll);
    let average = average_probability(&round.consultants);
    let success = is_success(roll, average);

    let mut pending = Vec::new();
    let mut skipped = Vec::new();
    for team in teams {
        match settle_team(team.settlement_input(), round, success) {
            Some(settlement) => pending.push((team, settlement)),
            None => skipped.push(team.team_name.clone()),
        }
    }

    let mut settled = Vec::with_capacity(pending.len());
    for (team, settlement) in pending {
        team.apply_settlement(round_number, round, &settlement);
        settled.push(team.team_name.clone());
    }

    RoundReport {
        round: round_number,
        roll,
        average,
        success,
        settled,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round() -> RoundDefinition {
        RoundDefinition {
            drug_name: "GLP-X01".into(),
            drug_description: String::new(),
            consultants: vec![20, 30, 40, 50, 60],
            consultant_comments: Vec::new(),
            profit: 100_000_000,
            consultant_cost: 2_000_000,
            investment_amount: 25_000_000,
        }
    }

    fn input(hired: u32, invested: Option<bool>) -> SettlementInput {
        SettlementInput {
            consultants_hired: hired,
            invested,
            total_money: 0,
        }
    }

    #[test]
    fn test_average_probability() {
        assert!((average_probability(&[20, 30, 40, 50, 60]) - 40.0).abs() < 1e-9);
        assert!((average_probability(&[10, 95, 95, 95, 95]) - 78.0).abs() < 1e-9);
        assert!((average_probability(&[90, 80, 10, 20, 10]) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_of_empty_list_is_zero() {
        assert_eq!(average_probability(&[]), 0.0);
        assert!(!is_success(ROLL_MIN, 0.0));
    }

    #[test]
    fn test_success_boundary_inclusive() {
        assert!(is_success(40, 40.0));
        assert!(!is_success(41, 40.0));
        assert!(is_success(1, 1.5));
        assert!(!is_success(2, 1.5));
    }

    #[test]
    fn test_clamp_roll() {
        assert_eq!(clamp_roll(0), 1);
        assert_eq!(clamp_roll(55), 55);
        assert_eq!(clamp_roll(255), 100);
    }

    #[test]
    fn test_reference_example() {
        // hires 3, invests, roll 35 against average 40
        let average = average_probability(&round().consultants);
        let success = is_success(35, average);
        let s = settle_team(input(3, Some(true)), &round(), success).unwrap();
        assert_eq!(s.initial_expenses, -31_000_000);
        assert_eq!(s.round_profit, 69_000_000);
        assert_eq!(s.total_after_round, 69_000_000);
    }

    #[test]
    fn test_not_invested_pays_only_consultants() {
        for success in [true, false] {
            let s = settle_team(input(4, Some(false)), &round(), success).unwrap();
            assert_eq!(s.round_profit, -8_000_000);
        }
    }

    #[test]
    fn test_invested_failure_loses_expenses() {
        let s = settle_team(input(2, Some(true)), &round(), false).unwrap();
        assert_eq!(s.round_profit, -(4_000_000 + 25_000_000));
    }

    #[test]
    fn test_undecided_team_treated_as_not_invested() {
        let s = settle_team(input(0, None), &round(), true).unwrap();
        assert_eq!(s.round_profit, 0);
        assert_eq!(s.initial_expenses, 0);
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut r = round();
        r.profit = i64::MAX;
        let s = settle_team(
            SettlementInput {
                consultants_hired: 0,
                invested: Some(true),
                total_money: i64::MAX,
            },
            &r,
            true,
        );
        assert_eq!(s, None);
    }

    #[test]
    fn test_settle_round_applies_to_all_teams_and_skips_invalid() {
        let mut a = TeamRecord::new("A".into(), 0);
        a.current_round.consultants_hired = 3;
        a.current_round.invested = Some(true);
        let mut b = TeamRecord::new("B".into(), 10);
        b.current_round.consultants_hired = 1;
        b.current_round.invested = Some(false);
        let mut broken = TeamRecord::new("C".into(), i64::MAX);
        broken.current_round.invested = Some(true);

        let mut teams = vec![a, b, broken];
        let report = settle_round(teams.iter_mut(), 1, &round(), 35);

        assert!(report.success);
        assert_eq!(report.settled, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(report.skipped, vec!["C".to_string()]);
        assert_eq!(teams[0].total_money, 69_000_000);
        assert_eq!(teams[1].total_money, 10 - 2_000_000);
        assert_eq!(teams[2].total_money, i64::MAX);
        assert!(teams[2].round_history.is_empty());

        let entry = &teams[0].round_history[&1];
        assert_eq!(entry.drug_name, "GLP-X01");
        assert_eq!(entry.initial_expenses, -31_000_000);
        assert_eq!(entry.total_after_round, 69_000_000);
    }
}
