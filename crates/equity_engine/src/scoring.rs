//! Tenure-based contribution scoring

use crate::params::SimulationConfig;
use crate::roster::Roster;
use crate::types::{ContributionScores, ContributionUnits, Contributor, TimeTick};
use serde::{Deserialize, Serialize};

/// Scoring window `[start, end)` in ticks, from the previous boundary to
/// the current one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWindow {
    pub start: TimeTick,
    pub end: TimeTick,
}

impl ScoringWindow {
    pub fn new(start: TimeTick, end: TimeTick) -> Self {
        Self { start, end }
    }
}

/// Scores contributors by the ticks they were active inside a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContributionScorer {
    minimum_tenure: TimeTick,
}

impl ContributionScorer {
    pub fn new(minimum_tenure: TimeTick) -> Self {
        Self { minimum_tenure }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.minimum_tenure_for_credit)
    }

    /// Units credited to `contributor` for `window`.
    ///
    /// Credit starts once tenure reaches the minimum; the ticks before
    /// that are never paid back.
    pub fn score(&self, contributor: &Contributor, window: ScoringWindow) -> ContributionUnits {
        let credited_before = contributor.tenure_at(window.start).max(self.minimum_tenure);
        ContributionUnits::from(contributor.tenure_at(window.end).saturating_sub(credited_before))
    }

    /// Scores for the whole roster plus their sum.
    ///
    /// When `anchor_in_pool` is false the anchor is listed with a zero score;
    /// its share comes from the floor instead.
    pub fn score_roster(
        &self,
        roster: &Roster,
        window: ScoringWindow,
        anchor_in_pool: bool,
    ) -> (ContributionScores, ContributionUnits) {
        let mut scores = ContributionScores::new();
        let mut total: ContributionUnits = 0;

        for (index, contributor) in roster.contributors().iter().enumerate() {
            let units = if index == 0 && !anchor_in_pool {
                0
            } else {
                self.score(contributor, window)
            };
            total = total.saturating_add(units);
            scores.insert(contributor.id.clone(), units);
        }

        (scores, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContributorId;

    #[test]
    fn test_partial_window_credit() {
        let scorer = ContributionScorer::default();
        let a = Contributor::new("A", 3, None);
        assert_eq!(scorer.score(&a, ScoringWindow::new(0, 12)), 9);
        assert_eq!(scorer.score(&a, ScoringWindow::new(12, 24)), 12);
    }

    #[test]
    fn test_not_yet_joined_scores_zero() {
        let scorer = ContributionScorer::default();
        let d = Contributor::new("D", 24, None);
        assert_eq!(scorer.score(&d, ScoringWindow::new(0, 12)), 0);
        assert_eq!(scorer.score(&d, ScoringWindow::new(12, 24)), 0);
        assert_eq!(scorer.score(&d, ScoringWindow::new(24, 36)), 12);
    }

    #[test]
    fn test_exit_stops_credit() {
        let scorer = ContributionScorer::default();
        let b = Contributor::new("B", 6, Some(18));
        assert_eq!(scorer.score(&b, ScoringWindow::new(0, 12)), 6);
        assert_eq!(scorer.score(&b, ScoringWindow::new(12, 24)), 6);
        assert_eq!(scorer.score(&b, ScoringWindow::new(24, 36)), 0);
    }

    #[test]
    fn test_tenure_gate_without_back_pay() {
        let scorer = ContributionScorer::new(12);
        let a = Contributor::new("A", 6, None);
        // tenure reaches 12 at tick 18
        assert_eq!(scorer.score(&a, ScoringWindow::new(0, 12)), 0);
        assert_eq!(scorer.score(&a, ScoringWindow::new(12, 24)), 6);
        assert_eq!(scorer.score(&a, ScoringWindow::new(24, 36)), 12);
    }

    #[test]
    fn test_tenure_gate_never_crossed() {
        let scorer = ContributionScorer::new(12);
        let short = Contributor::new("S", 2, Some(12));
        for start in [0, 12, 24] {
            assert_eq!(scorer.score(&short, ScoringWindow::new(start, start + 12)), 0);
        }
    }

    #[test]
    fn test_clipped_window_scores_only_new_ticks() {
        let scorer = ContributionScorer::default();
        let leaver = Contributor::new("L", 0, Some(24));
        let stayer = Contributor::new("S", 0, None);
        assert_eq!(scorer.score(&leaver, ScoringWindow::new(24, 30)), 0);
        assert_eq!(scorer.score(&stayer, ScoringWindow::new(24, 30)), 6);
    }

    #[test]
    fn test_windows_partition_tenure() {
        let scorer = ContributionScorer::new(5);
        let c = Contributor::new("C", 3, Some(27));
        let total: ContributionUnits = [(0, 12), (12, 24), (24, 30)]
            .into_iter()
            .map(|(s, e)| scorer.score(&c, ScoringWindow::new(s, e)))
            .sum();
        // 24 ticks of tenure minus the 5-tick gate
        assert_eq!(total, 19);
    }

    #[test]
    fn test_score_roster_excludes_anchor_by_default() {
        let roster = Roster::from_contributors(vec![
            Contributor::new("anchor", 0, None),
            Contributor::new("A", 3, None),
        ]);
        let scorer = ContributionScorer::default();
        let window = ScoringWindow::new(0, 12);

        let (scores, total) = scorer.score_roster(&roster, window, false);
        assert_eq!(scores[&ContributorId::new("anchor")], 0);
        assert_eq!(scores[&ContributorId::new("A")], 9);
        assert_eq!(total, 9);

        let (scores, total) = scorer.score_roster(&roster, window, true);
        assert_eq!(scores[&ContributorId::new("anchor")], 12);
        assert_eq!(total, 21);
    }
}
