//! Read-only views over a finished run
//!
//! Everything here is derived from the period snapshots; the presentation
//! layer formats and renders these rows.

use crate::params::SimulationConfig;
use crate::roster::Roster;
use crate::types::{
    ContributionUnits, Contributor, ContributorId, Holdings, PeriodIndex, PeriodSnapshot,
    ShareCount, TimeTick,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contributor at one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorPoint {
    pub period_index: PeriodIndex,
    pub boundary: TimeTick,
    pub contribution_score: ContributionUnits,
    pub target_ratio: Decimal,
    pub new_shares: ShareCount,
    pub cumulative_shares: ShareCount,
    pub ownership_percentage: Decimal,
}

/// Table row: a per-contributor share column plus a total.
/// Used for both the per-period issuance table and the cumulative table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTableRow {
    pub period_index: PeriodIndex,
    pub boundary: TimeTick,
    pub total: ShareCount,
    pub shares: Holdings,
}

/// Chart-ready ownership percentages for one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub period_index: PeriodIndex,
    pub ownership: BTreeMap<ContributorId, Decimal>,
}

/// Full output of a run. Owned by the caller and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    config: SimulationConfig,
    contributors: Vec<Contributor>,
    snapshots: Vec<PeriodSnapshot>,
}

impl SimulationResult {
    pub(crate) fn new(roster: &Roster, config: SimulationConfig, snapshots: Vec<PeriodSnapshot>) -> Self {
        Self {
            config,
            contributors: roster.contributors().to_vec(),
            snapshots,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Roster in input order; the first entry is the anchor
    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn anchor_id(&self) -> Option<&ContributorId> {
        self.contributors.first().map(|c| &c.id)
    }

    pub fn snapshots(&self) -> &[PeriodSnapshot] {
        &self.snapshots
    }

    pub fn last_snapshot(&self) -> Option<&PeriodSnapshot> {
        self.snapshots.last()
    }

    /// Time series for one contributor; empty if the id is unknown
    pub fn contributor_series(&self, id: &ContributorId) -> Vec<ContributorPoint> {
        if !self.contributors.iter().any(|c| &c.id == id) {
            return Vec::new();
        }

        self.snapshots
            .iter()
            .map(|s| ContributorPoint {
                period_index: s.period_index,
                boundary: s.boundary,
                contribution_score: s.contribution_scores.get(id).copied().unwrap_or(0),
                target_ratio: s.target_ratios.get(id).copied().unwrap_or(Decimal::ZERO),
                new_shares: s.new_shares.get(id).copied().unwrap_or(0),
                cumulative_shares: s.cumulative_shares.get(id).copied().unwrap_or(0),
                ownership_percentage: s.ownership_percentage(id),
            })
            .collect()
    }

    /// Shares issued per period, in total and per contributor
    pub fn issuance_table(&self) -> Vec<ShareTableRow> {
        self.snapshots
            .iter()
            .map(|s| ShareTableRow {
                period_index: s.period_index,
                boundary: s.boundary,
                total: s.new_shares_issued,
                shares: s.new_shares.clone(),
            })
            .collect()
    }

    /// Holdings after each period, with the total supply
    pub fn cumulative_table(&self) -> Vec<ShareTableRow> {
        self.snapshots
            .iter()
            .map(|s| ShareTableRow {
                period_index: s.period_index,
                boundary: s.boundary,
                total: s.total_shares_issued,
                shares: s.cumulative_shares.clone(),
            })
            .collect()
    }

    /// Period → {contributor: ownership %}
    pub fn chart_series(&self) -> Vec<ChartPoint> {
        self.snapshots
            .iter()
            .map(|s| ChartPoint {
                period_index: s.period_index,
                ownership: self
                    .contributors
                    .iter()
                    .map(|c| (c.id.clone(), s.ownership_percentage(&c.id)))
                    .collect(),
            })
            .collect()
    }

    /// Holdings before the first period: the anchor owns the initial supply
    pub fn genesis_holdings(&self) -> Holdings {
        self.contributors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), if i == 0 { self.config.initial_supply } else { 0 }))
            .collect()
    }

    /// Holdings after the last period, or the genesis split if the run had none
    pub fn final_holdings(&self) -> Holdings {
        match self.snapshots.last() {
            Some(last) => last.cumulative_shares.clone(),
            None => self.genesis_holdings(),
        }
    }

    pub fn total_supply(&self) -> ShareCount {
        self.snapshots
            .last()
            .map_or(self.config.initial_supply, |s| s.total_shares_issued)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::run;

    fn sample_result() -> SimulationResult {
        run(&Roster::sample(), &SimulationConfig::default()).unwrap()
    }

    #[test]
    fn test_series_lengths_match_periods() {
        let result = sample_result();
        assert_eq!(result.snapshots().len(), 3);
        assert_eq!(result.issuance_table().len(), 3);
        assert_eq!(result.cumulative_table().len(), 3);
        assert_eq!(result.chart_series().len(), 3);
        for contributor in result.contributors() {
            assert_eq!(result.contributor_series(&contributor.id).len(), 3);
        }
    }

    #[test]
    fn test_unknown_contributor_has_empty_series() {
        let result = sample_result();
        assert!(result.contributor_series(&ContributorId::new("nobody")).is_empty());
    }

    #[test]
    fn test_chart_percentages_sum_to_hundred() {
        let result = sample_result();
        for point in result.chart_series() {
            let sum: Decimal = point.ownership.values().copied().sum();
            let diff = (sum - Decimal::ONE_HUNDRED).abs();
            assert!(diff < Decimal::new(1, 18), "period {} sums to {sum}", point.period_index);
        }
    }

    #[test]
    fn test_tables_agree_with_snapshots() {
        let result = sample_result();
        let cumulative = result.cumulative_table();
        let issuance = result.issuance_table();
        let mut previous = result.config().initial_supply;
        for (cum, iss) in cumulative.iter().zip(&issuance) {
            assert_eq!(cum.total, previous + iss.total);
            previous = cum.total;
        }
        assert_eq!(result.total_supply(), previous);
        assert_eq!(result.final_holdings(), cumulative.last().unwrap().shares);
    }

    #[test]
    fn test_json_export_round_trips() {
        let result = sample_result();
        let json = result.to_json().unwrap();
        let parsed: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
