//! Simulation driver
//!
//! Walks the evaluation boundaries of the horizon in order and feeds each one
//! through scoring, allocation and issuance. A run either completes every
//! period or fails; callers never see a partial series.

use crate::allocation::target_ratios;
use crate::errors::{ConfigError, SimError};
use crate::issuance::{meets_floor, IssuanceReconciler};
use crate::params::SimulationConfig;
use crate::report::SimulationResult;
use crate::roster::Roster;
use crate::scoring::{ContributionScorer, ScoringWindow};
use crate::supply::ShareLedger;
use crate::types::{ContributionUnits, ContributorId, PeriodIndex, PeriodSnapshot, ShareCount, TimeTick};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Boundary ticks for the horizon: every `evaluation_interval` ticks, the last
/// one clipped to the horizon. Each period scores the ticks since the
/// previous boundary.
pub fn evaluation_boundaries(config: &SimulationConfig) -> Vec<TimeTick> {
    (1..=config.boundary_count())
        .map(|k| {
            k.saturating_mul(config.evaluation_interval)
                .min(config.horizon_periods)
        })
        .collect()
}

/// Run one scenario.
///
/// Deterministic: the same roster and config always produce the same
/// snapshots.
pub fn run(roster: &Roster, config: &SimulationConfig) -> Result<SimulationResult, SimError> {
    config.validate()?;
    roster.validate()?;

    let mut driver = SimulationDriver::new(roster, config)?;
    let boundaries = evaluation_boundaries(config);

    info!(
        target: "equity",
        "Simulating {} contributors over {} ticks ({} periods)",
        roster.len(),
        config.horizon_periods,
        boundaries.len()
    );

    let mut snapshots = Vec::with_capacity(boundaries.len());
    let mut previous_boundary = 0;
    for (offset, boundary) in boundaries.into_iter().enumerate() {
        let period = PeriodIndex::try_from(offset + 1).map_err(|_| SimError::Overflow("period index"))?;
        let window = ScoringWindow::new(previous_boundary, boundary);
        snapshots.push(driver.step(period, window)?);
        previous_boundary = boundary;
    }

    if let Some(last) = snapshots.last() {
        info!(
            target: "equity",
            "Simulation complete: {} shares outstanding after period {}",
            last.total_shares_issued, last.period_index
        );
    }

    Ok(SimulationResult::new(roster, config.clone(), snapshots))
}

/// Run several configurations against the same roster in parallel.
///
/// Runs share nothing; results come back in the order of `configs`.
pub fn sweep(roster: &Roster, configs: &[SimulationConfig]) -> Vec<Result<SimulationResult, SimError>> {
    configs.par_iter().map(|config| run(roster, config)).collect()
}

struct SimulationDriver<'a> {
    roster: &'a Roster,
    config: &'a SimulationConfig,
    anchor_id: ContributorId,
    scorer: ContributionScorer,
    reconciler: IssuanceReconciler,
    ledger: ShareLedger,
}

impl<'a> SimulationDriver<'a> {
    fn new(roster: &'a Roster, config: &'a SimulationConfig) -> Result<Self, SimError> {
        let anchor = roster.anchor().ok_or(ConfigError::EmptyRoster)?;
        Ok(Self {
            roster,
            config,
            anchor_id: anchor.id.clone(),
            scorer: ContributionScorer::from_config(config),
            reconciler: IssuanceReconciler::from_config(config),
            ledger: ShareLedger::genesis(&anchor.id, config.initial_supply, roster.ids()),
        })
    }

    fn step(&mut self, period: PeriodIndex, window: ScoringWindow) -> Result<PeriodSnapshot, SimError> {
        let boundary = window.end;
        let (scores, total_contribution) =
            self.scorer
                .score_roster(self.roster, window, self.config.anchor_in_pool);

        if total_contribution == 0 {
            warn!(
                target: "equity",
                "Period {} ({}..{}): no contribution, anchor keeps the pool",
                period, window.start, window.end
            );
        }

        let ratios = target_ratios(
            &scores,
            total_contribution,
            &self.anchor_id,
            self.config.anchor_floor_ratio,
        );
        let outcome = self.reconciler.reconcile(
            period,
            &self.ledger,
            &self.anchor_id,
            &ratios,
            total_contribution,
        )?;

        let previous_total = self.ledger.total_supply();
        let issued = self.ledger.record_issuance(period, &outcome.new_shares)?;
        self.check_period(period, previous_total, issued, total_contribution)?;

        debug!(
            target: "equity",
            "Period {} closed at tick {}: contribution {}, issued {}, supply {}",
            period,
            boundary,
            total_contribution,
            issued,
            self.ledger.total_supply()
        );

        Ok(PeriodSnapshot {
            period_index: period,
            boundary,
            contribution_scores: scores,
            total_contribution,
            target_ratios: ratios,
            new_shares: outcome.new_shares,
            cumulative_shares: self.ledger.holdings().clone(),
            new_shares_issued: issued,
            total_shares_issued: self.ledger.total_supply(),
        })
    }

    fn check_period(
        &self,
        period: PeriodIndex,
        previous_total: ShareCount,
        issued: ShareCount,
        total_contribution: ContributionUnits,
    ) -> Result<(), SimError> {
        self.ledger.verify_conservation(period)?;

        if previous_total.checked_add(issued) != Some(self.ledger.total_supply()) {
            return Err(SimError::InvariantViolation {
                period,
                detail: "total supply does not equal previous supply plus issuance".into(),
            });
        }

        let floor = self.config.anchor_floor_ratio;
        if total_contribution > 0
            && !meets_floor(
                self.ledger.shares_of(&self.anchor_id),
                self.ledger.total_supply(),
                floor,
            )
        {
            return Err(SimError::InvariantViolation {
                period,
                detail: format!("anchor ownership fell below floor {floor}"),
            });
        }

        Ok(())
    }
}
