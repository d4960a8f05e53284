//! Issuance reconciliation
//!
//! Converts target ratios into whole new shares for one period without
//! ever reducing an existing holding:
//!
//! 1. plan a total supply at which the anchor's current holding matches
//!    its target ratio (`anchor_shares / anchor_ratio`)
//! 2. raise the plan to `previous_total + minimum_issuance` whenever anyone
//!    contributed this period
//! 3. `target = rounding(ratio × planned_total)` per contributor
//! 4. `new = max(0, target − held)`; surpluses are absorbed, not clawed back
//! 5. top the anchor up if absorbed surpluses pushed it under its floor
//! 6. the real total is `previous_total + Σ new`; the plan is only an input
//!
//! The holding of a contributor whose ratio shrank stays above target until
//! later issuance dilutes it. Nothing forces convergence.

use crate::errors::SimError;
use crate::params::{RoundingMode, SimulationConfig};
use crate::supply::ShareLedger;
use crate::types::{ContributionUnits, ContributorId, Holdings, PeriodIndex, ShareCount, TargetRatios};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of reconciling one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceOutcome {
    /// Supply the targets were computed against
    pub planned_total: ShareCount,
    /// Whole-share target per contributor
    pub target_shares: Holdings,
    /// Shares to add per contributor, never negative
    pub new_shares: Holdings,
    /// Extra anchor shares needed to restore the floor
    pub floor_top_up: ShareCount,
    /// Σ new_shares
    pub issued: ShareCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceReconciler {
    anchor_floor_ratio: Decimal,
    minimum_issuance: ShareCount,
    rounding: RoundingMode,
}

impl IssuanceReconciler {
    pub fn new(anchor_floor_ratio: Decimal, minimum_issuance: ShareCount, rounding: RoundingMode) -> Self {
        Self {
            anchor_floor_ratio,
            minimum_issuance,
            rounding,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.anchor_floor_ratio,
            config.minimum_issuance_per_round,
            config.rounding_mode,
        )
    }

    /// Plan this period's issuance against the current ledger.
    /// The ledger itself is not touched.
    pub fn reconcile(
        &self,
        period: PeriodIndex,
        ledger: &ShareLedger,
        anchor_id: &ContributorId,
        ratios: &TargetRatios,
        total_contribution: ContributionUnits,
    ) -> Result<IssuanceOutcome, SimError> {
        let previous_total = ledger.total_supply();
        let anchor_held = ledger.shares_of(anchor_id);
        let anchor_ratio = ratios.get(anchor_id).copied().unwrap_or(Decimal::ZERO);

        let candidate = self.candidate_total(anchor_held, anchor_ratio, previous_total)?;
        let planned_total = if total_contribution > 0 {
            let floor = previous_total
                .checked_add(self.minimum_issuance)
                .ok_or(SimError::Overflow("minimum issuance floor"))?;
            candidate.max(floor)
        } else {
            candidate
        };

        let planned = Decimal::from(planned_total);
        let mut target_shares = Holdings::new();
        let mut new_shares = Holdings::new();

        for (id, ratio) in ratios {
            let exact = ratio
                .checked_mul(planned)
                .ok_or(SimError::Overflow("target share computation"))?;
            let target = self
                .rounding
                .to_shares(exact)
                .ok_or_else(|| SimError::InvariantViolation {
                    period,
                    detail: format!("target shares for {id} are not representable: {exact}"),
                })?;
            let held = ledger.shares_of(id);

            target_shares.insert(id.clone(), target);
            new_shares.insert(id.clone(), target.saturating_sub(held));
        }

        let mut issued = sum_shares(&new_shares)?;
        let after_total = previous_total
            .checked_add(issued)
            .ok_or(SimError::Overflow("total supply"))?;
        let anchor_after = anchor_held
            .checked_add(new_shares.get(anchor_id).copied().unwrap_or(0))
            .ok_or(SimError::Overflow("anchor holdings"))?;

        let floor_top_up = self.floor_top_up(anchor_after, after_total)?;
        if floor_top_up > 0 {
            warn!(
                target: "equity",
                "Period {}: anchor at {}/{} is under its floor, issuing {} extra shares",
                period, anchor_after, after_total, floor_top_up
            );
            let entry = new_shares.entry(anchor_id.clone()).or_insert(0);
            *entry = entry
                .checked_add(floor_top_up)
                .ok_or(SimError::Overflow("anchor floor top-up"))?;
            issued = issued
                .checked_add(floor_top_up)
                .ok_or(SimError::Overflow("period issuance"))?;
        }

        debug!(
            target: "equity",
            "Period {}: candidate {}, planned {}, issuing {}",
            period, candidate, planned_total, issued
        );

        Ok(IssuanceOutcome {
            planned_total,
            target_shares,
            new_shares,
            floor_top_up,
            issued,
        })
    }

    /// Supply at which `anchor_held` equals `anchor_ratio` of the total.
    /// Falls back to the previous total when the anchor targets nothing.
    fn candidate_total(
        &self,
        anchor_held: ShareCount,
        anchor_ratio: Decimal,
        previous_total: ShareCount,
    ) -> Result<ShareCount, SimError> {
        if anchor_ratio <= Decimal::ZERO {
            return Ok(previous_total);
        }
        let exact = Decimal::from(anchor_held)
            .checked_div(anchor_ratio)
            .ok_or(SimError::Overflow("candidate total supply"))?;
        self.rounding
            .to_shares(exact)
            .ok_or(SimError::Overflow("candidate total supply"))
    }

    /// Smallest `x` with `(anchor + x) / (total + x) >= floor`
    fn floor_top_up(&self, anchor: ShareCount, total: ShareCount) -> Result<ShareCount, SimError> {
        let floor = self.anchor_floor_ratio;
        if floor <= Decimal::ZERO || meets_floor(anchor, total, floor) {
            return Ok(0);
        }

        let deficit = floor * Decimal::from(total) - Decimal::from(anchor);
        let needed = deficit
            .checked_div(Decimal::ONE - floor)
            .ok_or(SimError::Overflow("floor top-up"))?
            .ceil();
        let mut top_up = needed.to_u64().ok_or(SimError::Overflow("floor top-up"))?;

        // guard against the last digit of an inexact division
        while !meets_floor(anchor.saturating_add(top_up), total.saturating_add(top_up), floor) {
            top_up = top_up
                .checked_add(1)
                .ok_or(SimError::Overflow("floor top-up"))?;
        }
        Ok(top_up)
    }
}

/// `anchor / total >= floor`, evaluated without division
pub fn meets_floor(anchor: ShareCount, total: ShareCount, floor: Decimal) -> bool {
    Decimal::from(anchor) >= floor * Decimal::from(total)
}

fn sum_shares(shares: &Holdings) -> Result<ShareCount, SimError> {
    shares.values().try_fold(0 as ShareCount, |acc, v| {
        acc.checked_add(*v).ok_or(SimError::Overflow("period issuance"))
    })
}
