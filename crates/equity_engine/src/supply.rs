//! Share supply tracking
//!
//! Holds cumulative holdings per contributor and the authoritative total
//! supply. Supply only ever grows, and only through recorded issuance.

use crate::errors::SimError;
use crate::types::{ContributorId, Holdings, PeriodIndex, ShareCount};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLedger {
    holdings: Holdings,
    total_supply: ShareCount,
    last_period: PeriodIndex,
}

impl ShareLedger {
    /// Ledger where the anchor holds the whole initial supply and every
    /// other contributor holds nothing.
    pub fn genesis<'a>(
        anchor: &ContributorId,
        initial_supply: ShareCount,
        others: impl IntoIterator<Item = &'a ContributorId>,
    ) -> Self {
        let mut holdings: Holdings = others.into_iter().map(|id| (id.clone(), 0)).collect();
        holdings.insert(anchor.clone(), initial_supply);
        Self {
            holdings,
            total_supply: initial_supply,
            last_period: 0,
        }
    }

    pub fn holdings(&self) -> &Holdings {
        &self.holdings
    }

    pub fn shares_of(&self, id: &ContributorId) -> ShareCount {
        self.holdings.get(id).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> ShareCount {
        self.total_supply
    }

    /// Add a period's new shares. Periods must be recorded in increasing order.
    /// Returns the number of shares issued.
    pub fn record_issuance(
        &mut self,
        period: PeriodIndex,
        new_shares: &Holdings,
    ) -> Result<ShareCount, SimError> {
        if period <= self.last_period {
            return Err(SimError::InvariantViolation {
                period,
                detail: format!(
                    "issuance recorded out of order after period {}",
                    self.last_period
                ),
            });
        }

        let mut issued: ShareCount = 0;
        for (id, amount) in new_shares {
            let held = self.holdings.entry(id.clone()).or_insert(0);
            *held = held
                .checked_add(*amount)
                .ok_or(SimError::Overflow("contributor holdings"))?;
            issued = issued
                .checked_add(*amount)
                .ok_or(SimError::Overflow("period issuance"))?;
        }

        self.total_supply = self
            .total_supply
            .checked_add(issued)
            .ok_or(SimError::Overflow("total supply"))?;
        self.last_period = period;

        debug!(
            target: "equity",
            "Period {}: issued {} shares, total supply {}",
            period, issued, self.total_supply
        );
        Ok(issued)
    }

    /// Σ holdings must equal the tracked total supply
    pub fn verify_conservation(&self, period: PeriodIndex) -> Result<(), SimError> {
        let held: u128 = self.holdings.values().map(|v| u128::from(*v)).sum();
        if held != u128::from(self.total_supply) {
            return Err(SimError::InvariantViolation {
                period,
                detail: format!(
                    "holdings sum {} differs from total supply {}",
                    held, self.total_supply
                ),
            });
        }
        Ok(())
    }
}
