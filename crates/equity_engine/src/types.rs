//! Core types for the equity issuance engine
//!
//! Defines time units, contributor identifiers, share counts, and the
//! per-period snapshot emitted by the simulation driver.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Simulation clock unit (the default evaluation interval treats one tick as a month)
pub type TimeTick = u32;

/// 1-based index of an evaluation boundary
pub type PeriodIndex = u32;

/// Whole number of equity units
pub type ShareCount = u64;

/// Contribution units credited over one scoring window
pub type ContributionUnits = u64;

/// Stable contributor identifier.
///
/// Independent from the display name: names are user-editable and may
/// collide, ids may not.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorId(pub String);

impl ContributorId {
    /// Create a new ContributorId from string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContributorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A roster entry.
///
/// `exit_period = None` means the contributor is still active at the horizon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub id: ContributorId,
    #[serde(default)]
    pub name: String,
    pub join_period: TimeTick,
    #[serde(default)]
    pub exit_period: Option<TimeTick>,
}

impl Contributor {
    pub fn new(id: impl Into<String>, join_period: TimeTick, exit_period: Option<TimeTick>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id: ContributorId(id),
            join_period,
            exit_period,
        }
    }

    /// Builder-style display name override
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Label used by reports; falls back to the id when no name was given
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    /// Ticks spent active up to `tick` (never negative)
    pub fn tenure_at(&self, tick: TimeTick) -> TimeTick {
        let end = self.exit_period.map_or(tick, |exit| exit.min(tick));
        end.saturating_sub(self.join_period)
    }
}

/// Mapping contributor → contribution units for one window
pub type ContributionScores = BTreeMap<ContributorId, ContributionUnits>;

/// Mapping contributor → target ownership ratio
pub type TargetRatios = BTreeMap<ContributorId, Decimal>;

/// Mapping contributor → share count
pub type Holdings = BTreeMap<ContributorId, ShareCount>;

/// Immutable record of one evaluated boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub period_index: PeriodIndex,
    /// Tick at which this boundary closes
    pub boundary: TimeTick,
    pub contribution_scores: ContributionScores,
    pub total_contribution: ContributionUnits,
    pub target_ratios: TargetRatios,
    pub new_shares: Holdings,
    pub cumulative_shares: Holdings,
    /// Σ new_shares for this period
    pub new_shares_issued: ShareCount,
    /// Authoritative total supply after this period
    pub total_shares_issued: ShareCount,
}

impl PeriodSnapshot {
    /// Ownership fraction of `id` after this period, in [0, 1]
    pub fn ownership_ratio(&self, id: &ContributorId) -> Decimal {
        if self.total_shares_issued == 0 {
            return Decimal::ZERO;
        }
        let held = self.cumulative_shares.get(id).copied().unwrap_or(0);
        Decimal::from(held) / Decimal::from(self.total_shares_issued)
    }

    /// Ownership of `id` after this period as a percentage
    pub fn ownership_percentage(&self, id: &ContributorId) -> Decimal {
        self.ownership_ratio(id) * Decimal::ONE_HUNDRED
    }
}
