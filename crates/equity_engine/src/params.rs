use crate::errors::ConfigError;
use crate::types::{ShareCount, TimeTick};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How fractional share targets are turned into whole units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Truncate toward zero
    #[default]
    Floor,
    /// Round half away from zero
    Round,
}

impl RoundingMode {
    /// Apply the mode to a non-negative decimal and convert it to a share count.
    /// Returns `None` if the value is negative or does not fit.
    pub fn to_shares(self, value: Decimal) -> Option<ShareCount> {
        let rounded = match self {
            RoundingMode::Floor => value.floor(),
            RoundingMode::Round => value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        };
        if rounded.is_sign_negative() && !rounded.is_zero() {
            return None;
        }
        rounded.to_u64()
    }
}

/// Per-run simulation settings.
///
/// One immutable value per run; every policy variant (plain proportional
/// split, tenure gating, minimum per-round dilution) is expressed through
/// these fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of the simulation in ticks
    pub horizon_periods: TimeTick,
    /// Shares held by the anchor before the first boundary
    pub initial_supply: ShareCount,
    /// Minimum ownership fraction protected for the anchor, in [0, 1)
    pub anchor_floor_ratio: Decimal,
    /// Ticks of tenure before a contributor starts earning credit
    pub minimum_tenure_for_credit: TimeTick,
    /// Minimum supply growth for any period with positive contribution
    pub minimum_issuance_per_round: ShareCount,
    pub rounding_mode: RoundingMode,
    /// Ticks between evaluation boundaries (12 = yearly when ticks are months)
    pub evaluation_interval: TimeTick,
    /// Whether the anchor also competes for the proportional remainder
    pub anchor_in_pool: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_periods: 36,
            initial_supply: 10_000,
            // 10% protected founder stake
            anchor_floor_ratio: Decimal::new(1, 1),
            minimum_tenure_for_credit: 0,
            minimum_issuance_per_round: 0,
            rounding_mode: RoundingMode::Floor,
            evaluation_interval: 12,
            anchor_in_pool: false,
        }
    }
}

impl SimulationConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_periods == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.initial_supply == 0 {
            return Err(ConfigError::ZeroInitialSupply);
        }
        if self.anchor_floor_ratio < Decimal::ZERO || self.anchor_floor_ratio >= Decimal::ONE {
            return Err(ConfigError::FloorOutOfRange(self.anchor_floor_ratio));
        }
        if self.evaluation_interval == 0 {
            return Err(ConfigError::ZeroEvaluationInterval);
        }
        Ok(())
    }

    /// Number of evaluation boundaries in the horizon (last one clipped)
    pub fn boundary_count(&self) -> u32 {
        if self.evaluation_interval == 0 {
            return 0;
        }
        self.horizon_periods.div_ceil(self.evaluation_interval)
    }
}
