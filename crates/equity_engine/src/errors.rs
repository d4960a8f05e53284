use crate::types::{ContributorId, TimeTick};
use rust_decimal::Decimal;
use thiserror::Error;

/// Invalid simulation settings. Raised before any period is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("horizon must be at least one tick")]
    ZeroHorizon,

    #[error("initial supply must be positive")]
    ZeroInitialSupply,

    #[error("anchor floor ratio {0} is outside [0, 1)")]
    FloorOutOfRange(Decimal),

    #[error("evaluation interval must be at least one tick")]
    ZeroEvaluationInterval,

    #[error("roster is empty: an anchor contributor is required")]
    EmptyRoster,

    #[error("anchor {id} must join at tick 0, got {join_period}")]
    AnchorJoinNotZero { id: ContributorId, join_period: TimeTick },

    #[error("duplicate contributor id {0}")]
    DuplicateContributor(ContributorId),
}

/// Invalid roster contents or roster edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("contributor {id} exits at {exit_period} before joining at {join_period}")]
    ExitBeforeJoin {
        id: ContributorId,
        join_period: TimeTick,
        exit_period: TimeTick,
    },

    #[error("unknown contributor {0}")]
    UnknownContributor(ContributorId),

    #[error("the anchor contributor {0} cannot be removed")]
    AnchorRemoval(ContributorId),
}

/// Top-level error returned by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("internal invariant violated at period {period}: {detail}")]
    InvariantViolation { period: u32, detail: String },

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),
}
