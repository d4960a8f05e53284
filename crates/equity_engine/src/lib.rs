//! Contribution-weighted equity issuance
//!
//! Deterministic per-period share issuance for a roster of contributors:
//! tenure-based contribution scoring, a protected ownership floor for the
//! anchor contributor, and no-clawback reconciliation of ratios into whole
//! shares.
//!
//! A run is a pure computation over an in-memory roster; see
//! [`simulation::run`].

pub mod allocation;
pub mod audit;
pub mod errors;
pub mod issuance;
pub mod params;
pub mod report;
pub mod roster;
pub mod scoring;
pub mod simulation;
pub mod supply;
pub mod types;

pub use allocation::*;
pub use audit::*;
pub use errors::*;
pub use issuance::*;
pub use params::*;
pub use report::*;
pub use roster::*;
pub use scoring::*;
pub use simulation::*;
pub use supply::*;
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::audit::{audit_result, AuditReport};
    pub use crate::errors::{ConfigError, RosterError, SimError};
    pub use crate::params::{RoundingMode, SimulationConfig};
    pub use crate::report::{ChartPoint, ContributorPoint, ShareTableRow, SimulationResult};
    pub use crate::roster::Roster;
    pub use crate::simulation::{evaluation_boundaries, run, sweep};
    pub use crate::types::{Contributor, ContributorId, PeriodSnapshot, ShareCount, TimeTick};
}

/// Module version for API introspection
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
