//! After-the-fact verification of a finished run
//!
//! Re-derives the ledger properties from the snapshots alone and reports
//! every breach instead of stopping at the first one.

use crate::issuance::meets_floor;
use crate::report::SimulationResult;
use crate::types::ShareCount;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub is_healthy: bool,
    pub issues: Vec<String>,
    pub warnings: Vec<String>,
    pub periods_checked: usize,
    pub total_issued: ShareCount,
}

/// Check no-clawback, supply conservation, holdings consistency, period
/// ordering and the anchor floor across every snapshot, against the
/// settings the run was made with.
pub fn audit_result(result: &SimulationResult) -> AuditReport {
    let config = result.config();
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let Some(anchor) = result.anchor_id() else {
        issues.push("result has no anchor contributor".to_string());
        return AuditReport {
            is_healthy: false,
            issues,
            warnings,
            periods_checked: 0,
            total_issued: 0,
        };
    };

    let mut previous_holdings = result.genesis_holdings();
    let mut previous_total = config.initial_supply;
    let mut previous_index = 0;
    let mut total_issued: ShareCount = 0;

    for snapshot in result.snapshots() {
        let period = snapshot.period_index;

        if period <= previous_index {
            issues.push(format!("period {period} follows period {previous_index}"));
        }

        for (id, &held) in &snapshot.cumulative_shares {
            let before = previous_holdings.get(id).copied().unwrap_or(0);
            let added = snapshot.new_shares.get(id).copied().unwrap_or(0);
            if held < before {
                issues.push(format!("period {period}: {id} dropped from {before} to {held} shares"));
            }
            if before.checked_add(added) != Some(held) {
                issues.push(format!(
                    "period {period}: {id} holds {held}, expected {before} + {added}"
                ));
            }
        }

        let issued: u128 = snapshot.new_shares.values().map(|v| u128::from(*v)).sum();
        if u128::from(snapshot.new_shares_issued) != issued {
            issues.push(format!(
                "period {period}: recorded issuance {} differs from sum {issued}",
                snapshot.new_shares_issued
            ));
        }
        if u128::from(previous_total) + issued != u128::from(snapshot.total_shares_issued) {
            issues.push(format!(
                "period {period}: supply {} is not {previous_total} + {issued}",
                snapshot.total_shares_issued
            ));
        }

        let held: u128 = snapshot.cumulative_shares.values().map(|v| u128::from(*v)).sum();
        if held != u128::from(snapshot.total_shares_issued) {
            issues.push(format!(
                "period {period}: holdings sum {held} differs from supply {}",
                snapshot.total_shares_issued
            ));
        }

        let anchor_held = snapshot.cumulative_shares.get(anchor).copied().unwrap_or(0);
        let floor_met = meets_floor(anchor_held, snapshot.total_shares_issued, config.anchor_floor_ratio);
        if !floor_met {
            if snapshot.total_contribution > 0 {
                issues.push(format!(
                    "period {period}: anchor holds {anchor_held} of {}, below floor {}",
                    snapshot.total_shares_issued, config.anchor_floor_ratio
                ));
            } else {
                warnings.push(format!("period {period}: anchor below floor in an idle period"));
            }
        }

        if snapshot.total_contribution == 0 {
            warnings.push(format!("period {period}: no contribution recorded"));
        }

        total_issued = total_issued.saturating_add(snapshot.new_shares_issued);
        previous_holdings = snapshot.cumulative_shares.clone();
        previous_total = snapshot.total_shares_issued;
        previous_index = period;
    }

    let report = AuditReport {
        is_healthy: issues.is_empty(),
        issues,
        warnings,
        periods_checked: result.snapshots().len(),
        total_issued,
    };

    if report.is_healthy {
        info!(
            target: "equity",
            "Audit passed: {} periods, {} shares issued",
            report.periods_checked, report.total_issued
        );
    } else {
        error!(
            target: "equity",
            "Audit failed with {} issues",
            report.issues.len()
        );
    }

    report
}
