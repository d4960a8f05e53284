//! Plain-text tables for simulation results

use equity_engine::{
    AuditReport, ContributorId, PeriodIndex, ShareTableRow, SimulationResult, TimeTick,
};
use rust_decimal::Decimal;

/// Ticks per year when ticks are months
const TICKS_PER_YEAR: TimeTick = 12;

/// "2y", "1y 6m", "7m"
pub fn format_ticks(ticks: TimeTick) -> String {
    let years = ticks / TICKS_PER_YEAR;
    let months = ticks % TICKS_PER_YEAR;
    match (years, months) {
        (0, m) => format!("{m}m"),
        (y, 0) => format!("{y}y"),
        (y, m) => format!("{y}y {m}m"),
    }
}

fn header(result: &SimulationResult, first: &str, last: &str) -> String {
    let mut line = format!("{first:<10}{:>10}", "tick");
    for contributor in result.contributors() {
        line.push_str(&format!("{:>12}", contributor.display_name()));
    }
    line.push_str(&format!("{last:>14}"));
    line
}

fn period_cell(period_index: PeriodIndex, boundary: TimeTick) -> String {
    format!("{:<10}{:>10}", period_index, format_ticks(boundary))
}

fn share_table(result: &SimulationResult, title: &str, total_label: &str, rows: &[ShareTableRow]) -> String {
    let head = header(result, "period", total_label);
    let mut out = format!("{title}\n{head}\n{}\n", "-".repeat(head.len()));

    for row in rows {
        out.push_str(&period_cell(row.period_index, row.boundary));
        for contributor in result.contributors() {
            let shares = row.shares.get(&contributor.id).copied().unwrap_or(0);
            out.push_str(&format!("{shares:>12}"));
        }
        out.push_str(&format!("{:>14}\n", row.total));
    }
    out
}

pub fn issuance_table(result: &SimulationResult) -> String {
    share_table(result, "New shares per period", "issued", &result.issuance_table())
}

pub fn cumulative_table(result: &SimulationResult) -> String {
    share_table(result, "Cumulative shares", "supply", &result.cumulative_table())
}

pub fn ownership_table(result: &SimulationResult) -> String {
    let head = header(result, "period", "");
    let head = head.trim_end();
    let mut out = format!("Ownership (%)\n{head}\n{}\n", "-".repeat(head.len()));

    for (point, snapshot) in result.chart_series().iter().zip(result.snapshots()) {
        out.push_str(&period_cell(point.period_index, snapshot.boundary));
        for contributor in result.contributors() {
            let pct = point
                .ownership
                .get(&contributor.id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            out.push_str(&format!("{:>12}", pct.round_dp(2)));
        }
        out.push('\n');
    }
    out
}

pub fn contributor_series(result: &SimulationResult, id: &ContributorId) -> String {
    let mut out = format!(
        "Series for {id}\n{:<10}{:>10}{:>10}{:>12}{:>12}{:>14}{:>12}\n",
        "period", "tick", "score", "ratio", "new", "cumulative", "own %"
    );
    for point in result.contributor_series(id) {
        out.push_str(&format!(
            "{}{:>10}{:>12}{:>12}{:>14}{:>12}\n",
            period_cell(point.period_index, point.boundary),
            point.contribution_score,
            point.target_ratio.round_dp(4),
            point.new_shares,
            point.cumulative_shares,
            point.ownership_percentage.round_dp(2)
        ));
    }
    out
}

pub fn audit_report(report: &AuditReport) -> String {
    let status = if report.is_healthy { "healthy" } else { "FAILED" };
    let mut out = format!(
        "Audit {status}: {} periods checked, {} shares issued\n",
        report.periods_checked, report.total_issued
    );
    for issue in &report.issues {
        out.push_str(&format!("  issue:   {issue}\n"));
    }
    for warning in &report.warnings {
        out.push_str(&format!("  warning: {warning}\n"));
    }
    out
}
