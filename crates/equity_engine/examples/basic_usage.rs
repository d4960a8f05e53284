//! Basic usage example for the equity engine
//!
//! Runs the default founder-team scenario and prints the cumulative
//! holdings and ownership after every period.

use equity_engine::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let roster = Roster::sample();
    let config = SimulationConfig::default();

    println!("Equity Engine - Basic Usage Example\n");
    println!("Contributors:");
    for contributor in roster.contributors() {
        let exit = contributor
            .exit_period
            .map_or_else(|| "-".to_string(), |e| e.to_string());
        println!(
            "  {:<8} join {:>3}  exit {:>3}",
            contributor.display_name(),
            contributor.join_period,
            exit
        );
    }
    println!();

    let result = run(&roster, &config)?;

    for snapshot in result.snapshots() {
        println!(
            "Period {} (tick {}): {} new, {} total",
            snapshot.period_index,
            snapshot.boundary,
            snapshot.new_shares_issued,
            snapshot.total_shares_issued
        );
        for contributor in result.contributors() {
            println!(
                "  {:<8} {:>8} shares  {:>6.2}%",
                contributor.display_name(),
                snapshot.cumulative_shares[&contributor.id],
                snapshot.ownership_percentage(&contributor.id)
            );
        }
    }

    let report = audit_result(&result);
    println!("\nAudit healthy: {}", report.is_healthy);
    Ok(())
}
