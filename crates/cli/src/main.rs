//! Contribution equity simulator command line interface
//!
//! Loads a scenario, runs the issuance engine and prints tables, JSON,
//! audit reports or floor sweeps.

mod config;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{load_scenario, ConfigOverrides, Scenario};
use equity_engine::{audit_result, run, sweep, ContributorId, SimulationConfig};
use rust_decimal::Decimal;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "equity-sim")]
#[command(about = "Contribution-weighted equity issuance simulator", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario file (TOML); falls back to $EQUITY_SIM_CONFIG, then config/scenario.toml
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario and print issuance, holdings and ownership tables
    Run {
        /// Also print the full series for this contributor id
        #[arg(long, value_name = "ID")]
        series: Option<String>,
    },
    /// Run the scenario and write the full result as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Run the scenario and verify the ledger invariants
    Audit,
    /// Run the scenario once per anchor floor, in parallel
    Sweep {
        /// Comma-separated floor ratios, e.g. 0.05,0.1,0.2
        #[arg(long, value_delimiter = ',', required = true)]
        floors: Vec<Decimal>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut scenario = load_scenario(cli.config.as_deref())?;
    cli.overrides.apply(&mut scenario.config);

    match cli.command {
        Commands::Run { series } => handle_run(&scenario, series.as_deref()),
        Commands::Export { output } => handle_export(&scenario, output),
        Commands::Audit => handle_audit(&scenario),
        Commands::Sweep { floors } => handle_sweep(&scenario, &floors),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn handle_run(scenario: &Scenario, series: Option<&str>) -> Result<()> {
    let result = run(&scenario.roster, &scenario.config).context("simulation failed")?;

    println!("{}", render::issuance_table(&result));
    println!("{}", render::cumulative_table(&result));
    println!("{}", render::ownership_table(&result));

    if let Some(id) = series {
        let id = ContributorId::new(id);
        if scenario.roster.get(&id).is_none() {
            bail!("unknown contributor {id}");
        }
        println!("{}", render::contributor_series(&result, &id));
    }

    Ok(())
}

fn handle_export(scenario: &Scenario, output: Option<PathBuf>) -> Result<()> {
    let result = run(&scenario.roster, &scenario.config).context("simulation failed")?;
    let json = result.to_json()?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote {} periods to {}", result.snapshots().len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_audit(scenario: &Scenario) -> Result<()> {
    let result = run(&scenario.roster, &scenario.config).context("simulation failed")?;
    let report = audit_result(&result);
    print!("{}", render::audit_report(&report));

    if !report.is_healthy {
        bail!("audit found {} issues", report.issues.len());
    }
    Ok(())
}

fn handle_sweep(scenario: &Scenario, floors: &[Decimal]) -> Result<()> {
    let configs: Vec<SimulationConfig> = floors
        .iter()
        .map(|floor| SimulationConfig {
            anchor_floor_ratio: *floor,
            ..scenario.config.clone()
        })
        .collect();

    println!(
        "{:<10}{:>14}  final ownership (%)",
        "floor", "supply"
    );
    for (floor, outcome) in floors.iter().zip(sweep(&scenario.roster, &configs)) {
        let result = outcome.with_context(|| format!("simulation with floor {floor} failed"))?;
        let total = result.total_supply();
        let ownership = result
            .last_snapshot()
            .map(|last| {
                result
                    .contributors()
                    .iter()
                    .map(|c| {
                        format!(
                            "{}={}",
                            c.display_name(),
                            last.ownership_percentage(&c.id).round_dp(2)
                        )
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        println!("{floor:<10}{total:>14}  {ownership}");
    }
    Ok(())
}
