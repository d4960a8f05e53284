//! Scenario file loading
//!
//! A scenario is a TOML file with a `[simulation]` table and a
//! `[[contributors]]` array whose first entry is the anchor. The path comes
//! from `--config`, then `EQUITY_SIM_CONFIG`, then `config/scenario.toml`;
//! without any file the built-in founder team is used.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use equity_engine::{Contributor, Roster, RoundingMode, SimulationConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV: &str = "EQUITY_SIM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/scenario.toml";

/// On-disk scenario layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
}

/// Resolved roster and settings for one invocation
#[derive(Debug, Clone)]
pub struct Scenario {
    pub roster: Roster,
    pub config: SimulationConfig,
    /// File the scenario came from, `None` for the built-in sample
    pub source: Option<PathBuf>,
}

impl Scenario {
    pub fn sample() -> Self {
        Self {
            roster: Roster::sample(),
            config: SimulationConfig::default(),
            source: None,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoundingArg {
    Floor,
    Round,
}

impl From<RoundingArg> for RoundingMode {
    fn from(value: RoundingArg) -> Self {
        match value {
            RoundingArg::Floor => RoundingMode::Floor,
            RoundingArg::Round => RoundingMode::Round,
        }
    }
}

/// Command line overrides for individual settings
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Simulation length in ticks
    #[arg(long, global = true)]
    pub horizon: Option<u32>,

    /// Ticks between evaluation boundaries
    #[arg(long, global = true)]
    pub interval: Option<u32>,

    /// Shares the anchor starts with
    #[arg(long, global = true)]
    pub initial_supply: Option<u64>,

    /// Anchor ownership floor, e.g. 0.1
    #[arg(long, global = true)]
    pub floor: Option<Decimal>,

    /// Ticks of tenure before credit starts
    #[arg(long, global = true)]
    pub min_tenure: Option<u32>,

    /// Minimum supply growth per active period
    #[arg(long, global = true)]
    pub min_issuance: Option<u64>,

    /// Rounding applied to share targets
    #[arg(long, value_enum, global = true)]
    pub rounding: Option<RoundingArg>,

    /// Whether the anchor competes for the proportional pool (true or false)
    #[arg(long, global = true, value_name = "BOOL")]
    pub anchor_in_pool: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut SimulationConfig) {
        if let Some(horizon) = self.horizon {
            config.horizon_periods = horizon;
        }
        if let Some(interval) = self.interval {
            config.evaluation_interval = interval;
        }
        if let Some(supply) = self.initial_supply {
            config.initial_supply = supply;
        }
        if let Some(floor) = self.floor {
            config.anchor_floor_ratio = floor;
        }
        if let Some(tenure) = self.min_tenure {
            config.minimum_tenure_for_credit = tenure;
        }
        if let Some(min_issuance) = self.min_issuance {
            config.minimum_issuance_per_round = min_issuance;
        }
        if let Some(rounding) = self.rounding {
            config.rounding_mode = rounding.into();
        }
        if let Some(in_pool) = self.anchor_in_pool {
            config.anchor_in_pool = in_pool;
        }
    }
}

/// Load the scenario for this invocation.
///
/// An explicit path must exist; the environment and default paths fall back
/// to the built-in sample when missing.
pub fn load_scenario(explicit: Option<&Path>) -> Result<Scenario> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("scenario file {} does not exist", path.display());
        }
        return load_scenario_from_file(path);
    }

    let path = env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    if path.exists() {
        load_scenario_from_file(&path)
    } else {
        debug!("No scenario at {}, using the built-in sample", path.display());
        Ok(Scenario::sample())
    }
}

/// Load and check a scenario from a TOML file
pub fn load_scenario_from_file(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario file {}", path.display()))?;
    let mut scenario = parse_scenario(&content)
        .with_context(|| format!("failed to parse scenario file {}", path.display()))?;
    scenario.source = Some(path.to_path_buf());

    info!(
        "Loaded scenario {} with {} contributors",
        path.display(),
        scenario.roster.len()
    );
    Ok(scenario)
}

pub fn parse_scenario(content: &str) -> Result<Scenario> {
    let file: ScenarioFile = toml::from_str(content)?;
    let roster = if file.contributors.is_empty() {
        Roster::sample()
    } else {
        Roster::from_contributors(file.contributors)
    };
    roster.validate()?;

    Ok(Scenario {
        roster,
        config: file.simulation,
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCENARIO: &str = r#"
[simulation]
horizon_periods = 24
initial_supply = 5000
anchor_floor_ratio = "0.2"
rounding_mode = "round"

[[contributors]]
id = "founder"
name = "Founder"
join_period = 0

[[contributors]]
id = "eng-1"
name = "Engineer"
join_period = 4
exit_period = 20
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = parse_scenario(SCENARIO).unwrap();
        assert_eq!(scenario.config.horizon_periods, 24);
        assert_eq!(scenario.config.initial_supply, 5_000);
        assert_eq!(scenario.config.anchor_floor_ratio, Decimal::new(2, 1));
        assert_eq!(scenario.config.rounding_mode, RoundingMode::Round);
        // unspecified fields keep their defaults
        assert_eq!(scenario.config.evaluation_interval, 12);

        assert_eq!(scenario.roster.len(), 2);
        let engineer = &scenario.roster.contributors()[1];
        assert_eq!(engineer.display_name(), "Engineer");
        assert_eq!(engineer.exit_period, Some(20));
    }

    #[test]
    fn test_invalid_roster_is_rejected() {
        let content = r#"
[[contributors]]
id = "founder"
join_period = 3
"#;
        assert!(parse_scenario(content).is_err());
    }

    #[test]
    fn test_empty_file_uses_sample_roster() {
        let scenario = parse_scenario("").unwrap();
        assert_eq!(scenario.roster, Roster::sample());
        assert_eq!(scenario.config, SimulationConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCENARIO.as_bytes()).unwrap();

        let scenario = load_scenario(Some(file.path())).unwrap();
        assert_eq!(scenario.source.as_deref(), Some(file.path()));
        assert_eq!(scenario.roster.len(), 2);
    }

    #[test]
    fn test_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(load_scenario(Some(&missing)).is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = SimulationConfig::default();
        let overrides = ConfigOverrides {
            horizon: Some(60),
            floor: Some(Decimal::new(25, 2)),
            rounding: Some(RoundingArg::Round),
            anchor_in_pool: Some(true),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.horizon_periods, 60);
        assert_eq!(config.anchor_floor_ratio, Decimal::new(25, 2));
        assert_eq!(config.rounding_mode, RoundingMode::Round);
        assert!(config.anchor_in_pool);
        assert_eq!(config.initial_supply, 10_000);
    }

    #[test]
    fn test_overrides_can_disable_anchor_in_pool() {
        let content = r#"
[simulation]
anchor_in_pool = true
"#;
        let mut scenario = parse_scenario(content).unwrap();
        assert!(scenario.config.anchor_in_pool);

        ConfigOverrides::default().apply(&mut scenario.config);
        assert!(scenario.config.anchor_in_pool);

        let overrides = ConfigOverrides {
            anchor_in_pool: Some(false),
            ..Default::default()
        };
        overrides.apply(&mut scenario.config);
        assert!(!scenario.config.anchor_in_pool);
    }

    #[test]
    fn test_anchor_in_pool_flag_takes_a_value() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            overrides: ConfigOverrides,
        }

        let parsed = Harness::try_parse_from(["equity-sim", "--anchor-in-pool", "false"]).unwrap();
        assert_eq!(parsed.overrides.anchor_in_pool, Some(false));

        let parsed = Harness::try_parse_from(["equity-sim"]).unwrap();
        assert_eq!(parsed.overrides.anchor_in_pool, None);
    }
}
