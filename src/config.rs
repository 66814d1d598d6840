// ⚙️ Dashboard Configuration - JSON file with a fallback chain

use crate::alerts::{AlertProfile, AlertRuleSet};
use crate::dashboard::{DEFAULT_RECENT_LIMIT, DEFAULT_UPCOMING_LIMIT};
use crate::finance::DEFAULT_TREND_MONTHS;
use crate::forecast::DEFAULT_FORECAST_DAYS;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "FARM_DASHBOARD_CONFIG";
pub const DATA_ENV: &str = "FARM_DASHBOARD_DATA";
pub const LOCAL_CONFIG_FILE: &str = "farm-dashboard.json";

/// Ten years of monthly buckets
pub const MAX_TREND_MONTHS: usize = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Snapshot file the store is loaded from
    pub data_path: PathBuf,

    pub upcoming_task_limit: usize,

    pub recent_crop_limit: usize,

    pub trend_months: usize,

    /// Outlook length after the current day
    pub forecast_days: usize,

    /// Rule selection used by the weather view
    pub alert_profile: AlertProfile,

    /// Replaces the built-in alert rule table
    pub alert_rules_path: Option<PathBuf>,

    pub bind_addr: String,

    pub json_logs: bool,

    /// Where this config came from; `None` for defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("data/farm-data.json"),
            upcoming_task_limit: DEFAULT_UPCOMING_LIMIT,
            recent_crop_limit: DEFAULT_RECENT_LIMIT,
            trend_months: DEFAULT_TREND_MONTHS,
            forecast_days: DEFAULT_FORECAST_DAYS,
            alert_profile: AlertProfile::default(),
            alert_rules_path: None,
            bind_addr: "0.0.0.0:3000".to_string(),
            json_logs: false,
            source: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. `FARM_DASHBOARD_CONFIG`
    /// 3. `farm-dashboard.json` in the working directory
    /// 4. Defaults
    ///
    /// `FARM_DASHBOARD_DATA` then overrides `data_path`.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = Self::resolve(config_path, env_path.as_deref())?;

        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_path = PathBuf::from(data);
        }

        config.validate()?;
        Ok(config)
    }

    fn resolve(explicit: Option<&Path>, from_env: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit.or(from_env) {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()));
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load_from_file(&local);
        }

        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Self = serde_json::from_str(&content).context("Failed to parse config file")?;
        config.source = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.trend_months == 0 || self.trend_months > MAX_TREND_MONTHS {
            anyhow::bail!("trend_months must be between 1 and {}", MAX_TREND_MONTHS);
        }
        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr must not be empty");
        }
        Ok(())
    }

    /// The configured rule table, or the built-in one.
    pub fn alert_rules(&self) -> Result<AlertRuleSet> {
        match &self.alert_rules_path {
            Some(path) => AlertRuleSet::from_file(path),
            None => Ok(AlertRuleSet::standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.upcoming_task_limit, 5);
        assert_eq!(config.recent_crop_limit, 4);
        assert_eq!(config.trend_months, 6);
        assert_eq!(config.forecast_days, 5);
        assert_eq!(config.alert_profile, AlertProfile::Extended);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm-dashboard.json");
        fs::write(&path, r#"{"trend_months": 12, "alert_profile": "dashboard"}"#).unwrap();

        let config = DashboardConfig::load_from_file(&path).unwrap();
        assert_eq!(config.trend_months, 12);
        assert_eq!(config.alert_profile, AlertProfile::Dashboard);
        assert_eq!(config.upcoming_task_limit, 5);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_explicit_path_wins_over_env_path() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("a.json");
        let env = dir.path().join("b.json");
        fs::write(&explicit, r#"{"forecast_days": 3}"#).unwrap();
        fs::write(&env, r#"{"forecast_days": 7}"#).unwrap();

        let config = DashboardConfig::resolve(Some(&explicit), Some(&env)).unwrap();
        assert_eq!(config.forecast_days, 3);

        let config = DashboardConfig::resolve(None, Some(&env)).unwrap();
        assert_eq!(config.forecast_days, 7);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DashboardConfig::resolve(Some(&dir.path().join("nope.json")), None).is_err());
    }

    #[test]
    fn test_trend_months_bounds() {
        for (months, ok) in [(0, false), (1, true), (MAX_TREND_MONTHS, true), (MAX_TREND_MONTHS + 1, false)] {
            let config = DashboardConfig {
                trend_months: months,
                ..DashboardConfig::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "trend_months = {}", months);
        }

        let config = DashboardConfig {
            trend_months: usize::MAX,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
