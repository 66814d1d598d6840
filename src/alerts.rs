// ⚠️ Weather Alert Rules - Rules as Data
//
// One rule table is the single source of thresholds. The dashboard card and
// the weather page both evaluate it; they only differ in which rules of the
// table they select.

use crate::entities::WeatherDay;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherMetric {
    Temperature,
    Precipitation,
    WindSpeed,
    Humidity,
}

impl WeatherMetric {
    pub fn read(&self, day: &WeatherDay) -> f64 {
        match self {
            WeatherMetric::Temperature => day.temperature,
            WeatherMetric::Precipitation => day.precipitation,
            WeatherMetric::WindSpeed => day.wind_speed,
            WeatherMetric::Humidity => day.humidity,
        }
    }
}

/// Strict comparisons only; a reading equal to the threshold never fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    /// Rule ID for tracking
    pub id: String,

    pub metric: WeatherMetric,

    pub comparison: Comparison,

    pub threshold: f64,

    pub severity: AlertSeverity,

    pub title: String,

    pub message: String,

    /// Also shown on the compact dashboard card
    #[serde(default)]
    pub dashboard: bool,
}

impl AlertRule {
    pub fn fires(&self, day: &WeatherDay) -> bool {
        let value = self.metric.read(day);
        match self.comparison {
            Comparison::Above => value > self.threshold,
            Comparison::Below => value < self.threshold,
        }
    }
}

// ============================================================================
// ALERT RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub rule_id: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub observed: f64,
    pub threshold: f64,
}

// ============================================================================
// RULE SET
// ============================================================================

/// Which selection of the rule table to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertProfile {
    /// Dashboard card: rules flagged `dashboard` (heavy rain by default)
    Dashboard,
    /// Weather page: every rule
    #[default]
    Extended,
}

impl std::str::FromStr for AlertProfile {
    type Err = crate::error::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(AlertProfile::Dashboard),
            "" | "extended" => Ok(AlertProfile::Extended),
            other => Err(crate::error::StoreError::invalid(format!("unknown alert profile: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRuleSet {
    rules: Vec<AlertRule>,
}

impl AlertRuleSet {
    /// Built-in table: heavy rain, extreme heat, frost, high wind.
    pub fn standard() -> Self {
        AlertRuleSet::from_rules(vec![
            AlertRule {
                id: "heavy_rain".to_string(),
                metric: WeatherMetric::Precipitation,
                comparison: Comparison::Above,
                threshold: 70.0,
                severity: AlertSeverity::Warning,
                title: "Heavy Rain Expected".to_string(),
                message: "Consider postponing outdoor activities and protect sensitive crops.".to_string(),
                dashboard: true,
            },
            AlertRule {
                id: "extreme_heat".to_string(),
                metric: WeatherMetric::Temperature,
                comparison: Comparison::Above,
                threshold: 90.0,
                severity: AlertSeverity::Error,
                title: "Extreme Heat Warning".to_string(),
                message: "Ensure adequate irrigation and consider shade protection for crops.".to_string(),
                dashboard: false,
            },
            AlertRule {
                id: "frost".to_string(),
                metric: WeatherMetric::Temperature,
                comparison: Comparison::Below,
                threshold: 35.0,
                severity: AlertSeverity::Warning,
                title: "Frost Warning".to_string(),
                message: "Protect sensitive crops from potential frost damage.".to_string(),
                dashboard: false,
            },
            AlertRule {
                id: "high_wind".to_string(),
                metric: WeatherMetric::WindSpeed,
                comparison: Comparison::Above,
                threshold: 25.0,
                severity: AlertSeverity::Warning,
                title: "High Wind Advisory".to_string(),
                message: "Secure loose equipment and check crop supports.".to_string(),
                dashboard: false,
            },
        ])
    }

    /// Rules in evaluation order. Order is the table order.
    pub fn from_rules(rules: Vec<AlertRule>) -> Self {
        AlertRuleSet { rules }
    }

    /// Load a rule table from a JSON array file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read alert rules file: {:?}", path.as_ref()))?;

        let rules: Vec<AlertRule> =
            serde_json::from_str(&content).context("Failed to parse alert rules JSON")?;

        if let Some(bad) = rules.iter().find(|r| !r.threshold.is_finite()) {
            anyhow::bail!("Alert rule {} has a non-finite threshold", bad.id);
        }

        Ok(AlertRuleSet::from_rules(rules))
    }

    /// The selection of this table used by `profile`.
    pub fn for_profile(&self, profile: AlertProfile) -> AlertRuleSet {
        match profile {
            AlertProfile::Extended => self.clone(),
            AlertProfile::Dashboard => AlertRuleSet::from_rules(
                self.rules.iter().filter(|r| r.dashboard).cloned().collect(),
            ),
        }
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Every rule is checked independently; one day can raise several alerts.
    pub fn evaluate(&self, day: &WeatherDay) -> Vec<WeatherAlert> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(day))
            .map(|rule| WeatherAlert {
                rule_id: rule.id.clone(),
                severity: rule.severity,
                title: rule.title.clone(),
                message: rule.message.clone(),
                observed: rule.metric.read(day),
                threshold: rule.threshold,
            })
            .collect()
    }
}

impl Default for AlertRuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Alerts for the current day under `rules`.
pub fn weather_alerts(current: &WeatherDay, rules: &AlertRuleSet) -> Vec<WeatherAlert> {
    rules.evaluate(current)
}

// ============================================================================
// TESTS
// ============================================================================
