// 🧮 Aggregation Engine - Composes dashboard, finance and weather views
//
// Stateless: every view is recomputed from the snapshots it is handed.

use crate::alerts::{weather_alerts, AlertProfile, AlertRuleSet, WeatherAlert};
use crate::config::DashboardConfig;
use crate::dashboard::{
    recent_crops, summarize_farm_status, upcoming_tasks, FarmStatusSummary, DEFAULT_RECENT_LIMIT,
    DEFAULT_UPCOMING_LIMIT,
};
use crate::dates::YearMonth;
use crate::entities::{Crop, Task, Transaction, WeatherDay};
use crate::finance::{
    filter_transactions, financial_totals, month_totals, monthly_trend, FinancialTotals, MonthlyTrendPoint,
    TransactionFilter, DEFAULT_TREND_MONTHS,
};
use crate::forecast::{
    current_day, field_advisories, forecast_averages, outlook, FieldAdvisory, ForecastAverages,
    DEFAULT_FORECAST_DAYS,
};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

// ============================================================================
// VIEWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub reference_date: NaiveDate,
    pub summary: FarmStatusSummary,
    pub upcoming_tasks: Vec<Task>,
    pub recent_crops: Vec<Crop>,
    pub current_weather: Option<WeatherDay>,
    pub alerts: Vec<WeatherAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceView {
    pub reference_date: NaiveDate,
    /// All time
    pub totals: FinancialTotals,
    /// Reference month only
    pub month: YearMonth,
    pub month_totals: FinancialTotals,
    pub trend: Vec<MonthlyTrendPoint>,
    pub filter: TransactionFilter,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub current: Option<WeatherDay>,
    pub outlook: Vec<WeatherDay>,
    pub alerts: Vec<WeatherAlert>,
    pub averages: Option<ForecastAverages>,
    pub advisories: Vec<FieldAdvisory>,
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AggregationEngine {
    upcoming_limit: usize,
    recent_limit: usize,
    trend_months: usize,
    forecast_days: usize,
    dashboard_rules: AlertRuleSet,
    weather_rules: AlertRuleSet,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::with_rules(AlertRuleSet::standard(), AlertProfile::Extended)
    }

    /// Dashboard card uses the dashboard selection of `rules`; the weather
    /// view uses `weather_profile`.
    pub fn with_rules(rules: AlertRuleSet, weather_profile: AlertProfile) -> Self {
        AggregationEngine {
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
            recent_limit: DEFAULT_RECENT_LIMIT,
            trend_months: DEFAULT_TREND_MONTHS,
            forecast_days: DEFAULT_FORECAST_DAYS,
            dashboard_rules: rules.for_profile(AlertProfile::Dashboard),
            weather_rules: rules.for_profile(weather_profile),
        }
    }

    pub fn with_limits(mut self, upcoming: usize, recent: usize, trend_months: usize, forecast_days: usize) -> Self {
        self.upcoming_limit = upcoming;
        self.recent_limit = recent;
        self.trend_months = trend_months;
        self.forecast_days = forecast_days;
        self
    }

    /// Build from configuration (loads the alert rule file if one is set).
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let rules = config.alert_rules()?;
        Ok(Self::with_rules(rules, config.alert_profile).with_limits(
            config.upcoming_task_limit,
            config.recent_crop_limit,
            config.trend_months,
            config.forecast_days,
        ))
    }

    pub fn trend_months(&self) -> usize {
        self.trend_months
    }

    pub fn dashboard_view(
        &self,
        crops: &[Crop],
        tasks: &[Task],
        transactions: &[Transaction],
        forecast: &[WeatherDay],
        reference: NaiveDate,
    ) -> DashboardView {
        let summary = summarize_farm_status(crops, tasks, transactions, reference);
        let current = current_day(forecast);
        let alerts = current
            .map(|day| weather_alerts(day, &self.dashboard_rules))
            .unwrap_or_default();

        debug!(
            "dashboard view for {}: {} crops, {} tasks, {} transactions, {} alerts",
            reference,
            crops.len(),
            tasks.len(),
            transactions.len(),
            alerts.len()
        );

        DashboardView {
            reference_date: reference,
            summary,
            upcoming_tasks: upcoming_tasks(tasks, reference, self.upcoming_limit)
                .into_iter()
                .cloned()
                .collect(),
            recent_crops: recent_crops(crops, self.recent_limit).into_iter().cloned().collect(),
            current_weather: current.cloned(),
            alerts,
        }
    }

    pub fn finance_view(
        &self,
        transactions: &[Transaction],
        filter: TransactionFilter,
        reference: NaiveDate,
    ) -> FinanceView {
        let month = YearMonth::of(reference);
        let listed: Vec<Transaction> = filter_transactions(transactions, filter).into_iter().cloned().collect();

        debug!(
            "finance view for {}: {} of {} transactions ({})",
            month,
            listed.len(),
            transactions.len(),
            filter.as_str()
        );

        FinanceView {
            reference_date: reference,
            totals: financial_totals(transactions),
            month,
            month_totals: month_totals(transactions, month),
            trend: monthly_trend(transactions, reference, self.trend_months),
            filter,
            transactions: listed,
        }
    }

    pub fn weather_view(&self, forecast: &[WeatherDay]) -> WeatherView {
        let current = current_day(forecast);

        debug!("weather view over {} forecast days", forecast.len());

        WeatherView {
            current: current.cloned(),
            outlook: outlook(forecast, self.forecast_days).to_vec(),
            alerts: current
                .map(|day| weather_alerts(day, &self.weather_rules))
                .unwrap_or_default(),
            averages: forecast_averages(forecast),
            advisories: current.map(field_advisories).unwrap_or_default(),
        }
    }

    /// Alerts for the current forecast day under an explicit profile.
    pub fn alerts_for(&self, forecast: &[WeatherDay], profile: AlertProfile) -> Vec<WeatherAlert> {
        let rules = match profile {
            AlertProfile::Dashboard => &self.dashboard_rules,
            AlertProfile::Extended => &self.weather_rules,
        };
        current_day(forecast)
            .map(|day| weather_alerts(day, rules))
            .unwrap_or_default()
    }
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
