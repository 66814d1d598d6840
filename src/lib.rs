// Farm Dashboard - Core Library
// Exposes all modules for use in the CLI, the API server and tests

pub mod alerts;     // Weather alert rule table
pub mod config;
pub mod dashboard;  // Farm status summary, upcoming tasks, recent crops
pub mod dates;
pub mod engine;     // Composed dashboard / finance / weather views
pub mod entities;
pub mod error;
pub mod filters;    // Task, crop and farm list filters
pub mod finance;    // Totals and monthly trend
pub mod forecast;
pub mod logging;
pub mod store;      // Record store, snapshots, CSV import

// Re-export commonly used types
pub use alerts::{
    weather_alerts, AlertProfile, AlertRule, AlertRuleSet, AlertSeverity, Comparison, WeatherAlert,
    WeatherMetric,
};
pub use config::DashboardConfig;
pub use dashboard::{recent_crops, summarize_farm_status, upcoming_tasks, FarmStatusSummary};
pub use dates::{parse_record_date, YearMonth};
pub use engine::{AggregationEngine, DashboardView, FinanceView, WeatherView};
pub use entities::{
    Crop, CropStatus, Farm, FarmType, Record, RecordId, Task, TaskPriority, TaskType, Transaction,
    TransactionType, WeatherCondition, WeatherDay,
};
pub use error::{StoreError, StoreResult};
pub use filters::{
    filter_crops, filter_tasks, search_farms, task_filter_predicate, CropFilter, FarmSort, TaskFilter,
};
pub use finance::{
    filter_transactions, financial_totals, month_totals, monthly_trend, FinancialTotals, MonthlyTrendPoint,
    TransactionFilter,
};
pub use forecast::{current_day, field_advisories, forecast_averages, outlook, FieldAdvisory, ForecastAverages};
pub use store::{load_transactions_csv, Event, ImportReport, InMemoryStore, RecordStore, Snapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// US-dollar amount with thousands separators, e.g. `-$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
