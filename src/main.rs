use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use farm_dashboard::{
    filter_crops, filter_tasks, format_currency, load_transactions_csv, logging, search_farms, AggregationEngine,
    AlertProfile, CropFilter, DashboardConfig, FarmSort, InMemoryStore, RecordId, RecordStore, TaskFilter,
    TransactionFilter,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }

    logging::init(config.json_logs);
    match &config.source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    let engine = AggregationEngine::from_config(&config)?;
    let store = open_store(&config.data_path)?;
    let reference = cli.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let out = Output { json: cli.json };

    match cli.command {
        Commands::Farms { search, sort } => {
            let farms = store.list_farms();
            let found = search_farms(&farms, &search, sort);
            if out.json {
                return out.print_json(&found);
            }

            println!("🚜 Farms ({} of {})", found.len(), farms.len());
            for farm in found {
                println!(
                    "  #{:<3} {:<24} {:<20} {:>8.1} acres  {}",
                    farm.id,
                    farm.name,
                    farm.location,
                    farm.size,
                    farm.farm_type.label()
                );
            }
        }

        Commands::Dashboard { farm } => {
            let name = store.get_farm(farm)?.name;
            let view = engine.dashboard_view(
                &store.list_crops_for_farm(farm)?,
                &store.list_tasks_for_farm(farm)?,
                &store.list_transactions_for_farm(farm)?,
                &store.list_weather_forecast(),
                reference,
            );
            if out.json {
                return out.print_json(&view);
            }

            let s = &view.summary;
            println!("📊 {} - {}", name, reference);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("  Crops:    {} total, {} active", s.total_crops, s.active_crops);
            println!("  Tasks:    {} pending, {} overdue", s.pending_tasks, s.overdue_tasks);
            println!("  Income:   {}", format_currency(s.monthly_income));
            println!(
                "  Expenses: {} ({} transactions)",
                format_currency(s.monthly_expenses),
                s.expense_transactions
            );
            println!("  Profit:   {}", format_currency(s.monthly_profit));

            println!("\n📅 Upcoming tasks");
            if view.upcoming_tasks.is_empty() {
                println!("  No upcoming tasks");
            }
            for task in &view.upcoming_tasks {
                println!("  {}  {:<28} [{}]", task.due_date, task.title, task.priority.as_str());
            }

            println!("\n🌱 Recent crops");
            for crop in &view.recent_crops {
                println!("  {:<28} planted {}  {}", crop.display_name(), crop.planting_date, crop.status.as_str());
            }

            if let Some(today) = &view.current_weather {
                println!(
                    "\n🌤️  {:.0}°F {}, {:.0}% rain, wind {:.0} mph",
                    today.temperature,
                    today.condition.as_str(),
                    today.precipitation,
                    today.wind_speed
                );
            }
            for alert in &view.alerts {
                println!("  ⚠️  {}: {}", alert.title, alert.message);
            }
        }

        Commands::Finance { farm, filter } => {
            let view = engine.finance_view(&store.list_transactions_for_farm(farm)?, filter, reference);
            if out.json {
                return out.print_json(&view);
            }

            println!("💰 Finances - farm #{}", farm);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("  Total income:   {}", format_currency(view.totals.income));
            println!("  Total expenses: {}", format_currency(view.totals.expenses));
            println!("  Net profit:     {}", format_currency(view.totals.net_profit));
            println!("  {}:        {}", view.month, format_currency(view.month_totals.net_profit));

            println!("\n📈 Last {} months", view.trend.len());
            for point in &view.trend {
                println!(
                    "  {}  +{:>12}  -{:>12}",
                    point.label,
                    format_currency(point.income),
                    format_currency(point.expenses)
                );
            }

            println!("\n🧾 Transactions ({})", view.filter.as_str());
            for tx in &view.transactions {
                let amount = format_currency(tx.signed_amount());
                println!("  {}  {:<8} {:<12} {:>14}  {}", tx.date, tx.transaction_type.as_str(), tx.category, amount, tx.description);
            }
        }

        Commands::Tasks { farm, filter } => {
            let tasks = store.list_tasks_for_farm(farm)?;
            let selected = filter_tasks(&tasks, filter, reference);
            if out.json {
                return out.print_json(&selected);
            }

            println!("✅ Tasks ({}): {} of {}", filter.as_str(), selected.len(), tasks.len());
            for task in selected {
                let mark = if task.completed { "x" } else { " " };
                println!("  [{}] {}  {:<28} {}", mark, task.due_date, task.title, task.task_type.as_str());
            }
        }

        Commands::Crops { farm, status } => {
            let crops = store.list_crops_for_farm(farm)?;
            let selected = filter_crops(&crops, status);
            if out.json {
                return out.print_json(&selected);
            }

            println!("🌱 Crops: {} of {}", selected.len(), crops.len());
            for crop in selected {
                let harvest = match crop.days_to_harvest(reference) {
                    Some(days) if days >= 0 => format!("{} days to harvest", days),
                    Some(days) => format!("harvest was {} days ago", -days),
                    None => "no harvest date".to_string(),
                };
                println!("  {:<28} {:<10} {}", crop.display_name(), crop.status.as_str(), harvest);
            }
        }

        Commands::Weather { profile } => {
            let forecast = store.list_weather_forecast();
            let mut view = engine.weather_view(&forecast);
            if let Some(profile) = profile {
                view.alerts = engine.alerts_for(&forecast, profile);
            }
            if out.json {
                return out.print_json(&view);
            }

            match &view.current {
                Some(today) => println!(
                    "🌤️  Today ({}): {:.0}°F {}, humidity {:.0}%, wind {:.0} mph, rain {:.0}%",
                    today.date,
                    today.temperature,
                    today.condition.as_str(),
                    today.humidity,
                    today.wind_speed,
                    today.precipitation
                ),
                None => println!("🌤️  No forecast data"),
            }
            for day in &view.outlook {
                println!("  {}  {:>4.0}°F  {}", day.date, day.temperature, day.condition.as_str());
            }
            for alert in &view.alerts {
                println!("  ⚠️  [{:?}] {}: {}", alert.severity, alert.title, alert.message);
            }
            if let Some(avg) = &view.averages {
                println!(
                    "\n  Averages over {} days: {:.1}°F, rain {:.1}%, wind {:.1} mph, humidity {:.1}%",
                    avg.days, avg.temperature, avg.precipitation, avg.wind_speed, avg.humidity
                );
            }
            for advice in &view.advisories {
                println!("  {:<11} {}", advice.kind.as_str(), advice.message);
            }
        }

        Commands::Import { farm, csv, dry_run } => {
            let transactions = load_transactions_csv(&csv, farm)?;
            info!("Loaded {} transactions from {}", transactions.len(), csv.display());

            let report = store.import_transactions(transactions)?;
            if !dry_run {
                store.save_snapshot(&config.data_path)?;
            }
            if out.json {
                return out.print_json(&report);
            }

            println!("✓ Inserted: {} transactions", report.inserted);
            println!("✓ Skipped duplicates: {}", report.duplicates);
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Farm dashboard: statistics, finances, tasks and weather for your farms.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot data file, overrides the configured one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List farms, optionally searched and sorted
    Farms {
        #[arg(long, default_value = "")]
        search: String,

        /// name, location, size or type
        #[arg(long, default_value = "name")]
        sort: FarmSort,
    },

    /// Status summary, upcoming tasks, recent crops and today's weather
    Dashboard {
        #[arg(long)]
        farm: RecordId,
    },

    /// Totals, monthly trend and the transaction list
    Finance {
        #[arg(long)]
        farm: RecordId,

        /// all, income or expense
        #[arg(long, default_value = "all")]
        filter: TransactionFilter,
    },

    Tasks {
        #[arg(long)]
        farm: RecordId,

        /// all, pending, completed, overdue or today
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
    },

    Crops {
        #[arg(long)]
        farm: RecordId,

        /// all, planted, growing, harvested or failed
        #[arg(long, default_value = "all")]
        status: CropFilter,
    },

    /// Forecast, alerts, averages and field advice
    Weather {
        /// dashboard or extended; defaults to the configured profile
        #[arg(long)]
        profile: Option<AlertProfile>,
    },

    /// Import transactions from a CSV file into the data file
    Import {
        /// Farm for rows without a farmId column
        #[arg(long)]
        farm: RecordId,

        csv: PathBuf,

        /// Report what would be imported without saving
        #[arg(long)]
        dry_run: bool,
    },
}

// ==============================================================================
// Helpers
// ==============================================================================

fn open_store(path: &Path) -> Result<InMemoryStore> {
    if !path.exists() {
        anyhow::bail!(
            "Data file {} not found (set --data, data_path or FARM_DASHBOARD_DATA)",
            path.display()
        );
    }
    InMemoryStore::load_snapshot(path).with_context(|| format!("Failed to open data file {}", path.display()))
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
