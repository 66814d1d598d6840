// 📊 Dashboard Statistics - Farm status at a glance
//
// Everything here is a pure function of the record snapshots and the
// reference date. Empty input gives zeroed results, never an error.

use crate::dates::YearMonth;
use crate::entities::{Crop, Task, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_UPCOMING_LIMIT: usize = 5;
pub const DEFAULT_RECENT_LIMIT: usize = 4;

// ============================================================================
// FARM STATUS SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmStatusSummary {
    pub total_crops: usize,
    /// Planted or growing
    pub active_crops: usize,
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_profit: f64,
    /// All expense transactions, any month
    pub expense_transactions: usize,
}

impl FarmStatusSummary {
    pub fn is_profitable(&self) -> bool {
        self.monthly_profit >= 0.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} crops ({} active), {} pending tasks ({} overdue), month: +{:.2} / -{:.2} = {:.2}",
            self.total_crops,
            self.active_crops,
            self.pending_tasks,
            self.overdue_tasks,
            self.monthly_income,
            self.monthly_expenses,
            self.monthly_profit
        )
    }
}

/// Dashboard counters plus income/expense for the reference date's month.
pub fn summarize_farm_status(
    crops: &[Crop],
    tasks: &[Task],
    transactions: &[Transaction],
    reference: NaiveDate,
) -> FarmStatusSummary {
    let month = YearMonth::of(reference);

    let in_month = |tx: &&Transaction| month.contains_raw(&tx.date);

    let monthly_income: f64 = transactions
        .iter()
        .filter(|tx| tx.is_income())
        .filter(in_month)
        .map(|tx| tx.amount)
        .sum();

    let monthly_expenses: f64 = transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .filter(in_month)
        .map(|tx| tx.amount)
        .sum();

    FarmStatusSummary {
        total_crops: crops.len(),
        active_crops: crops.iter().filter(|c| c.is_active()).count(),
        pending_tasks: tasks.iter().filter(|t| t.is_pending()).count(),
        overdue_tasks: tasks.iter().filter(|t| t.is_overdue(reference)).count(),
        monthly_income,
        monthly_expenses,
        monthly_profit: monthly_income - monthly_expenses,
        expense_transactions: transactions.iter().filter(|tx| tx.is_expense()).count(),
    }
}

// ============================================================================
// UPCOMING TASKS / RECENT CROPS
// ============================================================================

/// Open tasks due after the reference day, soonest first, at most `limit`.
///
/// Ties keep their input order.
pub fn upcoming_tasks(tasks: &[Task], reference: NaiveDate, limit: usize) -> Vec<&Task> {
    let mut upcoming: Vec<&Task> = tasks.iter().filter(|t| t.is_upcoming(reference)).collect();
    upcoming.sort_by_key(|t| t.due_on());
    upcoming.truncate(limit);
    upcoming
}

/// Most recently planted crops first, at most `limit`. Crops without a
/// usable planting date are left out.
pub fn recent_crops(crops: &[Crop], limit: usize) -> Vec<&Crop> {
    let mut dated: Vec<&Crop> = crops.iter().filter(|c| c.planted_on().is_some()).collect();
    dated.sort_by(|a, b| b.planted_on().cmp(&a.planted_on()));
    dated.truncate(limit);
    dated
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CropStatus, TaskType, TransactionType};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_task(id: i64, due: &str, completed: bool) -> Task {
        let mut task = Task::new(1, &format!("Task {}", id), TaskType::Weeding, due);
        task.id = id;
        task.completed = completed;
        task
    }

    fn create_test_crop(id: i64, planted: &str, status: CropStatus) -> Crop {
        let mut crop = Crop::new(1, "corn", "Dent", planted, status);
        crop.id = id;
        crop
    }

    fn create_test_transaction(tx_type: TransactionType, amount: f64, date: &str) -> Transaction {
        Transaction::new(1, tx_type, "other", amount, date, "test")
    }

    #[test]
    fn test_monthly_totals_exclude_other_months() {
        let transactions = vec![
            create_test_transaction(TransactionType::Income, 1000.0, "2024-03-05"),
            create_test_transaction(TransactionType::Expense, 300.0, "2024-03-10"),
            create_test_transaction(TransactionType::Expense, 50.0, "2024-02-01"),
        ];

        let summary = summarize_farm_status(&[], &[], &transactions, ymd(2024, 3, 15));

        assert_eq!(summary.monthly_income, 1000.0);
        assert_eq!(summary.monthly_expenses, 300.0);
        assert_eq!(summary.monthly_profit, 700.0);
        assert_eq!(summary.expense_transactions, 2);
        assert!(summary.is_profitable());

        println!("✅ {}", summary.summary());
    }

    #[test]
    fn test_month_is_inclusive_of_first_and_last_day() {
        let transactions = vec![
            create_test_transaction(TransactionType::Income, 10.0, "2024-02-01"),
            create_test_transaction(TransactionType::Income, 20.0, "2024-02-29T23:30:00"),
            create_test_transaction(TransactionType::Income, 40.0, "2024-03-01"),
            create_test_transaction(TransactionType::Income, 80.0, "2023-02-15"),
            create_test_transaction(TransactionType::Income, 160.0, "garbage"),
        ];

        let summary = summarize_farm_status(&[], &[], &transactions, ymd(2024, 2, 14));
        assert_eq!(summary.monthly_income, 30.0);
    }

    #[test]
    fn test_crop_and_task_counters() {
        let crops = vec![
            create_test_crop(1, "2024-01-01", CropStatus::Planted),
            create_test_crop(2, "2024-01-02", CropStatus::Growing),
            create_test_crop(3, "2023-06-01", CropStatus::Harvested),
            create_test_crop(4, "2023-06-01", CropStatus::Failed),
        ];
        let tasks = vec![
            create_test_task(1, "2024-03-10", false),
            create_test_task(2, "2024-03-15", false),
            create_test_task(3, "2024-03-20", false),
            create_test_task(4, "2024-03-01", true),
        ];

        let summary = summarize_farm_status(&crops, &tasks, &[], ymd(2024, 3, 15));

        assert_eq!(summary.total_crops, 4);
        assert_eq!(summary.active_crops, 2);
        assert_eq!(summary.pending_tasks, 3);
        assert_eq!(summary.overdue_tasks, 1);
    }

    #[test]
    fn test_empty_inputs_are_all_zero() {
        let summary = summarize_farm_status(&[], &[], &[], ymd(2024, 3, 15));
        assert_eq!(summary, FarmStatusSummary::default());
    }

    #[test]
    fn test_upcoming_tasks_order_and_limit() {
        let tasks = vec![
            create_test_task(1, "2024-03-20", false),
            create_test_task(2, "2024-03-16", false),
            create_test_task(3, "2024-03-15", false), // due today, not upcoming
            create_test_task(4, "2024-03-18", true),  // completed
            create_test_task(5, "2024-03-16", false), // ties with 2
            create_test_task(6, "2024-04-01", false),
            create_test_task(7, "2024-03-25", false),
            create_test_task(8, "2024-03-30", false),
            create_test_task(9, "never", false),
        ];

        let upcoming = upcoming_tasks(&tasks, ymd(2024, 3, 15), DEFAULT_UPCOMING_LIMIT);
        let ids: Vec<i64> = upcoming.iter().map(|t| t.id).collect();

        assert_eq!(ids, vec![2, 5, 1, 7, 8]);
    }

    #[test]
    fn test_recent_crops_descending_and_stable() {
        let crops = vec![
            create_test_crop(1, "2024-01-10", CropStatus::Growing),
            create_test_crop(2, "2024-03-01", CropStatus::Planted),
            create_test_crop(3, "2024-01-10", CropStatus::Growing),
            create_test_crop(4, "unknown", CropStatus::Growing),
            create_test_crop(5, "2023-12-31", CropStatus::Harvested),
            create_test_crop(6, "2022-05-05", CropStatus::Failed),
        ];

        let recent = recent_crops(&crops, DEFAULT_RECENT_LIMIT);
        let ids: Vec<i64> = recent.iter().map(|c| c.id).collect();

        assert_eq!(ids, vec![2, 1, 3, 5]);
        assert!(recent_crops(&crops, 0).is_empty());
    }
}
