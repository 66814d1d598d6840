// 💰 Finance Aggregation - Totals, monthly trend and transaction views
//
// Formula: net_profit = total_income - total_expenses
//
// Amounts are non-negative; the transaction type alone decides the side.

use crate::dates::{months_ending_at, YearMonth};
use crate::entities::{Transaction, TransactionType};
use crate::error::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

pub const DEFAULT_TREND_MONTHS: usize = 6;

// ============================================================================
// TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTotals {
    pub income: f64,
    pub expenses: f64,
    pub net_profit: f64,
}

impl FinancialTotals {
    fn from_sums(income: f64, expenses: f64) -> Self {
        FinancialTotals {
            income,
            expenses,
            net_profit: income - expenses,
        }
    }
}

/// Income, expenses and net profit over every transaction given.
pub fn financial_totals(transactions: &[Transaction]) -> FinancialTotals {
    totals_where(transactions, |_| true)
}

/// Same as [`financial_totals`] restricted to one calendar month.
pub fn month_totals(transactions: &[Transaction], month: YearMonth) -> FinancialTotals {
    totals_where(transactions, |tx| month.contains_raw(&tx.date))
}

fn totals_where<F>(transactions: &[Transaction], keep: F) -> FinancialTotals
where
    F: Fn(&Transaction) -> bool,
{
    let (income, expenses) = transactions
        .iter()
        .filter(|tx| keep(tx))
        .fold((0.0, 0.0), |(income, expenses), tx| match tx.transaction_type {
            TransactionType::Income => (income + tx.amount, expenses),
            TransactionType::Expense => (income, expenses + tx.amount),
        });

    FinancialTotals::from_sums(income, expenses)
}

// ============================================================================
// MONTHLY TREND
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    pub month: YearMonth,
    /// Short month name for chart axes ("Mar")
    pub label: String,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyTrendPoint {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

/// `month_count` consecutive months ending at the reference month, oldest
/// first. Months without transactions are (0, 0).
pub fn monthly_trend(
    transactions: &[Transaction],
    reference: NaiveDate,
    month_count: usize,
) -> Vec<MonthlyTrendPoint> {
    months_ending_at(reference, month_count)
        .into_iter()
        .map(|month| {
            let totals = month_totals(transactions, month);
            MonthlyTrendPoint {
                month,
                label: month.short_label(),
                income: totals.income,
                expenses: totals.expenses,
            }
        })
        .collect()
}

// ============================================================================
// TRANSACTION LIST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TransactionFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionFilter::All => "all",
            TransactionFilter::Income => "income",
            TransactionFilter::Expense => "expense",
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Income => tx.is_income(),
            TransactionFilter::Expense => tx.is_expense(),
        }
    }
}

impl FromStr for TransactionFilter {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(TransactionFilter::All),
            "income" => Ok(TransactionFilter::Income),
            "expense" | "expenses" => Ok(TransactionFilter::Expense),
            other => Err(StoreError::invalid(format!("unknown transaction filter: {}", other))),
        }
    }
}

/// Filtered transactions, newest first. Undated rows go last in input order.
pub fn filter_transactions(transactions: &[Transaction], filter: TransactionFilter) -> Vec<&Transaction> {
    let mut matching: Vec<&Transaction> = transactions.iter().filter(|tx| filter.matches(tx)).collect();
    matching.sort_by(|a, b| match (a.occurred_on(), b.occurred_on()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    matching
}

// ============================================================================
// TESTS
// ============================================================================
