// 💵 Transaction Entity - Farm income and expenses
//
// Amounts are stored non-negative. Whether a transaction adds to or
// subtracts from profit is decided by its type, never by the amount sign.

use super::{deserialize_id, Record, RecordId};
use crate::dates::parse_record_date;
use crate::error::{StoreError, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Categories offered for expense transactions.
pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "seeds",
    "fertilizer",
    "equipment",
    "labor",
    "fuel",
    "maintenance",
    "other",
];

/// Categories offered for income transactions.
pub const INCOME_CATEGORIES: [&str; 4] = ["harvest", "sales", "subsidy", "other"];

// ============================================================================
// TRANSACTION TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TransactionType::Income => &INCOME_CATEGORIES,
            TransactionType::Expense => &EXPENSE_CATEGORIES,
        }
    }
}

impl FromStr for TransactionType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(StoreError::invalid(format!("unknown transaction type: {}", other))),
        }
    }
}

// ============================================================================
// TRANSACTION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "Id", deserialize_with = "deserialize_id")]
    pub id: RecordId,

    #[serde(deserialize_with = "deserialize_id")]
    pub farm_id: RecordId,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    pub category: String,

    pub amount: f64,

    pub date: String,

    #[serde(default)]
    pub description: String,
}

impl Transaction {
    pub fn new(
        farm_id: RecordId,
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
        date: &str,
        description: &str,
    ) -> Self {
        Transaction {
            id: 0,
            farm_id,
            transaction_type,
            category: category.to_string(),
            amount,
            date: date.to_string(),
            description: description.to_string(),
        }
    }

    pub fn occurred_on(&self) -> Option<NaiveDate> {
        parse_record_date(&self.date)
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Contribution to profit: +amount for income, -amount for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Content hash used to skip re-imported rows. Ignores the id, which the
    /// store assigns.
    pub fn compute_idempotency_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}|{}|{}",
            self.farm_id,
            self.date.trim(),
            self.transaction_type.as_str(),
            self.category.trim().to_lowercase(),
            self.amount,
            self.description.trim()
        ));
        format!("{:x}", hasher.finalize())
    }
}

impl Record for Transaction {
    const ENTITY: &'static str = "transaction";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn farm_id(&self) -> Option<RecordId> {
        Some(self.farm_id)
    }

    fn validate(&self) -> StoreResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(StoreError::invalid(format!(
                "transaction amount must be a non-negative number (got {})",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(StoreError::invalid("transaction category must not be empty"));
        }
        Ok(())
    }
}
