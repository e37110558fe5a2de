//! Transaction domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Income or expense. Unknown input types normalize to `Expense`, the
/// non-rewarding side of the XP economy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

/// A sanitized, persisted ledger entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// When the transaction occurred (user-supplied, validated).
    pub date: DateTime<Utc>,
    /// When the record was created on this device.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.tx_type == TransactionType::Income
    }

    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }
}

/// Raw, untrusted transaction input from the ingestion collaborator.
/// Passes through the sanitizer before it becomes a [`Transaction`].
#[derive(Clone, Debug, Deserialize)]
pub struct CreateTransactionDto {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}
