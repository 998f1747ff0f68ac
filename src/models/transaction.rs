//! Transaction model
//!
//! A ledger entry with a signed amount and an explicit kind discriminator.
//! The sign convention (negative = expense, positive = income) and the kind
//! field both exist in the persisted format; neither is trusted alone, so
//! arithmetic paths validate agreement before using a row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;

/// Discriminator for the direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money leaving the ledger (negative amount convention)
    #[default]
    Expense,
    /// Money entering the ledger (positive amount convention)
    Income,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "expense"),
            Self::Income => write!(f, "income"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, stable across saves
    pub id: TransactionId,

    /// Signed amount (negative for expenses, positive for income)
    pub amount: Money,

    /// Direction discriminator; must agree with the amount sign
    pub kind: TransactionKind,

    /// Free-form category
    pub category: String,

    /// Optional note, also fed to the classifier when present
    pub note: Option<String>,

    /// When the transaction occurred
    pub timestamp: DateTime<Utc>,

    /// External anchoring record, opaque to this core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<serde_json::Value>,
}

impl Transaction {
    /// Create a new transaction, inferring the kind from the amount sign
    pub fn new(amount: Money, category: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let kind = if amount.is_positive() {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        Self {
            id: TransactionId::new(),
            amount,
            kind,
            category: category.into(),
            note: None,
            timestamp,
            proof: None,
        }
    }

    /// Create a transaction with a note attached
    pub fn with_note(
        amount: Money,
        category: impl Into<String>,
        note: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut txn = Self::new(amount, category, timestamp);
        txn.note = Some(note.into());
        txn
    }

    /// Check that the amount sign and the kind discriminator agree.
    ///
    /// A zero amount is accepted for either kind.
    pub fn sign_consistent(&self) -> bool {
        match self.kind {
            TransactionKind::Expense => !self.amount.is_positive(),
            TransactionKind::Income => !self.amount.is_negative(),
        }
    }

    /// Check if this is a well-formed expense (kind AND sign both agree)
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense && self.sign_consistent()
    }

    /// Check if this is a well-formed income entry
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income && self.sign_consistent()
    }

    /// Magnitude of a well-formed expense, None for anything else
    pub fn expense_magnitude(&self) -> Option<Money> {
        if self.is_expense() {
            Some(self.amount.abs())
        } else {
            None
        }
    }

    /// Validate the transaction for submission
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.sign_consistent() {
            return Err(TransactionValidationError::SignMismatch {
                amount: self.amount,
                kind: self.kind,
            });
        }
        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::EmptyCategory);
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.category,
            self.amount,
            self.kind
        )
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    SignMismatch {
        amount: Money,
        kind: TransactionKind,
    },
    EmptyCategory,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignMismatch { amount, kind } => write!(
                f,
                "Amount {} does not match transaction kind '{}'",
                amount, kind
            ),
            Self::EmptyCategory => write!(f, "Transaction category cannot be empty"),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_kind_inferred_from_sign() {
        let expense = Transaction::new(Money::from_cents(-5000), "Groceries", ts());
        assert_eq!(expense.kind, TransactionKind::Expense);
        assert!(expense.is_expense());

        let income = Transaction::new(Money::from_cents(200_000), "Salary", ts());
        assert_eq!(income.kind, TransactionKind::Income);
        assert!(income.is_income());
    }

    #[test]
    fn test_sign_mismatch_detected() {
        let mut txn = Transaction::new(Money::from_cents(-5000), "Groceries", ts());
        txn.kind = TransactionKind::Income;

        assert!(!txn.sign_consistent());
        assert!(!txn.is_expense());
        assert!(!txn.is_income());
        assert!(matches!(
            txn.validate(),
            Err(TransactionValidationError::SignMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_amount_is_consistent() {
        let txn = Transaction::new(Money::zero(), "Misc", ts());
        assert!(txn.sign_consistent());
    }

    #[test]
    fn test_expense_magnitude() {
        let txn = Transaction::new(Money::from_cents(-1234), "Dining", ts());
        assert_eq!(txn.expense_magnitude(), Some(Money::from_cents(1234)));

        let income = Transaction::new(Money::from_cents(1234), "Salary", ts());
        assert_eq!(income.expense_magnitude(), None);
    }

    #[test]
    fn test_empty_category_rejected() {
        let txn = Transaction::new(Money::from_cents(-1000), "  ", ts());
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::EmptyCategory)
        );
    }

    #[test]
    fn test_serialization_roundtrip() {
        let txn = Transaction::with_note(Money::from_cents(-450), "Dining", "morning coffee", ts());
        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(txn.id, back.id);
        assert_eq!(txn.amount, back.amount);
        assert_eq!(txn.note, back.note);
        // proof is omitted from the wire format when absent
        assert!(!json.contains("proof"));
    }
}
