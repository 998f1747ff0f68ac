//! Budget model
//!
//! A mapping from category to period limit. Budgets are independent of the
//! encryption layer and are always stored as plaintext JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// The calendar period a budget limit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    /// Most recent Sunday through now
    Weekly,
    /// First of the current month through now
    #[default]
    Monthly,
    /// January 1 of the current year through now
    Yearly,
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown budget period: {}", other)),
        }
    }
}

/// All configured budget limits plus the period they apply to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetBook {
    /// Period shared by every limit in the book
    #[serde(default)]
    pub period: BudgetPeriod,

    /// Category -> limit. BTreeMap for stable iteration and diff-friendly files.
    #[serde(default)]
    pub limits: BTreeMap<String, Money>,
}

impl BudgetBook {
    /// Set or replace the limit for a category
    pub fn set_limit(&mut self, category: impl Into<String>, limit: Money) {
        self.limits.insert(category.into(), limit);
    }

    /// Remove a category's limit, returning it if present
    pub fn remove_limit(&mut self, category: &str) -> Option<Money> {
        self.limits.remove(category)
    }

    /// Check whether any limits are configured
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

/// Evaluation status of one budgeted category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetStatus {
    /// Below 80% of the limit
    OnTrack,
    /// 80% to just under 100%
    Warning,
    /// At or above the limit
    Exceeded,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on-track"),
            Self::Warning => write!(f, "warning"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}

/// Evaluation result for one budgeted category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetReport {
    pub category: String,
    pub limit: Money,
    /// Total expense magnitude within the period
    pub spent: Money,
    /// spent / limit
    pub ratio: f64,
    pub status: BudgetStatus,
}

impl fmt::Display for BudgetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} ({:.0}%, {})",
            self.category,
            self.spent,
            self.limit,
            self.ratio * 100.0,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove_limit() {
        let mut book = BudgetBook::default();
        assert!(book.is_empty());

        book.set_limit("Groceries", Money::from_cents(40_000));
        assert_eq!(book.limits["Groceries"], Money::from_cents(40_000));

        assert_eq!(
            book.remove_limit("Groceries"),
            Some(Money::from_cents(40_000))
        );
        assert!(book.is_empty());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("weekly".parse::<BudgetPeriod>(), Ok(BudgetPeriod::Weekly));
        assert_eq!("MONTHLY".parse::<BudgetPeriod>(), Ok(BudgetPeriod::Monthly));
        assert!("daily".parse::<BudgetPeriod>().is_err());
    }

    #[test]
    fn test_default_period_is_monthly() {
        let book: BudgetBook = serde_json::from_str(r#"{"limits":{}}"#).unwrap();
        assert_eq!(book.period, BudgetPeriod::Monthly);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut book = BudgetBook {
            period: BudgetPeriod::Weekly,
            ..Default::default()
        };
        book.set_limit("Dining", Money::from_cents(10_000));

        let json = serde_json::to_string(&book).unwrap();
        let back: BudgetBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back.period, BudgetPeriod::Weekly);
        assert_eq!(back.limits["Dining"], Money::from_cents(10_000));
    }
}
