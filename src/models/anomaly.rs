//! Anomaly records produced by the detector
//!
//! Ephemeral output: recomputed on demand from the transaction history and
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;

/// The detection rule that produced an anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    /// Two near-identical transactions close together in time
    Duplicate,
    /// An expense far above the historical mean
    HighAmount,
    /// Activity during the 02:00-06:00 window
    UnusualTime,
    /// Several sizable expenses in rapid succession
    RapidSuccession,
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::HighAmount => write!(f, "high-amount"),
            Self::UnusualTime => write!(f, "unusual-time"),
            Self::RapidSuccession => write!(f, "rapid-succession"),
        }
    }
}

/// How strongly a flag should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A single detector flag referencing one transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Which rule fired
    pub kind: AnomalyKind,

    /// The transaction this flag refers to
    pub transaction_id: TransactionId,

    pub severity: Severity,

    /// Human-readable explanation
    pub message: String,

    /// When this flag was generated
    pub detected_at: DateTime<Utc>,
}

impl Anomaly {
    /// Create a new anomaly flag stamped with the current time
    pub fn new(
        kind: AnomalyKind,
        transaction_id: TransactionId,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            transaction_id,
            severity,
            message: message.into(),
            detected_at: Utc::now(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AnomalyKind::HighAmount.to_string(), "high-amount");
        assert_eq!(AnomalyKind::RapidSuccession.to_string(), "rapid-succession");
    }

    #[test]
    fn test_anomaly_display() {
        let a = Anomaly::new(
            AnomalyKind::Duplicate,
            TransactionId::new(),
            Severity::Medium,
            "possible duplicate",
        );
        assert_eq!(a.to_string(), "[medium] duplicate: possible duplicate");
    }
}
