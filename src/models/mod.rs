//! Core data models for ledgerkeep

pub mod anomaly;
pub mod budget;
pub mod ids;
pub mod money;
pub mod transaction;

pub use anomaly::{Anomaly, AnomalyKind, Severity};
pub use budget::{BudgetBook, BudgetPeriod, BudgetReport, BudgetStatus};
pub use ids::TransactionId;
pub use money::Money;
pub use transaction::{Transaction, TransactionKind};
