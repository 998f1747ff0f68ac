//! Analysis over the transaction history
//!
//! Pure functions: the anomaly detector and the budget evaluator both take a
//! snapshot of the transaction list and hold no state of their own.

pub mod anomaly;
pub mod budget_eval;

pub use anomaly::detect;
pub use budget_eval::{evaluate, period_start};
