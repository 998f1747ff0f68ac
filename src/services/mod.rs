//! Application services
//!
//! The orchestration layer between the CLI and the storage/cache primitives.
//! [`LedgerService`] owns the transaction and classifier workflows;
//! [`EncryptionService`] owns the mode-switch lifecycle.

pub mod encryption;
pub mod ledger;

pub use encryption::{EncryptionService, EncryptionStatus};
pub use ledger::{LedgerService, TransactionPatch};
