//! ledgerkeep - wallet-bound personal finance ledger
//!
//! This library provides the core functionality for the ledgerkeep personal
//! finance application: a transaction ledger whose storage can be switched
//! between plaintext JSON and wallet-key encryption, with a trainable
//! category classifier, anomaly detection, and budget tracking on top.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, budgets, anomalies)
//! - `crypto`: Signature-derived keys and record encryption
//! - `session`: Wallet session state and the signing collaborator trait
//! - `storage`: Dual-encoded JSON file storage layer
//! - `cache`: Shared auto-unlocking transaction cache
//! - `classifier`: Trainable keyword classifier
//! - `analysis`: Anomaly detection and budget evaluation
//! - `services`: Business logic layer
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerkeep::config::LedgerPaths;
//! use ledgerkeep::storage::Storage;
//!
//! let paths = LedgerPaths::new()?;
//! let storage = Storage::new(paths)?;
//! ```

pub mod analysis;
pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
