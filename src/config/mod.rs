//! Configuration and path management for ledgerkeep

pub mod paths;

pub use paths::LedgerPaths;
