//! Payment ledger: entry construction and the reconciling orchestrator

pub mod core;
pub mod entry;

pub use self::core::*;
pub use entry::*;
