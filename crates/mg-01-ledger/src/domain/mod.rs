//! # Domain Layer - Ledger Subsystem
//!
//! - `entities`: Agent account snapshot, Transaction, TierChange
//! - `ledger`: the per-agent locked ledger
//! - `errors`: LedgerError

pub mod entities;
pub mod errors;
pub mod ledger;

pub use entities::*;
pub use errors::*;
pub use ledger::*;
