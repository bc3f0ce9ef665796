//! # Ledger Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Tracks each agent's XP and USD balances, every balance-changing
//! transaction, and the agent's trust standing (tier, fraud flags, claim
//! counters). Every other subsystem reads and mutates agent state through
//! this crate.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Balances never go negative | `domain/ledger.rs` - `debit()` |
//! | INVARIANT-2 | Cached balance == sum of journal | `domain/ledger.rs` - `Account::post()` |
//! | INVARIANT-3 | Journal is append-only | `domain/ledger.rs` - no removal API |
//! | INVARIANT-4 | Tier changes carry a reason | `domain/ledger.rs` - `update_tier()` |
//!
//! ## Concurrency
//!
//! Each account sits behind its own `parking_lot::Mutex` inside a `DashMap`.
//! Operations on the same agent serialize; operations on different agents
//! never contend. A journal append and the cached balance update happen
//! under the same guard, so they are never observed out of sync.
//!
//! ## Module Structure
//!
//! ```text
//! domain/entities.rs - Agent, Transaction, TierChange, LedgerAction
//! domain/ledger.rs   - Ledger (per-agent locked accounts)
//! domain/errors.rs   - LedgerError
//! ports/inbound.rs   - LedgerApi (object-safe balance port)
//! ```

#![warn(missing_docs)]

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
