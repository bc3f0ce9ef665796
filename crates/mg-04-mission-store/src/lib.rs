//! # Mission Store Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Owns missions: creation (after moderation and funding), capacity
//! reservation for claims, completion progress, community flags with
//! auto-pause, review, cancellation with refunds, and expiry.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | `current_claims <= reserved_claims <= max_claims` | `service.rs` - `claim_slot()` |
//! | INVARIANT-2 | `completed` only at `current_claims == max_claims` | `service.rs` - `record_completion_with()` |
//! | INVARIANT-3 | `completed` never regresses | `domain/mission.rs` - `MissionStatus::is_terminal()` |
//! | INVARIANT-4 | Funded USD == paid + refunded | `service.rs` - `cancel()` |
//! | INVARIANT-5 | One flag per agent, never by the creator | `service.rs` - `flag()` |
//!
//! ## Locking
//!
//! One `parking_lot::Mutex` per mission inside a `DashMap`. Callers that
//! also lock a claim take the claim lock first; the ledger account lock is
//! always taken last.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::*;
pub use error::{MissionError, MissionResult};
pub use service::{MissionStore, MissionStoreConfig};
