//! # Claim Engine Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! Runs the claim state machine and settles rewards.
//!
//! ```text
//!            create_claim
//!                 │
//!                 ▼
//!   ┌────────▶ pending ──────submit_proof──────▶ submitted
//!   │             │                                 │
//!   │   ttl / hard block / mission closed    ┌──────┴───────┐
//!   │             │                    auto-approve      audit opened
//!   │             ▼                          │              │
//!   │         rejected ◀──hard block──────────┼──────────────┤
//!   │                                        ▼              │
//!   │                                    verified ◀─approve─┤
//!   └──────────────────audit reject─────────────────────────┘
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | One live or verified claim per (mission, agent) | `service/claims.rs` - pair index |
//! | INVARIANT-2 | Escrow fixed at creation | `domain/claim.rs` - `Claim::escrow` |
//! | INVARIANT-3 | Exactly one of auto-approve / audit per submission | `service/claims.rs` - `submit_proof()` |
//! | INVARIANT-4 | Reward credit and completion commit together | `service/settlement.rs` |
//! | INVARIANT-5 | An audit resolves once | `service/audits.rs` - `resolve_audit()` |
//!
//! ## Locking
//!
//! Lock order is audit → claim → mission → agent account. Every transition
//! checks its entry state under the claim lock and works on a copy of the
//! claim that is written back only after every fallible step succeeded.
//! Notifications are published after all locks are released.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::*;
pub use error::{ClaimError, ClaimResult};
pub use service::{ClaimEngine, ClaimEngineConfig, ClaimEngineDeps, MaintenanceReport};
