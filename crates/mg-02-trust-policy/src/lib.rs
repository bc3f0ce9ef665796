//! # Trust Policy Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Pure decision logic for agent trust: how often each tier is audited,
//! which tier an agent moves to after a fraud signal, an admin override or
//! the end of probation, and how free-text rejection reasons classify as
//! fraud signals. Holds no state of its own; the ledger stores tiers.
//!
//! ## Tier Ladder
//!
//! ```text
//! trusted ──fraud──▶ probation ──fraud──▶ blacklist
//! normal  ──fraud──▶ probation
//! any tier below banned ──severe fraud──▶ blacklist
//! probation ──expiry──▶ normal
//! any tier ──admin override (reason required)──▶ any tier
//! ```
//!
//! ## Sampling
//!
//! Audit sampling draws from an injected [`RandomSource`], so seeded and
//! scripted sources make sampling deterministic under test.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{EntropyRandom, ScriptedRandom, SeededRandom};
pub use domain::*;
pub use ports::RandomSource;
