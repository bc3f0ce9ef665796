//! # Shared Types Crate
//!
//! Identifiers, value types and outbound ports shared by every Mission Grid
//! subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types are defined here once.
//! - **Typed Identities**: every entity has its own identifier newtype, so a
//!   `ClaimId` can never be passed where a `MissionId` is expected.
//! - **Injected Collaborators**: clocks, counter stores and the identity
//!   oracle are traits; subsystems never reach for process-wide globals.

pub mod counter_store;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod time;

pub use counter_store::{CounterStore, InMemoryCounterStore, RateLimiter, RateLimitRule};
pub use entities::*;
pub use errors::*;
pub use identity::{IdentityError, IdentityOracle, StaticIdentityOracle};
pub use ids::*;
pub use time::{ManualClock, SystemTimeSource, TimeSource, Timestamp, DAY_MS, HOUR_MS};
