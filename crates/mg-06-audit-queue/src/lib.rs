//! # Audit Queue Subsystem
//!
//! **Subsystem ID:** 6
//!
//! Reviewer-facing view over the claim engine's audits. Holds no state of
//! its own: listing reads engine snapshots and every verdict goes through
//! `ClaimEngine::resolve_audit`, so the exclusivity and self-review rules
//! live in one place.

pub mod domain;
pub mod service;

pub use domain::QueueStats;
pub use service::AuditQueue;
