//! # Moderation Subsystem
//!
//! **Subsystem ID:** 3
//!
//! Plain-text screening for mission descriptions and proof notes.
//!
//! | Input | Verdict | Effect |
//! |-------|---------|--------|
//! | Mission content | `blocked` | Mission creation refused |
//! | Proof content | `flagged` | Submission forced into audit, never refused |
//!
//! Proof screening errs towards false positives: a flag only costs a
//! reviewer's time.

pub mod domain;

pub use domain::*;
