//! # Mission Grid Test Suite
//!
//! Unified test crate for behaviour that spans subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Container on a manual clock, seeded agents/missions
//!     ├── scenarios.rs    # End-to-end claim, audit and fraud flows
//!     ├── concurrency.rs  # Racing creates, submits and reviewers
//!     └── properties.rs   # Escrow conservation, tier-ordered audit rates
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mg-tests
//! cargo test -p mg-tests integration::concurrency::
//! ```

#![allow(dead_code)]

pub mod integration;
