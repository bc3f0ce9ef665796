//! Cross-subsystem integration suites.

pub mod harness;

mod concurrency;
mod properties;
mod scenarios;
