//! # Domain Layer - Audit Queue

pub mod stats;

pub use stats::QueueStats;
