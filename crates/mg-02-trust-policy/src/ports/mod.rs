//! # Ports Layer - Trust Policy

pub mod outbound;

pub use outbound::RandomSource;
