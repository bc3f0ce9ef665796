//! # Ports Layer - Ledger Subsystem

pub mod inbound;

pub use inbound::*;
