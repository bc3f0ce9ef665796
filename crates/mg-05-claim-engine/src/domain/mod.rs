//! # Domain Layer - Claim Engine

pub mod audit;
pub mod claim;
pub mod outcome;

pub use audit::*;
pub use claim::*;
pub use outcome::*;
