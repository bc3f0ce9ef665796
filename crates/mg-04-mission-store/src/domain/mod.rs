//! # Domain Layer - Mission Store

pub mod mission;
pub mod validation;

pub use mission::*;
pub use validation::validate_spec;
