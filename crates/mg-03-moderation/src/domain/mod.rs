//! # Domain Layer - Moderation

pub mod entities;
pub mod errors;
pub mod filter;
mod patterns;

pub use entities::*;
pub use errors::*;
pub use filter::*;
