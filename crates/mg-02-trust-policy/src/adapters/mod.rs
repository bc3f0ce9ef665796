//! # Adapters - Trust Policy

pub mod random;

pub use random::{EntropyRandom, ScriptedRandom, SeededRandom};
