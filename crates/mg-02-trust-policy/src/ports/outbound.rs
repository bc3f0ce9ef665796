//! Outbound (Driven) ports for the Trust Policy subsystem.

/// Source of uniform draws for audit sampling.
///
/// Shared across request tasks, so implementations use interior
/// mutability.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&self) -> f64;
}
