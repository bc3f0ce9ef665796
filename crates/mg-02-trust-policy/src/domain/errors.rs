//! Trust policy errors.

use shared_types::{Classify, ErrorKind, TrustTier};
use thiserror::Error;

/// Trust policy error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrustPolicyError {
    /// Admin overrides must carry a reason.
    #[error("Admin tier override requires a non-empty reason")]
    MissingReason,

    /// Sample rates are percentages.
    #[error("Audit sample rate for {tier} must be within 0..=100, got {rate}")]
    RateOutOfRange {
        /// Tier with the bad rate.
        tier: TrustTier,
        /// Configured rate.
        rate: u8,
    },

    /// A worse tier must never be audited less often than a better one.
    #[error("Audit sample rate for {worse} ({worse_rate}) is below {better} ({better_rate})")]
    NonMonotonicRates {
        /// Better-standing tier.
        better: TrustTier,
        /// Its rate.
        better_rate: u8,
        /// Worse-standing tier.
        worse: TrustTier,
        /// Its rate.
        worse_rate: u8,
    },
}

impl Classify for TrustPolicyError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
