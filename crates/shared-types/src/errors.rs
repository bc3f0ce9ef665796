//! # Error Taxonomy
//!
//! Every subsystem error enum classifies itself into one of these kinds so
//! callers (the runtime gateway, an HTTP layer) can map errors without
//! matching each variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an expected, recoverable error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input. No state change.
    Validation,
    /// Referenced entity does not exist.
    NotFound,
    /// Duplicate, capacity exceeded, wrong-state transition, self-claim or
    /// self-flag.
    Conflict,
    /// A debit would drive a balance negative.
    InsufficientFunds,
    /// Mission content rejected by moderation.
    ModerationBlocked,
    /// Caller exceeded a configured rate limit.
    RateLimited,
}

impl ErrorKind {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::InsufficientFunds => "insufficient_funds",
            Self::ModerationBlocked => "moderation_blocked",
            Self::RateLimited => "rate_limited",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every subsystem error type.
pub trait Classify {
    /// The taxonomy bucket this error belongs to.
    fn kind(&self) -> ErrorKind;
}
