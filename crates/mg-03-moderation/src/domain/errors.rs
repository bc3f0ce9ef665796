//! Moderation errors.

use shared_types::{Classify, ErrorKind};
use thiserror::Error;

/// Moderation error type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModerationError {
    /// A configured rule failed to compile.
    #[error("Invalid moderation pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// Entropy threshold must be positive and finite.
    #[error("Invalid entropy threshold: {0}")]
    InvalidEntropyThreshold(f64),
}

impl Classify for ModerationError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}
