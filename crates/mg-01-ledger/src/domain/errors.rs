//! Ledger error types.

use super::entities::{AgentId, Currency};
use shared_types::{Classify, ErrorKind};
use thiserror::Error;

/// Ledger error type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// No account exists for the agent.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An account already exists for the agent.
    #[error("Agent already registered: {0}")]
    AgentExists(AgentId),

    /// Amounts must be strictly positive.
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    /// A debit would drive the balance negative.
    #[error("Insufficient {currency} funds for {agent}: required {required}, available {available}")]
    InsufficientFunds {
        /// Agent being debited.
        agent: AgentId,
        /// Currency of the debit.
        currency: Currency,
        /// Amount the debit needed.
        required: u64,
        /// Balance at the time of the debit.
        available: u64,
    },

    /// A credit would overflow the balance.
    #[error("Balance overflow for {agent} in {currency}")]
    BalanceOverflow {
        /// Agent being credited.
        agent: AgentId,
        /// Currency of the credit.
        currency: Currency,
    },

    /// Tier changes require a non-empty reason.
    #[error("Tier change for {0} requires a reason")]
    MissingReason(AgentId),
}

impl Classify for LedgerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::AgentNotFound(_) => ErrorKind::NotFound,
            Self::AgentExists(_) => ErrorKind::Conflict,
            Self::ZeroAmount | Self::BalanceOverflow { .. } | Self::MissingReason(_) => {
                ErrorKind::Validation
            }
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
        }
    }
}
