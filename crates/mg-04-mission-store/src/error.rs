//! Error types for the Mission Store subsystem.

use crate::domain::{AgentId, MissionId, MissionStatus};
use mg_01_ledger::LedgerError;
use shared_types::{Classify, ErrorKind};
use thiserror::Error;

/// Mission store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MissionError {
    /// Mission does not exist.
    #[error("Mission not found: {0}")]
    NotFound(MissionId),

    /// Malformed mission request.
    #[error("Invalid mission: {0}")]
    Invalid(String),

    /// Content matched a blocking moderation rule.
    #[error("Mission content blocked: {reasons}")]
    ModerationBlocked { reasons: String },

    /// Mission is not open for new claims.
    #[error("Mission {id} is not active (status: {status})")]
    NotActive { id: MissionId, status: MissionStatus },

    /// Mission deadline has passed.
    #[error("Mission {0} has expired")]
    Expired(MissionId),

    /// Every slot is reserved.
    #[error("Mission {0} has no remaining capacity")]
    CapacityExceeded(MissionId),

    /// Creators may not claim their own mission.
    #[error("Agent {agent} created mission {mission} and cannot claim it")]
    SelfClaim { mission: MissionId, agent: AgentId },

    /// Creators may not flag their own mission.
    #[error("Agent {agent} created mission {mission} and cannot flag it")]
    SelfFlag { mission: MissionId, agent: AgentId },

    /// Agent already flagged this mission.
    #[error("Agent {agent} already flagged mission {mission}")]
    DuplicateFlag { mission: MissionId, agent: AgentId },

    /// Operation not allowed from the current status.
    #[error("Cannot {operation} mission {id} in status {status}")]
    InvalidState {
        id: MissionId,
        status: MissionStatus,
        operation: &'static str,
    },

    /// Caller is neither the creator nor an admin.
    #[error("Agent {agent} may not modify mission {mission}")]
    NotPermitted { mission: MissionId, agent: AgentId },

    /// Counter bookkeeping would break an invariant.
    #[error("Mission {0} has no reserved slot to settle")]
    NoReservedSlot(MissionId),

    /// Funding or refund failed in the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl Classify for MissionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Invalid(_) => ErrorKind::Validation,
            Self::ModerationBlocked { .. } => ErrorKind::ModerationBlocked,
            Self::NotActive { .. }
            | Self::Expired(_)
            | Self::CapacityExceeded(_)
            | Self::SelfClaim { .. }
            | Self::SelfFlag { .. }
            | Self::DuplicateFlag { .. }
            | Self::InvalidState { .. }
            | Self::NotPermitted { .. }
            | Self::NoReservedSlot(_) => ErrorKind::Conflict,
            Self::Ledger(e) => e.kind(),
        }
    }
}

/// Result alias for mission store operations.
pub type MissionResult<T> = Result<T, MissionError>;
