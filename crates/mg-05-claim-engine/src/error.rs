//! Error types for the Claim Engine subsystem.

use crate::domain::{AgentId, AuditId, ClaimId, ClaimStatus, MissionId};
use mg_01_ledger::LedgerError;
use mg_02_trust_policy::TrustPolicyError;
use mg_04_mission_store::MissionError;
use shared_types::{Classify, ErrorKind};
use thiserror::Error;

/// Claim engine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClaimError {
    /// Claim does not exist.
    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    /// Audit does not exist.
    #[error("Audit not found: {0}")]
    AuditNotFound(AuditId),

    /// Agent already holds a live or verified claim on the mission.
    #[error("Agent {agent} already has a claim on mission {mission}")]
    DuplicateClaim { mission: MissionId, agent: AgentId },

    /// Banned agents may not open claims.
    #[error("Agent {0} is banned")]
    AgentBanned(AgentId),

    /// Per-agent rate limit exhausted.
    #[error("Rate limit exceeded for {agent} ({action})")]
    RateLimited {
        agent: AgentId,
        action: &'static str,
    },

    /// Caller does not own the claim.
    #[error("Agent {agent} does not own claim {claim}")]
    NotOwner { claim: ClaimId, agent: AgentId },

    /// Transition not allowed from the claim's status.
    #[error("Cannot {operation} claim {claim} in status {status}")]
    InvalidTransition {
        claim: ClaimId,
        status: ClaimStatus,
        operation: &'static str,
    },

    /// Audit already has a verdict.
    #[error("Audit {0} is already resolved")]
    AuditAlreadyResolved(AuditId),

    /// Audit and claim disagree (claim moved on concurrently).
    #[error("Audit {audit} is not the open audit of claim {claim}")]
    StaleAudit { audit: AuditId, claim: ClaimId },

    /// Reviewers cannot judge their own submission.
    #[error("Reviewer {reviewer} cannot resolve audit {audit} of their own claim")]
    SelfReview { audit: AuditId, reviewer: AgentId },

    /// Proof reference is empty.
    #[error("Proof reference is required")]
    EmptyProof,

    /// Rejections need a reason.
    #[error("A reason is required to {0}")]
    MissingReason(&'static str),

    /// Mission store failure.
    #[error(transparent)]
    Mission(#[from] MissionError),

    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Trust policy failure.
    #[error(transparent)]
    Policy(#[from] TrustPolicyError),
}

impl Classify for ClaimError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::ClaimNotFound(_) | Self::AuditNotFound(_) => ErrorKind::NotFound,
            Self::EmptyProof | Self::MissingReason(_) => ErrorKind::Validation,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::DuplicateClaim { .. }
            | Self::AgentBanned(_)
            | Self::NotOwner { .. }
            | Self::InvalidTransition { .. }
            | Self::AuditAlreadyResolved(_)
            | Self::StaleAudit { .. }
            | Self::SelfReview { .. } => ErrorKind::Conflict,
            Self::Mission(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Policy(e) => e.kind(),
        }
    }
}

/// Result alias for claim engine operations.
pub type ClaimResult<T> = Result<T, ClaimError>;
