//! Audit entities.

use super::claim::{AgentId, AuditId, ClaimId, MissionId, Timestamp};
pub use mg_02_trust_policy::AuditTrigger;
use serde::{Deserialize, Serialize};

/// Audit verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditVerdict {
    /// Awaiting review.
    Pending,
    /// Claim paid.
    Approved,
    /// Claim returned to pending (or closed by a hard block).
    Rejected,
}

impl AuditVerdict {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// A reviewer's decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Pay the claim.
    Approve,
    /// Send the claim back to pending.
    Reject,
}

impl Decision {
    /// Verdict recorded for this decision.
    #[must_use]
    pub fn verdict(&self) -> AuditVerdict {
        match self {
            Self::Approve => AuditVerdict::Approved,
            Self::Reject => AuditVerdict::Rejected,
        }
    }
}

/// Audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    /// Identity.
    pub id: AuditId,
    /// Audited claim.
    pub claim_id: ClaimId,
    /// Mission of the claim.
    pub mission_id: MissionId,
    /// Agent who submitted the proof.
    pub agent_id: AgentId,
    /// Why the audit was opened.
    pub trigger: AuditTrigger,
    /// Current verdict.
    pub verdict: AuditVerdict,
    /// Reviewer, `None` for automated resolution.
    pub reviewer: Option<AgentId>,
    /// Reviewer notes.
    pub notes: Option<String>,
    /// Moderation reasons that forced the audit.
    pub moderation_reasons: Vec<String>,
    /// Opened (ms).
    pub opened_at: Timestamp,
    /// Resolved (ms).
    pub resolved_at: Option<Timestamp>,
}

impl Audit {
    pub(crate) fn open(
        claim_id: ClaimId,
        mission_id: MissionId,
        agent_id: AgentId,
        trigger: AuditTrigger,
        moderation_reasons: Vec<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: AuditId::new(),
            claim_id,
            mission_id,
            agent_id,
            trigger,
            verdict: AuditVerdict::Pending,
            reviewer: None,
            notes: None,
            moderation_reasons,
            opened_at: now,
            resolved_at: None,
        }
    }

    /// Still awaiting a verdict.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.verdict == AuditVerdict::Pending
    }

    pub(crate) fn close(
        &mut self,
        verdict: AuditVerdict,
        reviewer: Option<AgentId>,
        notes: &str,
        now: Timestamp,
    ) {
        self.verdict = verdict;
        self.reviewer = reviewer;
        self.notes = (!notes.is_empty()).then(|| notes.to_string());
        self.resolved_at = Some(now);
    }
}
