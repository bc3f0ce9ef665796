//! Claim entities.

use serde::{Deserialize, Serialize};
pub use shared_types::{AgentId, AuditId, ClaimId, MissionId, Reward, Timestamp};
use std::fmt;

/// Claim lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Slot reserved, waiting for proof.
    Pending,
    /// Proof submitted, audit open.
    Submitted,
    /// Reward paid.
    Verified,
    /// Closed without payment.
    Rejected,
}

impl ClaimStatus {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Submitted => "submitted",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Still holds a slot and can progress.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Submitted)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Submitted proof: an opaque reference plus optional text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofRef {
    /// URL or content-store key; never dereferenced by the engine.
    pub uri: String,
    /// Accompanying free text, screened by moderation.
    pub text: Option<String>,
}

impl ProofRef {
    /// Proof with a reference only.
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            text: None,
        }
    }

    /// Attach accompanying text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Text moderation should look at. The reference itself is opaque.
    #[must_use]
    pub fn screenable_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}

/// Claim record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Identity.
    pub id: ClaimId,
    /// Claimed mission.
    pub mission_id: MissionId,
    /// Claiming agent.
    pub agent_id: AgentId,
    /// Lifecycle status.
    pub status: ClaimStatus,
    /// Reward fixed at creation.
    pub escrow: Reward,
    /// Latest proof.
    pub proof: Option<ProofRef>,
    /// Open audit, while submitted for review.
    pub open_audit: Option<AuditId>,
    /// Number of proofs submitted.
    pub submission_count: u32,
    /// Number of audit rejections.
    pub rejection_count: u32,
    /// Reason of the latest rejection.
    pub last_rejection: Option<String>,
    /// Creation time (ms).
    pub created_at: Timestamp,
    /// When the claim last entered `pending` (ms); drives the TTL.
    pub pending_since: Timestamp,
    /// Latest submission (ms).
    pub submitted_at: Option<Timestamp>,
    /// Verification time (ms).
    pub verified_at: Option<Timestamp>,
    /// Terminal rejection time (ms).
    pub closed_at: Option<Timestamp>,
}

impl Claim {
    pub(crate) fn new(
        mission_id: MissionId,
        agent_id: AgentId,
        escrow: Reward,
        now: Timestamp,
    ) -> Self {
        Self {
            id: ClaimId::new(),
            mission_id,
            agent_id,
            status: ClaimStatus::Pending,
            escrow,
            proof: None,
            open_audit: None,
            submission_count: 0,
            rejection_count: 0,
            last_rejection: None,
            created_at: now,
            pending_since: now,
            submitted_at: None,
            verified_at: None,
            closed_at: None,
        }
    }

    /// Pending for at least `ttl_ms`.
    #[must_use]
    pub fn is_stale(&self, now: Timestamp, ttl_ms: u64) -> bool {
        self.status == ClaimStatus::Pending && now.saturating_sub(self.pending_since) >= ttl_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claim_is_pending() {
        let claim = Claim::new(MissionId::new(), AgentId::new(), Reward::xp(5), 100);
        assert_eq!(claim.status, ClaimStatus::Pending);
        assert!(claim.status.is_live());
        assert_eq!(claim.pending_since, 100);
    }

    #[test]
    fn test_staleness() {
        let mut claim = Claim::new(MissionId::new(), AgentId::new(), Reward::xp(5), 100);
        assert!(!claim.is_stale(150, 100));
        assert!(claim.is_stale(200, 100));
        claim.status = ClaimStatus::Submitted;
        assert!(!claim.is_stale(10_000, 100));
    }

    #[test]
    fn test_proof_text() {
        let proof = ProofRef::new("https://example.com/p/1").with_text("done");
        assert_eq!(proof.screenable_text(), Some("done"));
        assert_eq!(ProofRef::new("proofs/ab12").screenable_text(), None);
        assert_eq!(
            ProofRef::new("proofs/ab12").with_text("  ").screenable_text(),
            None
        );
    }
}
