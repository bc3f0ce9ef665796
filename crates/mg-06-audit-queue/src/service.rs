//! Audit Queue Service

use crate::domain::QueueStats;
use mg_05_claim_engine::{
    AgentId, Audit, AuditId, AuditTrigger, ClaimEngine, ClaimId, ClaimResult, Decision,
    ResolveOutcome,
};
use shared_types::TimeSource;
use std::sync::Arc;
use tracing::info;

/// Reviewer-facing audit queue.
pub struct AuditQueue {
    engine: Arc<ClaimEngine>,
    clock: Arc<dyn TimeSource>,
}

impl AuditQueue {
    /// Create a queue over `engine`.
    pub fn new(engine: Arc<ClaimEngine>, clock: Arc<dyn TimeSource>) -> Self {
        Self { engine, clock }
    }

    // =========================================================================
    // LISTING
    // =========================================================================

    /// Open audits, optionally for one trigger, oldest first.
    #[must_use]
    pub fn list_open(&self, trigger: Option<AuditTrigger>) -> Vec<Audit> {
        self.engine.open_audits(trigger)
    }

    /// Oldest open audit.
    #[must_use]
    pub fn next(&self, trigger: Option<AuditTrigger>) -> Option<Audit> {
        self.list_open(trigger).into_iter().next()
    }

    /// Every audit opened for a claim, oldest first.
    #[must_use]
    pub fn history(&self, claim: ClaimId) -> Vec<Audit> {
        self.engine.audits_where(|a| a.claim_id == claim)
    }

    /// Snapshot of one audit.
    pub fn get(&self, id: AuditId) -> ClaimResult<Audit> {
        self.engine.audit(id)
    }

    // =========================================================================
    // VERDICTS
    // =========================================================================

    /// Approve an audit; pays the claim.
    pub async fn approve(
        &self,
        id: AuditId,
        reviewer: AgentId,
        notes: &str,
    ) -> ClaimResult<ResolveOutcome> {
        self.engine
            .resolve_audit(id, Decision::Approve, Some(reviewer), notes)
            .await
    }

    /// Reject an audit; `reason` is required and may carry a fraud signal.
    pub async fn reject(
        &self,
        id: AuditId,
        reviewer: AgentId,
        reason: &str,
    ) -> ClaimResult<ResolveOutcome> {
        self.engine
            .resolve_audit(id, Decision::Reject, Some(reviewer), reason)
            .await
    }

    /// Resolve without a human reviewer (automated checks).
    pub async fn auto_resolve(
        &self,
        id: AuditId,
        decision: Decision,
        notes: &str,
    ) -> ClaimResult<ResolveOutcome> {
        let outcome = self.engine.resolve_audit(id, decision, None, notes).await?;
        info!(audit_id = %id, verdict = outcome.audit.verdict.as_str(), "[mg-06] Audit auto-resolved");
        Ok(outcome)
    }

    // =========================================================================
    // STATS
    // =========================================================================

    /// Queue statistics as of now.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let audits = self.engine.audits_where(|_| true);
        QueueStats::collect(&audits, self.clock.now())
    }
}

impl std::fmt::Debug for AuditQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditQueue")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
