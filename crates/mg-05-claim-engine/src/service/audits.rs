//! Audit resolution.

use super::settlement::settlement_events;
use super::trust::tier_event;
use super::ClaimEngine;
use crate::domain::*;
use crate::error::{ClaimError, ClaimResult};
use shared_bus::CoreEvent;
use tracing::info;

impl ClaimEngine {
    /// Resolve an open audit.
    ///
    /// Approval settles the claim exactly like auto-approval. Rejection
    /// returns the claim to `pending` with its slot kept; notes that read
    /// as fraud count against the agent and may move their tier.
    /// `reviewer` is `None` for automated resolution.
    pub async fn resolve_audit(
        &self,
        audit_id: AuditId,
        decision: Decision,
        reviewer: Option<AgentId>,
        notes: &str,
    ) -> ClaimResult<ResolveOutcome> {
        let notes = notes.trim();
        if decision == Decision::Reject && notes.is_empty() {
            return Err(ClaimError::MissingReason("reject an audit"));
        }

        let audit_entry = self.audit_entry(audit_id)?;
        let now = self.clock.now();

        let (outcome, events) = {
            let mut audit = audit_entry.lock();
            if !audit.is_open() {
                return Err(ClaimError::AuditAlreadyResolved(audit_id));
            }
            if let Some(reviewer) = reviewer.filter(|r| *r == audit.agent_id) {
                return Err(ClaimError::SelfReview {
                    audit: audit_id,
                    reviewer,
                });
            }

            let claim_entry = self.claim_entry(audit.claim_id)?;
            let mut claim = claim_entry.lock();
            if claim.status != ClaimStatus::Submitted || claim.open_audit != Some(audit_id) {
                return Err(ClaimError::StaleAudit {
                    audit: audit_id,
                    claim: claim.id,
                });
            }

            let mut next = claim.clone();
            let mut followups = Vec::new();
            let mut tier_change = None;
            let mut mission_completed = false;
            match decision {
                Decision::Approve => {
                    let completion = self.settle(&mut next, now)?;
                    mission_completed = completion.completed;
                    followups.extend(settlement_events(&next, completion));
                }
                Decision::Reject => {
                    next.status = ClaimStatus::Pending;
                    next.open_audit = None;
                    next.rejection_count += 1;
                    next.last_rejection = Some(notes.to_string());
                    next.pending_since = now;
                    tier_change = self.apply_fraud_signal(next.agent_id, notes, now)?;
                    followups.extend(tier_change.as_ref().map(tier_event));
                }
            }

            audit.close(decision.verdict(), reviewer, notes, now);
            *claim = next.clone();
            info!(
                audit_id = %audit_id,
                claim_id = %next.id,
                verdict = audit.verdict.as_str(),
                reviewer = ?reviewer,
                "[mg-05] Audit resolved"
            );

            let mut events = vec![CoreEvent::AuditResolved {
                audit_id,
                claim_id: next.id,
                verdict: audit.verdict.as_str().to_string(),
                reviewer,
            }];
            events.extend(followups);
            (
                ResolveOutcome {
                    audit: audit.clone(),
                    claim: next,
                    tier_change,
                    mission_completed,
                },
                events,
            )
        };

        self.events.publish_all(events).await;
        Ok(outcome)
    }
}
