//! Hard blocks, expiry and mission closure.

use super::ClaimEngine;
use crate::domain::*;
use crate::error::{ClaimError, ClaimResult};
use mg_01_ledger::TierChange;
use mg_04_mission_store::{Mission, MissionActor};
use shared_bus::CoreEvent;
use tracing::{info, warn};

/// Attempts to lock an audit/claim pair whose audit keeps changing.
const CLOSE_ATTEMPTS: usize = 3;

/// Summary of one maintenance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// Pending claims that passed their TTL.
    pub expired_claims: Vec<ClaimId>,
    /// Missions cancelled at their deadline.
    pub expired_missions: Vec<MissionId>,
    /// Live claims closed because their mission expired.
    pub closed_claims: Vec<ClaimId>,
    /// Probations returned to normal.
    pub probations_lifted: Vec<TierChange>,
}

impl MaintenanceReport {
    /// Nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired_claims.is_empty()
            && self.expired_missions.is_empty()
            && self.closed_claims.is_empty()
            && self.probations_lifted.is_empty()
    }
}

/// How a claim reached `rejected`.
#[derive(Clone, Copy)]
enum Closure<'a> {
    Blocked { admin: AgentId, reason: &'a str },
    Expired,
    MissionClosed { reason: &'a str },
}

impl Closure<'_> {
    fn reason(&self) -> &str {
        match self {
            Self::Blocked { reason, .. } | Self::MissionClosed { reason } => *reason,
            Self::Expired => "claim expired",
        }
    }

    fn reviewer(&self) -> Option<AgentId> {
        match self {
            Self::Blocked { admin, .. } => Some(*admin),
            Self::Expired | Self::MissionClosed { .. } => None,
        }
    }
}

impl ClaimEngine {
    /// Move a claim to `rejected` if `eligible` holds under its lock.
    ///
    /// Releases the mission slot, rejects any open audit and frees the pair
    /// index. Returns `Ok(None)` when the claim is not eligible.
    fn close_claim(
        &self,
        claim_id: ClaimId,
        closure: Closure<'_>,
        eligible: impl Fn(&Claim) -> bool,
    ) -> ClaimResult<Option<ClosedClaim>> {
        let claim_entry = self.claim_entry(claim_id)?;
        for _ in 0..CLOSE_ATTEMPTS {
            // Audit locks come before claim locks; read the audit id first
            // and confirm it once both are held.
            let audit_id = claim_entry.lock().open_audit;
            let audit_entry = audit_id.map(|id| self.audit_entry(id)).transpose()?;
            let mut audit = audit_entry.as_ref().map(|entry| entry.lock());
            let mut claim = claim_entry.lock();
            if claim.open_audit != audit_id {
                continue;
            }
            if !claim.status.is_live() || !eligible(&claim) {
                return Ok(None);
            }

            self.missions.release_slot(claim.mission_id)?;
            let now = self.clock.now();
            claim.status = ClaimStatus::Rejected;
            claim.open_audit = None;
            claim.closed_at = Some(now);
            claim.last_rejection = Some(closure.reason().to_string());
            if let Some(audit) = audit.as_mut() {
                audit.close(AuditVerdict::Rejected, closure.reviewer(), closure.reason(), now);
            }
            let key = (claim.mission_id, claim.agent_id);
            self.pairs.remove_if(&key, |_, id| *id == claim_id);

            return Ok(Some(ClosedClaim {
                claim: claim.clone(),
                audit: audit.as_deref().cloned(),
            }));
        }
        let status = claim_entry.lock().status;
        Err(ClaimError::InvalidTransition {
            claim: claim_id,
            status,
            operation: "close",
        })
    }

    fn closure_events(closed: &ClosedClaim, closure: Closure<'_>) -> Vec<CoreEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(audit) = &closed.audit {
            events.push(CoreEvent::AuditResolved {
                audit_id: audit.id,
                claim_id: closed.claim.id,
                verdict: audit.verdict.as_str().to_string(),
                reviewer: audit.reviewer,
            });
        }
        events.push(match closure {
            Closure::Expired => CoreEvent::ClaimExpired {
                claim_id: closed.claim.id,
            },
            Closure::Blocked { .. } | Closure::MissionClosed { .. } => CoreEvent::ClaimRejected {
                claim_id: closed.claim.id,
                reason: closure.reason().to_string(),
            },
        });
        events
    }

    fn live_claims_where(&self, predicate: impl Fn(&Claim) -> bool) -> Vec<ClaimId> {
        let entries: Vec<_> = self
            .claims
            .iter()
            .map(|entry| std::sync::Arc::clone(entry.value()))
            .collect();
        entries
            .into_iter()
            .filter_map(|entry| {
                let claim = entry.lock();
                (claim.status.is_live() && predicate(&claim)).then_some(claim.id)
            })
            .collect()
    }

    // =========================================================================
    // HARD BLOCK
    // =========================================================================

    /// Reject a live claim outright (admin moderation). Terminal.
    pub async fn reject_claim(
        &self,
        claim_id: ClaimId,
        admin: AgentId,
        reason: &str,
    ) -> ClaimResult<ClosedClaim> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ClaimError::MissingReason("reject a claim"));
        }
        let closure = Closure::Blocked { admin, reason };
        let Some(closed) = self.close_claim(claim_id, closure, |_| true)? else {
            let status = self.claim_entry(claim_id)?.lock().status;
            return Err(ClaimError::InvalidTransition {
                claim: claim_id,
                status,
                operation: "reject",
            });
        };
        warn!(claim_id = %claim_id, admin = %admin, reason = reason, "[mg-05] Claim blocked");
        self.events
            .publish_all(Self::closure_events(&closed, closure))
            .await;
        Ok(closed)
    }

    // =========================================================================
    // EXPIRY
    // =========================================================================

    /// Reject pending claims that have waited longer than the claim TTL.
    pub async fn expire_stale_claims(&self, now: Timestamp) -> Vec<ClaimId> {
        let ttl = self.config.claim_ttl_ms;
        let is_due = |claim: &Claim| claim.is_stale(now, ttl);
        let mut expired = Vec::new();
        let mut events = Vec::new();
        for claim_id in self.live_claims_where(is_due) {
            match self.close_claim(claim_id, Closure::Expired, is_due) {
                Ok(Some(closed)) => {
                    events.extend(Self::closure_events(&closed, Closure::Expired));
                    expired.push(claim_id);
                }
                Ok(None) => {}
                Err(e) => warn!(claim_id = %claim_id, error = %e, "[mg-05] Claim expiry failed"),
            }
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "[mg-05] Stale claims expired");
        }
        self.events.publish_all(events).await;
        expired
    }

    // =========================================================================
    // MISSION CLOSURE
    // =========================================================================

    /// Reject every live claim on a mission that no longer accepts work.
    pub async fn close_claims_for_mission(
        &self,
        mission_id: MissionId,
        reason: &str,
    ) -> Vec<ClaimId> {
        let closure = Closure::MissionClosed { reason };
        let mut closed_ids = Vec::new();
        let mut events = Vec::new();
        for claim_id in self.live_claims_where(|c| c.mission_id == mission_id) {
            match self.close_claim(claim_id, closure, |_| true) {
                Ok(Some(closed)) => {
                    events.extend(Self::closure_events(&closed, closure));
                    closed_ids.push(claim_id);
                }
                Ok(None) => {}
                Err(e) => warn!(claim_id = %claim_id, error = %e, "[mg-05] Claim closure failed"),
            }
        }
        if !closed_ids.is_empty() {
            info!(
                mission_id = %mission_id,
                count = closed_ids.len(),
                "[mg-05] Claims closed with mission"
            );
        }
        self.events.publish_all(events).await;
        closed_ids
    }

    /// Cancel a mission (refunding its unearned budget) and close its live
    /// claims.
    pub async fn cancel_mission(
        &self,
        mission_id: MissionId,
        actor: MissionActor,
        reason: &str,
    ) -> ClaimResult<(Mission, Vec<ClaimId>)> {
        let mission = self.missions.cancel(mission_id, actor, reason).await?;
        let closed = self
            .close_claims_for_mission(mission_id, &format!("mission cancelled: {reason}"))
            .await;
        Ok((mission, closed))
    }

    /// Cancel missions past their deadline and close their live claims.
    pub async fn expire_missions(&self, now: Timestamp) -> (Vec<MissionId>, Vec<ClaimId>) {
        let expired = self.missions.expire_due(now).await;
        let mut closed = Vec::new();
        for mission_id in &expired {
            closed.extend(
                self.close_claims_for_mission(*mission_id, "mission expired")
                    .await,
            );
        }
        (expired, closed)
    }

    /// One pass of every time-driven policy.
    ///
    /// Also drops rate-limit counters from windows that have closed.
    pub async fn run_maintenance(&self, now: Timestamp) -> MaintenanceReport {
        let expired_claims = self.expire_stale_claims(now).await;
        let (expired_missions, closed_claims) = self.expire_missions(now).await;
        let probations_lifted = self.lift_expired_probations(now).await;
        self.limiter.purge_expired(self.config.claim_rule());
        self.limiter.purge_expired(self.config.submit_rule());
        MaintenanceReport {
            expired_claims,
            expired_missions,
            closed_claims,
            probations_lifted,
        }
    }
}
