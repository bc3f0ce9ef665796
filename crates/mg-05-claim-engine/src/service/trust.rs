//! Fraud signals and tier changes.

use super::ClaimEngine;
use crate::domain::{AgentId, Timestamp};
use crate::error::{ClaimError, ClaimResult};
use mg_01_ledger::{TierActor, TierChange, TierUpdate};
use mg_02_trust_policy::{FraudSignal, TrustEvent};
use shared_bus::CoreEvent;
use shared_types::TrustTier;
use tracing::{info, warn};

impl ClaimEngine {
    /// Count a fraud signal from rejection `notes` and apply the resulting
    /// tier move. Quality rejections have no effect.
    pub(super) fn apply_fraud_signal(
        &self,
        agent: AgentId,
        notes: &str,
        now: Timestamp,
    ) -> ClaimResult<Option<TierChange>> {
        let signal = FraudSignal::from_reason(notes);
        let Some(event) = signal.event() else {
            return Ok(None);
        };
        let flags = self.ledger.record_fraud_flag(agent)?;
        warn!(
            agent_id = %agent,
            signal = ?signal,
            fraud_flags = flags,
            "[mg-05] Fraud signal recorded"
        );
        self.transition(agent, &event, TierActor::System, now)
    }

    /// Ask the policy for the next tier and apply it under the account lock.
    fn transition(
        &self,
        agent: AgentId,
        event: &TrustEvent,
        actor: TierActor,
        now: Timestamp,
    ) -> ClaimResult<Option<TierChange>> {
        self.ledger.update_tier::<ClaimError, _>(agent, |current| {
            let transition = self.policy.next_tier(current.tier, event, now)?;
            Ok(transition.map(|t| TierUpdate {
                to: t.to,
                reason: t.reason,
                actor,
                probation_until: t.probation_until,
            }))
        })
    }

    /// Set an agent's tier by hand. Returns `None` if the agent is already
    /// at `to`.
    pub async fn admin_set_tier(
        &self,
        agent: AgentId,
        to: TrustTier,
        reason: &str,
        admin: AgentId,
    ) -> ClaimResult<Option<TierChange>> {
        let event = TrustEvent::AdminOverride {
            to,
            reason: reason.trim().to_string(),
        };
        let change = self.transition(agent, &event, TierActor::Admin(admin), self.clock.now())?;
        if let Some(change) = &change {
            info!(agent_id = %agent, admin = %admin, to = %change.to, "[mg-05] Tier overridden");
            self.events.publish(tier_event(change)).await;
        }
        Ok(change)
    }

    /// Return agents whose probation has run out to `normal`.
    pub async fn lift_expired_probations(&self, now: Timestamp) -> Vec<TierChange> {
        let mut changes = Vec::new();
        for agent in self.ledger.expired_probations(now) {
            match self.transition(agent, &TrustEvent::ProbationExpired, TierActor::System, now) {
                Ok(Some(change)) => changes.push(change),
                Ok(None) => {}
                Err(e) => warn!(agent_id = %agent, error = %e, "[mg-05] Probation lift failed"),
            }
        }
        if !changes.is_empty() {
            info!(count = changes.len(), "[mg-05] Probations lifted");
        }
        self.events
            .publish_all(changes.iter().map(tier_event).collect())
            .await;
        changes
    }
}

/// Notification for an applied tier change.
pub(super) fn tier_event(change: &TierChange) -> CoreEvent {
    CoreEvent::TierChanged {
        agent_id: change.agent,
        from: change.from,
        to: change.to,
        reason: change.reason.clone(),
    }
}
