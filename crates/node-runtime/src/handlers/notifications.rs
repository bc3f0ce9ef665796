//! # Notification Handler
//!
//! Consumes every bus event, logs it and keeps the Prometheus counters in
//! step. Handlers only observe; nothing in the core waits on them.

use mission_telemetry::{
    AUDITS_OPENED, AUDITS_RESOLVED, CLAIMS_CREATED, CLAIMS_REJECTED, CLAIMS_VERIFIED,
    EVENT_BUS_MESSAGES_RECEIVED, LEDGER_REWARDS_CREDITED, MISSIONS_PAUSED, MISSION_EVENTS,
    TIER_CHANGES,
};
use shared_bus::{CoreEvent, EventFilter, InMemoryEventBus, Subscription};
use shared_types::Currency;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Stable label for an event variant.
fn event_type(event: &CoreEvent) -> &'static str {
    match event {
        CoreEvent::TierChanged { .. } => "tier_changed",
        CoreEvent::MissionCreated { .. } => "mission_created",
        CoreEvent::MissionPaused { .. } => "mission_paused",
        CoreEvent::MissionActivated { .. } => "mission_activated",
        CoreEvent::MissionCompleted { .. } => "mission_completed",
        CoreEvent::MissionCancelled { .. } => "mission_cancelled",
        CoreEvent::ClaimCreated { .. } => "claim_created",
        CoreEvent::ProofSubmitted { .. } => "proof_submitted",
        CoreEvent::ClaimVerified { .. } => "claim_verified",
        CoreEvent::ClaimRejected { .. } => "claim_rejected",
        CoreEvent::ClaimExpired { .. } => "claim_expired",
        CoreEvent::AuditOpened { .. } => "audit_opened",
        CoreEvent::AuditResolved { .. } => "audit_resolved",
    }
}

/// Handler for bus notifications.
pub struct NotificationHandler {
    subscription: Subscription,
}

impl NotificationHandler {
    /// Subscribe to every event on `bus`.
    #[must_use]
    pub fn new(bus: &InMemoryEventBus) -> Self {
        Self {
            subscription: bus.subscribe(EventFilter::all()),
        }
    }

    /// Run until the bus closes or shutdown is signalled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("[runtime] Notification handler started");
        loop {
            tokio::select! {
                event = self.subscription.recv() => match event {
                    Some(event) => Self::record(&event),
                    None => {
                        warn!("[runtime] Event bus closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!(
                        missed = self.subscription.missed(),
                        "[runtime] Notification handler shutting down"
                    );
                    break;
                }
            }
        }
    }

    /// Handle everything currently buffered without waiting.
    pub fn drain(&mut self) -> usize {
        let events = self.subscription.drain();
        for event in &events {
            Self::record(event);
        }
        events.len()
    }

    /// Log one event and update its metrics.
    pub fn record(event: &CoreEvent) {
        EVENT_BUS_MESSAGES_RECEIVED
            .with_label_values(&[event_type(event)])
            .inc();

        match event {
            CoreEvent::TierChanged {
                agent_id,
                from,
                to,
                reason,
            } => {
                TIER_CHANGES.with_label_values(&[to.as_str()]).inc();
                info!(agent_id = %agent_id, from = from.as_str(), to = to.as_str(), reason = %reason, "[mg-02] Tier changed");
            }
            CoreEvent::MissionCreated {
                mission_id,
                kind,
                status,
                ..
            } => {
                MISSION_EVENTS.with_label_values(&["created"]).inc();
                info!(mission_id = %mission_id, kind = %kind, status = %status, "[mg-04] Mission created");
            }
            CoreEvent::MissionPaused { mission_id, reason } => {
                MISSIONS_PAUSED.inc();
                MISSION_EVENTS.with_label_values(&["paused"]).inc();
                warn!(mission_id = %mission_id, reason = %reason, "[mg-04] Mission paused");
            }
            CoreEvent::MissionActivated { mission_id } => {
                MISSION_EVENTS.with_label_values(&["activated"]).inc();
                info!(mission_id = %mission_id, "[mg-04] Mission activated");
            }
            CoreEvent::MissionCompleted { mission_id } => {
                MISSION_EVENTS.with_label_values(&["completed"]).inc();
                info!(mission_id = %mission_id, "[mg-04] Mission completed");
            }
            CoreEvent::MissionCancelled {
                mission_id,
                reason,
                refunded_cents,
            } => {
                MISSION_EVENTS.with_label_values(&["cancelled"]).inc();
                info!(mission_id = %mission_id, reason = %reason, refunded_cents, "[mg-04] Mission cancelled");
            }
            CoreEvent::ClaimCreated {
                claim_id,
                mission_id,
                agent_id,
            } => {
                CLAIMS_CREATED.inc();
                debug!(claim_id = %claim_id, mission_id = %mission_id, agent_id = %agent_id, "[mg-05] Claim created");
            }
            CoreEvent::ProofSubmitted { claim_id, audited } => {
                debug!(claim_id = %claim_id, audited, "[mg-05] Proof submitted");
            }
            CoreEvent::ClaimVerified {
                claim_id,
                agent_id,
                reward,
                ..
            } => {
                CLAIMS_VERIFIED.inc();
                LEDGER_REWARDS_CREDITED
                    .with_label_values(&[Currency::Xp.as_str()])
                    .inc_by(reward.xp as f64);
                LEDGER_REWARDS_CREDITED
                    .with_label_values(&[Currency::Usd.as_str()])
                    .inc_by(reward.usd_cents as f64);
                info!(claim_id = %claim_id, agent_id = %agent_id, xp = reward.xp, usd_cents = reward.usd_cents, "[mg-05] Claim verified");
            }
            CoreEvent::ClaimRejected { claim_id, reason } => {
                CLAIMS_REJECTED.with_label_values(&["rejected"]).inc();
                info!(claim_id = %claim_id, reason = %reason, "[mg-05] Claim rejected");
            }
            CoreEvent::ClaimExpired { claim_id } => {
                CLAIMS_REJECTED.with_label_values(&["expired"]).inc();
                info!(claim_id = %claim_id, "[mg-05] Claim expired");
            }
            CoreEvent::AuditOpened {
                audit_id,
                claim_id,
                trigger,
            } => {
                AUDITS_OPENED.with_label_values(&[trigger.as_str()]).inc();
                info!(audit_id = %audit_id, claim_id = %claim_id, trigger = %trigger, "[mg-06] Audit opened");
            }
            CoreEvent::AuditResolved {
                audit_id,
                claim_id,
                verdict,
                reviewer,
            } => {
                AUDITS_RESOLVED.with_label_values(&[verdict.as_str()]).inc();
                info!(audit_id = %audit_id, claim_id = %claim_id, verdict = %verdict, reviewer = ?reviewer, "[mg-06] Audit resolved");
            }
        }
    }
}
