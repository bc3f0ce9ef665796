//! Mission Store Service
//!
//! Per-mission locked records. Slot and completion operations are
//! synchronous so the claim engine can run them inside its own claim lock;
//! lifecycle operations publish their notification once the mission lock
//! is released.

use crate::domain::*;
use crate::error::{MissionError, MissionResult};
use dashmap::DashMap;
use mg_01_ledger::{LedgerAction, LedgerApi, TxRefs};
use mg_03_moderation::ModerationFilter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_bus::{CoreEvent, EventPublisher};
use shared_types::{Currency, TimeSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mission store configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionStoreConfig {
    /// Distinct flags that auto-pause an active mission.
    pub flag_threshold: usize,
    /// Largest completion target accepted.
    pub max_claims_limit: u32,
    /// Longest title accepted (characters).
    pub max_title_len: usize,
    /// Longest description accepted (characters).
    pub max_description_len: usize,
}

impl Default for MissionStoreConfig {
    fn default() -> Self {
        Self {
            flag_threshold: 3,
            max_claims_limit: 10_000,
            max_title_len: 200,
            max_description_len: 10_000,
        }
    }
}

/// Mission store.
pub struct MissionStore {
    missions: DashMap<MissionId, Arc<Mutex<Mission>>>,
    ledger: Arc<dyn LedgerApi>,
    moderation: Arc<ModerationFilter>,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    config: MissionStoreConfig,
}

impl MissionStore {
    /// Create an empty store.
    pub fn new(
        ledger: Arc<dyn LedgerApi>,
        moderation: Arc<ModerationFilter>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn TimeSource>,
        config: MissionStoreConfig,
    ) -> Self {
        Self {
            missions: DashMap::new(),
            ledger,
            moderation,
            events,
            clock,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MissionStoreConfig {
        &self.config
    }

    fn entry(&self, id: MissionId) -> MissionResult<Arc<Mutex<Mission>>> {
        self.missions
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(MissionError::NotFound(id))
    }

    fn all_entries(&self) -> Vec<Arc<Mutex<Mission>>> {
        self.missions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create a mission.
    ///
    /// Validates the request, screens its text, then debits the creator for
    /// the full USD budget. Custom missions start in `pending_review`.
    pub async fn create(&self, spec: MissionSpec) -> MissionResult<Mission> {
        let now = self.clock.now();
        validate_spec(&spec, &self.config, now)?;
        self.ledger.agent(spec.creator)?;

        let screen = self.moderation.screen_mission_content(&spec.content());
        if screen.blocked {
            return Err(MissionError::ModerationBlocked {
                reasons: screen.summary(),
            });
        }

        let id = MissionId::new();
        let budget = spec.reward.usd_cents * u64::from(spec.max_claims);
        if budget > 0 {
            self.ledger.debit(
                spec.creator,
                Currency::Usd,
                budget,
                LedgerAction::MissionFunding,
                TxRefs::mission(id),
            )?;
        }

        let status = if spec.kind.requires_review() {
            MissionStatus::PendingReview
        } else {
            MissionStatus::Active
        };
        let mission = Mission {
            id,
            creator: spec.creator,
            title: spec.title,
            description: spec.description,
            kind: spec.kind,
            reward: spec.reward,
            max_claims: spec.max_claims,
            reserved_claims: 0,
            current_claims: 0,
            status,
            flags: Vec::new(),
            pause_reason: None,
            funded_cents: budget,
            refunded_cents: 0,
            expires_at: spec.expires_at,
            created_at: now,
        };
        self.missions
            .insert(id, Arc::new(Mutex::new(mission.clone())));

        info!(
            mission_id = %id,
            kind = mission.kind.as_str(),
            status = %status,
            budget_cents = budget,
            "[mg-04] Mission created"
        );
        self.events
            .publish(CoreEvent::MissionCreated {
                mission_id: id,
                creator: mission.creator,
                kind: mission.kind.as_str().to_string(),
                status: status.as_str().to_string(),
            })
            .await;
        Ok(mission)
    }

    /// Approve a mission waiting for review.
    ///
    /// A mission that collected enough flags while in review goes straight
    /// to `paused`.
    pub async fn approve_review(&self, id: MissionId, admin: AgentId) -> MissionResult<Mission> {
        let (snapshot, pause_reason) = {
            let entry = self.entry(id)?;
            let mut mission = entry.lock();
            if mission.status != MissionStatus::PendingReview {
                return Err(MissionError::InvalidState {
                    id,
                    status: mission.status,
                    operation: "approve",
                });
            }
            mission.status = MissionStatus::Active;
            // Flags raised during review count as soon as it goes live.
            let pause_reason = self.auto_pause(&mut mission);
            (mission.clone(), pause_reason)
        };
        info!(mission_id = %id, admin = %admin, "[mg-04] Mission approved");
        let event = match pause_reason {
            Some(reason) => {
                warn!(mission_id = %id, reason = %reason, "[mg-04] Mission paused");
                CoreEvent::MissionPaused {
                    mission_id: id,
                    reason,
                }
            }
            None => CoreEvent::MissionActivated { mission_id: id },
        };
        self.events.publish(event).await;
        Ok(snapshot)
    }

    /// Pause an active mission that has reached the flag threshold.
    ///
    /// Returns the recorded pause reason when the mission was paused.
    fn auto_pause(&self, mission: &mut Mission) -> Option<String> {
        let flag_count = mission.flag_count();
        if mission.status != MissionStatus::Active || flag_count < self.config.flag_threshold {
            return None;
        }
        let summary = mission
            .flags
            .iter()
            .map(|f| f.reason.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let reason = format!("auto-paused after {flag_count} flags: {summary}");
        mission.status = MissionStatus::Paused;
        mission.pause_reason = Some(reason.clone());
        Some(reason)
    }

    /// Reject a mission at review; the full budget is refunded.
    pub async fn reject_review(
        &self,
        id: MissionId,
        admin: AgentId,
        reason: &str,
    ) -> MissionResult<Mission> {
        let snapshot = self.cancel_locked(
            id,
            MissionActor::Admin(admin),
            reason,
            Some(MissionStatus::PendingReview),
        )?;
        self.publish_cancelled(&snapshot, reason).await;
        Ok(snapshot)
    }

    /// Reactivate a paused mission and clear its flags.
    pub async fn resume(&self, id: MissionId, admin: AgentId) -> MissionResult<Mission> {
        let snapshot = {
            let entry = self.entry(id)?;
            let mut mission = entry.lock();
            if mission.status != MissionStatus::Paused {
                return Err(MissionError::InvalidState {
                    id,
                    status: mission.status,
                    operation: "resume",
                });
            }
            mission.status = MissionStatus::Active;
            mission.flags.clear();
            mission.pause_reason = None;
            mission.clone()
        };
        info!(mission_id = %id, admin = %admin, "[mg-04] Mission resumed");
        self.events
            .publish(CoreEvent::MissionActivated { mission_id: id })
            .await;
        Ok(snapshot)
    }

    /// Cancel a mission and refund the unearned USD budget.
    ///
    /// Live claims are not touched here; the claim engine closes them.
    pub async fn cancel(
        &self,
        id: MissionId,
        actor: MissionActor,
        reason: &str,
    ) -> MissionResult<Mission> {
        let snapshot = self.cancel_locked(id, actor, reason, None)?;
        self.publish_cancelled(&snapshot, reason).await;
        Ok(snapshot)
    }

    async fn publish_cancelled(&self, mission: &Mission, reason: &str) {
        self.events
            .publish(CoreEvent::MissionCancelled {
                mission_id: mission.id,
                reason: reason.to_string(),
                refunded_cents: mission.refunded_cents,
            })
            .await;
    }

    fn cancel_locked(
        &self,
        id: MissionId,
        actor: MissionActor,
        reason: &str,
        required: Option<MissionStatus>,
    ) -> MissionResult<Mission> {
        let entry = self.entry(id)?;
        let mut mission = entry.lock();
        if let MissionActor::Creator(agent) = actor {
            if agent != mission.creator {
                return Err(MissionError::NotPermitted { mission: id, agent });
            }
        }
        if mission.status.is_terminal() || required.is_some_and(|s| s != mission.status) {
            return Err(MissionError::InvalidState {
                id,
                status: mission.status,
                operation: "cancel",
            });
        }

        let refund = mission.unearned_cents();
        if refund > 0 {
            self.ledger.credit(
                mission.creator,
                Currency::Usd,
                refund,
                LedgerAction::MissionRefund,
                TxRefs::mission(id),
            )?;
        }
        mission.refunded_cents += refund;
        mission.status = MissionStatus::Cancelled;
        info!(
            mission_id = %id,
            actor = ?actor,
            refund_cents = refund,
            reason = reason,
            "[mg-04] Mission cancelled"
        );
        Ok(mission.clone())
    }

    /// Cancel every open mission whose deadline has passed.
    pub async fn expire_due(&self, now: Timestamp) -> Vec<MissionId> {
        let due: Vec<MissionId> = self
            .all_entries()
            .into_iter()
            .filter_map(|entry| {
                let mission = entry.lock();
                (!mission.status.is_terminal() && mission.is_expired(now)).then_some(mission.id)
            })
            .collect();

        let mut expired = Vec::with_capacity(due.len());
        for id in due {
            match self.cancel(id, MissionActor::System, "expired").await {
                Ok(_) => expired.push(id),
                // Raced with completion or a manual cancel.
                Err(MissionError::InvalidState { .. }) => {}
                Err(e) => warn!(mission_id = %id, error = %e, "[mg-04] Mission expiry failed"),
            }
        }
        expired
    }

    // =========================================================================
    // FLAGS
    // =========================================================================

    /// Record a community flag; pauses an active mission at the threshold.
    pub async fn flag(
        &self,
        id: MissionId,
        agent: AgentId,
        reason: &str,
    ) -> MissionResult<FlagOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(MissionError::Invalid("flag reason is required".into()));
        }

        let (outcome, pause_reason) = {
            let entry = self.entry(id)?;
            let mut mission = entry.lock();
            if mission.creator == agent {
                return Err(MissionError::SelfFlag { mission: id, agent });
            }
            if mission.status.is_terminal() {
                return Err(MissionError::InvalidState {
                    id,
                    status: mission.status,
                    operation: "flag",
                });
            }
            if mission.flags.iter().any(|f| f.agent == agent) {
                return Err(MissionError::DuplicateFlag { mission: id, agent });
            }

            mission.flags.push(MissionFlag {
                agent,
                reason: reason.to_string(),
                at: self.clock.now(),
            });
            let flag_count = mission.flag_count();
            let pause_reason = self.auto_pause(&mut mission);
            (
                FlagOutcome {
                    flag_count,
                    paused: pause_reason.is_some(),
                },
                pause_reason,
            )
        };

        debug!(mission_id = %id, flags = outcome.flag_count, "[mg-04] Mission flagged");
        if let Some(reason) = pause_reason {
            warn!(mission_id = %id, reason = %reason, "[mg-04] Mission paused");
            self.events
                .publish(CoreEvent::MissionPaused {
                    mission_id: id,
                    reason,
                })
                .await;
        }
        Ok(outcome)
    }

    // =========================================================================
    // SLOTS
    // =========================================================================

    /// Reserve a slot for a new claim by `agent`.
    ///
    /// The check and the reservation happen under the mission lock, so two
    /// agents racing for the last slot cannot both succeed.
    pub fn claim_slot(
        &self,
        id: MissionId,
        agent: AgentId,
        now: Timestamp,
    ) -> MissionResult<SlotReservation> {
        let entry = self.entry(id)?;
        let mut mission = entry.lock();
        if mission.creator == agent {
            return Err(MissionError::SelfClaim { mission: id, agent });
        }
        if mission.status != MissionStatus::Active {
            return Err(MissionError::NotActive {
                id,
                status: mission.status,
            });
        }
        if mission.is_expired(now) {
            return Err(MissionError::Expired(id));
        }
        if !mission.has_capacity() {
            return Err(MissionError::CapacityExceeded(id));
        }
        mission.reserved_claims += 1;
        Ok(SlotReservation {
            mission_id: id,
            reward: mission.reward,
            requires_review: mission.kind.requires_review(),
            reserved_claims: mission.reserved_claims,
        })
    }

    /// Return a reserved slot whose claim ended without completing.
    pub fn release_slot(&self, id: MissionId) -> MissionResult<u32> {
        let entry = self.entry(id)?;
        let mut mission = entry.lock();
        if mission.reserved_claims <= mission.current_claims {
            return Err(MissionError::NoReservedSlot(id));
        }
        mission.reserved_claims -= 1;
        Ok(mission.reserved_claims)
    }

    /// Record a verified completion.
    pub fn record_completion(&self, id: MissionId) -> MissionResult<CompletionOutcome> {
        self.record_completion_with(id, |_| Ok::<(), MissionError>(()))
            .map(|(_, outcome)| outcome)
    }

    /// Record a verified completion paired with `settle`.
    ///
    /// `settle` runs under the mission lock after the mission has been
    /// checked; the counter is committed only if it succeeds, so a paid
    /// reward and its completion are never observed apart.
    pub fn record_completion_with<T, E, F>(
        &self,
        id: MissionId,
        settle: F,
    ) -> Result<(T, CompletionOutcome), E>
    where
        E: From<MissionError>,
        F: FnOnce(&Mission) -> Result<T, E>,
    {
        let entry = self.entry(id)?;
        let mut mission = entry.lock();
        if !mission.status.accepts_completions() {
            return Err(MissionError::NotActive {
                id,
                status: mission.status,
            }
            .into());
        }
        if mission.current_claims >= mission.reserved_claims {
            return Err(MissionError::NoReservedSlot(id).into());
        }

        let value = settle(&mission)?;

        mission.current_claims += 1;
        let completed = mission.current_claims == mission.max_claims;
        if completed {
            mission.status = MissionStatus::Completed;
            info!(mission_id = %id, "[mg-04] Mission completed");
        }
        Ok((
            value,
            CompletionOutcome {
                current_claims: mission.current_claims,
                completed,
            },
        ))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot of a mission.
    pub fn get(&self, id: MissionId) -> MissionResult<Mission> {
        Ok(self.entry(id)?.lock().clone())
    }

    /// Missions with the given status, oldest first.
    #[must_use]
    pub fn list_by_status(&self, status: MissionStatus) -> Vec<Mission> {
        let mut missions: Vec<Mission> = self
            .all_entries()
            .into_iter()
            .filter_map(|entry| {
                let mission = entry.lock();
                (mission.status == status).then(|| mission.clone())
            })
            .collect();
        missions.sort_by_key(|m| m.created_at);
        missions
    }

    /// Number of missions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }
}

impl std::fmt::Debug for MissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MissionStore")
            .field("missions", &self.missions.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
