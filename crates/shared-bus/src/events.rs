//! # Core Events
//!
//! Notifications published after a state transition commits. Consumers
//! (notification handler, metrics, external webhooks) only observe; no
//! subsystem depends on receiving them.

use serde::{Deserialize, Serialize};
use shared_types::{AgentId, AuditId, ClaimId, MissionId, Reward, TrustTier, UsdCents};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreEvent {
    // =========================================================================
    // SUBSYSTEM 2: TRUST POLICY
    // =========================================================================
    /// An agent's tier changed.
    TierChanged {
        /// Agent whose tier changed.
        agent_id: AgentId,
        /// Previous tier.
        from: TrustTier,
        /// New tier.
        to: TrustTier,
        /// Recorded reason.
        reason: String,
    },

    // =========================================================================
    // SUBSYSTEM 4: MISSION STORE
    // =========================================================================
    /// A mission was created.
    MissionCreated {
        /// New mission.
        mission_id: MissionId,
        /// Requester.
        creator: AgentId,
        /// Mission kind label.
        kind: String,
        /// Initial status label (`active` or `pending_review`).
        status: String,
    },

    /// A mission was paused (flag threshold reached).
    MissionPaused {
        /// Paused mission.
        mission_id: MissionId,
        /// Pause reason.
        reason: String,
    },

    /// A paused or reviewed mission became active.
    MissionActivated {
        /// Activated mission.
        mission_id: MissionId,
    },

    /// A mission reached its completion target.
    MissionCompleted {
        /// Completed mission.
        mission_id: MissionId,
    },

    /// A mission was cancelled, rejected at review or expired.
    MissionCancelled {
        /// Cancelled mission.
        mission_id: MissionId,
        /// Why the mission closed.
        reason: String,
        /// Unearned USD budget returned to the creator.
        refunded_cents: UsdCents,
    },

    // =========================================================================
    // SUBSYSTEM 5: CLAIM ENGINE
    // =========================================================================
    /// An agent claimed a mission slot.
    ClaimCreated {
        /// New claim.
        claim_id: ClaimId,
        /// Claimed mission.
        mission_id: MissionId,
        /// Claiming agent.
        agent_id: AgentId,
    },

    /// Proof was submitted for a claim.
    ProofSubmitted {
        /// Claim.
        claim_id: ClaimId,
        /// Whether the proof was routed to audit.
        audited: bool,
    },

    /// A claim was verified and its reward paid.
    ClaimVerified {
        /// Verified claim.
        claim_id: ClaimId,
        /// Mission.
        mission_id: MissionId,
        /// Rewarded agent.
        agent_id: AgentId,
        /// Reward paid.
        reward: Reward,
    },

    /// A claim reached the terminal rejected state.
    ClaimRejected {
        /// Rejected claim.
        claim_id: ClaimId,
        /// Rejection reason.
        reason: String,
    },

    /// A pending claim timed out.
    ClaimExpired {
        /// Expired claim.
        claim_id: ClaimId,
    },

    // =========================================================================
    // SUBSYSTEM 6: AUDIT QUEUE
    // =========================================================================
    /// A claim was routed to audit.
    AuditOpened {
        /// New audit.
        audit_id: AuditId,
        /// Audited claim.
        claim_id: ClaimId,
        /// Trigger label (`random`, `security_flag`, `manual`).
        trigger: String,
    },

    /// An audit was resolved.
    AuditResolved {
        /// Resolved audit.
        audit_id: AuditId,
        /// Audited claim.
        claim_id: ClaimId,
        /// Verdict label (`approved`, `rejected`).
        verdict: String,
        /// Reviewer, or `None` for automated resolution.
        reviewer: Option<AgentId>,
    },
}

impl CoreEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::TierChanged { .. } => EventTopic::Trust,
            Self::MissionCreated { .. }
            | Self::MissionPaused { .. }
            | Self::MissionActivated { .. }
            | Self::MissionCompleted { .. }
            | Self::MissionCancelled { .. } => EventTopic::Missions,
            Self::ClaimCreated { .. }
            | Self::ProofSubmitted { .. }
            | Self::ClaimVerified { .. }
            | Self::ClaimRejected { .. }
            | Self::ClaimExpired { .. } => EventTopic::Claims,
            Self::AuditOpened { .. } | Self::AuditResolved { .. } => EventTopic::Audits,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::TierChanged { .. } => 2,
            Self::MissionCreated { .. }
            | Self::MissionPaused { .. }
            | Self::MissionActivated { .. }
            | Self::MissionCompleted { .. }
            | Self::MissionCancelled { .. } => 4,
            Self::ClaimCreated { .. }
            | Self::ProofSubmitted { .. }
            | Self::ClaimVerified { .. }
            | Self::ClaimRejected { .. }
            | Self::ClaimExpired { .. } => 5,
            Self::AuditOpened { .. } | Self::AuditResolved { .. } => 6,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Subsystem 2 events.
    Trust,
    /// Subsystem 4 events.
    Missions,
    /// Subsystem 5 events.
    Claims,
    /// Subsystem 6 events.
    Audits,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &CoreEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
