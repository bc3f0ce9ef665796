//! Mission entities.

use serde::{Deserialize, Serialize};
pub use shared_types::{AgentId, MissionId, Reward, Timestamp, UsdCents};
use std::fmt;

/// What the agent is asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum MissionKind {
    /// Share or engage with a social post.
    Social,
    /// Contact a list of targets using a message template.
    Outreach {
        /// Message template sent to each target.
        template: String,
        /// Recipients (handles, emails, URLs).
        targets: Vec<String>,
    },
    /// Produce original content.
    Content,
    /// Bring in new sign-ups.
    Referral,
    /// Open-ended task; always reviewed before it goes live.
    Custom {
        /// Free-form instructions.
        instructions: String,
    },
}

impl MissionKind {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Outreach { .. } => "outreach",
            Self::Content => "content",
            Self::Referral => "referral",
            Self::Custom { .. } => "custom",
        }
    }

    /// Custom missions need admin review before going live and a manual
    /// audit for every submission.
    #[must_use]
    pub fn requires_review(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// Text carried by the kind payload, for moderation.
    #[must_use]
    pub fn payload_text(&self) -> Option<String> {
        match self {
            Self::Outreach { template, targets } => {
                Some(format!("{}\n{}", template, targets.join("\n")))
            }
            Self::Custom { instructions } => Some(instructions.clone()),
            Self::Social | Self::Content | Self::Referral => None,
        }
    }
}

/// Mission lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Waiting for admin approval.
    PendingReview,
    /// Open for claims.
    Active,
    /// Closed to new claims after community flags.
    Paused,
    /// Completion target reached.
    Completed,
    /// Cancelled, rejected at review or expired.
    Cancelled,
}

impl MissionStatus {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending_review",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further transitions out of this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Submissions against existing claims can still be paid.
    #[must_use]
    pub fn accepts_completions(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request to create a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSpec {
    /// Requester paying for the mission.
    pub creator: AgentId,
    /// Short title.
    pub title: String,
    /// Full description shown to agents.
    pub description: String,
    /// Task kind.
    pub kind: MissionKind,
    /// Reward paid per verified completion.
    pub reward: Reward,
    /// Completion target.
    pub max_claims: u32,
    /// Optional deadline (ms).
    pub expires_at: Option<Timestamp>,
}

impl MissionSpec {
    /// All free text, for moderation.
    #[must_use]
    pub fn content(&self) -> String {
        let mut text = format!("{}\n{}", self.title, self.description);
        if let Some(payload) = self.kind.payload_text() {
            text.push('\n');
            text.push_str(&payload);
        }
        text
    }
}

/// A community flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionFlag {
    /// Flagging agent.
    pub agent: AgentId,
    /// Stated reason.
    pub reason: String,
    /// When the flag was raised (ms).
    pub at: Timestamp,
}

/// Mission record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    /// Identity.
    pub id: MissionId,
    /// Requester.
    pub creator: AgentId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Task kind.
    pub kind: MissionKind,
    /// Reward per verified completion.
    pub reward: Reward,
    /// Completion target.
    pub max_claims: u32,
    /// Slots held by live or verified claims.
    pub reserved_claims: u32,
    /// Verified completions.
    pub current_claims: u32,
    /// Lifecycle status.
    pub status: MissionStatus,
    /// Distinct community flags.
    pub flags: Vec<MissionFlag>,
    /// Why the mission was paused.
    pub pause_reason: Option<String>,
    /// USD debited from the creator at creation.
    pub funded_cents: UsdCents,
    /// USD returned to the creator.
    pub refunded_cents: UsdCents,
    /// Deadline (ms).
    pub expires_at: Option<Timestamp>,
    /// Creation time (ms).
    pub created_at: Timestamp,
}

impl Mission {
    /// Number of community flags.
    #[must_use]
    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    /// Whether a new claim could reserve a slot right now.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.reserved_claims < self.max_claims
    }

    /// Deadline has passed.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// USD that has been paid out for verified completions.
    #[must_use]
    pub fn paid_cents(&self) -> UsdCents {
        self.reward.usd_cents * UsdCents::from(self.current_claims)
    }

    /// USD still held for completions that have not happened.
    #[must_use]
    pub fn unearned_cents(&self) -> UsdCents {
        self.reward.usd_cents * UsdCents::from(self.max_claims - self.current_claims)
    }
}

/// Result of recording a community flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagOutcome {
    /// Flags after this one.
    pub flag_count: usize,
    /// This flag paused the mission.
    pub paused: bool,
}

/// Slot reserved for a new claim, with what the claim needs to escrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotReservation {
    /// Mission.
    pub mission_id: MissionId,
    /// Reward to escrow on the claim.
    pub reward: Reward,
    /// Whether submissions always go to manual audit.
    pub requires_review: bool,
    /// Reserved slots after this reservation.
    pub reserved_claims: u32,
}

/// Result of a recorded completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    /// Verified completions after this one.
    pub current_claims: u32,
    /// This completion reached the target.
    pub completed: bool,
}

/// Who is acting on a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "role", content = "id")]
pub enum MissionActor {
    /// The mission creator.
    Creator(AgentId),
    /// A platform administrator.
    Admin(AgentId),
    /// Scheduled maintenance.
    System,
}
