//! Trust policy value types.

use serde::{Deserialize, Serialize};
pub use shared_types::{Timestamp, TrustTier};

/// Why a claim was routed to audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditTrigger {
    /// Selected by tier sampling.
    Random,
    /// Proof content was flagged by moderation.
    SecurityFlag,
    /// Mission kind always requires human review.
    Manual,
}

impl AuditTrigger {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::SecurityFlag => "security_flag",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for AuditTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the audit routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditDecision {
    /// Approve without review.
    Skip,
    /// Open an audit with the given trigger.
    Audit(AuditTrigger),
}

impl AuditDecision {
    /// Whether the claim goes to audit.
    #[must_use]
    pub fn is_audit(&self) -> bool {
        matches!(self, Self::Audit(_))
    }

    /// Trigger, when audited.
    #[must_use]
    pub fn trigger(&self) -> Option<AuditTrigger> {
        match self {
            Self::Skip => None,
            Self::Audit(trigger) => Some(*trigger),
        }
    }
}

/// Inputs that can move an agent between tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustEvent {
    /// Ordinary fraud signal from a rejected audit.
    FraudFlag,
    /// Severe fraud signal.
    SevereFraud,
    /// Manual tier assignment.
    AdminOverride {
        /// Target tier.
        to: TrustTier,
        /// Mandatory justification.
        reason: String,
    },
    /// Probation period elapsed.
    ProbationExpired,
}

impl TrustEvent {
    /// Reason recorded on the resulting tier change.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::FraudFlag => "fraud flag".to_string(),
            Self::SevereFraud => "severe fraud".to_string(),
            Self::AdminOverride { reason, .. } => reason.clone(),
            Self::ProbationExpired => "probation expired".to_string(),
        }
    }
}

/// Classification of an audit rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FraudSignal {
    /// Quality rejection; no standing consequence.
    None,
    /// Fraud.
    Fraud,
    /// Severe fraud.
    Severe,
}

impl FraudSignal {
    /// Classify free-text reviewer notes.
    ///
    /// Case-insensitive: "severe" wins over "fraud"; anything else is a
    /// plain quality rejection.
    #[must_use]
    pub fn from_reason(reason: &str) -> Self {
        let reason = reason.to_ascii_lowercase();
        if reason.contains("severe") {
            Self::Severe
        } else if reason.contains("fraud") {
            Self::Fraud
        } else {
            Self::None
        }
    }

    /// Trust event this signal produces, if any.
    #[must_use]
    pub fn event(&self) -> Option<TrustEvent> {
        match self {
            Self::None => None,
            Self::Fraud => Some(TrustEvent::FraudFlag),
            Self::Severe => Some(TrustEvent::SevereFraud),
        }
    }

    /// Whether the signal counts against the agent.
    #[must_use]
    pub fn is_fraud(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// A tier move decided by the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTransition {
    /// Tier before.
    pub from: TrustTier,
    /// Tier after.
    pub to: TrustTier,
    /// Reason to record.
    pub reason: String,
    /// Probation end, set when `to` is probation.
    pub probation_until: Option<Timestamp>,
}
