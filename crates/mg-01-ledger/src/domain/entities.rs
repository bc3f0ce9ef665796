//! Core domain entities for the Ledger subsystem.

use serde::{Deserialize, Serialize};
pub use shared_types::{
    AgentId, ClaimId, Currency, MissionId, Reward, Timestamp, TransactionId, TrustTier, UsdCents,
};

/// Why a balance changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerAction {
    /// Escrow released to an agent for a verified claim.
    ClaimReward,
    /// A requester funded a mission's USD budget.
    MissionFunding,
    /// Unearned mission budget returned to the requester.
    MissionRefund,
    /// Manual correction by an operator.
    AdminAdjustment,
    /// Funds leaving the platform (executed by an external payment rail).
    Withdrawal,
}

impl LedgerAction {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClaimReward => "claim_reward",
            Self::MissionFunding => "mission_funding",
            Self::MissionRefund => "mission_refund",
            Self::AdminAdjustment => "admin_adjustment",
            Self::Withdrawal => "withdrawal",
        }
    }
}

/// Optional entity references attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxRefs {
    /// Mission the transaction relates to.
    pub mission: Option<MissionId>,
    /// Claim the transaction relates to.
    pub claim: Option<ClaimId>,
}

impl TxRefs {
    /// No references.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Reference to a mission only.
    #[must_use]
    pub fn mission(mission: MissionId) -> Self {
        Self {
            mission: Some(mission),
            claim: None,
        }
    }

    /// Reference to a claim and its mission.
    #[must_use]
    pub fn claim(mission: MissionId, claim: ClaimId) -> Self {
        Self {
            mission: Some(mission),
            claim: Some(claim),
        }
    }
}

/// An append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction identity.
    pub id: TransactionId,
    /// Agent whose balance changed.
    pub agent: AgentId,
    /// Signed amount (positive = credit).
    pub amount: i64,
    /// Currency of the amount.
    pub currency: Currency,
    /// Action tag.
    pub action: LedgerAction,
    /// Optional mission / claim references.
    pub refs: TxRefs,
    /// When the entry was posted (ms).
    pub timestamp: Timestamp,
}

/// Snapshot of an agent account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Agent identity.
    pub id: AgentId,
    /// XP balance.
    pub xp_balance: u64,
    /// USD balance in cents.
    pub usd_balance: UsdCents,
    /// Current trust tier.
    pub tier: TrustTier,
    /// Fraud signals recorded against the agent.
    pub fraud_flags: u32,
    /// Claims the agent has opened.
    pub total_claims: u64,
    /// Claims that reached `verified`.
    pub verified_claims: u64,
    /// When the current probation ends, if on probation.
    pub probation_expires_at: Option<Timestamp>,
    /// Registration time (ms).
    pub created_at: Timestamp,
}

impl Agent {
    /// Balance for one currency.
    #[must_use]
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Xp => self.xp_balance,
            Currency::Usd => self.usd_balance,
        }
    }
}

/// Who initiated a tier change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum TierActor {
    /// The engine, reacting to a fraud signal or probation expiry.
    System,
    /// An administrator.
    Admin(AgentId),
}

/// A requested tier change, computed by the trust policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierUpdate {
    /// Target tier.
    pub to: TrustTier,
    /// Mandatory reason.
    pub reason: String,
    /// Initiator.
    pub actor: TierActor,
    /// Probation end, when moving to probation.
    pub probation_until: Option<Timestamp>,
}

/// An applied tier change (append-only history entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChange {
    /// Agent whose tier changed.
    pub agent: AgentId,
    /// Tier before the change.
    pub from: TrustTier,
    /// Tier after the change.
    pub to: TrustTier,
    /// Why the tier changed.
    pub reason: String,
    /// Initiator.
    pub actor: TierActor,
    /// When the change was applied (ms).
    pub at: Timestamp,
}
