//! Results returned by claim engine operations.

use super::audit::Audit;
use super::claim::Claim;
use mg_01_ledger::TierChange;
use mg_02_trust_policy::AuditDecision;

/// Result of a proof submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Claim after the submission.
    pub claim: Claim,
    /// How the submission was routed.
    pub decision: AuditDecision,
    /// Audit opened for the submission, if routed to audit.
    pub audit: Option<Audit>,
    /// The payout completed the mission.
    pub mission_completed: bool,
}

/// Result of resolving an audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Resolved audit.
    pub audit: Audit,
    /// Claim after resolution.
    pub claim: Claim,
    /// Tier change caused by a fraud rejection.
    pub tier_change: Option<TierChange>,
    /// The payout completed the mission.
    pub mission_completed: bool,
}

/// A claim moved to the terminal rejected state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedClaim {
    /// Claim after closing.
    pub claim: Claim,
    /// Audit that was open at the time, now rejected.
    pub audit: Option<Audit>,
}
