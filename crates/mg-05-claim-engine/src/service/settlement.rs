//! Paying a claim.

use super::ClaimEngine;
use crate::domain::{Claim, ClaimStatus, Timestamp};
use crate::error::{ClaimError, ClaimResult};
use mg_01_ledger::TxRefs;
use mg_04_mission_store::CompletionOutcome;
use shared_bus::CoreEvent;
use tracing::info;

impl ClaimEngine {
    /// Credit the escrowed reward and record the mission completion as one
    /// step, then mark `claim` verified.
    ///
    /// The ledger credit runs under the mission lock and the completion
    /// counter is committed only if it succeeded. On error `claim` is left
    /// untouched.
    pub(super) fn settle(&self, claim: &mut Claim, now: Timestamp) -> ClaimResult<CompletionOutcome> {
        let refs = TxRefs::claim(claim.mission_id, claim.id);
        let (agent, escrow) = (claim.agent_id, claim.escrow);
        let (transactions, outcome) = self.missions.record_completion_with(
            claim.mission_id,
            |_mission| {
                self.ledger
                    .credit_reward(agent, escrow, refs)
                    .map_err(ClaimError::from)
            },
        )?;

        claim.status = ClaimStatus::Verified;
        claim.verified_at = Some(now);
        claim.open_audit = None;
        info!(
            claim_id = %claim.id,
            agent_id = %agent,
            xp = escrow.xp,
            usd_cents = escrow.usd_cents,
            transactions = transactions.len(),
            completions = outcome.current_claims,
            "[mg-05] Claim settled"
        );
        Ok(outcome)
    }
}

/// Notifications for a settled claim.
pub(super) fn settlement_events(claim: &Claim, outcome: CompletionOutcome) -> Vec<CoreEvent> {
    let mut events = vec![CoreEvent::ClaimVerified {
        claim_id: claim.id,
        mission_id: claim.mission_id,
        agent_id: claim.agent_id,
        reward: claim.escrow,
    }];
    if outcome.completed {
        events.push(CoreEvent::MissionCompleted {
            mission_id: claim.mission_id,
        });
    }
    events
}
