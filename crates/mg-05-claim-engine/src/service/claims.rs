//! Claim creation and proof submission.

use super::settlement::settlement_events;
use super::ClaimEngine;
use crate::domain::*;
use crate::error::{ClaimError, ClaimResult};
use dashmap::mapref::entry::Entry;
use mg_02_trust_policy::{AuditDecision, AuditTrigger};
use mg_04_mission_store::MissionError;
use parking_lot::Mutex;
use shared_bus::CoreEvent;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl ClaimEngine {
    // =========================================================================
    // CLAIM CREATION
    // =========================================================================

    /// Claim a mission slot for `agent_id`.
    ///
    /// The pair index entry stays locked while the mission slot is reserved,
    /// so concurrent attempts by the same agent resolve to one claim. Any
    /// failure leaves no claim, no reservation and no index entry behind.
    pub async fn create_claim(
        &self,
        mission_id: MissionId,
        agent_id: AgentId,
    ) -> ClaimResult<Claim> {
        let agent = self.ledger.agent(agent_id)?;
        if agent.tier.is_banned() {
            return Err(ClaimError::AgentBanned(agent_id));
        }
        if !self
            .limiter
            .try_acquire(self.config.claim_rule(), &format!("claim:{agent_id}"))
        {
            warn!(agent_id = %agent_id, "[mg-05] Claim rate limit exceeded");
            return Err(ClaimError::RateLimited {
                agent: agent_id,
                action: "claim",
            });
        }

        let now = self.clock.now();
        let claim = match self.pairs.entry((mission_id, agent_id)) {
            Entry::Occupied(_) => {
                return Err(ClaimError::DuplicateClaim {
                    mission: mission_id,
                    agent: agent_id,
                })
            }
            Entry::Vacant(slot) => {
                let reservation = self.missions.claim_slot(mission_id, agent_id, now)?;
                if let Err(e) = self.ledger.record_claim_opened(agent_id) {
                    self.missions.release_slot(mission_id)?;
                    return Err(e.into());
                }
                let claim = Claim::new(mission_id, agent_id, reservation.reward, now);
                self.claims
                    .insert(claim.id, Arc::new(Mutex::new(claim.clone())));
                slot.insert(claim.id);
                claim
            }
        };

        info!(
            claim_id = %claim.id,
            mission_id = %mission_id,
            agent_id = %agent_id,
            "[mg-05] Claim created"
        );
        self.events
            .publish(CoreEvent::ClaimCreated {
                claim_id: claim.id,
                mission_id,
                agent_id,
            })
            .await;
        Ok(claim)
    }

    // =========================================================================
    // PROOF SUBMISSION
    // =========================================================================

    /// Submit proof for a pending claim.
    ///
    /// Routes the submission to exactly one of audit or auto-approval:
    /// flagged proof opens a `security_flag` audit, custom missions a
    /// `manual` audit, anything else is sampled by the trust policy.
    pub async fn submit_proof(
        &self,
        claim_id: ClaimId,
        agent_id: AgentId,
        proof: ProofRef,
    ) -> ClaimResult<SubmitOutcome> {
        if proof.uri.trim().is_empty() {
            return Err(ClaimError::EmptyProof);
        }
        if !self
            .limiter
            .try_acquire(self.config.submit_rule(), &format!("submit:{agent_id}"))
        {
            warn!(agent_id = %agent_id, "[mg-05] Submission rate limit exceeded");
            return Err(ClaimError::RateLimited {
                agent: agent_id,
                action: "submit",
            });
        }

        let entry = self.claim_entry(claim_id)?;
        let screen = proof
            .screenable_text()
            .map(|text| self.moderation.screen_proof_content(text))
            .unwrap_or_default();
        let now = self.clock.now();

        let (outcome, events) = {
            let mut claim = entry.lock();
            if claim.agent_id != agent_id {
                return Err(ClaimError::NotOwner {
                    claim: claim_id,
                    agent: agent_id,
                });
            }
            if claim.status != ClaimStatus::Pending {
                return Err(ClaimError::InvalidTransition {
                    claim: claim_id,
                    status: claim.status,
                    operation: "submit proof for",
                });
            }
            let mission = self.missions.get(claim.mission_id)?;
            if !mission.status.accepts_completions() {
                return Err(MissionError::NotActive {
                    id: mission.id,
                    status: mission.status,
                }
                .into());
            }

            let decision = if screen.flagged {
                AuditDecision::Audit(AuditTrigger::SecurityFlag)
            } else if mission.kind.requires_review() {
                AuditDecision::Audit(AuditTrigger::Manual)
            } else {
                let tier = self.ledger.agent(agent_id)?.tier;
                self.policy.should_audit(tier, false, self.random.as_ref())
            };

            let mut next = claim.clone();
            next.proof = Some(proof);
            next.submission_count += 1;
            next.submitted_at = Some(now);

            let mut events = Vec::with_capacity(3);
            let (audit, mission_completed) = match decision.trigger() {
                Some(trigger) => {
                    let audit = Audit::open(
                        claim_id,
                        next.mission_id,
                        agent_id,
                        trigger,
                        screen.reasons.iter().map(|r| r.as_str().to_string()).collect(),
                        now,
                    );
                    next.status = ClaimStatus::Submitted;
                    next.open_audit = Some(audit.id);
                    self.audits
                        .insert(audit.id, Arc::new(Mutex::new(audit.clone())));
                    info!(
                        claim_id = %claim_id,
                        audit_id = %audit.id,
                        trigger = %trigger,
                        "[mg-05] Submission routed to audit"
                    );
                    events.push(CoreEvent::ProofSubmitted {
                        claim_id,
                        audited: true,
                    });
                    events.push(CoreEvent::AuditOpened {
                        audit_id: audit.id,
                        claim_id,
                        trigger: trigger.as_str().to_string(),
                    });
                    (Some(audit), false)
                }
                None => {
                    let completion = self.settle(&mut next, now)?;
                    debug!(claim_id = %claim_id, "[mg-05] Submission auto-approved");
                    events.push(CoreEvent::ProofSubmitted {
                        claim_id,
                        audited: false,
                    });
                    events.extend(settlement_events(&next, completion));
                    (None, completion.completed)
                }
            };

            *claim = next.clone();
            (
                SubmitOutcome {
                    claim: next,
                    decision,
                    audit,
                    mission_completed,
                },
                events,
            )
        };

        self.events.publish_all(events).await;
        Ok(outcome)
    }
}
