//! Read-only snapshots.

use super::ClaimEngine;
use crate::domain::*;
use crate::error::ClaimResult;
use std::sync::Arc;

impl ClaimEngine {
    /// Snapshot of a claim.
    pub fn claim(&self, id: ClaimId) -> ClaimResult<Claim> {
        Ok(self.claim_entry(id)?.lock().clone())
    }

    /// Snapshot of an audit.
    pub fn audit(&self, id: AuditId) -> ClaimResult<Audit> {
        Ok(self.audit_entry(id)?.lock().clone())
    }

    /// Claims matching `predicate`, oldest first.
    pub fn claims_where(&self, predicate: impl Fn(&Claim) -> bool) -> Vec<Claim> {
        let entries: Vec<_> = self
            .claims
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut claims: Vec<Claim> = entries
            .into_iter()
            .filter_map(|entry| {
                let claim = entry.lock();
                predicate(&claim).then(|| claim.clone())
            })
            .collect();
        claims.sort_by_key(|c| c.created_at);
        claims
    }

    /// Claims opened by an agent.
    #[must_use]
    pub fn claims_for_agent(&self, agent: AgentId) -> Vec<Claim> {
        self.claims_where(|c| c.agent_id == agent)
    }

    /// Claims on a mission.
    #[must_use]
    pub fn claims_for_mission(&self, mission: MissionId) -> Vec<Claim> {
        self.claims_where(|c| c.mission_id == mission)
    }

    /// Audits matching `predicate`, oldest first.
    pub fn audits_where(&self, predicate: impl Fn(&Audit) -> bool) -> Vec<Audit> {
        let entries: Vec<_> = self
            .audits
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut audits: Vec<Audit> = entries
            .into_iter()
            .filter_map(|entry| {
                let audit = entry.lock();
                predicate(&audit).then(|| audit.clone())
            })
            .collect();
        audits.sort_by_key(|a| a.opened_at);
        audits
    }

    /// Open audits, optionally for one trigger, oldest first.
    #[must_use]
    pub fn open_audits(&self, trigger: Option<AuditTrigger>) -> Vec<Audit> {
        self.audits_where(|a| a.is_open() && trigger.map_or(true, |t| a.trigger == t))
    }

    /// Number of claims ever created.
    #[must_use]
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Number of audits ever opened.
    #[must_use]
    pub fn audit_count(&self) -> usize {
        self.audits.len()
    }
}
