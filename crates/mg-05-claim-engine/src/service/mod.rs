//! # Claim Engine Service
//!
//! Split by concern:
//!
//! - `claims`: claim creation and proof submission
//! - `audits`: audit resolution
//! - `settlement`: paying a claim together with its mission completion
//! - `maintenance`: hard blocks, TTL expiry, mission closure, probation
//! - `trust`: fraud handling and admin tier overrides
//! - `queries`: read-only snapshots

mod audits;
mod claims;
mod maintenance;
mod queries;
mod settlement;
mod trust;


pub use maintenance::MaintenanceReport;

use crate::domain::*;
use crate::error::{ClaimError, ClaimResult};
use dashmap::DashMap;
use mg_01_ledger::Ledger;
use mg_02_trust_policy::{RandomSource, TrustPolicy};
use mg_03_moderation::ModerationFilter;
use mg_04_mission_store::MissionStore;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_bus::EventPublisher;
use shared_types::{RateLimitRule, RateLimiter, TimeSource, DAY_MS, HOUR_MS};
use std::sync::Arc;

/// Claim engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEngineConfig {
    /// How long a claim may stay pending before it expires (ms).
    pub claim_ttl_ms: u64,
    /// Claims an agent may open per window.
    pub claims_per_window: u64,
    /// Proof submissions an agent may make per window.
    pub submissions_per_window: u64,
    /// Rate limit window (ms).
    pub rate_window_ms: u64,
}

impl Default for ClaimEngineConfig {
    fn default() -> Self {
        Self {
            claim_ttl_ms: 7 * DAY_MS,
            claims_per_window: 20,
            submissions_per_window: 60,
            rate_window_ms: HOUR_MS,
        }
    }
}

impl ClaimEngineConfig {
    /// Rule applied to claim creation.
    #[must_use]
    pub fn claim_rule(&self) -> RateLimitRule {
        RateLimitRule::new(self.claims_per_window, self.rate_window_ms)
    }

    /// Rule applied to proof submission.
    #[must_use]
    pub fn submit_rule(&self) -> RateLimitRule {
        RateLimitRule::new(self.submissions_per_window, self.rate_window_ms)
    }
}

/// Collaborators injected into the engine.
#[derive(Clone)]
pub struct ClaimEngineDeps {
    /// Agent ledger.
    pub ledger: Arc<Ledger>,
    /// Mission store.
    pub missions: Arc<MissionStore>,
    /// Audit sampling and tier rules.
    pub policy: Arc<TrustPolicy>,
    /// Proof screening.
    pub moderation: Arc<ModerationFilter>,
    /// Audit sampling draws.
    pub random: Arc<dyn RandomSource>,
    /// Per-agent rate limits.
    pub limiter: RateLimiter,
    /// Notification sink.
    pub events: Arc<dyn EventPublisher>,
    /// Clock.
    pub clock: Arc<dyn TimeSource>,
}

/// The claim engine.
pub struct ClaimEngine {
    claims: DashMap<ClaimId, Arc<Mutex<Claim>>>,
    audits: DashMap<AuditId, Arc<Mutex<Audit>>>,
    /// Live or verified claim per (mission, agent).
    pairs: DashMap<(MissionId, AgentId), ClaimId>,
    ledger: Arc<Ledger>,
    missions: Arc<MissionStore>,
    policy: Arc<TrustPolicy>,
    moderation: Arc<ModerationFilter>,
    random: Arc<dyn RandomSource>,
    limiter: RateLimiter,
    events: Arc<dyn EventPublisher>,
    clock: Arc<dyn TimeSource>,
    config: ClaimEngineConfig,
}

impl ClaimEngine {
    /// Create an engine with no claims.
    pub fn new(deps: ClaimEngineDeps, config: ClaimEngineConfig) -> Self {
        Self {
            claims: DashMap::new(),
            audits: DashMap::new(),
            pairs: DashMap::new(),
            ledger: deps.ledger,
            missions: deps.missions,
            policy: deps.policy,
            moderation: deps.moderation,
            random: deps.random,
            limiter: deps.limiter,
            events: deps.events,
            clock: deps.clock,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClaimEngineConfig {
        &self.config
    }

    /// Mission store the engine settles against.
    #[must_use]
    pub fn missions(&self) -> &Arc<MissionStore> {
        &self.missions
    }

    /// Ledger the engine pays into.
    #[must_use]
    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    fn claim_entry(&self, id: ClaimId) -> ClaimResult<Arc<Mutex<Claim>>> {
        self.claims
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ClaimError::ClaimNotFound(id))
    }

    fn audit_entry(&self, id: AuditId) -> ClaimResult<Arc<Mutex<Audit>>> {
        self.audits
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ClaimError::AuditNotFound(id))
    }
}

impl std::fmt::Debug for ClaimEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimEngine")
            .field("claims", &self.claims.len())
            .field("audits", &self.audits.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
