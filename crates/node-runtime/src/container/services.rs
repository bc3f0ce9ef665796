//! # Service Container
//!
//! Holds all subsystem instances and wires their collaborators.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Clock, Event Bus, Counter Store, Random Source (no dependencies)
//! Level 1: Ledger, Moderation Filter, Trust Policy
//! Level 2: Mission Store (ledger, filter, bus)
//! Level 3: Claim Engine (everything above)
//! Level 4: Audit Queue (claim engine)
//! ```
//!
//! ## Thread Safety
//!
//! Every service is wrapped in `Arc` and synchronizes internally; the
//! container itself is immutable after construction.

use std::sync::Arc;

use mg_01_ledger::Ledger;
use mg_02_trust_policy::{EntropyRandom, RandomSource, SeededRandom, TrustPolicy, TrustPolicyError};
use mg_03_moderation::{ModerationError, ModerationFilter};
use mg_04_mission_store::MissionStore;
use mg_05_claim_engine::{ClaimEngine, ClaimEngineDeps};
use mg_06_audit_queue::AuditQueue;
use shared_bus::InMemoryEventBus;
use shared_types::{
    IdentityOracle, InMemoryCounterStore, RateLimiter, SystemTimeSource, TimeSource,
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::container::config::{ConfigError, NodeConfig};
use crate::handlers::{Gateway, MaintenanceLoop, NotificationHandler};

/// Container construction failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operator-supplied moderation patterns did not compile.
    #[error("Moderation filter: {0}")]
    Moderation(#[from] ModerationError),

    /// Trust policy rejected its configuration.
    #[error("Trust policy: {0}")]
    Policy(#[from] TrustPolicyError),
}

/// Central container holding all subsystem instances.
pub struct ServiceContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Clock shared by every subsystem.
    pub clock: Arc<dyn TimeSource>,
    /// Event bus for notifications.
    pub event_bus: Arc<InMemoryEventBus>,
    /// Backing store for the per-agent rate limiter.
    pub counters: Arc<InMemoryCounterStore>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Agent accounts (Subsystem 1).
    pub ledger: Arc<Ledger>,
    /// Audit sampling and tier rules (Subsystem 2).
    pub policy: Arc<TrustPolicy>,
    /// Content screening (Subsystem 3).
    pub moderation: Arc<ModerationFilter>,
    /// Missions (Subsystem 4).
    pub missions: Arc<MissionStore>,
    /// Claims and audits (Subsystem 5).
    pub claims: Arc<ClaimEngine>,
    /// Reviewer queue (Subsystem 6).
    pub audits: Arc<AuditQueue>,

    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl ServiceContainer {
    /// Build the container on the wall clock.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        Self::with_clock(config, Arc::new(SystemTimeSource))
    }

    /// Build the container on an explicit clock.
    #[instrument(name = "container_init", skip_all)]
    pub fn with_clock(
        config: NodeConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;
        info!("Initializing Mission Grid service container");

        // Level 0
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(config.event_bus_capacity));
        let counters = Arc::new(InMemoryCounterStore::new());
        let random: Arc<dyn RandomSource> = match config.random_seed {
            Some(seed) => {
                info!(seed, "Audit sampling uses a fixed seed");
                Arc::new(SeededRandom::new(seed))
            }
            None => Arc::new(EntropyRandom::new()),
        };

        // Level 1
        let ledger = Arc::new(Ledger::new(clock.clone()));
        info!("  [1] Ledger initialized");
        let policy = Arc::new(TrustPolicy::new(config.trust.clone())?);
        info!("  [2] Trust policy initialized");
        let moderation = Arc::new(ModerationFilter::new(config.moderation.clone())?);
        info!("  [3] Moderation filter initialized");

        // Level 2
        let missions = Arc::new(MissionStore::new(
            ledger.clone(),
            moderation.clone(),
            event_bus.clone(),
            clock.clone(),
            config.missions.clone(),
        ));
        info!("  [4] Mission store initialized");

        // Level 3
        let claims = Arc::new(ClaimEngine::new(
            ClaimEngineDeps {
                ledger: ledger.clone(),
                missions: missions.clone(),
                policy: policy.clone(),
                moderation: moderation.clone(),
                random,
                limiter: RateLimiter::new(counters.clone(), clock.clone()),
                events: event_bus.clone(),
                clock: clock.clone(),
            },
            config.claim_engine_config(),
        ));
        info!("  [5] Claim engine initialized");

        // Level 4
        let audits = Arc::new(AuditQueue::new(claims.clone(), clock.clone()));
        info!("  [6] Audit queue initialized");

        Ok(Self {
            clock,
            event_bus,
            counters,
            ledger,
            policy,
            moderation,
            missions,
            claims,
            audits,
            config,
        })
    }

    /// Authenticated entry point over this container's services.
    #[must_use]
    pub fn gateway(&self, oracle: Arc<dyn IdentityOracle>) -> Gateway {
        Gateway::new(
            oracle,
            self.ledger.clone(),
            self.missions.clone(),
            self.claims.clone(),
        )
    }

    /// Notification handler subscribed to every bus event.
    #[must_use]
    pub fn notification_handler(&self) -> NotificationHandler {
        NotificationHandler::new(&self.event_bus)
    }

    /// Periodic maintenance task at the configured interval.
    #[must_use]
    pub fn maintenance_loop(&self) -> MaintenanceLoop {
        MaintenanceLoop::new(
            self.claims.clone(),
            self.audits.clone(),
            self.clock.clone(),
            std::time::Duration::from_secs(self.config.maintenance.interval_secs),
        )
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("agents", &self.ledger.agent_count())
            .field("missions", &self.missions.len())
            .field("claims", &self.claims.claim_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ManualClock;

    #[test]
    fn test_container_wires_rate_limits() {
        let mut config = NodeConfig::default();
        config.rate_limits.claims_per_hour = 4;
        let container = ServiceContainer::with_clock(config, Arc::new(ManualClock::new(0))).unwrap();
        assert_eq!(container.claims.config().claims_per_window, 4);
        assert_eq!(container.missions.config().flag_threshold, 3);
        assert!(container.missions.is_empty());
    }

    #[test]
    fn test_container_rejects_invalid_config() {
        let mut config = NodeConfig::default();
        config.event_bus_capacity = 0;
        let err = ServiceContainer::new(config).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::Config(ConfigError::Zero("event_bus_capacity"))
        ));
    }

    #[test]
    fn test_container_rejects_bad_moderation_pattern() {
        let mut config = NodeConfig::default();
        config.moderation.extra_blocked_patterns = vec!["(unclosed".into()];
        let err = ServiceContainer::new(config).unwrap_err();
        assert!(matches!(err, ContainerError::Moderation(_)));
    }
}
