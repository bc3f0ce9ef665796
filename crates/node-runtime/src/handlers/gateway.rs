//! # Gateway
//!
//! Agent-facing entry point. Every call first resolves the caller through
//! the `IdentityOracle`; the engine only ever sees the verified `AgentId`.
//! Failures are counted in `mg_subsystem_errors_total{subsystem="gateway"}`.

use std::sync::Arc;

use mg_01_ledger::{Agent, Ledger, LedgerError};
use mg_04_mission_store::{
    FlagOutcome, Mission, MissionError, MissionKind, MissionSpec, MissionStore,
};
use mg_05_claim_engine::{Claim, ClaimEngine, ClaimError, ClaimId, ProofRef, SubmitOutcome};
use mission_telemetry::SUBSYSTEM_ERRORS;
use shared_types::{
    AgentId, Classify, ErrorKind, IdentityError, IdentityOracle, MissionId, Reward, Timestamp,
    TrustTier,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Gateway failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The caller could not prove ownership of the identity.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] IdentityError),

    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Mission store failure.
    #[error(transparent)]
    Mission(#[from] MissionError),

    /// Claim engine failure.
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

impl GatewayError {
    /// Taxonomy bucket, or `None` when the caller was never identified.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Unauthenticated(_) => None,
            Self::Ledger(e) => Some(e.kind()),
            Self::Mission(e) => Some(e.kind()),
            Self::Claim(e) => Some(e.kind()),
        }
    }

    /// Stable label for metrics and transport status mapping.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.kind().map_or("unauthenticated", |kind| kind.as_str())
    }
}

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Caller identity and its ownership proof (signature, session token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Wallet address or session identity.
    pub identity: String,
    /// Proof of ownership.
    pub proof: String,
}

impl Credentials {
    /// Bundle an identity with its proof.
    pub fn new(identity: impl Into<String>, proof: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            proof: proof.into(),
        }
    }
}

/// Mission fields supplied by a requester; the creator is the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionRequest {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Task kind.
    pub kind: MissionKind,
    /// Reward per verified completion.
    pub reward: Reward,
    /// Completion target.
    pub max_claims: u32,
    /// Optional deadline (ms).
    pub expires_at: Option<Timestamp>,
}

impl MissionRequest {
    fn into_spec(self, creator: AgentId) -> MissionSpec {
        MissionSpec {
            creator,
            title: self.title,
            description: self.description,
            kind: self.kind,
            reward: self.reward,
            max_claims: self.max_claims,
            expires_at: self.expires_at,
        }
    }
}

/// Authenticated facade over the ledger, mission store and claim engine.
pub struct Gateway {
    oracle: Arc<dyn IdentityOracle>,
    ledger: Arc<Ledger>,
    missions: Arc<MissionStore>,
    claims: Arc<ClaimEngine>,
}

impl Gateway {
    /// Create a gateway.
    pub fn new(
        oracle: Arc<dyn IdentityOracle>,
        ledger: Arc<Ledger>,
        missions: Arc<MissionStore>,
        claims: Arc<ClaimEngine>,
    ) -> Self {
        Self {
            oracle,
            ledger,
            missions,
            claims,
        }
    }

    async fn authenticate(&self, credentials: &Credentials) -> GatewayResult<AgentId> {
        let agent = self
            .oracle
            .verify_ownership(&credentials.identity, &credentials.proof)
            .await?;
        debug!(identity = %credentials.identity, agent_id = %agent, "[gateway] Caller authenticated");
        Ok(agent)
    }

    fn observe<T>(operation: &'static str, result: GatewayResult<T>) -> GatewayResult<T> {
        if let Err(e) = &result {
            SUBSYSTEM_ERRORS
                .with_label_values(&["gateway", e.label()])
                .inc();
            warn!(operation, kind = e.label(), error = %e, "[gateway] Request failed");
        }
        result
    }

    // =========================================================================
    // AGENTS
    // =========================================================================

    /// Open an account for the caller at the default tier, or return the
    /// existing one.
    pub async fn enroll(&self, credentials: &Credentials) -> GatewayResult<Agent> {
        let result = async {
            let agent = self.authenticate(credentials).await?;
            match self.ledger.register_agent(agent, TrustTier::default()) {
                Ok(snapshot) => {
                    info!(agent_id = %agent, "[gateway] Agent enrolled");
                    Ok(snapshot)
                }
                Err(LedgerError::AgentExists(_)) => Ok(self.ledger.agent(agent)?),
                Err(e) => Err(e.into()),
            }
        }
        .await;
        Self::observe("enroll", result)
    }

    /// The caller's account.
    pub async fn me(&self, credentials: &Credentials) -> GatewayResult<Agent> {
        let result = async {
            let agent = self.authenticate(credentials).await?;
            Ok(self.ledger.agent(agent)?)
        }
        .await;
        Self::observe("me", result)
    }

    // =========================================================================
    // MISSIONS
    // =========================================================================

    /// Create a mission paid for by the caller.
    pub async fn create_mission(
        &self,
        credentials: &Credentials,
        request: MissionRequest,
    ) -> GatewayResult<Mission> {
        let result = async {
            let creator = self.authenticate(credentials).await?;
            Ok(self.missions.create(request.into_spec(creator)).await?)
        }
        .await;
        Self::observe("create_mission", result)
    }

    /// Flag a mission as the caller.
    pub async fn flag_mission(
        &self,
        credentials: &Credentials,
        mission: MissionId,
        reason: &str,
    ) -> GatewayResult<FlagOutcome> {
        let result = async {
            let agent = self.authenticate(credentials).await?;
            Ok(self.missions.flag(mission, agent, reason).await?)
        }
        .await;
        Self::observe("flag_mission", result)
    }

    // =========================================================================
    // CLAIMS
    // =========================================================================

    /// Claim a mission slot as the caller.
    pub async fn create_claim(
        &self,
        credentials: &Credentials,
        mission: MissionId,
    ) -> GatewayResult<Claim> {
        let result = async {
            let agent = self.authenticate(credentials).await?;
            Ok(self.claims.create_claim(mission, agent).await?)
        }
        .await;
        Self::observe("create_claim", result)
    }

    /// Submit proof for one of the caller's claims.
    pub async fn submit_proof(
        &self,
        credentials: &Credentials,
        claim: ClaimId,
        proof: ProofRef,
    ) -> GatewayResult<SubmitOutcome> {
        let result = async {
            let agent = self.authenticate(credentials).await?;
            Ok(self.claims.submit_proof(claim, agent, proof).await?)
        }
        .await;
        Self::observe("submit_proof", result)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{NodeConfig, ServiceContainer};
    use mg_01_ledger::{LedgerAction, TxRefs};
    use mg_05_claim_engine::ClaimStatus;
    use shared_types::{Currency, ManualClock, StaticIdentityOracle};

    struct Fixture {
        container: ServiceContainer,
        gateway: Gateway,
        oracle: Arc<StaticIdentityOracle>,
    }

    fn fixture() -> Fixture {
        let mut config = NodeConfig::default();
        // Never sample for audit.
        config.trust.trusted_rate = 0;
        config.trust.normal_rate = 0;
        let container =
            ServiceContainer::with_clock(config, Arc::new(ManualClock::new(1_000))).unwrap();
        let oracle = Arc::new(StaticIdentityOracle::new());
        let gateway = container.gateway(oracle.clone());
        Fixture {
            container,
            gateway,
            oracle,
        }
    }

    impl Fixture {
        async fn enrolled(&self, identity: &str) -> (Credentials, AgentId) {
            let agent = AgentId::new();
            self.oracle.register(identity, "sig", agent);
            let credentials = Credentials::new(identity, "sig");
            self.gateway.enroll(&credentials).await.unwrap();
            (credentials, agent)
        }

        fn fund(&self, agent: AgentId, cents: u64) {
            self.container
                .ledger
                .credit(
                    agent,
                    Currency::Usd,
                    cents,
                    LedgerAction::AdminAdjustment,
                    TxRefs::none(),
                )
                .unwrap();
        }
    }

    fn request(max_claims: u32) -> MissionRequest {
        MissionRequest {
            title: "Share the launch post".into(),
            description: "Repost the announcement on your timeline".into(),
            kind: MissionKind::Social,
            reward: Reward::new(10, 25),
            max_claims,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_enroll_is_idempotent() {
        let f = fixture();
        let (credentials, agent) = f.enrolled("0xaaa").await;
        let again = f.gateway.enroll(&credentials).await.unwrap();
        assert_eq!(again.id, agent);
        assert_eq!(f.gateway.me(&credentials).await.unwrap().tier, TrustTier::Normal);
        assert_eq!(f.container.ledger.agent_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_proof_is_unauthenticated() {
        let f = fixture();
        let (_, _) = f.enrolled("0xaaa").await;
        let forged = Credentials::new("0xaaa", "not-the-signature");

        let err = f
            .gateway
            .create_claim(&forged, MissionId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthenticated(_)));
        assert_eq!(err.kind(), None);
        assert_eq!(err.label(), "unauthenticated");
    }

    #[tokio::test]
    async fn test_full_flow_through_gateway() {
        let f = fixture();
        let (requester, creator) = f.enrolled("0xcreator").await;
        let (worker, agent) = f.enrolled("0xworker").await;
        f.fund(creator, 1_000);

        let mission = f.gateway.create_mission(&requester, request(2)).await.unwrap();
        assert_eq!(mission.creator, creator);

        let claim = f.gateway.create_claim(&worker, mission.id).await.unwrap();
        assert_eq!(claim.agent_id, agent);

        let outcome = f
            .gateway
            .submit_proof(&worker, claim.id, ProofRef::new("https://example.com/post/1"))
            .await
            .unwrap();
        assert_eq!(outcome.claim.status, ClaimStatus::Verified);
        assert_eq!(f.gateway.me(&worker).await.unwrap().xp_balance, 10);
    }

    #[tokio::test]
    async fn test_domain_errors_keep_their_kind() {
        let f = fixture();
        let (requester, _) = f.enrolled("0xcreator").await;

        // No funds for the budget.
        let err = f
            .gateway
            .create_mission(&requester, request(2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::InsufficientFunds));

        let err = f
            .gateway
            .create_claim(&requester, MissionId::new())
            .await
            .unwrap_err();
        assert_eq!(err.label(), "not_found");
    }

    #[tokio::test]
    async fn test_flag_mission_as_caller() {
        let f = fixture();
        let (requester, creator) = f.enrolled("0xcreator").await;
        let (flagger, _) = f.enrolled("0xflagger").await;
        f.fund(creator, 1_000);
        let mission = f.gateway.create_mission(&requester, request(2)).await.unwrap();

        let outcome = f
            .gateway
            .flag_mission(&flagger, mission.id, "looks like spam")
            .await
            .unwrap();
        assert_eq!(outcome.flag_count, 1);
        assert!(!outcome.paused);

        let err = f
            .gateway
            .flag_mission(&requester, mission.id, "my own mission")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Conflict));
    }
}
