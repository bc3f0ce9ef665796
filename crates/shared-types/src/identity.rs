//! # Identity Oracle Port
//!
//! Ownership proofs (wallet signatures, session tokens) are verified outside
//! the core. The engine only ever sees the resulting `AgentId`.

use crate::ids::AgentId;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

/// Identity verification failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The proof does not establish ownership of the identity.
    #[error("Ownership proof rejected for identity {0}")]
    Rejected(String),

    /// The oracle could not be reached.
    #[error("Identity oracle unavailable: {0}")]
    Unavailable(String),
}

/// Verifies that a caller owns an identity (wallet address, session).
#[async_trait]
pub trait IdentityOracle: Send + Sync {
    /// Returns the agent bound to `identity` if `proof` is valid.
    async fn verify_ownership(&self, identity: &str, proof: &str)
        -> Result<AgentId, IdentityError>;
}

/// Oracle backed by a fixed table of `(identity, proof) -> agent`.
///
/// Used by tests and local development; production deployments plug in a
/// signature or session verifier.
#[derive(Debug, Default)]
pub struct StaticIdentityOracle {
    entries: RwLock<HashMap<String, (String, AgentId)>>,
}

impl StaticIdentityOracle {
    /// Creates an empty oracle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `identity` to `agent`, accepting `proof` as its credential.
    pub fn register(&self, identity: impl Into<String>, proof: impl Into<String>, agent: AgentId) {
        self.entries
            .write()
            .insert(identity.into(), (proof.into(), agent));
    }
}

#[async_trait]
impl IdentityOracle for StaticIdentityOracle {
    async fn verify_ownership(
        &self,
        identity: &str,
        proof: &str,
    ) -> Result<AgentId, IdentityError> {
        match self.entries.read().get(identity) {
            Some((expected, agent)) if expected == proof => Ok(*agent),
            _ => Err(IdentityError::Rejected(identity.to_string())),
        }
    }
}
