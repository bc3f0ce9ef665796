//! # Entity Identifiers
//!
//! Stable identities for the persisted entities: agents, missions, claims,
//! audits and ledger transactions. All are random (v4) UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0.simple())
            }
        }
    };
}

entity_id!(
    /// Identity of an agent (a participant that completes missions).
    AgentId,
    "agt"
);
entity_id!(
    /// Identity of a mission.
    MissionId,
    "msn"
);
entity_id!(
    /// Identity of a claim against a mission.
    ClaimId,
    "clm"
);
entity_id!(
    /// Identity of an audit record.
    AuditId,
    "aud"
);
entity_id!(
    /// Identity of a ledger transaction.
    TransactionId,
    "txn"
);
