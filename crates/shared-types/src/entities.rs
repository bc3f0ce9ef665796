//! # Core Value Types
//!
//! Value types referenced by more than one subsystem.
//!
//! ## Clusters
//!
//! - **Money**: `Currency`, `Reward`, `UsdCents`
//! - **Reputation**: `TrustTier`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// USD amounts are carried as integer cents.
pub type UsdCents = u64;

/// Currency of a ledger balance or transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    /// Internal, non-monetary experience points.
    Xp,
    /// Monetary balance in cents.
    Usd,
}

impl Currency {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xp => "xp",
            Self::Usd => "usd",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reward amount in both currencies.
///
/// Used for mission reward schedules and for the escrow fixed on a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    /// XP part.
    pub xp: u64,
    /// USD part, in cents.
    pub usd_cents: UsdCents,
}

impl Reward {
    /// XP-only reward.
    #[must_use]
    pub fn xp(xp: u64) -> Self {
        Self { xp, usd_cents: 0 }
    }

    /// Reward with both parts.
    #[must_use]
    pub fn new(xp: u64, usd_cents: UsdCents) -> Self {
        Self { xp, usd_cents }
    }

    /// True when neither part carries value.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.xp == 0 && self.usd_cents == 0
    }

    /// Amount for a single currency.
    #[must_use]
    pub fn amount(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Xp => self.xp,
            Currency::Usd => self.usd_cents,
        }
    }
}

/// Coarse reputation bucket governing how often an agent is audited.
///
/// Variants are declared from best to worst standing; the derived `Ord`
/// follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    /// Long-standing agents with a clean record.
    Trusted,
    /// Default tier for new agents.
    Normal,
    /// Temporarily restricted after a fraud signal.
    Probation,
    /// Every submission is audited.
    Blacklist,
    /// Removed from the platform.
    Banned,
}

impl TrustTier {
    /// All tiers, best standing first.
    pub const ALL: [TrustTier; 5] = [
        TrustTier::Trusted,
        TrustTier::Normal,
        TrustTier::Probation,
        TrustTier::Blacklist,
        TrustTier::Banned,
    ];

    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::Normal => "normal",
            Self::Probation => "probation",
            Self::Blacklist => "blacklist",
            Self::Banned => "banned",
        }
    }

    /// True for tiers that may not open new claims.
    #[must_use]
    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Banned)
    }
}

impl Default for TrustTier {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for TrustTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tier label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown trust tier: {0}")]
pub struct UnknownTier(pub String);

impl FromStr for TrustTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trusted" => Ok(Self::Trusted),
            "normal" => Ok(Self::Normal),
            "probation" => Ok(Self::Probation),
            "blacklist" | "blacklisted" => Ok(Self::Blacklist),
            "banned" => Ok(Self::Banned),
            other => Err(UnknownTier(other.to_string())),
        }
    }
}
