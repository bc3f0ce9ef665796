//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! ## Environment Overrides
//!
//! | Variable | Default | Field |
//! |----------|---------|-------|
//! | `MG_FLAG_THRESHOLD` | `3` | `missions.flag_threshold` |
//! | `MG_MAX_CLAIMS_LIMIT` | `10000` | `missions.max_claims_limit` |
//! | `MG_CLAIM_TTL_HOURS` | `168` | `claims.claim_ttl_ms` |
//! | `MG_PROBATION_HOURS` | `336` | `trust.probation_duration_ms` |
//! | `MG_AUDIT_RATE_TRUSTED` | `5` | `trust.trusted_rate` |
//! | `MG_AUDIT_RATE_NORMAL` | `10` | `trust.normal_rate` |
//! | `MG_AUDIT_RATE_PROBATION` | `50` | `trust.probation_rate` |
//! | `MG_CLAIMS_PER_HOUR` | `20` | `rate_limits.claims_per_hour` |
//! | `MG_SUBMISSIONS_PER_HOUR` | `60` | `rate_limits.submissions_per_hour` |
//! | `MG_MAINTENANCE_INTERVAL_SECS` | `60` | `maintenance.interval_secs` |
//! | `MG_MAINTENANCE_ENABLED` | `true` | `maintenance.enabled` |
//! | `MG_EVENT_BUS_CAPACITY` | `1000` | `event_bus_capacity` |
//! | `MG_RANDOM_SEED` | unset | `random_seed` |

use std::env;
use std::str::FromStr;

use mg_02_trust_policy::{TrustPolicyConfig, TrustPolicyError};
use mg_03_moderation::ModerationConfig;
use mg_04_mission_store::MissionStoreConfig;
use mg_05_claim_engine::ClaimEngineConfig;
use serde::{Deserialize, Serialize};
use shared_types::HOUR_MS;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// A numeric setting that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// Audit sample rates are out of range or not monotonic.
    #[error("Invalid trust policy: {0}")]
    Trust(#[from] TrustPolicyError),
}

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Audit sampling and tier rules.
    pub trust: TrustPolicyConfig,
    /// Mission limits and flag threshold.
    pub missions: MissionStoreConfig,
    /// Claim lifetime. Rate limits come from `rate_limits`.
    pub claims: ClaimEngineConfig,
    /// Per-agent rate limits.
    pub rate_limits: RateLimitConfig,
    /// Content screening.
    pub moderation: ModerationConfig,
    /// Background maintenance.
    pub maintenance: MaintenanceConfig,
    /// Buffered events per bus subscriber.
    pub event_bus_capacity: usize,
    /// Fixed seed for audit sampling; entropy-seeded when unset.
    pub random_seed: Option<u64>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            trust: TrustPolicyConfig::default(),
            missions: MissionStoreConfig::default(),
            claims: ClaimEngineConfig::default(),
            rate_limits: RateLimitConfig::default(),
            moderation: ModerationConfig::default(),
            maintenance: MaintenanceConfig::default(),
            event_bus_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
            random_seed: None,
        }
    }
}

/// Per-agent rate limits, counted per rolling hour window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Claims an agent may open per hour.
    pub claims_per_hour: u64,
    /// Proof submissions an agent may make per hour.
    pub submissions_per_hour: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            claims_per_hour: 20,
            submissions_per_hour: 60,
        }
    }
}

/// Background maintenance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Run the periodic maintenance loop.
    pub enabled: bool,
    /// Seconds between passes.
    pub interval_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `MG_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = parse::<usize>(&lookup, "MG_FLAG_THRESHOLD")? {
            config.missions.flag_threshold = v;
        }
        if let Some(v) = parse::<u32>(&lookup, "MG_MAX_CLAIMS_LIMIT")? {
            config.missions.max_claims_limit = v;
        }
        if let Some(hours) = parse::<u64>(&lookup, "MG_CLAIM_TTL_HOURS")? {
            config.claims.claim_ttl_ms = hours.saturating_mul(HOUR_MS);
        }
        if let Some(hours) = parse::<u64>(&lookup, "MG_PROBATION_HOURS")? {
            config.trust.probation_duration_ms = hours.saturating_mul(HOUR_MS);
        }
        if let Some(v) = parse::<u8>(&lookup, "MG_AUDIT_RATE_TRUSTED")? {
            config.trust.trusted_rate = v;
        }
        if let Some(v) = parse::<u8>(&lookup, "MG_AUDIT_RATE_NORMAL")? {
            config.trust.normal_rate = v;
        }
        if let Some(v) = parse::<u8>(&lookup, "MG_AUDIT_RATE_PROBATION")? {
            config.trust.probation_rate = v;
        }
        if let Some(v) = parse::<u64>(&lookup, "MG_CLAIMS_PER_HOUR")? {
            config.rate_limits.claims_per_hour = v;
        }
        if let Some(v) = parse::<u64>(&lookup, "MG_SUBMISSIONS_PER_HOUR")? {
            config.rate_limits.submissions_per_hour = v;
        }
        if let Some(v) = parse::<u64>(&lookup, "MG_MAINTENANCE_INTERVAL_SECS")? {
            config.maintenance.interval_secs = v;
        }
        if let Some(v) = parse_flag(&lookup, "MG_MAINTENANCE_ENABLED")? {
            config.maintenance.enabled = v;
        }
        if let Some(v) = parse::<usize>(&lookup, "MG_EVENT_BUS_CAPACITY")? {
            config.event_bus_capacity = v;
        }
        if let Some(v) = parse::<u64>(&lookup, "MG_RANDOM_SEED")? {
            config.random_seed = Some(v);
        }

        Ok(config)
    }

    /// Reject settings the subsystems cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.trust.validate()?;
        let positive = [
            ("missions.flag_threshold", self.missions.flag_threshold as u64),
            ("missions.max_claims_limit", u64::from(self.missions.max_claims_limit)),
            ("claims.claim_ttl_ms", self.claims.claim_ttl_ms),
            ("trust.probation_duration_ms", self.trust.probation_duration_ms),
            ("rate_limits.claims_per_hour", self.rate_limits.claims_per_hour),
            (
                "rate_limits.submissions_per_hour",
                self.rate_limits.submissions_per_hour,
            ),
            ("maintenance.interval_secs", self.maintenance.interval_secs),
            ("event_bus_capacity", self.event_bus_capacity as u64),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        Ok(())
    }

    /// Claim engine settings with the node's rate limits applied.
    #[must_use]
    pub fn claim_engine_config(&self) -> ClaimEngineConfig {
        ClaimEngineConfig {
            claim_ttl_ms: self.claims.claim_ttl_ms,
            claims_per_window: self.rate_limits.claims_per_hour,
            submissions_per_window: self.rate_limits.submissions_per_hour,
            rate_window_ms: HOUR_MS,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue { key, value: raw }),
        },
    }
}
