//! # Trust Policy
//!
//! Audit sampling rates per tier and the tier transition table.

use super::entities::*;
use super::errors::TrustPolicyError;
use crate::ports::RandomSource;
use serde::{Deserialize, Serialize};
use shared_types::DAY_MS;
use std::str::FromStr;
use tracing::debug;

/// Default probation length.
pub const DEFAULT_PROBATION_MS: u64 = 14 * DAY_MS;

/// Sample rate applied to tier labels that do not parse.
pub const UNKNOWN_TIER_SAMPLE_RATE: u8 = 50;

/// Policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPolicyConfig {
    /// Audit percentage for trusted agents.
    pub trusted_rate: u8,
    /// Audit percentage for normal agents.
    pub normal_rate: u8,
    /// Audit percentage for agents on probation.
    pub probation_rate: u8,
    /// Audit percentage for blacklisted agents.
    pub blacklist_rate: u8,
    /// Audit percentage for banned agents.
    pub banned_rate: u8,
    /// How long probation lasts before reverting to normal.
    pub probation_duration_ms: u64,
}

impl Default for TrustPolicyConfig {
    fn default() -> Self {
        Self {
            trusted_rate: 5,
            normal_rate: 10,
            probation_rate: 50,
            blacklist_rate: 100,
            banned_rate: 100,
            probation_duration_ms: DEFAULT_PROBATION_MS,
        }
    }
}

impl TrustPolicyConfig {
    /// Configured rate for a tier.
    #[must_use]
    pub fn rate(&self, tier: TrustTier) -> u8 {
        match tier {
            TrustTier::Trusted => self.trusted_rate,
            TrustTier::Normal => self.normal_rate,
            TrustTier::Probation => self.probation_rate,
            TrustTier::Blacklist => self.blacklist_rate,
            TrustTier::Banned => self.banned_rate,
        }
    }

    /// Rates are percentages and never decrease as standing worsens.
    pub fn validate(&self) -> Result<(), TrustPolicyError> {
        for tier in TrustTier::ALL {
            let rate = self.rate(tier);
            if rate > 100 {
                return Err(TrustPolicyError::RateOutOfRange { tier, rate });
            }
        }
        for pair in TrustTier::ALL.windows(2) {
            let (better, worse) = (pair[0], pair[1]);
            if self.rate(worse) < self.rate(better) {
                return Err(TrustPolicyError::NonMonotonicRates {
                    better,
                    better_rate: self.rate(better),
                    worse,
                    worse_rate: self.rate(worse),
                });
            }
        }
        Ok(())
    }
}

/// Stateless trust policy.
#[derive(Debug, Clone, Default)]
pub struct TrustPolicy {
    config: TrustPolicyConfig,
}

impl TrustPolicy {
    /// Create a policy from validated configuration.
    pub fn new(config: TrustPolicyConfig) -> Result<Self, TrustPolicyError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TrustPolicyConfig {
        &self.config
    }

    /// Audit percentage for a tier.
    #[must_use]
    pub fn audit_sample_rate(&self, tier: TrustTier) -> u8 {
        self.config.rate(tier)
    }

    /// Audit percentage for a stored tier label; unknown labels get 50.
    #[must_use]
    pub fn audit_sample_rate_for_label(&self, label: &str) -> u8 {
        TrustTier::from_str(label)
            .map(|tier| self.audit_sample_rate(tier))
            .unwrap_or(UNKNOWN_TIER_SAMPLE_RATE)
    }

    /// Decide whether a submission is audited.
    ///
    /// Flagged content is always audited. Otherwise one uniform draw is
    /// taken and the claim is audited iff it falls below `rate / 100`.
    pub fn should_audit(
        &self,
        tier: TrustTier,
        content_flagged: bool,
        rng: &dyn RandomSource,
    ) -> AuditDecision {
        if content_flagged {
            return AuditDecision::Audit(AuditTrigger::SecurityFlag);
        }
        let rate = self.audit_sample_rate(tier);
        let draw = rng.next_unit();
        let sampled = draw < f64::from(rate) / 100.0;
        debug!(
            tier = %tier,
            rate = rate,
            draw = draw,
            sampled = sampled,
            "[mg-02] Audit sampling"
        );
        if sampled {
            AuditDecision::Audit(AuditTrigger::Random)
        } else {
            AuditDecision::Skip
        }
    }

    /// Compute the tier transition for an event.
    ///
    /// Returns `Ok(None)` when the event leaves the tier unchanged.
    pub fn next_tier(
        &self,
        current: TrustTier,
        event: &TrustEvent,
        now: Timestamp,
    ) -> Result<Option<TierTransition>, TrustPolicyError> {
        let to = match event {
            TrustEvent::FraudFlag => match current {
                TrustTier::Trusted | TrustTier::Normal => Some(TrustTier::Probation),
                TrustTier::Probation => Some(TrustTier::Blacklist),
                TrustTier::Blacklist | TrustTier::Banned => None,
            },
            TrustEvent::SevereFraud => {
                (current < TrustTier::Blacklist).then_some(TrustTier::Blacklist)
            }
            TrustEvent::AdminOverride { to, reason } => {
                if reason.trim().is_empty() {
                    return Err(TrustPolicyError::MissingReason);
                }
                (*to != current).then_some(*to)
            }
            TrustEvent::ProbationExpired => {
                (current == TrustTier::Probation).then_some(TrustTier::Normal)
            }
        };

        Ok(to.map(|to| TierTransition {
            from: current,
            to,
            reason: event.reason(),
            probation_until: (to == TrustTier::Probation)
                .then(|| now.saturating_add(self.config.probation_duration_ms)),
        }))
    }
}
