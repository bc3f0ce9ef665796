//! Queue statistics.

use mg_05_claim_engine::{Audit, AuditTrigger, AuditVerdict};
use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Point-in-time queue statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Open audits sampled at random.
    pub open_random: usize,
    /// Open audits forced by moderation flags.
    pub open_security_flag: usize,
    /// Open audits required by the mission kind.
    pub open_manual: usize,
    /// Audits approved so far.
    pub approved: usize,
    /// Audits rejected so far.
    pub rejected: usize,
    /// Resolved without a reviewer.
    pub automated: usize,
    /// Age of the oldest open audit (ms).
    pub oldest_open_age_ms: Option<u64>,
}

impl QueueStats {
    /// Tally `audits` as of `now`.
    #[must_use]
    pub fn collect<'a>(audits: impl IntoIterator<Item = &'a Audit>, now: Timestamp) -> Self {
        let mut stats = Self::default();
        let mut oldest: Option<Timestamp> = None;
        for audit in audits {
            match audit.verdict {
                AuditVerdict::Pending => {
                    match audit.trigger {
                        AuditTrigger::Random => stats.open_random += 1,
                        AuditTrigger::SecurityFlag => stats.open_security_flag += 1,
                        AuditTrigger::Manual => stats.open_manual += 1,
                    }
                    oldest = Some(oldest.map_or(audit.opened_at, |o| o.min(audit.opened_at)));
                }
                AuditVerdict::Approved => stats.approved += 1,
                AuditVerdict::Rejected => stats.rejected += 1,
            }
            if audit.resolved_at.is_some() && audit.reviewer.is_none() {
                stats.automated += 1;
            }
        }
        stats.oldest_open_age_ms = oldest.map(|at| now.saturating_sub(at));
        stats
    }

    /// Audits still awaiting a verdict.
    #[must_use]
    pub fn open(&self) -> usize {
        self.open_random + self.open_security_flag + self.open_manual
    }
}
