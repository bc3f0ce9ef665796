//! # Maintenance Loop
//!
//! Periodic sweep: expires stale pending claims, cancels missions past
//! their deadline (closing their live claims) and lifts elapsed
//! probations. Each pass also refreshes the open-audit gauge.

use std::sync::Arc;
use std::time::Duration;

use mg_05_claim_engine::{ClaimEngine, MaintenanceReport};
use mg_06_audit_queue::AuditQueue;
use mission_telemetry::{time_histogram, MAINTENANCE_RUNS, OPEN_AUDITS};
use shared_types::TimeSource;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Background maintenance task.
pub struct MaintenanceLoop {
    claims: Arc<ClaimEngine>,
    audits: Arc<AuditQueue>,
    clock: Arc<dyn TimeSource>,
    interval: Duration,
}

impl MaintenanceLoop {
    /// Create a loop that runs every `interval`.
    pub fn new(
        claims: Arc<ClaimEngine>,
        audits: Arc<AuditQueue>,
        clock: Arc<dyn TimeSource>,
        interval: Duration,
    ) -> Self {
        Self {
            claims,
            audits,
            clock,
            interval,
        }
    }

    /// One maintenance pass at the current time.
    pub async fn run_once(&self) -> MaintenanceReport {
        let _timer = time_histogram!(mission_telemetry::MAINTENANCE_DURATION);
        let report = self.claims.run_maintenance(self.clock.now()).await;
        MAINTENANCE_RUNS.inc();

        let stats = self.audits.stats();
        OPEN_AUDITS.set(stats.open() as f64);

        if report.is_empty() {
            debug!(open_audits = stats.open(), "[runtime] Maintenance pass: nothing to do");
        } else {
            info!(
                expired_claims = report.expired_claims.len(),
                expired_missions = report.expired_missions.len(),
                closed_claims = report.closed_claims.len(),
                probations_lifted = report.probations_lifted.len(),
                open_audits = stats.open(),
                "[runtime] Maintenance pass complete"
            );
        }
        report
    }

    /// Run passes until shutdown is signalled.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "[runtime] Maintenance loop started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                _ = shutdown.changed() => {
                    info!("[runtime] Maintenance loop shutting down");
                    break;
                }
            }
        }
    }
}
