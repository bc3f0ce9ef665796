//! Prometheus metrics for Mission Grid subsystems.
//!
//! All metrics follow the naming convention: `mg_<subsystem>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., claims_created_total)
//! - **Gauge**: Value that can go up or down (e.g., audits_open)
//! - **Histogram**: Distribution of values (e.g., maintenance_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LEDGER METRICS (Subsystem 1)
    // =========================================================================

    /// Reward amounts credited, by currency (XP units / USD cents)
    pub static ref LEDGER_REWARDS_CREDITED: CounterVec = CounterVec::new(
        Opts::new("mg_ledger_rewards_credited_total", "Reward amounts credited to agents"),
        &["currency"]  // currency: xp/usd
    ).expect("metric creation failed");

    // =========================================================================
    // TRUST METRICS (Subsystem 2)
    // =========================================================================

    /// Tier changes by target tier
    pub static ref TIER_CHANGES: CounterVec = CounterVec::new(
        Opts::new("mg_trust_tier_changes_total", "Tier changes applied"),
        &["to"]
    ).expect("metric creation failed");

    // =========================================================================
    // MISSION METRICS (Subsystem 4)
    // =========================================================================

    /// Mission lifecycle events
    pub static ref MISSION_EVENTS: CounterVec = CounterVec::new(
        Opts::new("mg_missions_events_total", "Mission lifecycle events"),
        &["event"]  // event: created/activated/completed/cancelled
    ).expect("metric creation failed");

    /// Missions auto-paused by community flags
    pub static ref MISSIONS_PAUSED: Counter = Counter::new(
        "mg_missions_paused_total",
        "Missions paused after reaching the flag threshold"
    ).expect("metric creation failed");

    // =========================================================================
    // CLAIM METRICS (Subsystem 5)
    // =========================================================================

    /// Claims created
    pub static ref CLAIMS_CREATED: Counter = Counter::new(
        "mg_claims_created_total",
        "Total claims created"
    ).expect("metric creation failed");

    /// Claims verified and paid
    pub static ref CLAIMS_VERIFIED: Counter = Counter::new(
        "mg_claims_verified_total",
        "Total claims verified"
    ).expect("metric creation failed");

    /// Claims closed without payment
    pub static ref CLAIMS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("mg_claims_rejected_total", "Claims closed without payment"),
        &["cause"]  // cause: rejected/expired
    ).expect("metric creation failed");

    // =========================================================================
    // AUDIT METRICS (Subsystem 6)
    // =========================================================================

    /// Audits opened by trigger
    pub static ref AUDITS_OPENED: CounterVec = CounterVec::new(
        Opts::new("mg_audits_opened_total", "Audits opened"),
        &["trigger"]  // trigger: random/security_flag/manual
    ).expect("metric creation failed");

    /// Audits resolved by verdict
    pub static ref AUDITS_RESOLVED: CounterVec = CounterVec::new(
        Opts::new("mg_audits_resolved_total", "Audits resolved"),
        &["verdict"]  // verdict: approved/rejected
    ).expect("metric creation failed");

    /// Audits currently awaiting a verdict
    pub static ref OPEN_AUDITS: Gauge = Gauge::new(
        "mg_audits_open",
        "Audits currently awaiting a verdict"
    ).expect("metric creation failed");

    // =========================================================================
    // RUNTIME METRICS
    // =========================================================================

    /// Messages received from the event bus
    pub static ref EVENT_BUS_MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("mg_eventbus_messages_received_total", "Messages received from event bus"),
        &["event_type"]
    ).expect("metric creation failed");

    /// Maintenance passes completed
    pub static ref MAINTENANCE_RUNS: Counter = Counter::new(
        "mg_maintenance_runs_total",
        "Maintenance passes completed"
    ).expect("metric creation failed");

    /// Maintenance pass duration
    pub static ref MAINTENANCE_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "mg_maintenance_duration_seconds",
            "Time spent in one maintenance pass"
        ).buckets(exponential_buckets(0.0001, 2.0, 15).expect("bucket layout is valid"))
    ).expect("metric creation failed");

    /// Errors returned to callers, by subsystem and kind
    pub static ref SUBSYSTEM_ERRORS: CounterVec = CounterVec::new(
        Opts::new("mg_subsystem_errors_total", "Errors by subsystem and kind"),
        &["subsystem", "kind"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered metrics are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Ledger / trust
        Box::new(LEDGER_REWARDS_CREDITED.clone()),
        Box::new(TIER_CHANGES.clone()),
        // Missions
        Box::new(MISSION_EVENTS.clone()),
        Box::new(MISSIONS_PAUSED.clone()),
        // Claims
        Box::new(CLAIMS_CREATED.clone()),
        Box::new(CLAIMS_VERIFIED.clone()),
        Box::new(CLAIMS_REJECTED.clone()),
        // Audits
        Box::new(AUDITS_OPENED.clone()),
        Box::new(AUDITS_RESOLVED.clone()),
        Box::new(OPEN_AUDITS.clone()),
        // Runtime
        Box::new(EVENT_BUS_MESSAGES_RECEIVED.clone()),
        Box::new(MAINTENANCE_RUNS.clone()),
        Box::new(MAINTENANCE_DURATION.clone()),
        Box::new(SUBSYSTEM_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
