//! # Mission Telemetry
//!
//! Structured logging and Prometheus metrics for Mission Grid.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mission_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // Logs and metrics are now being collected
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MG_SERVICE_NAME` | `mission-grid` | Service name attached to logs |
//! | `MG_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MG_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `MG_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, AUDITS_OPENED,
    AUDITS_RESOLVED, CLAIMS_CREATED, CLAIMS_REJECTED, CLAIMS_VERIFIED,
    EVENT_BUS_MESSAGES_RECEIVED, LEDGER_REWARDS_CREDITED, MAINTENANCE_DURATION,
    MAINTENANCE_RUNS, MISSION_EVENTS, MISSIONS_PAUSED, OPEN_AUDITS, SUBSYSTEM_ERRORS,
    TIER_CHANGES,
};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize log subscriber: {0}")]
    SubscriberInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    logging::init_logging(&config)?;
    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(TelemetryGuard {
        _metrics: metrics,
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
