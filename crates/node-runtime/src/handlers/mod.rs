//! # Runtime Handlers
//!
//! - `gateway`: authenticated entry point for agent-facing operations
//! - `notifications`: bus consumer that logs events and updates metrics
//! - `maintenance`: periodic expiry and probation sweep

pub mod gateway;
pub mod maintenance;
pub mod notifications;

pub use gateway::{Credentials, Gateway, GatewayError, GatewayResult, MissionRequest};
pub use maintenance::MaintenanceLoop;
pub use notifications::NotificationHandler;
