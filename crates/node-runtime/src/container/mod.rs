//! # Service Container
//!
//! Central container holding all subsystem instances with proper lifetime
//! management and dependency injection.
//!
//! - Subsystems are initialized in dependency order (Level 0 → Level 4)
//! - Notifications flow through the event bus only
//! - Configuration is validated before anything is built

pub mod config;
pub mod services;

pub use config::{ConfigError, MaintenanceConfig, NodeConfig, RateLimitConfig};
pub use services::{ContainerError, ServiceContainer};
