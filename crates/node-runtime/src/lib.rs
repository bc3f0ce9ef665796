//! # Node Runtime Library
//!
//! Wiring, handlers and lifecycle for a Mission Grid node. The `main.rs`
//! binary is a thin shell around [`NodeRuntime`].
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: subsystems expose ports; this crate picks
//!   the adapters (wall clock, in-memory counters, entropy random source)
//! - **Event-Driven Notifications**: subsystems publish after commit; the
//!   notification handler only observes
//! - **Authenticated Edge**: every agent-facing call passes the `Gateway`

#![warn(missing_docs)]

pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{ConfigError, ContainerError, NodeConfig, ServiceContainer};
pub use handlers::{Credentials, Gateway, GatewayError, MaintenanceLoop, NotificationHandler};
pub use runtime::NodeRuntime;
