//! # Shared Bus - Event Bus for Core Notifications
//!
//! Every committed transition in the engine (mission created or paused,
//! claim verified, audit resolved, tier changed) is announced here.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────────────┐
//! │ Claim Engine │                    │ Notification Handler │
//! │ Mission Store│    publish()       │ (logs + metrics)     │
//! │              │ ──────┐            │                      │
//! └──────────────┘       │            └──────────────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Delivery
//!
//! - Events are published only after the entity locks of the transition
//!   are released.
//! - Delivery is best effort; a lagging subscriber skips events rather
//!   than blocking publishers.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{CoreEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus, TopicCounts};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
