//! # Node Runtime
//!
//! Owns the service container and the background tasks.
//!
//! ## Startup Sequence
//!
//! 1. Build the container (configuration already validated)
//! 2. Spawn the notification handler
//! 3. Spawn the maintenance loop (if enabled)
//!
//! ## Shutdown Sequence
//!
//! 1. Signal every task over the `watch` channel
//! 2. Wait for the tasks, bounded by a grace period

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{ContainerError, NodeConfig, ServiceContainer};

/// How long shutdown waits for background tasks.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The node runtime orchestrating all subsystems.
pub struct NodeRuntime {
    container: Arc<ServiceContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Create a runtime on the wall clock.
    pub fn new(config: NodeConfig) -> Result<Self, ContainerError> {
        Ok(Self::from_container(ServiceContainer::new(config)?))
    }

    /// Create a runtime around an existing container.
    pub fn from_container(container: ServiceContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start the background tasks.
    pub fn start(&self) {
        info!("===========================================");
        info!("  Mission Grid Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let mut tasks = self.tasks.lock();

        let notifications = self.container.notification_handler();
        tasks.push(tokio::spawn(notifications.run(self.shutdown_rx.clone())));

        let maintenance = &self.container.config.maintenance;
        if maintenance.enabled {
            let task = self.container.maintenance_loop();
            tasks.push(tokio::spawn(task.run(self.shutdown_rx.clone())));
        } else {
            warn!("Maintenance loop disabled; stale claims will not expire");
        }

        info!(
            tasks = tasks.len(),
            flag_threshold = self.container.config.missions.flag_threshold,
            claim_ttl_ms = self.container.config.claims.claim_ttl_ms,
            "Node runtime started"
        );
    }

    /// Shut down gracefully.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Background task failed: {}", e),
                Err(_) => warn!("Background task did not stop within the grace period"),
            }
        }

        info!("Shutdown complete");
    }

    /// Number of background tasks still tracked.
    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.lock().len()
    }

    /// The service container.
    #[must_use]
    pub fn container(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let runtime = NodeRuntime::new(NodeConfig::default()).unwrap();
        runtime.start();
        assert_eq!(runtime.running_tasks(), 2);

        runtime.shutdown().await;
        assert_eq!(runtime.running_tasks(), 0);
    }

    #[tokio::test]
    async fn test_maintenance_can_be_disabled() {
        let mut config = NodeConfig::default();
        config.maintenance.enabled = false;
        let runtime = NodeRuntime::new(config).unwrap();
        runtime.start();
        assert_eq!(runtime.running_tasks(), 1);
        runtime.shutdown().await;
    }
}
