//! Lifecycle and shutdown ports

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// State of a lifecycle-managed service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceState {
    /// Starting up
    Starting,
    /// Serving
    Running,
    /// Shutting down
    Stopping,
    /// Not running
    #[default]
    Stopped,
}

/// Service that holds resources released on shutdown
///
/// Bind implementations as set members of `dyn LifecycleManaged` to have the
/// shutdown hook stop them.
#[async_trait::async_trait]
pub trait LifecycleManaged: Send + Sync {
    /// Service name
    fn name(&self) -> &str;

    /// Current state
    fn state(&self) -> ServiceState;

    /// Start the service
    async fn start(&self) -> Result<()>;

    /// Stop the service gracefully
    async fn stop(&self) -> Result<()>;
}

/// Coordinates process shutdown
pub trait ShutdownCoordinator: Send + Sync {
    /// Signal all components to begin shutdown
    fn signal_shutdown(&self);

    /// Check if shutdown has been signaled
    fn is_shutting_down(&self) -> bool;
}
