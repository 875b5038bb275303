//! Shutdown coordination
//!
//! The shutdown hook waits for the coordinator's signal, then stops every
//! `dyn LifecycleManaged` set member the container has already built, in
//! reverse registration order. Members that were never built are left alone.
//!
//! The hook never installs OS signal handlers. Whoever owns the process
//! (the `keel` binary, a server's main loop) listens for Ctrl-C and calls
//! `AppContext::shutdown`.

use crate::di::FrozenContainer;
use keel_domain::ports::{LifecycleManaged, ShutdownCoordinator};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{info, warn};

// ============================================================================
// Default Shutdown Coordinator
// ============================================================================

/// Default implementation of `ShutdownCoordinator` using atomics and Notify
///
/// Uses Tokio's Notify for async waiting and an `AtomicBool` for fast
/// shutdown status checks.
pub struct DefaultShutdownCoordinator {
    /// Shutdown signal flag
    shutdown_signal: AtomicBool,
    /// Notification channel for async waiting
    notify: Notify,
}

impl DefaultShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new() -> Self {
        Self {
            shutdown_signal: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Wait asynchronously for the shutdown signal
    ///
    /// Returns immediately if shutdown was already signaled.
    pub async fn wait_for_shutdown(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a signal in between is not lost
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}

impl Default for DefaultShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultShutdownCoordinator")
            .field("is_shutting_down", &self.is_shutting_down())
            .finish()
    }
}

impl ShutdownCoordinator for DefaultShutdownCoordinator {
    fn signal_shutdown(&self) {
        info!("Shutdown signal received");
        self.shutdown_signal.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Shutdown Hook
// ============================================================================

/// Stop the already built lifecycle members, last registered first
///
/// Failures are logged and do not prevent the remaining members from
/// stopping. Returns how many members stopped cleanly.
pub async fn stop_lifecycle_members(container: &FrozenContainer) -> usize {
    let members = container.initialized_members::<dyn LifecycleManaged>();
    let mut stopped = 0;
    for member in members.iter().rev() {
        match member.stop().await {
            Ok(()) => {
                info!(service = member.name(), "Service stopped");
                stopped += 1;
            }
            Err(e) => warn!(service = member.name(), error = %e, "Service failed to stop"),
        }
    }
    stopped
}

/// Spawn the shutdown hook on the current Tokio runtime
///
/// The task sleeps until `coordinator` is signaled. Returns `None` when
/// called outside a runtime; callers then stop members themselves through
/// [`stop_lifecycle_members`].
pub fn spawn_shutdown_hook(
    container: FrozenContainer,
    coordinator: Arc<DefaultShutdownCoordinator>,
) -> Option<JoinHandle<usize>> {
    let runtime = tokio::runtime::Handle::try_current().ok()?;
    Some(runtime.spawn(async move {
        coordinator.wait_for_shutdown().await;
        stop_lifecycle_members(&container).await
    }))
}
