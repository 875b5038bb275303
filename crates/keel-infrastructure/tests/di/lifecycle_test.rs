//! Shutdown: lifecycle members stop in reverse order, only if built

use crate::test_utils::test_config;
use async_trait::async_trait;
use keel_application::ports::ListScan;
use keel_domain::ports::{InjectorExt, LifecycleManaged, ServiceState, ShutdownCoordinator};
use keel_domain::{Candidate, DeclaredTag, Error, Result};
use keel_infrastructure::lifecycle::DefaultShutdownCoordinator;
use keel_infrastructure::{AppContext, Assembler};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Journal = Arc<Mutex<Vec<&'static str>>>;

struct Service {
    name: &'static str,
    fail_on_stop: bool,
    stops: Journal,
}

#[async_trait]
impl LifecycleManaged for Service {
    fn name(&self) -> &str {
        self.name
    }

    fn state(&self) -> ServiceState {
        ServiceState::Running
    }

    async fn start(&self) -> Result<()> {
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if self.fail_on_stop {
            return Err(Error::generic(format!("{} refused to stop", self.name)));
        }
        self.stops
            .lock()
            .map_err(|_| Error::generic("journal poisoned"))?
            .push(self.name);
        Ok(())
    }
}

fn service(name: &'static str, fail_on_stop: bool, stops: &Journal) -> Candidate {
    let stops = Arc::clone(stops);
    Candidate::of::<Service>()
        .constructor(move |_| {
            Ok(Service {
                name,
                fail_on_stop,
                stops: Arc::clone(&stops),
            })
        })
        .exposing::<dyn LifecycleManaged>(|it| it)
        .tag(DeclaredTag::set_member().alias::<dyn LifecycleManaged>())
        .build()
}

fn assemble(candidates: Vec<Candidate>) -> AppContext {
    Assembler::new(test_config())
        .scan(ListScan::new(candidates))
        .assemble()
        .expect("assemble")
}

fn stopped(stops: &Journal) -> Vec<&'static str> {
    stops.lock().expect("journal").clone()
}

#[tokio::test]
async fn test_shutdown_stops_built_members_in_reverse_order() {
    let stops = Journal::default();
    let context = assemble(vec![
        service("database", false, &stops),
        service("cache", false, &stops),
    ]);
    let members = context
        .container()
        .get_set::<dyn LifecycleManaged>()
        .expect("members");
    assert_eq!(members.len(), 2);

    assert_eq!(context.shutdown().await.expect("shutdown"), 2);
    assert_eq!(stopped(&stops), vec!["cache", "database"]);
    assert!(context.shutdown_coordinator().is_shutting_down());

    assert_eq!(context.shutdown().await.expect("second shutdown"), 0);
    assert_eq!(stopped(&stops).len(), 2);
}

#[tokio::test]
async fn test_unbuilt_members_are_not_stopped() {
    let stops = Journal::default();
    let context = assemble(vec![service("database", false, &stops)]);

    assert_eq!(context.shutdown().await.expect("shutdown"), 0);
    assert!(stopped(&stops).is_empty());
}

#[tokio::test]
async fn test_failed_stop_does_not_block_the_others() {
    let stops = Journal::default();
    let context = assemble(vec![
        service("database", false, &stops),
        service("stubborn", true, &stops),
    ]);
    context
        .container()
        .get_set::<dyn LifecycleManaged>()
        .expect("members");

    assert_eq!(context.shutdown().await.expect("shutdown"), 1);
    assert_eq!(stopped(&stops), vec!["database"]);
}

#[test]
fn test_shutdown_without_runtime_at_assembly_stops_inline() {
    let stops = Journal::default();
    let context = assemble(vec![service("database", false, &stops)]);
    context
        .container()
        .get_set::<dyn LifecycleManaged>()
        .expect("members");

    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let count = runtime
        .block_on(context.shutdown())
        .expect("shutdown");

    assert_eq!(count, 1);
    assert_eq!(stopped(&stops), vec!["database"]);
}

#[tokio::test]
async fn test_coordinator_wakes_waiters() {
    let coordinator = Arc::new(DefaultShutdownCoordinator::new());
    let waiter = tokio::spawn({
        let coordinator = Arc::clone(&coordinator);
        async move { coordinator.wait_for_shutdown().await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!coordinator.is_shutting_down());
    coordinator.signal_shutdown();

    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter woke")
        .expect("waiter task");
    tokio::time::timeout(Duration::from_millis(100), coordinator.wait_for_shutdown())
        .await
        .expect("already signaled");
}

#[tokio::test]
async fn test_hook_waits_for_the_coordinator_only() {
    let stops = Journal::default();
    let context = assemble(vec![service("database", false, &stops)]);
    context
        .container()
        .get_set::<dyn LifecycleManaged>()
        .expect("members");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(stopped(&stops).is_empty());

    context.shutdown_coordinator().signal_shutdown();
    for _ in 0..100 {
        if !stopped(&stops).is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stopped(&stops), vec!["database"]);
    assert_eq!(context.shutdown().await.expect("shutdown"), 1);
}
