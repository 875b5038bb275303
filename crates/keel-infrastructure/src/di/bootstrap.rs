//! Assembly Bootstrap - Phase Orchestrator + Composition Root
//!
//! Drives the four assembly phases and produces the [`AppContext`].
//!
//! ```text
//! CONFIG_BOOTSTRAP  ConfigModule: application name, AppConfig, service configs
//!        ↓
//! MODULE_BOOTSTRAP  scanned bootstrap modules, then caller bootstrap modules
//!        ↓
//! MAIN_INSTALL      (1) scanned descriptors and main-phase modules
//!                   (2) MigrationRegistry
//!                   (3) caller modules (StoreModule first)
//!                   (4) override modules, only in override mode
//!        ↓
//! FINALIZED         frozen container, eager singletons built, shutdown hook
//! ```
//!
//! Every scanned candidate is classified before the first phase starts, so a
//! classification error aborts assembly before anything is bound.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = Assembler::new(config)
//!     .scan(StaticScan)
//!     .module(RepositoryModule)
//!     .assemble()?;
//!
//! let repository = context.container().get::<dyn Repository>()?;
//! context.run_migrations().await?;
//! ```

use super::binder::PhaseBinder;
use super::binding::BindingTable;
use super::container::FrozenContainer;
use super::modules::{ConfigModule, StoreModule};
use crate::config::AppConfig;
use crate::error_ext::ErrorContext;
use crate::graph::renderer_for;
use crate::lifecycle::{DefaultShutdownCoordinator, spawn_shutdown_hook, stop_lifecycle_members};
use crate::logging::log_phase;
use keel_application::domain_services::{BindingClassifier, DependencyGraph};
use keel_application::ports::registry::registered_migrations;
use keel_application::ports::{GraphRenderer, ScanResult};
use keel_application::use_cases::{MigrationReport, MigrationRunner};
use keel_domain::error::{Error, Result};
use keel_domain::ports::{
    Binder, BinderExt, InjectorExt, Migration, Module, ShutdownCoordinator, StoreProvider,
};
use keel_domain::{
    ApplicationName, AssemblyPhase, BindingDescriptor, BindingKey, BindingVariant, Instance,
    MigrationRegistry, ModulePhase,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Builder that assembles a container through the four phases
pub struct Assembler {
    config: Arc<AppConfig>,
    application: ApplicationName,
    service_configs: Vec<(BindingKey, Instance)>,
    scans: Vec<Box<dyn ScanResult>>,
    bootstrap_modules: Vec<Arc<dyn Module>>,
    modules: Vec<Arc<dyn Module>>,
    override_modules: Vec<Arc<dyn Module>>,
    override_mode: bool,
    migrations: Vec<Arc<dyn Migration>>,
    linked_migrations: bool,
    store_module: bool,
}

impl Assembler {
    /// Assembler for `config`
    ///
    /// Override mode starts from `assembly.override_mode`; the store module
    /// and the linked migrations are included.
    pub fn new(config: AppConfig) -> Self {
        let application = config.application_name();
        let override_mode = config.assembly.override_mode;
        Self {
            config: Arc::new(config),
            application,
            service_configs: Vec::new(),
            scans: Vec::new(),
            bootstrap_modules: Vec::new(),
            modules: Vec::new(),
            override_modules: Vec::new(),
            override_mode,
            migrations: Vec::new(),
            linked_migrations: true,
            store_module: true,
        }
    }

    /// Add a scan result whose candidates are auto-bound
    #[must_use]
    pub fn scan<S: ScanResult + 'static>(mut self, scan: S) -> Self {
        self.scans.push(Box::new(scan));
        self
    }

    /// Add a module installed during MODULE_BOOTSTRAP
    #[must_use]
    pub fn bootstrap_module<M: Module + 'static>(mut self, module: M) -> Self {
        self.bootstrap_modules.push(Arc::new(module));
        self
    }

    /// Add a module installed during MAIN_INSTALL
    #[must_use]
    pub fn module<M: Module + 'static>(mut self, module: M) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    /// Add a module installed last, replacing earlier bindings of its keys
    ///
    /// Ignored unless override mode is on.
    #[must_use]
    pub fn override_module<M: Module + 'static>(mut self, module: M) -> Self {
        self.override_modules.push(Arc::new(module));
        self
    }

    /// Turn override mode on or off
    #[must_use]
    pub fn override_mode(mut self, enabled: bool) -> Self {
        self.override_mode = enabled;
        self
    }

    /// Register a migration unit next to the linked ones
    #[must_use]
    pub fn migration<M: Migration + 'static>(mut self, unit: M) -> Self {
        self.migrations.push(Arc::new(unit));
        self
    }

    /// Ignore migrations registered in the `MIGRATIONS` slice
    #[must_use]
    pub fn without_linked_migrations(mut self) -> Self {
        self.linked_migrations = false;
        self
    }

    /// Do not select a store from the store registry
    #[must_use]
    pub fn without_store_module(mut self) -> Self {
        self.store_module = false;
        self
    }

    /// Bind a parsed service configuration object during CONFIG_BOOTSTRAP
    #[must_use]
    pub fn service_config<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.service_configs
            .push((BindingKey::of::<T>(), Instance::from_value(value)));
        self
    }

    /// Run all four phases
    ///
    /// Any error aborts the whole assembly; nothing partially wired escapes.
    pub fn assemble(self) -> Result<AppContext> {
        let app = self.application.to_string();
        info!(application = %app, override_mode = self.override_mode, "Assembling application");

        let classifier = BindingClassifier::new();
        let mut bootstrap_descriptors = Vec::new();
        let mut main_descriptors = Vec::new();
        for scan in &self.scans {
            for descriptor in classifier.classify_all(scan.candidates().iter())? {
                let bootstrap = matches!(
                    descriptor.variant,
                    BindingVariant::ModuleContribution {
                        phase: ModulePhase::Bootstrap,
                        ..
                    }
                );
                if bootstrap {
                    bootstrap_descriptors.push(descriptor);
                } else {
                    main_descriptors.push(descriptor);
                }
            }
        }

        let mut table = BindingTable::new();

        log_phase(&app, AssemblyPhase::ConfigBootstrap);
        {
            let config_module = self.service_configs.iter().fold(
                ConfigModule::new(self.application.clone(), Arc::clone(&self.config)),
                |module, (key, instance)| module.with_service_config(key.clone(), instance.clone()),
            );
            let mut binder = PhaseBinder::new(&mut table, AssemblyPhase::ConfigBootstrap)?;
            binder.install_module(Arc::new(config_module))?;
        }

        log_phase(&app, AssemblyPhase::ModuleBootstrap);
        {
            let mut binder = PhaseBinder::new(&mut table, AssemblyPhase::ModuleBootstrap)?;
            install_descriptors(&mut binder, bootstrap_descriptors)?;
            for module in &self.bootstrap_modules {
                binder.install_module(Arc::clone(module))?;
            }
        }

        log_phase(&app, AssemblyPhase::MainInstall);
        {
            let mut binder = PhaseBinder::new(&mut table, AssemblyPhase::MainInstall)?;
            install_descriptors(&mut binder, main_descriptors)?;

            let registry = self.migration_registry()?;
            info!(units = registry.len(), "Installing migrations");
            binder.bind_value(registry)?;

            if self.store_module {
                binder.install_module(Arc::new(StoreModule))?;
            }
            for module in &self.modules {
                binder.install_module(Arc::clone(module))?;
            }
        }
        if self.override_mode {
            table.set_override_mode(true);
            let mut binder = PhaseBinder::new(&mut table, AssemblyPhase::MainInstall)?;
            for module in &self.override_modules {
                info!(module = module.name(), "Installing override module");
                binder.install_module(Arc::clone(module))?;
            }
        } else if !self.override_modules.is_empty() {
            warn!(
                count = self.override_modules.len(),
                "Override modules ignored because override mode is off"
            );
        }

        log_phase(&app, AssemblyPhase::Finalized);
        let graph = Arc::new(DependencyGraph::new());
        let container = table.finalize(Arc::clone(&graph))?;
        if self.config.assembly.eager_validation {
            let resolved = container.validate()?;
            info!(keys = resolved, "Every binding resolved");
        }

        let shutdown = Arc::new(DefaultShutdownCoordinator::new());
        let hook = match spawn_shutdown_hook(container.clone(), Arc::clone(&shutdown)) {
            Some(handle) => ShutdownHook::Spawned(handle),
            None => ShutdownHook::Inline,
        };
        info!(application = %app, "Application assembled");

        Ok(AppContext {
            application: self.application,
            renderer: renderer_for(self.config.assembly.render_graph),
            config: self.config,
            container,
            graph,
            shutdown,
            hook: Mutex::new(hook),
        })
    }

    fn migration_registry(&self) -> Result<MigrationRegistry> {
        let mut registry = if self.linked_migrations {
            registered_migrations()?
        } else {
            MigrationRegistry::new()
        };
        for unit in &self.migrations {
            registry.register(Arc::clone(unit))?;
        }
        Ok(registry)
    }
}

fn install_descriptors(
    binder: &mut PhaseBinder<'_>,
    descriptors: Vec<BindingDescriptor>,
) -> Result<()> {
    descriptors
        .into_iter()
        .try_for_each(|descriptor| binder.register(descriptor))
}

/// Where lifecycle members get stopped
enum ShutdownHook {
    /// Background task spawned on the runtime that was current at assembly
    Spawned(JoinHandle<usize>),
    /// No runtime at assembly; `shutdown` stops members itself
    Inline,
    /// Already shut down
    Finished,
}

/// A finalized application: the frozen container and what surrounds it
pub struct AppContext {
    application: ApplicationName,
    config: Arc<AppConfig>,
    container: FrozenContainer,
    graph: Arc<DependencyGraph>,
    renderer: Arc<dyn GraphRenderer>,
    shutdown: Arc<DefaultShutdownCoordinator>,
    hook: Mutex<ShutdownHook>,
}

impl AppContext {
    /// Application name bound during CONFIG_BOOTSTRAP
    pub fn application(&self) -> &ApplicationName {
        &self.application
    }

    /// Configuration the application was assembled with
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// The frozen container
    pub fn container(&self) -> &FrozenContainer {
        &self.container
    }

    /// Dependency graph recorded so far
    pub fn graph(&self) -> Arc<DependencyGraph> {
        Arc::clone(&self.graph)
    }

    /// Render the graph with the configured renderer and log the result
    pub fn render_graph(&self) -> String {
        let rendered = self.renderer.render(&self.graph);
        if !rendered.is_empty() {
            info!(
                renderer = self.renderer.name(),
                vertices = self.graph.vertex_count(),
                edges = self.graph.edge_count(),
                "Dependency graph\n{rendered}"
            );
        }
        rendered
    }

    /// Apply pending migrations with the bound store and registry
    pub async fn run_migrations(&self) -> Result<MigrationReport> {
        if !self.config.migrations.enabled {
            return Err(Error::configuration("migrations are disabled"));
        }
        let store = self.container.get::<dyn StoreProvider>()?;
        let registry = self.container.get::<MigrationRegistry>()?;
        MigrationRunner::new(store)
            .with_table(&self.config.migrations.table_name)
            .run(&self.application, &registry)
            .await
    }

    /// Shutdown coordinator watched by the shutdown hook
    pub fn shutdown_coordinator(&self) -> Arc<DefaultShutdownCoordinator> {
        Arc::clone(&self.shutdown)
    }

    /// Signal shutdown and wait until lifecycle members have stopped
    ///
    /// Returns how many members stopped cleanly; later calls stop nothing.
    pub async fn shutdown(&self) -> Result<usize> {
        self.shutdown.signal_shutdown();
        let hook = {
            let mut guard = self
                .hook
                .lock()
                .map_err(|_| Error::generic("shutdown hook lock poisoned"))?;
            std::mem::replace(&mut *guard, ShutdownHook::Finished)
        };
        match hook {
            ShutdownHook::Spawned(handle) => handle.await.context("shutdown hook failed"),
            ShutdownHook::Inline => Ok(stop_lifecycle_members(&self.container).await),
            ShutdownHook::Finished => Ok(0),
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("application", &self.application)
            .field("container", &self.container)
            .field("renderer", &self.renderer.name())
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}
