//! Phase Binder
//!
//! The [`Binder`] handed to modules. During CONFIG_BOOTSTRAP and
//! MODULE_BOOTSTRAP it only accepts instances and nested modules, since
//! nothing can be constructed before the main container exists. During
//! MAIN_INSTALL every candidate is classified and registered.

use super::binding::BindingTable;
use keel_application::domain_services::BindingClassifier;
use keel_domain::error::{Error, Result};
use keel_domain::ports::{Binder, Module};
use keel_domain::{
    AssemblyPhase, BindingDescriptor, BindingKey, BindingVariant, Candidate, Instance,
};
use std::sync::Arc;
use tracing::debug;

/// Binder bound to one assembly phase and one binding table
pub struct PhaseBinder<'t> {
    table: &'t mut BindingTable,
    phase: AssemblyPhase,
    classifier: BindingClassifier,
    contributor: String,
}

impl<'t> PhaseBinder<'t> {
    /// Binder for `phase` writing into `table`
    ///
    /// Fails for FINALIZED: a frozen container takes no registrations.
    pub fn new(table: &'t mut BindingTable, phase: AssemblyPhase) -> Result<Self> {
        if phase == AssemblyPhase::Finalized {
            return Err(Error::phase("the container is finalized; no further bindings"));
        }
        Ok(Self {
            table,
            phase,
            classifier: BindingClassifier::new(),
            contributor: phase.to_string(),
        })
    }

    /// Name reported as the contributor of the bindings made next
    #[must_use]
    pub fn with_contributor(mut self, contributor: impl Into<String>) -> Self {
        self.contributor = contributor.into();
        self
    }

    fn accepts_constructed(&self) -> bool {
        self.phase == AssemblyPhase::MainInstall
    }

    /// Register an already classified descriptor
    pub fn register(&mut self, descriptor: BindingDescriptor) -> Result<()> {
        if let BindingVariant::ModuleContribution { module, .. } = &descriptor.variant {
            return self.install_module(Arc::clone(module));
        }
        if !self.accepts_constructed() {
            return Err(Error::phase(format!(
                "{} cannot be bound during {}: only instances and modules are accepted",
                descriptor.origin, self.phase
            )));
        }
        self.table.register(&descriptor)
    }
}

impl Binder for PhaseBinder<'_> {
    fn phase(&self) -> AssemblyPhase {
        self.phase
    }

    fn install(&mut self, candidate: Candidate) -> Result<()> {
        let descriptor = self.classifier.classify(&candidate)?;
        self.register(descriptor)
    }

    fn install_module(&mut self, module: Arc<dyn Module>) -> Result<()> {
        debug!(module = module.name(), phase = %self.phase, "Installing module");
        let outer = std::mem::replace(&mut self.contributor, module.name().to_string());
        let result = module.configure(self);
        self.contributor = outer;
        result
    }

    fn bind_instance(&mut self, key: BindingKey, instance: Instance) -> Result<()> {
        self.table.bind_instance(key, instance, &self.contributor)
    }

    fn bound_instance(&self, key: &BindingKey) -> Option<Instance> {
        self.table.instance(key)
    }
}
