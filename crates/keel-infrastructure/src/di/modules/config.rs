//! Configuration module
//!
//! Binds the application name, the whole configuration and each of its
//! sections as instances, plus any service configuration objects supplied
//! by the caller.

use crate::config::{AppConfig, AssemblyConfig, LoggingConfig, MigrationsConfig, StoreConfig};
use keel_domain::error::Result;
use keel_domain::ports::{Binder, BinderExt, Module};
use keel_domain::{ApplicationName, BindingKey, Instance};
use std::sync::Arc;

/// Installs configuration during CONFIG_BOOTSTRAP
pub struct ConfigModule {
    application: ApplicationName,
    config: Arc<AppConfig>,
    service_configs: Vec<(BindingKey, Instance)>,
}

impl ConfigModule {
    /// Module binding `config` for `application`
    pub fn new(application: ApplicationName, config: Arc<AppConfig>) -> Self {
        Self {
            application,
            config,
            service_configs: Vec::new(),
        }
    }

    /// Also bind a parsed service configuration object
    #[must_use]
    pub fn with_service_config(mut self, key: BindingKey, instance: Instance) -> Self {
        self.service_configs.push((key, instance));
        self
    }
}

impl Module for ConfigModule {
    fn name(&self) -> &str {
        "config"
    }

    fn configure(&self, binder: &mut dyn Binder) -> Result<()> {
        binder.bind_value(self.application.clone())?;
        binder.bind_arc(Arc::clone(&self.config))?;
        binder.bind_value::<AssemblyConfig>(self.config.assembly.clone())?;
        binder.bind_value::<MigrationsConfig>(self.config.migrations.clone())?;
        binder.bind_value::<StoreConfig>(self.config.store.clone())?;
        binder.bind_value::<LoggingConfig>(self.config.logging.clone())?;
        for (key, instance) in &self.service_configs {
            binder.bind_instance(key.clone(), instance.clone())?;
        }
        Ok(())
    }
}
