//! Assembly phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// States of the assembly state machine, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssemblyPhase {
    /// Application name and configuration are bound
    ConfigBootstrap,
    /// Bootstrap modules install name-scoped and config bindings
    ModuleBootstrap,
    /// Scanned descriptors, migrations, main and override modules install
    MainInstall,
    /// The container is frozen and serves lookups
    Finalized,
}

impl AssemblyPhase {
    /// The phase that follows this one
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ConfigBootstrap => Some(Self::ModuleBootstrap),
            Self::ModuleBootstrap => Some(Self::MainInstall),
            Self::MainInstall => Some(Self::Finalized),
            Self::Finalized => None,
        }
    }
}

impl fmt::Display for AssemblyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigBootstrap => "CONFIG_BOOTSTRAP",
            Self::ModuleBootstrap => "MODULE_BOOTSTRAP",
            Self::MainInstall => "MAIN_INSTALL",
            Self::Finalized => "FINALIZED",
        };
        f.write_str(name)
    }
}
