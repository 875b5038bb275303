//! Error handling types
//!
//! Every failure the assembly engine and the migration runner can surface.
//! All of them are fatal to the operation that raised them: nothing here is
//! retried automatically.

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by infrastructure-facing variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for keel
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or ambiguous binding metadata on a candidate type
    #[error("Cannot classify {type_name}: {reason}")]
    Classification {
        /// Name of the offending candidate type
        type_name: String,
        /// Human-readable reason
        reason: String,
    },

    /// Two non-override registrations for the same binding key
    #[error("Binding conflict on {key}: already bound by {existing}, rejected {incoming}")]
    BindingConflict {
        /// The contested binding key
        key: String,
        /// Type that registered the key first
        existing: String,
        /// Type whose registration was rejected
        incoming: String,
    },

    /// Two map entries with the same key for the same map
    #[error("Duplicate map key '{map_key}' in {map}: contributed by {existing} and {incoming}")]
    DuplicateMapKey {
        /// The map multi-binding
        map: String,
        /// The colliding key
        map_key: String,
        /// First contributor
        existing: String,
        /// Second contributor
        incoming: String,
    },

    /// A dependency could not be resolved
    #[error("Missing binding for {key}{}", required_by_suffix(.consumer))]
    MissingBinding {
        /// The key nobody bound
        key: String,
        /// The consumer being built when resolution failed, if any
        consumer: Option<String>,
    },

    /// A constructor chain re-entered a key it is still building
    #[error("Circular dependency: {chain}")]
    CircularDependency {
        /// Rendered chain, e.g. `A -> B -> A`
        chain: String,
    },

    /// A bound instance did not have the type it was looked up as
    #[error("Type mismatch for {key}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Binding key being looked up
        key: String,
        /// Requested type
        expected: String,
        /// Type actually stored
        actual: String,
    },

    /// Operation not allowed in the current assembly phase
    #[error("Phase error: {message}")]
    Phase {
        /// Description of the violation
        message: String,
    },

    /// The migration tracking table cannot be created or read
    #[error("Migration table error: {message}")]
    MigrationTable {
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A migration unit failed while mutating the store
    #[error("Migration {index} ({description}) failed: {source}")]
    MigrationApply {
        /// Index of the failing unit
        index: u32,
        /// Description of the failing unit
        description: String,
        /// The error raised by the unit
        #[source]
        source: BoxedSource,
    },

    /// Store backend failure
    #[error("Store error: {message}")]
    Store {
        /// Description of the store error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Generic error from external sources
    #[error("Generic error: {0}")]
    Generic(#[from] BoxedSource),
}

fn required_by_suffix(consumer: &Option<String>) -> String {
    consumer
        .as_ref()
        .map(|c| format!(" (required by {c})"))
        .unwrap_or_default()
}

// Assembly error creation methods
impl Error {
    /// Create a classification error
    pub fn classification<T: Into<String>, R: Into<String>>(type_name: T, reason: R) -> Self {
        Self::Classification {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a binding conflict error
    pub fn binding_conflict<K, E, I>(key: K, existing: E, incoming: I) -> Self
    where
        K: Into<String>,
        E: Into<String>,
        I: Into<String>,
    {
        Self::BindingConflict {
            key: key.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Create a duplicate map key error
    pub fn duplicate_map_key<M, K, E, I>(map: M, map_key: K, existing: E, incoming: I) -> Self
    where
        M: Into<String>,
        K: Into<String>,
        E: Into<String>,
        I: Into<String>,
    {
        Self::DuplicateMapKey {
            map: map.into(),
            map_key: map_key.into(),
            existing: existing.into(),
            incoming: incoming.into(),
        }
    }

    /// Create a missing binding error
    pub fn missing_binding<K: Into<String>>(key: K) -> Self {
        Self::MissingBinding {
            key: key.into(),
            consumer: None,
        }
    }

    /// Attach the consumer that was being built to a missing binding error
    ///
    /// Errors that already name a consumer keep the innermost one.
    #[must_use]
    pub fn required_by<C: Into<String>>(self, consumer: C) -> Self {
        match self {
            Self::MissingBinding {
                key,
                consumer: None,
            } => Self::MissingBinding {
                key,
                consumer: Some(consumer.into()),
            },
            other => other,
        }
    }

    /// Create a phase error
    pub fn phase<S: Into<String>>(message: S) -> Self {
        Self::Phase {
            message: message.into(),
        }
    }
}

// Migration and store error creation methods
impl Error {
    /// Create a migration table error
    pub fn migration_table<S: Into<String>>(message: S) -> Self {
        Self::MigrationTable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a migration table error with source
    pub fn migration_table_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::MigrationTable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into().into())
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }
}

// Classification of errors for callers that branch on the taxonomy
impl Error {
    /// Duplicate non-override binding or duplicate map key
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::BindingConflict { .. } | Self::DuplicateMapKey { .. }
        )
    }

    /// Unresolvable dependency
    pub fn is_missing_binding(&self) -> bool {
        matches!(self, Self::MissingBinding { .. })
    }

    /// Either of the two migration failures
    pub fn is_migration(&self) -> bool {
        matches!(
            self,
            Self::MigrationTable { .. } | Self::MigrationApply { .. }
        )
    }
}
