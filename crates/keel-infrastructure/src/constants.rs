//! Infrastructure layer constants
//!
//! Configuration discovery, logging defaults and graph rendering glyphs.
//! Binding markers and the migration table layout live in
//! `keel_domain::constants`.

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "keel.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "keel";

/// Prefix of configuration environment variables
pub const CONFIG_ENV_PREFIX: &str = "KEEL";

/// Separator between nested keys in environment variable names,
/// e.g. `KEEL_MIGRATIONS__TABLE_NAME`
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Application name used when none is configured
pub const DEFAULT_APPLICATION_NAME: &str = "keel";

/// Store provider used when none is configured
pub const DEFAULT_STORE_PROVIDER: &str = "memory";

// ============================================================================
// LOGGING
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding a tracing filter directive
pub const LOG_ENV_VAR: &str = "KEEL_LOG";

/// File stem used when the log file path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "keel";

// ============================================================================
// GRAPH RENDERING
// ============================================================================

/// Connector from a consumer to its first dependency
pub const GRAPH_FIRST_EDGE: &str = " ──▶ ";

/// Connector to a dependency that has later siblings
pub const GRAPH_MIDDLE_EDGE: &str = " ├─▶ ";

/// Connector to the last dependency of a consumer
pub const GRAPH_LAST_EDGE: &str = " └─▶ ";

/// Continuation under a dependency that has later siblings
pub const GRAPH_RAIL: &str = " │   ";

/// Continuation under the last dependency
pub const GRAPH_BLANK_RAIL: &str = "     ";

/// Suffix for a vertex whose dependencies were already drawn
pub const GRAPH_REPEAT_MARK: &str = " (*)";

/// Suffix for a vertex with no edges
pub const GRAPH_ORPHAN_MARK: &str = " (orphan)";
