//! Provider Constants
//!
//! Constants specific to provider implementations. These are separated from
//! domain constants (which live in keel-domain) and infrastructure constants.

// ============================================================================
// STORE PROVIDER CONSTANTS
// ============================================================================

/// Registry name of the in-memory store
pub const STORE_MEMORY_NAME: &str = "memory";

/// Registry description of the in-memory store
pub const STORE_MEMORY_DESCRIPTION: &str = "In-memory key-item store (fast, non-persistent)";

/// Registry name of the null store
pub const STORE_NULL_NAME: &str = "null";

/// Registry description of the null store
pub const STORE_NULL_DESCRIPTION: &str = "Discards all writes (dry runs)";
