//! Domain layer constants
//!
//! Marker and attribute names understood by the binding classifier, and the
//! shape of the migration tracking table. Infrastructure-specific constants
//! remain in `keel_infrastructure::constants`.

// ============================================================================
// BINDING MARKERS
// ============================================================================

/// Marker for at-most-one-instance bindings
pub const MARKER_SINGLETON: &str = "singleton";

/// Marker for keyed multi-binding entries
pub const MARKER_MAP_ENTRY: &str = "map_entry";

/// Marker for unkeyed multi-binding elements
pub const MARKER_SET_MEMBER: &str = "set_member";

/// Marker for scoped provider thunks
pub const MARKER_PROVIDER: &str = "provider";

/// Marker for assisted-construction factories
pub const MARKER_FACTORY: &str = "factory";

/// Marker for module contributions
pub const MARKER_MODULE: &str = "module";

/// Qualifier marker (not variant-determining)
pub const MARKER_NAMED: &str = "named";

/// Eager-instantiation modifier (not variant-determining)
pub const MARKER_EAGER: &str = "eager";

// ============================================================================
// MARKER ATTRIBUTES
// ============================================================================

/// Type a binding is looked up as
pub const ATTR_ALIAS: &str = "alias";

/// Also bind the implementing type when an alias is set
pub const ATTR_EXPOSE_IMPL: &str = "expose_impl";

/// Map entry key
pub const ATTR_KEY: &str = "key";

/// Map entry key kind: `string` or `enum`
pub const ATTR_KEY_TYPE: &str = "key_type";

/// Enum name for enum-backed map keys
pub const ATTR_ENUM_TYPE: &str = "enum_type";

/// Produced type of providers and factories
pub const ATTR_PRODUCES: &str = "produces";

/// Factory object type a `factory` candidate must construct
pub const ATTR_FACTORY_TYPE: &str = "factory_type";

/// Provider lifecycle scope
pub const ATTR_SCOPE: &str = "scope";

/// Module installation phase
pub const ATTR_PHASE: &str = "phase";

/// Value of the `named` marker
pub const ATTR_VALUE: &str = "value";

/// Map key kind for plain strings
pub const KEY_TYPE_STRING: &str = "string";

/// Map key kind for enum variants
pub const KEY_TYPE_ENUM: &str = "enum";

// ============================================================================
// MIGRATION TRACKING TABLE
// ============================================================================

/// Default tracking table name
pub const MIGRATIONS_TABLE: &str = "keel_migrations";

/// Partition key: the application name
pub const MIGRATION_FIELD_APPLICATION: &str = "application";

/// Sort key: the migration index
pub const MIGRATION_FIELD_INDEX: &str = "migration_index";

/// Description of the applied unit
pub const MIGRATION_FIELD_DESCRIPTION: &str = "description";

/// RFC 3339 completion timestamp
pub const MIGRATION_FIELD_APPLIED_AT: &str = "applied_at";
