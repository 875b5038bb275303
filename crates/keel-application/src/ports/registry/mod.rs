//! Registry System
//!
//! Compile-time registration of candidates, migration units and store
//! providers, using `linkme` distributed slices that are discovered at
//! runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Registration Flow                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Crate defines:     #[linkme::distributed_slice(CANDIDATES)] │
//! │                        static ENTRY: CandidateEntry = ...       │
//! │                              ↓                                  │
//! │  2. Registry declares: #[linkme::distributed_slice]             │
//! │                        pub static CANDIDATES: [Entry] = [..]    │
//! │                              ↓                                  │
//! │  3. Assembler queries: StaticScan → CANDIDATES.iter()           │
//! │                              ↓                                  │
//! │  4. Config selects:    "provider = memory" → InMemoryStore      │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Registering a Store Provider (in keel-providers)
//!
//! ```ignore
//! use keel_application::ports::registry::{StoreProviderEntry, STORE_PROVIDERS};
//!
//! #[linkme::distributed_slice(STORE_PROVIDERS)]
//! static MEMORY_PROVIDER: StoreProviderEntry = StoreProviderEntry {
//!     name: "memory",
//!     description: "In-memory key-item store",
//!     factory: |config| Ok(Arc::new(InMemoryStore::from_config(config))),
//! };
//! ```
//!
//! ### Registering a Migration Unit
//!
//! ```ignore
//! #[linkme::distributed_slice(MIGRATIONS)]
//! static CREATE_USERS: MigrationEntry = MigrationEntry {
//!     index: 0,
//!     description: "create users table",
//!     factory: || Arc::new(CreateUsers),
//! };
//! ```

pub mod candidates;
pub mod migrations;
pub mod store;

pub use candidates::{CANDIDATES, CandidateEntry, list_candidates};
pub use migrations::{MIGRATIONS, MigrationEntry, list_migrations, registered_migrations};
pub use store::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry, list_store_providers,
    resolve_store_provider,
};
