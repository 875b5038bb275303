//! Store provider implementations
//!
//! | Provider | Registry name | Persistence |
//! |----------|---------------|-------------|
//! | [`InMemoryStore`] | `memory` | process lifetime |
//! | [`NullStore`] | `null` | none |

pub mod in_memory;
pub mod null;

pub use in_memory::{InMemoryClient, InMemoryStore};
pub use null::NullStore;
