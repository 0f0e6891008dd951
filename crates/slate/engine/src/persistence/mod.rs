//! Persistence layer for the assignment store
//!
//! The in-memory ledgers are the source of truth for a session; storage is
//! best-effort durability behind a debounce window.

mod debounce;
mod json_file;
mod memory;
mod traits;

pub use debounce::{DebouncedWriter, PersistKey, PersistKind, PersistPayload};
pub use json_file::JsonFileStorage;
pub use memory::InMemoryStorage;
pub use traits::{SlateStorage, StoredDecisions};
