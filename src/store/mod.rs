//! Local notification state: key-value storage and typed state updates.

mod error;
mod kv;
mod memory;
mod notifications;
mod schema;
mod sqlite;
mod state;

pub use error::StoreError;
pub use kv::{KeyValueStore, StorageKey, StoredRecord};
pub use memory::MemoryStore;
pub use notifications::NotificationStore;
pub use schema::{SCHEMA, SCHEMA_VERSION};
pub use sqlite::{default_state_path, SqliteStore};
pub use state::{with_entry, NotificationState};
