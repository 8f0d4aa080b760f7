//! Stall table storage adapters.

mod r#trait;
mod in_memory;
mod postgrest;

pub use r#trait::{SyncAdapter, SyncError};
pub use in_memory::{InMemorySyncAdapter, Operation};
pub use postgrest::{DEFAULT_TABLE, PollerHandle, PostgrestSyncAdapter, classify_error};
