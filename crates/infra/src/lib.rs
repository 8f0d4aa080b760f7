//! Infrastructure layer: backend adapters, the inventory store, background workers.

pub mod backend;
pub mod inventory_store;
pub mod recommender;
pub mod schema;
pub mod sync_adapter;
pub mod workers;

pub use backend::BackendConfig;
pub use inventory_store::{BookingError, InventoryStore, SubscriberId};
pub use recommender::EdgeFunctionRecommender;
pub use sync_adapter::{InMemorySyncAdapter, PostgrestSyncAdapter, SyncAdapter, SyncError};
pub use workers::{RealtimeRefresher, RefresherHandle};
