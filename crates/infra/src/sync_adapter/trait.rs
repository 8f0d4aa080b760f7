use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use marketbook_core::StallId;
use marketbook_events::{ChangeNotice, Subscription};
use marketbook_inventory::{StallPatch, StallRecord};

/// Remote read/write failure.
///
/// These are **infrastructure errors** (transport, backend, schema) as opposed
/// to domain errors (validation, booking rules).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("unexpected data from backend: {0}")]
    Decode(String),

    /// The backing table has not been provisioned.
    #[error("table `{table}` does not exist; run the provisioning SQL and retry")]
    SchemaMissing { table: String },

    /// The table was cleared but re-inserting failed; it may now be empty.
    #[error("seeding interrupted after the table was cleared: {0}")]
    SeedInterrupted(Box<SyncError>),
}

impl SyncError {
    /// True when the underlying cause is a missing table.
    pub fn is_schema_missing(&self) -> bool {
        match self {
            SyncError::SchemaMissing { .. } => true,
            SyncError::SeedInterrupted(inner) => inner.is_schema_missing(),
            _ => false,
        }
    }
}

/// Durable storage + change notification for the stall table.
///
/// The inventory store treats this as an optional capability: when absent, it
/// runs on generated mock data instead.
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    /// Every row, ordered by id.
    async fn fetch_all(&self) -> Result<Vec<StallRecord>, SyncError>;

    /// Patch one row. Patching an id that does not exist is not an error.
    async fn update(&self, id: &StallId, patch: &StallPatch) -> Result<(), SyncError>;

    async fn insert_many(&self, records: &[StallRecord]) -> Result<(), SyncError>;

    async fn delete_all(&self) -> Result<(), SyncError>;

    /// Stream of change notices; dropping the subscription releases it.
    fn subscribe_to_changes(&self) -> Subscription<ChangeNotice>;
}

#[async_trait]
impl<S> SyncAdapter for Arc<S>
where
    S: SyncAdapter + ?Sized,
{
    async fn fetch_all(&self) -> Result<Vec<StallRecord>, SyncError> {
        (**self).fetch_all().await
    }

    async fn update(&self, id: &StallId, patch: &StallPatch) -> Result<(), SyncError> {
        (**self).update(id, patch).await
    }

    async fn insert_many(&self, records: &[StallRecord]) -> Result<(), SyncError> {
        (**self).insert_many(records).await
    }

    async fn delete_all(&self) -> Result<(), SyncError> {
        (**self).delete_all().await
    }

    fn subscribe_to_changes(&self) -> Subscription<ChangeNotice> {
        (**self).subscribe_to_changes()
    }
}
