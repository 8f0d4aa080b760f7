//! Authoritative local copy of the stall collection.
//!
//! The store runs in one of two modes, fixed at construction:
//!
//! - **Remote**: a [`SyncAdapter`] is injected. Reads replace the whole
//!   collection; writes go to the backend first and touch the local copy only
//!   after the backend accepted them.
//! - **Mock**: no adapter. The collection is generated once from a zone layout
//!   and lives in memory for the rest of the process.
//!
//! Readers get cheap `Arc<[Stall]>` snapshots. The lock guarding the
//! collection is never held across an `.await` nor while subscribers run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use marketbook_core::{Entity, StallId};
use marketbook_events::{ChangeNotice, Subscription};
use marketbook_inventory::{
    BookingInfo, DEFAULT_LAYOUT, MockInventory, Stall, StallPatch, StallQuery, StallRecord, StallStatus, ZoneLayout,
};

use crate::sync_adapter::{SyncAdapter, SyncError};

/// Failure of a booking request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    #[error("stall {0} not found")]
    NotFound(StallId),

    #[error("stall {id} cannot be booked (status {status})")]
    NotBookable { id: StallId, status: StallStatus },

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Handle returned by [`InventoryStore::on_change`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Subscriber = Arc<dyn Fn(&[Stall]) + Send + Sync>;

pub struct InventoryStore {
    remote: Option<Arc<dyn SyncAdapter>>,
    mock: MockInventory,
    layout: Vec<ZoneLayout>,
    stalls: RwLock<Arc<[Stall]>>,
    mock_seeded: AtomicBool,
    subscribers: RwLock<Vec<(SubscriberId, Subscriber)>>,
    next_subscriber: AtomicU64,
}

impl InventoryStore {
    /// Store backed by `remote` when given, by generated mock data otherwise.
    pub fn new(remote: Option<Arc<dyn SyncAdapter>>) -> Self {
        Self::with_mock(remote, MockInventory::default(), DEFAULT_LAYOUT.to_vec())
    }

    pub fn with_mock(remote: Option<Arc<dyn SyncAdapter>>, mock: MockInventory, layout: Vec<ZoneLayout>) -> Self {
        Self {
            remote,
            mock,
            layout,
            stalls: RwLock::new(Arc::from(Vec::new())),
            mock_seeded: AtomicBool::new(false),
            subscribers: RwLock::new(Vec::new()),
            next_subscriber: AtomicU64::new(1),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Change notices from the backend, if one is configured.
    pub fn subscribe_remote_changes(&self) -> Option<Subscription<ChangeNotice>> {
        self.remote.as_ref().map(|remote| remote.subscribe_to_changes())
    }

    /// Refresh the collection.
    ///
    /// Remote mode replaces the collection with the backend's rows. Mock mode
    /// generates the collection on the first call; later calls do nothing.
    pub async fn load(&self) -> Result<(), SyncError> {
        let Some(remote) = &self.remote else {
            return self.seed_mock_once();
        };

        let records = remote.fetch_all().await?;
        let stalls = stalls_from_records(records);
        tracing::info!(count = stalls.len(), "stall inventory loaded from backend");
        self.replace_all(stalls);
        self.notify();
        Ok(())
    }

    /// Book an available stall for `booking`'s vendor.
    pub async fn book(&self, id: &StallId, booking: &BookingInfo) -> Result<(), BookingError> {
        let current = self.get(id).ok_or_else(|| BookingError::NotFound(id.clone()))?;
        if !current.can_book() {
            return Err(BookingError::NotBookable {
                id: id.clone(),
                status: current.status(),
            });
        }

        let tenant = booking.vendor_name();
        if let Some(remote) = &self.remote {
            remote.update(id, &StallPatch::booking(tenant)).await?;
        }

        if self.replace_one(id, |stall| stall.clone().with_tenant(tenant)) {
            tracing::info!(stall = %id, tenant, "stall booked");
            self.notify();
        }
        Ok(())
    }

    /// Overwrite the editable fields of a stall (name, zone, price, status,
    /// tenant, features). The size is never changed.
    ///
    /// The backend write is issued even when `stall` is not in the local
    /// collection; locally nothing changes in that case.
    pub async fn admin_update(&self, stall: Stall) -> Result<(), SyncError> {
        let id = stall.id_typed().clone();
        if let Some(remote) = &self.remote {
            remote.update(&id, &StallPatch::full(&stall)).await?;
        }

        if self.replace_one(&id, |existing| stall.clone().sized(existing.size())) {
            tracing::info!(stall = %id, status = %stall.status(), "stall updated by admin");
            self.notify();
        } else {
            tracing::warn!(stall = %id, "admin update for a stall missing from the local collection");
        }
        Ok(())
    }

    /// Release a stall: status AVAILABLE, tenant cleared.
    pub async fn clear_booking(&self, id: &StallId) -> Result<(), BookingError> {
        let current = self.get(id).ok_or_else(|| BookingError::NotFound(id.clone()))?;
        self.admin_update(current.with_status(StallStatus::Available)).await?;
        Ok(())
    }

    /// Replace the whole collection with `records`.
    ///
    /// Remote mode deletes every row, inserts `records` and reloads. This is
    /// not atomic: an insert failure after the delete is reported as
    /// [`SyncError::SeedInterrupted`] and the table may be empty. Retrying is
    /// safe since every attempt starts with a full delete.
    pub async fn seed_all(&self, records: Vec<StallRecord>) -> Result<(), SyncError> {
        let records: Vec<StallRecord> = records.into_iter().map(normalize_tenant).collect();

        let Some(remote) = &self.remote else {
            let stalls = stalls_from_records(records);
            tracing::info!(count = stalls.len(), "local stall inventory replaced");
            self.mock_seeded.store(true, Ordering::SeqCst);
            self.replace_all(stalls);
            self.notify();
            return Ok(());
        };

        remote.delete_all().await?;
        if let Err(err) = remote.insert_many(&records).await {
            tracing::warn!(error = %err, "seeding failed after the table was cleared");
            return Err(SyncError::SeedInterrupted(Box::new(err)));
        }
        tracing::info!(count = records.len(), "backend stall table seeded");
        self.load().await
    }

    /// Records of the default generated inventory.
    pub fn mock_records(&self) -> Result<Vec<StallRecord>, SyncError> {
        let stalls = self
            .mock
            .generate(&self.layout)
            .map_err(|e| SyncError::Decode(format!("invalid mock layout: {e}")))?;
        Ok(stalls.iter().map(StallRecord::from).collect())
    }

    /// Reset the collection to the generated default inventory.
    pub async fn seed_defaults(&self) -> Result<(), SyncError> {
        let records = self.mock_records()?;
        self.seed_all(records).await
    }

    /// Register a callback receiving the full collection after every change.
    ///
    /// Callbacks run after internal locks are released but must not call back
    /// into mutating store operations.
    pub fn on_change<F>(&self, callback: F) -> SubscriberId
    where
        F: Fn(&[Stall]) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_subscriber(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.write().unwrap_or_else(PoisonError::into_inner);
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    /// Stalls matching `query`, in collection order.
    pub fn filter(&self, query: &StallQuery) -> Vec<Stall> {
        let snapshot = self.snapshot();
        query.apply(&snapshot).cloned().collect()
    }

    pub fn snapshot(&self) -> Arc<[Stall]> {
        Arc::clone(&self.stalls.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn get(&self, id: &StallId) -> Option<Stall> {
        self.snapshot().iter().find(|s| s.id() == id).cloned()
    }

    fn seed_mock_once(&self) -> Result<(), SyncError> {
        if self.mock_seeded.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let stalls = match self.mock.generate(&self.layout) {
            Ok(stalls) => stalls,
            Err(err) => {
                self.mock_seeded.store(false, Ordering::SeqCst);
                return Err(SyncError::Decode(format!("invalid mock layout: {err}")));
            }
        };
        tracing::info!(count = stalls.len(), "no backend configured; using generated stall inventory");
        self.replace_all(stalls);
        self.notify();
        Ok(())
    }

    fn replace_all(&self, stalls: Vec<Stall>) {
        *self.stalls.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(stalls);
    }

    fn replace_one(&self, id: &StallId, update: impl FnOnce(&Stall) -> Stall) -> bool {
        let mut guard = self.stalls.write().unwrap_or_else(PoisonError::into_inner);
        let Some(pos) = guard.iter().position(|s| s.id() == id) else {
            return false;
        };
        let mut next = guard.to_vec();
        next[pos] = update(&guard[pos]);
        *guard = Arc::from(next);
        true
    }

    fn notify(&self) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        if subscribers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for callback in subscribers {
            callback(&snapshot);
        }
    }
}

impl core::fmt::Debug for InventoryStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryStore")
            .field("remote", &self.remote.is_some())
            .field("stalls", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

/// Non-booked rows carry an explicit null tenant.
fn normalize_tenant(mut record: StallRecord) -> StallRecord {
    let blank = record.tenant.as_deref().is_some_and(|t| t.trim().is_empty());
    if record.status != StallStatus::Booked || blank {
        record.tenant = None;
    }
    record
}

/// Rows that cannot form a valid stall (e.g. a non-positive price) are skipped.
fn stalls_from_records(records: Vec<StallRecord>) -> Vec<Stall> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Stall::try_from(record) {
                Ok(stall) => Some(stall),
                Err(err) => {
                    tracing::warn!(stall = %id, error = %err, "skipping invalid stall row");
                    None
                }
            }
        })
        .collect()
}
