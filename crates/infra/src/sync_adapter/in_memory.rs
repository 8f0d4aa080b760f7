use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use marketbook_core::StallId;
use marketbook_events::{ChangeBus, ChangeNotice, InMemoryChangeBus, Subscription};
use marketbook_inventory::{StallPatch, StallRecord};

use super::r#trait::{SyncAdapter, SyncError};

/// Adapter operation, for failure injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchAll,
    Update,
    InsertMany,
    DeleteAll,
}

/// In-memory stall table with change notification.
///
/// Intended for tests/dev. Behaves like the hosted table: rows ordered by id,
/// patches to unknown ids are silently ignored, and every write publishes a
/// change notice. Failures can be scripted per operation.
#[derive(Debug, Default)]
pub struct InMemorySyncAdapter {
    rows: RwLock<Vec<StallRecord>>,
    bus: InMemoryChangeBus<ChangeNotice>,
    failures: Mutex<HashMap<Operation, VecDeque<SyncError>>>,
}

impl InMemorySyncAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<StallRecord>) -> Self {
        let adapter = Self::new();
        if let Ok(mut rows) = adapter.rows.write() {
            *rows = records;
            rows.sort_by(|a, b| a.id.cmp(&b.id));
        }
        adapter
    }

    /// Make the next call of `op` fail with `err` (queued, one failure per call).
    pub fn fail_next(&self, op: Operation, err: SyncError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.entry(op).or_default().push_back(err);
        }
    }

    /// Current table contents.
    pub fn rows(&self) -> Vec<StallRecord> {
        self.rows.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Simulate a write made by another client, announced as an external change.
    pub fn remote_edit(&self, id: &StallId, patch: &StallPatch) {
        if self.patch_row(id, patch) {
            self.bus.publish(ChangeNotice::External);
        }
    }

    fn injected(&self, op: Operation) -> Result<(), SyncError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| SyncError::Backend { status: 500, message: "lock poisoned".to_string() })?;
        match failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn write_rows(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<StallRecord>>, SyncError> {
        self.rows
            .write()
            .map_err(|_| SyncError::Backend { status: 500, message: "lock poisoned".to_string() })
    }

    fn patch_row(&self, id: &StallId, patch: &StallPatch) -> bool {
        let Ok(mut rows) = self.rows.write() else {
            return false;
        };
        match rows.iter_mut().find(|r| &r.id == id) {
            Some(row) => {
                patch.apply_to(row);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl SyncAdapter for InMemorySyncAdapter {
    async fn fetch_all(&self) -> Result<Vec<StallRecord>, SyncError> {
        self.injected(Operation::FetchAll)?;
        self.rows
            .read()
            .map(|rows| rows.clone())
            .map_err(|_| SyncError::Backend { status: 500, message: "lock poisoned".to_string() })
    }

    async fn update(&self, id: &StallId, patch: &StallPatch) -> Result<(), SyncError> {
        self.injected(Operation::Update)?;
        if self.patch_row(id, patch) {
            self.bus.publish(ChangeNotice::StallUpdated { id: id.clone() });
        }
        Ok(())
    }

    async fn insert_many(&self, records: &[StallRecord]) -> Result<(), SyncError> {
        self.injected(Operation::InsertMany)?;
        {
            let mut rows = self.write_rows()?;
            if let Some(dup) = records.iter().find(|r| rows.iter().any(|existing| existing.id == r.id)) {
                return Err(SyncError::Backend {
                    status: 409,
                    message: format!("duplicate key value violates unique constraint (id={})", dup.id),
                });
            }
            rows.extend(records.iter().cloned());
            rows.sort_by(|a, b| a.id.cmp(&b.id));
        }
        self.bus.publish(ChangeNotice::Inserted { count: records.len() });
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), SyncError> {
        self.injected(Operation::DeleteAll)?;
        self.write_rows()?.clear();
        self.bus.publish(ChangeNotice::Cleared);
        Ok(())
    }

    fn subscribe_to_changes(&self) -> Subscription<ChangeNotice> {
        self.bus.subscribe()
    }
}
