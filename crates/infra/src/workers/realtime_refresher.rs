use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use marketbook_events::{ChangeNotice, Delivery, Subscription};

use crate::inventory_store::InventoryStore;

/// Handle to control and join the refresher task.
#[derive(Debug)]
pub struct RefresherHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl RefresherHandle {
    /// Request graceful shutdown and wait for the task to stop.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }
}

impl Drop for RefresherHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}

/// Keeps an [`InventoryStore`] in step with its backend.
///
/// - Subscribes to the store's remote change notices
/// - Every notice (or lag report) triggers one full `load()`
/// - Notices that arrive while a reload is pending are coalesced into it
/// - Reload failures are logged; the next notice retries
#[derive(Debug)]
pub struct RealtimeRefresher;

impl RealtimeRefresher {
    /// Spawn a refresher for `store`; `None` when the store has no backend.
    pub fn spawn(name: &'static str, store: Arc<InventoryStore>) -> Option<RefresherHandle> {
        let subscription = store.subscribe_remote_changes()?;
        Some(Self::spawn_with(name, store, subscription))
    }

    /// Spawn a refresher driven by an explicit subscription.
    pub fn spawn_with(
        name: &'static str,
        store: Arc<InventoryStore>,
        subscription: Subscription<ChangeNotice>,
    ) -> RefresherHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(refresh_loop(name, store, subscription, shutdown_rx));

        RefresherHandle {
            shutdown: Some(shutdown_tx),
            join: Some(join),
        }
    }
}

async fn refresh_loop(
    name: &'static str,
    store: Arc<InventoryStore>,
    mut sub: Subscription<ChangeNotice>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        let delivery = tokio::select! {
            _ = &mut shutdown_rx => break,
            delivery = sub.recv() => delivery,
        };

        match delivery {
            Some(Delivery::Message(notice)) => debug!(worker = name, ?notice, "change notice received"),
            Some(Delivery::Lagged(missed)) => debug!(worker = name, missed, "change stream lagged"),
            None => {
                debug!(worker = name, "change stream closed");
                break;
            }
        }

        // Coalesce a burst: one reload covers everything already queued.
        while sub.try_recv().is_some() {}

        if let Err(err) = store.load().await {
            warn!(worker = name, error = %err, "reload after change notice failed");
        }
    }
}
