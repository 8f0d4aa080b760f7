//! Wiring of store, adapters and advisor from configuration.

use std::sync::Arc;

use anyhow::Context;

use marketbook_ai::{Advisor, RecommendationAdapter};
use marketbook_infra::sync_adapter::PollerHandle;
use marketbook_infra::{EdgeFunctionRecommender, InventoryStore, PostgrestSyncAdapter, SyncAdapter};
use marketbook_inventory::{Stall, occupancy_by_zone};

use crate::admin::gate_for;
use crate::config::AppConfig;
use crate::session::Session;

/// Long-lived services of one process.
pub struct Services {
    pub store: Arc<InventoryStore>,
    pub advisor: Advisor,
    /// Keeps the change poller alive; dropped on shutdown.
    pub poller: Option<PollerHandle>,
}

impl Services {
    pub fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(backend) = config.backend_config() else {
            tracing::info!("no backend configured; running offline on generated data");
            return Ok(Self {
                store: Arc::new(InventoryStore::new(None)),
                advisor: Advisor::offline(),
                poller: None,
            });
        };

        let adapter = Arc::new(
            PostgrestSyncAdapter::new(backend.clone(), config.stalls_table.clone())
                .context("failed to create the stall table client")?,
        );
        let poller = config.poll_interval.map(|interval| {
            tracing::info!(interval_secs = interval.as_secs(), "polling backend for external changes");
            adapter.spawn_poller(interval)
        });

        let recommender = EdgeFunctionRecommender::new(backend, config.recommender_function.clone())
            .context("failed to create the recommendation client")?;

        tracing::info!(
            table = %config.stalls_table,
            function = %config.recommender_function,
            "backend configured"
        );

        let remote: Arc<dyn SyncAdapter> = adapter;
        let recommender: Arc<dyn RecommendationAdapter> = Arc::new(recommender);
        Ok(Self {
            store: Arc::new(InventoryStore::new(Some(remote))),
            advisor: Advisor::new(Some(recommender)),
            poller,
        })
    }

    /// Fresh operator session over the shared store.
    pub fn session(&self, config: &AppConfig) -> Session {
        Session::new(self.store.clone(), gate_for(config.admin.as_ref()), config.stalls_table.clone())
    }
}

impl core::fmt::Debug for Services {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Services")
            .field("store", &self.store)
            .field("advisor", &self.advisor)
            .field("poller", &self.poller.is_some())
            .finish()
    }
}

/// Log one line per zone with its occupancy counts.
pub fn log_occupancy(stalls: &[Stall]) {
    for (zone, counts) in occupancy_by_zone(stalls) {
        tracing::info!(
            zone = zone.as_str(),
            available = counts.available,
            booked = counts.booked,
            maintenance = counts.maintenance,
            "zone occupancy"
        );
    }
}
