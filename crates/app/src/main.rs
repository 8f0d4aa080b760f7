//! Headless MarketBook node: loads the stall inventory and keeps it in sync
//! with the backend until interrupted.

use anyhow::Context;

use marketbook_app::{AppConfig, Services, log_occupancy};
use marketbook_infra::RealtimeRefresher;
use marketbook_infra::schema::provisioning_sql;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    marketbook_observability::init(config.log_format);

    let services = Services::build(&config)?;
    let store = services.store.clone();

    match store.load().await {
        Ok(()) => log_occupancy(&store.snapshot()),
        Err(err) if err.is_schema_missing() => {
            tracing::error!(
                table = %config.stalls_table,
                sql = %provisioning_sql(&config.stalls_table),
                "stall table is missing; run the provisioning SQL on the backend"
            );
        }
        Err(err) => tracing::error!(error = %err, "initial inventory load failed"),
    }

    if store.is_remote() && store.snapshot().is_empty() {
        tracing::warn!("backend table is empty; sign in as admin and load the default data");
    }

    match services.session(&config).export_json() {
        Ok(snapshot) => tracing::debug!(%snapshot, "initial session state"),
        Err(err) => tracing::warn!(error = %err, "failed to export session state"),
    }

    store.on_change(|stalls| {
        tracing::debug!(count = stalls.len(), "inventory changed");
        log_occupancy(stalls);
    });

    let refresher = RealtimeRefresher::spawn("realtime-refresher", store.clone());

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    if let Some(refresher) = refresher {
        refresher.shutdown().await;
    }
    drop(services);
    Ok(())
}
