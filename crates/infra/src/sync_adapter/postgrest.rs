//! PostgREST-backed stall table (the REST interface of a hosted Postgres).
//!
//! ## Change notification
//!
//! Writes made through this adapter are announced on its change bus right
//! after they succeed. Writes made by other clients are picked up by an
//! optional poller ([`PostgrestSyncAdapter::spawn_poller`]) that re-reads the
//! table on an interval and announces `ChangeNotice::External` when the
//! content differs from the previous read.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio::task::JoinHandle;

use marketbook_core::StallId;
use marketbook_events::{ChangeBus, ChangeNotice, InMemoryChangeBus, Subscription};
use marketbook_inventory::{StallPatch, StallRecord};

use super::r#trait::{SyncAdapter, SyncError};
use crate::backend::BackendConfig;

pub const DEFAULT_TABLE: &str = "stalls";

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct PostgrestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Stall table served over PostgREST.
#[derive(Debug)]
pub struct PostgrestSyncAdapter {
    client: reqwest::Client,
    config: BackendConfig,
    table: String,
    bus: Arc<InMemoryChangeBus<ChangeNotice>>,
}

impl PostgrestSyncAdapter {
    pub fn new(config: BackendConfig, table: impl Into<String>) -> Result<Self, SyncError> {
        let client = config
            .http_client()
            .map_err(|e| SyncError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            table: table.into(),
            bus: Arc::new(InMemoryChangeBus::new()),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Start polling for writes made by other clients.
    ///
    /// The first read only establishes a baseline. Read failures are logged and
    /// retried on the next tick.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> PollerHandle {
        let adapter = Arc::clone(self);
        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last: Option<Vec<StallRecord>> = None;

            loop {
                ticker.tick().await;
                match adapter.fetch_rows().await {
                    Ok(rows) => {
                        if last.as_ref().is_some_and(|prev| prev != &rows) {
                            tracing::debug!(table = %adapter.table, "external change detected by poller");
                            adapter.bus.publish(ChangeNotice::External);
                        }
                        last = Some(rows);
                    }
                    Err(err) => {
                        tracing::warn!(table = %adapter.table, error = %err, "change poller read failed");
                    }
                }
            }
        });
        PollerHandle { join }
    }

    async fn fetch_rows(&self) -> Result<Vec<StallRecord>, SyncError> {
        let request = self
            .client
            .get(self.config.table_url(&self.table))
            .query(&[("select", "*"), ("order", "id.asc")]);
        let response = self.send(request).await?;
        response
            .json::<Vec<StallRecord>>()
            .await
            .map_err(|e| SyncError::Decode(format!("failed to decode `{}` rows: {e}", self.table)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, SyncError> {
        let response = self
            .config
            .authorize(request)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(&self.table, status, &body))
    }
}

/// Map a failed PostgREST response to a [`SyncError`].
///
/// A missing table is reported as Postgres `42P01`, as PostgREST's schema-cache
/// miss `PGRST205`, or only in the message text on older servers.
pub fn classify_error(table: &str, status: StatusCode, body: &str) -> SyncError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message.unwrap_or_else(|| body.trim().to_string());

    let missing_table = matches!(parsed.code.as_deref(), Some("42P01") | Some("PGRST205"))
        || (message.contains("relation") && message.contains("does not exist"))
        || message.contains("Could not find the table");

    if missing_table {
        return SyncError::SchemaMissing { table: table.to_string() };
    }

    SyncError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl SyncAdapter for PostgrestSyncAdapter {
    async fn fetch_all(&self) -> Result<Vec<StallRecord>, SyncError> {
        self.fetch_rows().await
    }

    async fn update(&self, id: &StallId, patch: &StallPatch) -> Result<(), SyncError> {
        let request = self
            .client
            .patch(self.config.table_url(&self.table))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(patch);
        self.send(request).await?;
        self.bus.publish(ChangeNotice::StallUpdated { id: id.clone() });
        Ok(())
    }

    async fn insert_many(&self, records: &[StallRecord]) -> Result<(), SyncError> {
        if records.is_empty() {
            return Ok(());
        }
        let request = self
            .client
            .post(self.config.table_url(&self.table))
            .header("Prefer", "return=minimal")
            .json(records);
        self.send(request).await?;
        self.bus.publish(ChangeNotice::Inserted { count: records.len() });
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), SyncError> {
        // PostgREST refuses unfiltered deletes; match every real id instead.
        let request = self
            .client
            .delete(self.config.table_url(&self.table))
            .query(&[("id", "neq.placeholder")]);
        self.send(request).await?;
        self.bus.publish(ChangeNotice::Cleared);
        Ok(())
    }

    fn subscribe_to_changes(&self) -> Subscription<ChangeNotice> {
        self.bus.subscribe()
    }
}

/// Running change poller; stops when dropped.
#[derive(Debug)]
pub struct PollerHandle {
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_relation_is_schema_missing() {
        let body = r#"{"code":"42P01","message":"relation \"public.stalls\" does not exist"}"#;
        let err = classify_error("stalls", StatusCode::NOT_FOUND, body);
        assert_eq!(err, SyncError::SchemaMissing { table: "stalls".into() });
    }

    #[test]
    fn schema_cache_miss_is_schema_missing() {
        let body = r#"{"code":"PGRST205","message":"Could not find the table 'public.stalls' in the schema cache"}"#;
        assert!(classify_error("stalls", StatusCode::NOT_FOUND, body).is_schema_missing());
    }

    #[test]
    fn other_failures_keep_status_and_message() {
        let body = r#"{"code":"42501","message":"permission denied for table stalls"}"#;
        let err = classify_error("stalls", StatusCode::FORBIDDEN, body);
        assert_eq!(
            err,
            SyncError::Backend { status: 403, message: "permission denied for table stalls".into() }
        );
    }

    #[test]
    fn non_json_bodies_are_passed_through() {
        let err = classify_error("stalls", StatusCode::BAD_GATEWAY, "  upstream timeout ");
        assert_eq!(err, SyncError::Backend { status: 502, message: "upstream timeout".into() });
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn status_survives_classification(code in 400u16..600, message in "[a-z ]{0,40}") {
                let status = StatusCode::from_u16(code).unwrap();
                let body = serde_json::json!({ "code": "XX000", "message": message }).to_string();
                match classify_error("stalls", status, &body) {
                    SyncError::Backend { status: got, .. } => prop_assert_eq!(got, code),
                    SyncError::SchemaMissing { .. } => prop_assert!(message.contains("does not exist")),
                    other => prop_assert!(false, "unexpected classification: {other:?}"),
                }
            }
        }
    }
}
