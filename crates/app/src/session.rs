//! Interaction state of one operator session.
//!
//! The session owns only transient state (selection, filters, admin mode,
//! notices). Stalls are read from and mutated through the shared
//! [`InventoryStore`]; a failed operation leaves the store untouched and is
//! reported as an error [`Notice`].

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use marketbook_core::{DomainError, StallId};
use marketbook_infra::schema::provisioning_sql;
use marketbook_infra::{BookingError, InventoryStore, SyncError};
use marketbook_inventory::{BookingForm, Stall, StallQuery, StallRecord, ZoneFilter};

use crate::admin::{AdminGate, Credentials};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no stall is selected")]
    NoSelection,

    #[error("admin sign-in required")]
    NotAdmin,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Message the operator must acknowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Backend connection indicator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Running on generated mock data.
    Offline,
    Online,
    Syncing,
}

/// Exportable view of a session and the stalls it currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub connection: ConnectionStatus,
    pub zone_filter: ZoneFilter,
    pub search: String,
    pub selected: Option<StallId>,
    pub admin_mode: bool,
    pub backend_error: Option<String>,
    pub stalls: Vec<StallRecord>,
    pub notices: Vec<Notice>,
}

pub struct Session {
    store: Arc<InventoryStore>,
    gate: Box<dyn AdminGate>,
    table: String,
    selected: Option<StallId>,
    sidebar_open: bool,
    zone_filter: ZoneFilter,
    search: String,
    admin_mode: bool,
    syncing: bool,
    backend_error: Option<String>,
    schema_missing: bool,
    notices: Vec<Notice>,
}

impl Session {
    pub fn new(store: Arc<InventoryStore>, gate: Box<dyn AdminGate>, table: impl Into<String>) -> Self {
        Self {
            store,
            gate,
            table: table.into(),
            selected: None,
            sidebar_open: false,
            zone_filter: ZoneFilter::All,
            search: String::new(),
            admin_mode: false,
            syncing: false,
            backend_error: None,
            schema_missing: false,
            notices: Vec::new(),
        }
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.store
    }

    /// Reload the collection, recording any backend error for display.
    pub async fn refresh(&mut self) -> Result<(), SessionError> {
        self.syncing = true;
        self.backend_error = None;
        self.schema_missing = false;
        let result = self.store.load().await;
        self.syncing = false;

        if let Err(err) = &result {
            tracing::warn!(error = %err, "inventory refresh failed");
            self.schema_missing = err.is_schema_missing();
            self.backend_error = Some(self.describe(err));
        }
        result.map_err(SessionError::from)
    }

    // -- browsing --

    pub fn set_zone_filter(&mut self, filter: ZoneFilter) {
        self.zone_filter = filter;
    }

    pub fn zone_filter(&self) -> ZoneFilter {
        self.zone_filter
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Stalls passing the current zone filter and search text.
    pub fn visible_stalls(&self) -> Vec<Stall> {
        self.store.filter(&StallQuery::new(self.zone_filter, self.search.clone()))
    }

    /// Open the side panel for a stall. Returns false for an unknown id.
    pub fn select_stall(&mut self, id: &StallId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.clone());
        self.sidebar_open = true;
        true
    }

    pub fn cancel_selection(&mut self) {
        self.selected = None;
        self.sidebar_open = false;
    }

    /// Current version of the selected stall.
    pub fn selected_stall(&self) -> Option<Stall> {
        self.selected.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    // -- booking --

    /// Book the selected stall with the details of `form`.
    pub async fn submit_booking(&mut self, form: &BookingForm) -> Result<(), SessionError> {
        let result = self.try_book(form).await;
        match &result {
            Ok(name) => {
                self.notices.push(Notice::info(format!(
                    "Stall {name} booked. Thank you, {}!",
                    form.vendor_name.trim()
                )));
                self.cancel_selection();
            }
            Err(err) => {
                let message = format!("Booking failed: {}", self.describe_session(err));
                self.notices.push(Notice::error(message));
            }
        }
        result.map(|_| ())
    }

    async fn try_book(&mut self, form: &BookingForm) -> Result<String, SessionError> {
        let stall = self.selected_stall().ok_or(SessionError::NoSelection)?;
        let booking = form.validate()?;
        self.syncing = true;
        let result = self.store.book(stall.id_typed(), &booking).await;
        self.syncing = false;
        result?;
        Ok(stall.name().to_string())
    }

    // -- admin --

    pub fn enter_admin(&mut self, credentials: &Credentials) -> bool {
        if self.gate.authorize(credentials) {
            tracing::info!(username = %credentials.username, "admin signed in");
            self.admin_mode = true;
        } else {
            tracing::warn!(username = %credentials.username, "admin sign-in rejected");
            self.notices.push(Notice::error("Invalid username or password"));
        }
        self.admin_mode
    }

    pub fn leave_admin(&mut self) {
        self.admin_mode = false;
        self.cancel_selection();
    }

    pub fn is_admin(&self) -> bool {
        self.admin_mode
    }

    /// Save an admin edit of a stall.
    pub async fn save_admin_edit(&mut self, stall: Stall) -> Result<(), SessionError> {
        let result = self.try_admin_edit(stall).await;
        match &result {
            Ok(()) => self.cancel_selection(),
            Err(err) => {
                let message = format!("Update failed: {}", self.describe_session(err));
                self.notices.push(Notice::error(message));
            }
        }
        result
    }

    async fn try_admin_edit(&mut self, stall: Stall) -> Result<(), SessionError> {
        self.require_admin()?;
        self.syncing = true;
        let result = self.store.admin_update(stall).await;
        self.syncing = false;
        Ok(result?)
    }

    /// Free the selected stall (status AVAILABLE, tenant cleared).
    pub async fn release_selected(&mut self) -> Result<(), SessionError> {
        let result = self.try_release().await;
        match &result {
            Ok(()) => self.cancel_selection(),
            Err(err) => {
                let message = format!("Release failed: {}", self.describe_session(err));
                self.notices.push(Notice::error(message));
            }
        }
        result
    }

    async fn try_release(&mut self) -> Result<(), SessionError> {
        self.require_admin()?;
        let id = self.selected.clone().ok_or(SessionError::NoSelection)?;
        self.syncing = true;
        let result = self.store.clear_booking(&id).await;
        self.syncing = false;
        Ok(result?)
    }

    /// Wipe the inventory and load the default generated stalls.
    pub async fn reset_inventory(&mut self) -> Result<(), SessionError> {
        let result = self.try_reset().await;
        match &result {
            Ok(()) => self.notices.push(Notice::info("Default stall data loaded")),
            Err(SessionError::Sync(err)) => {
                self.schema_missing = err.is_schema_missing();
                let mut message = format!("Loading default data failed: {}", self.describe(err));
                if matches!(err, SyncError::SeedInterrupted(_)) {
                    message.push_str(" The table may now be empty; run the reset again.");
                }
                self.notices.push(Notice::error(message));
            }
            Err(err) => self.notices.push(Notice::error(format!("Loading default data failed: {err}"))),
        }
        result
    }

    async fn try_reset(&mut self) -> Result<(), SessionError> {
        self.require_admin()?;
        self.syncing = true;
        let result = self.store.seed_defaults().await;
        self.syncing = false;
        Ok(result?)
    }

    fn require_admin(&self) -> Result<(), SessionError> {
        if self.admin_mode { Ok(()) } else { Err(SessionError::NotAdmin) }
    }

    // -- status --

    pub fn connection_status(&self) -> ConnectionStatus {
        match (self.store.is_remote(), self.syncing) {
            (false, _) => ConnectionStatus::Offline,
            (true, true) => ConnectionStatus::Syncing,
            (true, false) => ConnectionStatus::Online,
        }
    }

    /// Backend connected but the table holds no stalls.
    pub fn needs_seeding(&self) -> bool {
        self.store.is_remote() && !self.syncing && self.store.snapshot().is_empty()
    }

    pub fn backend_error(&self) -> Option<&str> {
        self.backend_error.as_deref()
    }

    /// Provisioning SQL to show when the last failure was a missing table.
    pub fn schema_help(&self) -> Option<String> {
        self.schema_missing.then(|| provisioning_sql(&self.table))
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Acknowledge and remove all pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            connection: self.connection_status(),
            zone_filter: self.zone_filter,
            search: self.search.clone(),
            selected: self.selected.clone(),
            admin_mode: self.admin_mode,
            backend_error: self.backend_error.clone(),
            stalls: self.visible_stalls().iter().map(StallRecord::from).collect(),
            notices: self.notices.clone(),
        }
    }

    /// Snapshot encoded as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    fn describe(&self, err: &SyncError) -> String {
        if err.is_schema_missing() {
            format!(
                "table `{}` was not found in the database. Sign in as admin, copy the provisioning SQL and run it on the backend.",
                self.table
            )
        } else {
            err.to_string()
        }
    }

    fn describe_session(&self, err: &SessionError) -> String {
        match err {
            SessionError::Sync(sync) | SessionError::Booking(BookingError::Sync(sync)) => self.describe(sync),
            other => other.to_string(),
        }
    }
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("selected", &self.selected)
            .field("zone_filter", &self.zone_filter)
            .field("search", &self.search)
            .field("admin_mode", &self.admin_mode)
            .field("syncing", &self.syncing)
            .field("notices", &self.notices.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use marketbook_infra::InMemorySyncAdapter;
    use marketbook_infra::sync_adapter::Operation;
    use marketbook_inventory::{StallStatus, Zone};

    use crate::admin::StaticAdminGate;

    fn gate() -> Box<dyn AdminGate> {
        Box::new(StaticAdminGate::new(Credentials::new("admin", "pw")))
    }

    async fn mock_session() -> Session {
        let store = Arc::new(InventoryStore::new(None));
        let mut session = Session::new(store, gate(), "stalls");
        session.refresh().await.unwrap();
        session
    }

    async fn remote_session() -> (Arc<InMemorySyncAdapter>, Session) {
        let adapter = Arc::new(InMemorySyncAdapter::new());
        let store = Arc::new(InventoryStore::new(Some(adapter.clone())));
        let mut session = Session::new(store, gate(), "stalls");
        session.refresh().await.unwrap();
        (adapter, session)
    }

    fn form(vendor: &str) -> BookingForm {
        BookingForm {
            vendor_name: vendor.to_string(),
            shop_name: "Noi's Noodles".to_string(),
            phone: "081-234-5678".to_string(),
            products: "boat noodles".to_string(),
        }
    }

    fn first_available(session: &Session) -> Stall {
        session.visible_stalls().into_iter().find(|s| s.can_book()).unwrap()
    }

    #[tokio::test]
    async fn booking_flow_closes_the_panel_and_confirms() {
        let mut session = mock_session().await;
        assert_eq!(session.connection_status(), ConnectionStatus::Offline);

        let stall = first_available(&session);
        assert!(session.select_stall(stall.id_typed()));
        assert!(session.is_sidebar_open());

        session.submit_booking(&form("Noi")).await.unwrap();

        assert!(session.selected_stall().is_none());
        assert!(!session.is_sidebar_open());
        let booked = session.store().get(stall.id_typed()).unwrap();
        assert_eq!(booked.tenant(), Some("Noi"));
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Info);
        assert!(notices[0].message.contains(stall.name()));
    }

    #[tokio::test]
    async fn invalid_form_keeps_the_selection() {
        let mut session = mock_session().await;
        let stall = first_available(&session);
        session.select_stall(stall.id_typed());

        let err = session.submit_booking(&form("  ")).await.unwrap_err();
        assert!(matches!(err, SessionError::Invalid(_)));
        assert_eq!(session.selected_stall().unwrap(), stall);
        assert_eq!(session.notices()[0].level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn booking_without_selection_is_rejected() {
        let mut session = mock_session().await;
        let err = session.submit_booking(&form("Noi")).await.unwrap_err();
        assert!(matches!(err, SessionError::NoSelection));
    }

    #[tokio::test]
    async fn filters_narrow_the_visible_stalls() {
        let mut session = mock_session().await;
        session.set_zone_filter(ZoneFilter::Only(Zone::Craft));
        assert!(session.visible_stalls().iter().all(|s| s.zone() == Zone::Craft));

        session.set_search("c1");
        let names: Vec<String> = session.visible_stalls().iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["C1"]);
    }

    #[tokio::test]
    async fn admin_actions_require_sign_in() {
        let mut session = mock_session().await;
        let stall = first_available(&session);

        let err = session.save_admin_edit(stall.clone()).await.unwrap_err();
        assert!(matches!(err, SessionError::NotAdmin));

        assert!(!session.enter_admin(&Credentials::new("admin", "nope")));
        assert!(session.enter_admin(&Credentials::new("admin", "pw")));
        session
            .save_admin_edit(stall.clone().with_status(StallStatus::Maintenance))
            .await
            .unwrap();
        assert_eq!(session.store().get(stall.id_typed()).unwrap().status(), StallStatus::Maintenance);

        session.leave_admin();
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn empty_backend_needs_seeding_until_reset() {
        let (adapter, mut session) = remote_session().await;
        assert_eq!(session.connection_status(), ConnectionStatus::Online);
        assert!(session.needs_seeding());

        session.enter_admin(&Credentials::new("admin", "pw"));
        session.reset_inventory().await.unwrap();

        assert!(!session.needs_seeding());
        assert_eq!(adapter.rows().len(), 40);
    }

    #[tokio::test]
    async fn missing_table_produces_provisioning_guidance() {
        let (adapter, mut session) = remote_session().await;
        adapter.fail_next(Operation::FetchAll, SyncError::SchemaMissing { table: "stalls".into() });

        assert!(session.refresh().await.is_err());
        assert!(session.backend_error().unwrap().contains("provisioning SQL"));
        assert!(session.schema_help().unwrap().contains("create table if not exists public.stalls"));

        session.refresh().await.unwrap();
        assert!(session.backend_error().is_none());
        assert!(session.schema_help().is_none());
    }

    #[tokio::test]
    async fn interrupted_reset_suggests_a_retry() {
        let (adapter, mut session) = remote_session().await;
        session.enter_admin(&Credentials::new("admin", "pw"));
        adapter.fail_next(Operation::InsertMany, SyncError::Network("timeout".into()));

        assert!(session.reset_inventory().await.is_err());
        let notice = session.take_notices().pop().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.contains("run the reset again"));
    }

    #[tokio::test]
    async fn exported_snapshot_follows_the_filters() {
        let mut session = mock_session().await;
        session.set_zone_filter(ZoneFilter::Only(Zone::Craft));
        session.set_search("c1");

        let value: serde_json::Value = serde_json::from_str(&session.export_json().unwrap()).unwrap();
        assert_eq!(value["connection"], "offline");
        assert_eq!(value["search"], "c1");
        assert_eq!(value["admin_mode"], false);
        assert!(value["selected"].is_null());

        let stalls = value["stalls"].as_array().unwrap();
        assert_eq!(stalls.len(), 1);
        assert_eq!(stalls[0]["name"], "C1");
        assert_eq!(stalls[0]["zone"], "CRAFT");
        assert!(stalls[0].as_object().unwrap().contains_key("tenant"));
    }

    #[tokio::test]
    async fn releasing_a_booked_stall() {
        let mut session = mock_session().await;
        session.enter_admin(&Credentials::new("admin", "pw"));
        let booked = session
            .visible_stalls()
            .into_iter()
            .find(|s| s.status() == StallStatus::Booked)
            .unwrap();

        session.select_stall(booked.id_typed());
        session.release_selected().await.unwrap();

        let released = session.store().get(booked.id_typed()).unwrap();
        assert!(released.can_book());
        assert_eq!(released.tenant(), None);
    }
}
