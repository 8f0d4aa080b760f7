//! `marketbook-app`
//!
//! **Responsibility:** the operator-facing layer of MarketBook.
//!
//! - Configuration from the environment
//! - Service wiring (store, backend adapters, advisor)
//! - Per-operator session state: selection, filters, admin mode, notices
//! - Advisor chat transcript
//!
//! All stall mutations go through the shared `InventoryStore`.

pub mod admin;
pub mod bootstrap;
pub mod chat;
pub mod config;
pub mod session;

pub use admin::{AdminGate, Credentials, DenyAll, StaticAdminGate};
pub use bootstrap::{Services, log_occupancy};
pub use chat::{ChatMessage, ChatRole, ChatTranscript};
pub use config::AppConfig;
pub use session::{ConnectionStatus, Notice, NoticeLevel, Session, SessionError, SessionSnapshot};
