//! Admin sign-in.

use crate::config::AdminSettings;

/// Credentials typed into the admin sign-in form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Decides whether a sign-in attempt unlocks admin mode.
pub trait AdminGate: Send + Sync {
    fn authorize(&self, credentials: &Credentials) -> bool;
}

/// Gate that accepts one fixed username/password pair.
#[derive(Debug, Clone)]
pub struct StaticAdminGate {
    expected: Credentials,
}

impl StaticAdminGate {
    pub fn new(expected: Credentials) -> Self {
        Self { expected }
    }
}

impl AdminGate for StaticAdminGate {
    fn authorize(&self, credentials: &Credentials) -> bool {
        credentials.username == self.expected.username && credentials.password == self.expected.password
    }
}

/// Gate used when no admin account is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl AdminGate for DenyAll {
    fn authorize(&self, _credentials: &Credentials) -> bool {
        false
    }
}

/// Gate for the configured admin account, or [`DenyAll`].
pub fn gate_for(settings: Option<&AdminSettings>) -> Box<dyn AdminGate> {
    match settings {
        Some(s) => Box::new(StaticAdminGate::new(Credentials::new(&s.username, &s.password))),
        None => Box::new(DenyAll),
    }
}
