//! Process configuration from environment variables.

use std::time::Duration;

use anyhow::{Context, bail};

use marketbook_infra::BackendConfig;
use marketbook_infra::recommender::DEFAULT_FUNCTION;
use marketbook_infra::sync_adapter::DEFAULT_TABLE;
use marketbook_observability::{LOG_FORMAT_ENV, LogFormat};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Hosted backend credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub url: String,
    pub anon_key: String,
}

impl core::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("url", &self.url)
            .field("anon_key", &"<redacted>")
            .finish()
    }
}

/// Admin sign-in credentials; admin mode is unavailable without them.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `None` runs on generated mock data.
    pub backend: Option<BackendSettings>,
    pub admin: Option<AdminSettings>,
    pub stalls_table: String,
    pub recommender_function: String,
    pub http_timeout: Duration,
    /// `None` disables the change poller.
    pub poll_interval: Option<Duration>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: None,
            admin: None,
            stalls_table: DEFAULT_TABLE.to_string(),
            recommender_function: DEFAULT_FUNCTION.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            poll_interval: None,
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let prefixed = |key: &str| var(key).or_else(|| var(&format!("VITE_{key}")));

        let backend = match (prefixed("SUPABASE_URL"), prefixed("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(BackendSettings { url, anon_key }),
            (Some(_), None) | (None, Some(_)) => {
                tracing::warn!("only one of SUPABASE_URL / SUPABASE_ANON_KEY is set; running on mock data");
                None
            }
            (None, None) => None,
        };

        let admin = match (var("MARKETBOOK_ADMIN_USER"), var("MARKETBOOK_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some(AdminSettings { username, password }),
            _ => None,
        };

        let http_timeout_secs = parse_secs(var("MARKETBOOK_HTTP_TIMEOUT_SECS"), "MARKETBOOK_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        if http_timeout_secs == 0 {
            bail!("MARKETBOOK_HTTP_TIMEOUT_SECS must be greater than zero");
        }
        let poll_secs = parse_secs(var("MARKETBOOK_POLL_INTERVAL_SECS"), "MARKETBOOK_POLL_INTERVAL_SECS")?;

        Ok(Self {
            backend,
            admin,
            stalls_table: var("MARKETBOOK_STALLS_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            recommender_function: var("MARKETBOOK_RECOMMENDER_FUNCTION").unwrap_or_else(|| DEFAULT_FUNCTION.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            poll_interval: poll_secs.filter(|s| *s > 0).map(Duration::from_secs),
            log_format: var(LOG_FORMAT_ENV).map(|raw| LogFormat::parse(&raw)).unwrap_or_default(),
        })
    }

    pub fn backend_config(&self) -> Option<BackendConfig> {
        self.backend
            .as_ref()
            .map(|b| BackendConfig::new(b.url.clone(), b.anon_key.clone()).with_timeout(self.http_timeout))
    }
}

fn parse_secs(raw: Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    raw.map(|value| {
        value
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds, got `{value}`"))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_means_mock_mode_with_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(cfg.backend_config().is_none());
    }

    #[test]
    fn backend_needs_both_url_and_key() {
        assert!(config(&[("SUPABASE_URL", "https://x.supabase.co")]).unwrap().backend.is_none());
        assert!(config(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", "  ")])
            .unwrap()
            .backend
            .is_none());

        let cfg = config(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_ANON_KEY", "anon")]).unwrap();
        let backend = cfg.backend_config().unwrap();
        assert_eq!(backend.base_url(), "https://x.supabase.co");
        assert_eq!(backend.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn vite_prefixed_names_are_accepted() {
        let cfg = config(&[("VITE_SUPABASE_URL", "https://x.supabase.co"), ("VITE_SUPABASE_ANON_KEY", "anon")]).unwrap();
        assert!(cfg.backend.is_some());
    }

    #[test]
    fn numeric_settings_are_validated() {
        let err = config(&[("MARKETBOOK_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("MARKETBOOK_HTTP_TIMEOUT_SECS"));
        assert!(config(&[("MARKETBOOK_HTTP_TIMEOUT_SECS", "0")]).is_err());

        let cfg = config(&[("MARKETBOOK_POLL_INTERVAL_SECS", "5"), ("MARKETBOOK_LOG_FORMAT", "text")]).unwrap();
        assert_eq!(cfg.poll_interval, Some(Duration::from_secs(5)));
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(config(&[("MARKETBOOK_POLL_INTERVAL_SECS", "0")]).unwrap().poll_interval, None);
    }

    #[test]
    fn admin_credentials_are_optional() {
        assert!(config(&[("MARKETBOOK_ADMIN_USER", "admin")]).unwrap().admin.is_none());
        let cfg = config(&[("MARKETBOOK_ADMIN_USER", "admin"), ("MARKETBOOK_ADMIN_PASSWORD", "pw")]).unwrap();
        assert_eq!(cfg.admin.unwrap().username, "admin");
    }
}
