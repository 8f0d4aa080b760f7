//! Connection settings for the hosted backend (REST tables + functions).

use std::time::Duration;

use reqwest::RequestBuilder;

/// Default request timeout for backend calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Project URL + anonymous API key of the hosted backend.
#[derive(Clone)]
pub struct BackendConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `<base>/rest/v1/<table>`
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `<base>/functions/v1/<name>`
    pub fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Attach the API key headers every backend request needs.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(self.timeout).build()
    }
}

impl core::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_built_without_double_slashes() {
        let config = BackendConfig::new("https://demo.supabase.co/", "anon");
        assert_eq!(config.table_url("stalls"), "https://demo.supabase.co/rest/v1/stalls");
        assert_eq!(config.function_url("gemini-proxy"), "https://demo.supabase.co/functions/v1/gemini-proxy");
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = BackendConfig::new("https://demo.supabase.co", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
    }
}
