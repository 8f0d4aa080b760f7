use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use marketbook_ai::{AiError, RecommendationAdapter, StallContext, encode_context};

use crate::backend::BackendConfig;

pub const DEFAULT_FUNCTION: &str = "gemini-proxy";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    message: &'a str,
    /// JSON text, not a nested object.
    context: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Recommendation model behind a hosted backend function.
#[derive(Debug)]
pub struct EdgeFunctionRecommender {
    client: reqwest::Client,
    config: BackendConfig,
    function: String,
}

impl EdgeFunctionRecommender {
    pub fn new(config: BackendConfig, function: impl Into<String>) -> Result<Self, AiError> {
        let client = config
            .http_client()
            .map_err(|e| AiError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            function: function.into(),
        })
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

#[async_trait]
impl RecommendationAdapter for EdgeFunctionRecommender {
    async fn complete(&self, query: &str, context: &[StallContext]) -> Result<String, AiError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AiError::InvalidInput("empty question".to_string()));
        }

        let body = CompletionRequest {
            message: query,
            context: encode_context(context)?,
        };
        let request = self.client.post(self.config.function_url(&self.function)).json(&body);
        let response = self
            .config
            .authorize(request)
            .send()
            .await
            .map_err(|e| AiError::InferenceFailed(e.to_string()))?;

        let status = response.status();
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::InferenceFailed(format!("unreadable reply ({status}): {e}")))?;

        if let Some(error) = parsed.error {
            return Err(AiError::InferenceFailed(error));
        }
        if !status.is_success() {
            return Err(AiError::InferenceFailed(format!("function returned {status}")));
        }
        parsed
            .text
            .ok_or_else(|| AiError::InferenceFailed("reply has no text".to_string()))
    }
}
