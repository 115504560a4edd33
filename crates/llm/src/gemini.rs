//! Gemini generateContent client.
//!
//! One synchronous POST per exchange:
//! `POST {base}/v1beta/models/{model}:generateContent?key={api_key}` with
//! the assembled contents as the payload. The reply is the first
//! candidate's first text part. No retry, no streaming, no schema
//! validation beyond what extraction needs.

use async_trait::async_trait;
use chatrelay_core::error::LlmError;
use chatrelay_core::llm::LlmClient;
use chatrelay_core::wire::Content;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for the Gemini text-generation endpoint.
///
/// The API key is a query credential; keep the request URL out of logs.
pub struct GeminiClient {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a new client for the given key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    /// Pull the reply text out of a decoded response.
    fn extract_reply(resp: GenerateContentResponse) -> Result<String, LlmError> {
        resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| {
                LlmError::MalformedResponse("no candidates with text parts in response".into())
            })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, contents: &[Content]) -> Result<String, LlmError> {
        let body = GenerateContentRequest { contents };

        debug!(client = "gemini", model = %self.model, turns = contents.len(), "Sending generation request");

        let response = self
            .client
            .post(self.endpoint_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(LlmError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(LlmError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(LlmError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(format!("Failed to decode response: {e}")))?;

        Self::extract_reply(api_resp)
    }
}

// --- Gemini API types ---

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
