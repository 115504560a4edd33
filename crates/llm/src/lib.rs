//! LLM client implementations for chatrelay.

pub mod gemini;

pub use gemini::GeminiClient;

use chatrelay_config::AppConfig;

/// Build the Gemini client from config.
pub fn build_from_config(config: &AppConfig) -> GeminiClient {
    GeminiClient::new(&config.api_key, &config.llm.model)
        .with_base_url(&config.llm.base_url)
}
