//! LLM client trait — the abstraction over the text-generation endpoint.
//!
//! A client takes the fully assembled, oldest-first content sequence and
//! returns the generated reply text. One synchronous round trip — no
//! retries, no streaming.

use crate::error::LlmError;
use crate::wire::Content;
use async_trait::async_trait;

/// The core LlmClient trait.
///
/// The exchange calls `generate()` without knowing which endpoint is
/// behind it, which is what lets tests substitute a stub.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// A human-readable name for this client (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the assembled context and return the reply text.
    async fn generate(&self, contents: &[Content]) -> std::result::Result<String, LlmError>;
}
