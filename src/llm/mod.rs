//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities: clone them freely.
//! Async is delegated to the underlying provider; `generate` is an
//! `async fn` on the enum so callers need no trait-object machinery.
//!
//! Failures surface as `ProviderError` values. The turn controller decides
//! how they reach the user (it renders them as an `"Error: ..."` reply);
//! nothing in this module mutates conversation state.

pub mod providers;

use thiserror::Error;

use crate::session::Attachment;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0} not set")]
    MissingApiKey(&'static str),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Response ─────────────────────────────────────────────────────────────────

/// Token accounting reported by the backend, when available. Logged for
/// observability; never shown in the conversation.
#[derive(Debug, Clone, Copy)]
pub struct LlmUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached_input_tokens: u64,
}

/// A completed generation round-trip.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<LlmUsage>,
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait`
/// dependency. Adding a backend = new module + new variant + new arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Gemini(providers::gemini::GeminiProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// One generation round-trip: `prompt` plus an optional image.
    ///
    /// With no image the request carries the prompt alone; the image part is
    /// omitted entirely rather than sent empty. Callers substitute any
    /// default prompt before invoking; an empty prompt is passed through
    /// as-is.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&Attachment>,
    ) -> Result<LlmResponse, ProviderError> {
        match self {
            LlmProvider::Gemini(p) => p.generate(prompt, image).await,
            LlmProvider::Dummy(p) => p.generate(prompt, image).await,
        }
    }

    /// Model identifier for display (startup banner).
    pub fn model_name(&self) -> &str {
        match self {
            LlmProvider::Gemini(p) => p.model(),
            LlmProvider::Dummy(_) => "dummy",
        }
    }
}
