//! Dummy LLM provider: echoes input back prefixed with `[echo]`.
//! Used to exercise the full turn sequence without a real API key, and (in
//! failing mode) to exercise the error path without a network.

use crate::llm::{LlmResponse, ProviderError};
use crate::session::Attachment;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    failure: Option<String>,
}

impl DummyProvider {
    /// Echo backend.
    pub fn new() -> Self {
        Self { failure: None }
    }

    /// A backend whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self { failure: Some(message.into()) }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&Attachment>,
    ) -> Result<LlmResponse, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::Request(message.clone()));
        }
        let text = match image {
            Some(att) => format!("[echo] {prompt} [image: {}]", att.mime_type),
            None => format!("[echo] {prompt}"),
        };
        Ok(LlmResponse { text, usage: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg() -> Attachment {
        Attachment { name: "a.jpg".into(), mime_type: "image/jpeg".into(), data: vec![0xFF, 0xD8] }
    }

    #[tokio::test]
    async fn generate_prefixes_echo() {
        let p = DummyProvider::new();
        assert_eq!(p.generate("hello", None).await.unwrap().text, "[echo] hello");
    }

    #[tokio::test]
    async fn generate_empty_input() {
        let p = DummyProvider::new();
        assert_eq!(p.generate("", None).await.unwrap().text, "[echo] ");
    }

    #[tokio::test]
    async fn generate_notes_attached_image() {
        let p = DummyProvider::new();
        let att = jpeg();
        let text = p.generate("look", Some(&att)).await.unwrap().text;
        assert_eq!(text, "[echo] look [image: image/jpeg]");
    }

    #[tokio::test]
    async fn failing_mode_errors_every_call() {
        let p = DummyProvider::failing("boom");
        let err = p.generate("hello", None).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        // Still failing on the second call; no one-shot behavior.
        assert!(p.generate("hello", None).await.is_err());
    }
}
