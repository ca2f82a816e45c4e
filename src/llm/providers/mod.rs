//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory, called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and an optional API key.
///
/// `api_key` is sourced from `GOOGLE_API_KEY` env (never TOML). The Gemini
/// backend refuses to start without one; the dummy backend is keyless.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::new())),
        "gemini" => {
            let key = api_key.ok_or(ProviderError::MissingApiKey("GOOGLE_API_KEY"))?;
            let g = &config.gemini;
            let p = gemini::GeminiProvider::new(
                g.api_base_url.clone(),
                g.model.clone(),
                g.timeout_seconds,
                key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn dummy_builds_without_key() {
        let cfg = Config::test_default();
        assert!(build(&cfg.llm, None).is_ok());
    }

    #[test]
    fn gemini_requires_api_key() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "gemini".into();
        let err = build(&cfg.llm, None).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn gemini_builds_with_key() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "gemini".into();
        let provider = build(&cfg.llm, Some("k".into())).unwrap();
        assert_eq!(provider.model_name(), "test-model");
    }

    #[test]
    fn unknown_provider_rejected() {
        let mut cfg = Config::test_default();
        cfg.llm.provider = "claude".into();
        let err = build(&cfg.llm, None).unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }
}
