//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory
//! (every section is optional, so a missing file resolves to defaults),
//! then applies the `GEMCHAT_LOG_LEVEL` env override.
//!
//! The API key is sourced from `GOOGLE_API_KEY` only, never from TOML.

use std::{env, fs, path::Path};

use serde::Deserialize;

use crate::error::AppError;
use crate::logger;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Gemini provider configuration, from `[llm.gemini]`.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL including the version segment (the upstream pins
    /// `v1alpha`).
    pub api_base_url: String,
    /// Model identifier passed in the request path.
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM adapter configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"gemini"` or `"dummy"`).
    /// Maps to `default` in `[llm]` TOML.
    pub provider: String,
    /// Config for the Gemini provider (`[llm.gemini]`).
    pub gemini: GeminiConfig,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub llm: LlmConfig,
    /// API key from the `GOOGLE_API_KEY` env var. `None` when unset or
    /// empty; only the dummy provider runs without one.
    pub api_key: Option<String>,
}

/// Raw TOML shape, the `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_log_level")]
    log_level: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    /// Maps to `default = "..."` in `[llm]`.
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    gemini: RawGeminiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), gemini: RawGeminiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawGeminiConfig {
    #[serde(default = "default_gemini_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_gemini_model")]
    model: String,
    #[serde(default = "default_gemini_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_gemini_timeout_seconds(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_llm_provider() -> String { "gemini".to_string() }
fn default_gemini_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1alpha".to_string()
}
fn default_gemini_model() -> String { "gemini-2.5-flash".to_string() }
fn default_gemini_timeout_seconds() -> u64 { 60 }

/// Load config, then apply env-var overrides.
///
/// `path` is an explicit config file (errors if absent). With `None`, the
/// default path is read when present and built-in defaults apply otherwise.
pub fn load(path: Option<&Path>) -> Result<Config, AppError> {
    let log_level_override = env::var("GEMCHAT_LOG_LEVEL").ok();
    let api_key = env::var("GOOGLE_API_KEY").ok();
    load_from(path, log_level_override.as_deref(), api_key)
}

/// Internal loader. Tests pass overrides directly instead of mutating env
/// vars.
pub fn load_from(
    path: Option<&Path>,
    log_level_override: Option<&str>,
    api_key: Option<String>,
) -> Result<Config, AppError> {
    let parsed = match path {
        Some(p) => parse_file(p)?,
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() { parse_file(default)? } else { RawConfig::default() }
        }
    };

    let log_level = log_level_override.unwrap_or(&parsed.app.log_level).to_string();
    logger::parse_level(&log_level)?;

    Ok(Config {
        log_level,
        llm: LlmConfig {
            provider: parsed.llm.provider,
            gemini: GeminiConfig {
                api_base_url: parsed.llm.gemini.api_base_url,
                model: parsed.llm.gemini.model,
                timeout_seconds: parsed.llm.gemini.timeout_seconds,
            },
        },
        // An empty key counts as unset, matching the startup check upstream.
        api_key: api_key.filter(|k| !k.is_empty()),
    })
}

fn parse_file(path: &Path) -> Result<RawConfig, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for unit tests: dummy LLM, no API key, no external calls.
#[cfg(test)]
impl Config {
    pub fn test_default() -> Self {
        Self {
            log_level: "info".into(),
            llm: LlmConfig {
                provider: "dummy".into(),
                gemini: GeminiConfig {
                    api_base_url: "http://localhost:0/v1alpha".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            api_key: None,
        }
    }
}
