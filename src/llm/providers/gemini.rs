//! Gemini generation provider (`models/{model}:generateContent`).
//!
//! Exposes a single `generate(prompt, image) -> LlmResponse` interface
//! matching the rest of the `LlmProvider` abstraction, plus `list_models`
//! for the diagnostic binary. All Gemini wire types are private to this
//! module; callers never see them.
//!
//! Auth goes in the `x-goog-api-key` header so the key never appears in a
//! URL that could end up in logs or error text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::llm::{LlmResponse, LlmUsage, ProviderError};
use crate::session::Attachment;

const API_KEY_HEADER: &str = "x-goog-api-key";

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for the Gemini REST API.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally. Stateless: conversation
/// history lives with the caller, and each call is one round-trip.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: String,
}

impl GeminiProvider {
    /// Build a provider from config values and the required API key.
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, api_base_url: trim_trailing_slash(api_base_url), model, api_key })
    }

    /// Model identifier as configured.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` (and an optional image) as a single user turn.
    ///
    /// No image means no `inlineData` part at all; the two request shapes
    /// differ structurally, they are not an empty-image variant of one
    /// another.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&Attachment>,
    ) -> Result<LlmResponse, ProviderError> {
        let payload = build_request(prompt, image);

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            has_image = image.is_some(),
            "sending generation request"
        );

        let url = format!("{}/models/{}:generateContent", self.api_base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "generation request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let parsed = response.json::<GenerateContentResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize generation response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        let usage = parsed.usage_metadata.as_ref().map(|u| LlmUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            cached_input_tokens: u.cached_content_token_count,
        });
        if let Some(u) = &usage {
            debug!(
                input_tokens = u.input_tokens,
                output_tokens = u.output_tokens,
                cached_tokens = u.cached_input_tokens,
                "gemini usage"
            );
        }

        let text = extract_text(parsed)?;
        Ok(LlmResponse { text, usage })
    }

    /// List the models available to this API key, following pagination to
    /// exhaustion. Diagnostic use only; not part of the chat call graph.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        let url = format!("{}/models", self.api_base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self.client.get(&url).header(API_KEY_HEADER, &self.api_key);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }

            let response = req
                .send()
                .await
                .map_err(|e| ProviderError::Request(e.to_string()))?;
            let response = check_status(response).await?;

            let page = response.json::<ListModelsResponse>().await.map_err(|e| {
                ProviderError::Request(format!("failed to parse model list: {e}"))
            })?;

            models.extend(page.models);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = models.len(), "model list fetched");
        Ok(models)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    /// Base64-encoded file bytes.
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata", default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    cached_content_token_count: u64,
}

/// One entry of the `models` listing. Public: the diagnostic binary prints
/// these.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

// Error envelope used by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// ── Request construction / response extraction ────────────────────────────────

fn build_request(prompt: &str, image: Option<&Attachment>) -> GenerateContentRequest {
    let mut parts = vec![Part::Text { text: prompt.to_string() }];
    if let Some(att) = image {
        parts.push(Part::InlineData {
            inline_data: InlineData {
                mime_type: att.mime_type.clone(),
                data: BASE64_STANDARD.encode(&att.data),
            },
        });
    }
    GenerateContentRequest { contents: vec![Content { role: "user".to_string(), parts }] }
}

/// Pull the reply text out of a response: first candidate, all of its text
/// parts concatenated.
fn extract_text(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::Request("empty or missing candidates in response".into()))
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    let message = format_error_body(status, &body);

    error!(%status, %message, "gemini request returned HTTP error");
    Err(ProviderError::Request(message))
}

fn format_error_body(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(body) {
        let api_status = env
            .error
            .status
            .filter(|s| !s.is_empty())
            .map(|s| format!(" [{s}]"))
            .unwrap_or_default();
        format!("HTTP {status}{api_status}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> Attachment {
        Attachment {
            name: "photo.png".into(),
            mime_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }
    }

    #[test]
    fn text_only_request_has_single_part() {
        let req = build_request("hello", None);
        let json = serde_json::to_value(&req).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0]["text"], "hello");
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[test]
    fn image_request_appends_inline_data_part() {
        let att = png();
        let req = build_request("what is this", Some(&att));
        let json = serde_json::to_value(&req).unwrap();
        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], "what is this");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(
            parts[1]["inlineData"]["data"],
            BASE64_STANDARD.encode(&att.data)
        );
    }

    #[test]
    fn extract_text_joins_candidate_parts() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "Hello world");
    }

    #[test]
    fn extract_text_errors_on_missing_candidates() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        let err = extract_text(resp).unwrap_err();
        assert!(err.to_string().contains("empty or missing candidates"));
    }

    #[test]
    fn extract_text_errors_on_empty_text() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "  "}]}}]}"#,
        )
        .unwrap();
        assert!(extract_text(resp).is_err());
    }

    #[test]
    fn usage_metadata_deserializes() {
        let resp: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "ok"}]}}],
                "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3}}"#,
        )
        .unwrap();
        let u = resp.usage_metadata.unwrap();
        assert_eq!(u.prompt_token_count, 7);
        assert_eq!(u.candidates_token_count, 3);
        assert_eq!(u.cached_content_token_count, 0);
    }

    #[test]
    fn error_envelope_formats_api_status() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        let msg = format_error_body(reqwest::StatusCode::BAD_REQUEST, body);
        assert!(msg.contains("INVALID_ARGUMENT"));
        assert!(msg.contains("API key not valid"));
    }

    #[test]
    fn unparseable_error_body_falls_back_to_raw() {
        let msg = format_error_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(msg.contains("502"));
        assert!(msg.contains("upstream down"));
    }

    #[test]
    fn model_listing_deserializes() {
        let page: ListModelsResponse = serde_json::from_str(
            r#"{"models": [{"name": "models/gemini-2.5-flash",
                            "supportedGenerationMethods": ["generateContent", "countTokens"]}],
                "nextPageToken": "abc"}"#,
        )
        .unwrap();
        assert_eq!(page.models.len(), 1);
        assert_eq!(page.models[0].name, "models/gemini-2.5-flash");
        assert_eq!(page.models[0].supported_generation_methods.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        assert_eq!(
            trim_trailing_slash("https://example.invalid/v1alpha/".into()),
            "https://example.invalid/v1alpha"
        );
    }
}
