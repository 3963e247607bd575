//! Live strategy backed by the Gemini `generateContent` REST endpoint.
//!
//! One request per synthesis. The model is constrained to JSON by both a
//! system instruction and a response schema, and the returned text is
//! parsed and validated before it is handed back.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::credentials::ApiKey;
use super::error::{ResponseDefect, SynthesisError, TransportError};
use super::prompt::{SYSTEM_INSTRUCTION, build_synthesis_prompt};
use super::schema::response_schema;
use super::trait_def::PlanSynthesizer;
use crate::model::{CookingPlan, UserPreferences};

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Public Gemini REST base.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Env var overriding the model name.
pub const MODEL_ENV: &str = "ATELIER_GEMINI_MODEL";

/// Env var overriding the REST base URL.
pub const BASE_URL_ENV: &str = "ATELIER_GEMINI_BASE_URL";

/// Connection settings for [`GeminiSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: Option<f32>,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiConfig {
    /// Defaults, overridden by [`MODEL_ENV`] and [`BASE_URL_ENV`] when set.
    pub fn from_env() -> Self {
        Self::from_env_with(|name| std::env::var(name).ok())
    }

    pub fn from_env_with(env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(model) = env(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            config.model = model.trim().to_string();
        }
        if let Some(url) = env(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `{base_url}/models/{model}:generateContent`
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Remove a surrounding markdown code fence, if the model added one anyway.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim().contains('{') => inner.trim(),
        _ => body.trim(),
    }
}

/// Turn model output text into a validated plan.
pub fn parse_plan_text(text: &str) -> Result<CookingPlan, SynthesisError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(SynthesisError::EmptyResponse);
    }
    let plan: CookingPlan = serde_json::from_str(body).map_err(ResponseDefect::from)?;
    plan.validate().map_err(ResponseDefect::from)?;
    Ok(plan)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<GenerateContentResponse>(body)
        .ok()
        .and_then(|r| r.error)
        .map_or_else(|| body.trim().to_string(), |e| e.message)
}

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Live synthesis strategy.
///
/// Constructed with or without a key. Without one, every call fails with
/// [`SynthesisError::MissingCredential`] and makes no request.
pub struct GeminiSynthesizer {
    client: Client,
    config: GeminiConfig,
    api_key: Option<ApiKey>,
}

impl GeminiSynthesizer {
    pub fn new(config: GeminiConfig, api_key: Option<ApiKey>) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_request(&self, prefs: &UserPreferences, pantry: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_synthesis_prompt(prefs, pantry)),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(SYSTEM_INSTRUCTION.to_string()),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        }
    }
}

impl std::fmt::Debug for GeminiSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSynthesizer")
            .field("config", &self.config)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PlanSynthesizer for GeminiSynthesizer {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn synthesize(
        &self,
        prefs: &UserPreferences,
        pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        let Some(key) = &self.api_key else {
            return Err(SynthesisError::MissingCredential);
        };

        let request = self.build_request(prefs, pantry);
        debug!(endpoint = %self.config.endpoint(), "sending generateContent request");

        let response = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", key.expose())
            .json(&request)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(TransportError::from)?;

        if !status.is_success() {
            let message = error_message(&body);
            error!(status = status.as_u16(), %message, "Gemini API rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let envelope: GenerateContentResponse =
            serde_json::from_str(&body).map_err(ResponseDefect::from)?;
        if let Some(api_error) = envelope.error {
            error!(message = %api_error.message, "Gemini API returned an error body");
            return Err(TransportError::Api {
                message: api_error.message,
            }
            .into());
        }

        let text = envelope.text().unwrap_or_default();
        debug!(bytes = text.len(), "received plan text");
        parse_plan_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::mock::mock_plan;

    #[test]
    fn endpoint_joins_base_and_model() {
        let config = GeminiConfig::default().with_base_url("http://localhost:9999/v1beta/");
        assert_eq!(
            config.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn env_overrides_model_and_base_url() {
        let config = GeminiConfig::from_env_with(|name| match name {
            MODEL_ENV => Some("gemini-flash".into()),
            BASE_URL_ENV => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config.model, "gemini-flash");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn blank_text_is_empty_response() {
        assert!(matches!(
            parse_plan_text("   \n"),
            Err(SynthesisError::EmptyResponse)
        ));
        assert!(matches!(
            parse_plan_text("```json\n```"),
            Err(SynthesisError::EmptyResponse)
        ));
    }

    #[test]
    fn prose_is_malformed() {
        let err = parse_plan_text("Here is your plan!").unwrap_err();
        assert!(matches!(
            err,
            SynthesisError::MalformedResponse(ResponseDefect::Json(_))
        ));
    }

    #[test]
    fn short_week_fails_validation() {
        let mut plan = mock_plan();
        plan.days.truncate(5);
        let text = serde_json::to_string(&plan).unwrap();
        assert!(matches!(
            parse_plan_text(&text).unwrap_err(),
            SynthesisError::MalformedResponse(ResponseDefect::Invalid(_))
        ));
    }

    #[test]
    fn valid_text_round_trips_to_the_same_plan() {
        let text = serde_json::to_string(&mock_plan()).unwrap();
        assert_eq!(parse_plan_text(&text).unwrap(), mock_plan());
    }

    #[test]
    fn request_body_carries_schema_and_instruction() {
        let synth = GeminiSynthesizer::new(GeminiConfig::default(), None).unwrap();
        let body =
            serde_json::to_value(synth.build_request(&UserPreferences::default(), "rice")).unwrap();
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(body["generationConfig"].get("temperature").is_none());
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            SYSTEM_INSTRUCTION
        );
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("STASH: rice"));
    }

    #[test]
    fn error_message_prefers_api_error_body() {
        assert_eq!(
            error_message(r#"{"error":{"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[tokio::test]
    async fn without_key_no_request_is_made() {
        let synth = GeminiSynthesizer::new(
            GeminiConfig::default().with_base_url("http://127.0.0.1:1"),
            None,
        )
        .unwrap();
        assert!(!synth.has_credential());
        let err = synth
            .synthesize(&UserPreferences::default(), "rice")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::MissingCredential));
    }

    #[test]
    fn debug_does_not_leak_key() {
        use crate::synthesis::credentials::CredentialSource;
        let synth = GeminiSynthesizer::new(
            GeminiConfig::default(),
            Some(ApiKey::new("sk-live", CredentialSource::Explicit)),
        )
        .unwrap();
        assert!(!format!("{synth:?}").contains("sk-live"));
    }
}
