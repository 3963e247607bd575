//! Shared fixtures for Atelier integration tests.
//!
//! - preference fixtures
//! - scripted [`PlanSynthesizer`] fakes that count calls and can stall
//! - a wiremock-backed stand-in for the Gemini REST endpoint

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atelier_core::model::{
    CookingPlan, HealthGoal, Persona, ProteinFocus, ReminderPreference, UserPreferences,
};
use atelier_core::synthesis::{
    ApiKey, CredentialSource, DEFAULT_MODEL, GeminiConfig, PlanSynthesizer, SynthesisError,
    mock_plan,
};

/// Preferences that differ from the defaults in every field.
pub fn sample_preferences() -> UserPreferences {
    UserPreferences {
        persona: Persona::GymEnthusiast,
        diet: "Pescatarian".into(),
        allergies: vec!["shellfish".into()],
        dislikes: vec!["okra".into()],
        protein_focus: ProteinFocus::High,
        budget_limit: 4200.0,
        prep_time_limit: 20,
        kitchen_tools: vec!["Air fryer".into()],
        cooking_window: "6:00 AM - 7:00 AM".into(),
        reminder_preference: ReminderPreference::Morning,
        health_goal: Some(HealthGoal::Strength),
    }
}

/// The mock plan with a different id, for telling plans apart.
pub fn plan_with_id(id: &str) -> CookingPlan {
    let mut plan = mock_plan();
    plan.id = id.to_string();
    plan
}

/// A test API key.
pub fn test_key() -> ApiKey {
    ApiKey::new("test-key", CredentialSource::Explicit)
}

// ---------------------------------------------------------------------------
// Scripted strategies
// ---------------------------------------------------------------------------

type Outcome = Box<dyn Fn() -> Result<CookingPlan, SynthesisError> + Send + Sync>;

/// Strategy that plays back queued outcomes, optionally after a delay.
///
/// When the queue runs dry the fallback outcome repeats.
pub struct ScriptedSynthesizer {
    queue: Mutex<VecDeque<(Duration, Outcome)>>,
    fallback: Outcome,
    calls: Arc<AtomicUsize>,
}

impl ScriptedSynthesizer {
    /// Always succeeds with [`mock_plan`].
    pub fn succeeding() -> Self {
        Self::with_fallback(|| Ok(mock_plan()))
    }

    /// Always fails with the error built by `err`.
    pub fn failing(err: fn() -> SynthesisError) -> Self {
        Self::with_fallback(move || Err(err()))
    }

    pub fn with_fallback(
        outcome: impl Fn() -> Result<CookingPlan, SynthesisError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Box::new(outcome),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queue a single outcome, returned after `delay`.
    pub fn then(
        self,
        delay: Duration,
        outcome: impl Fn() -> Result<CookingPlan, SynthesisError> + Send + Sync + 'static,
    ) -> Self {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back((delay, Box::new(outcome)));
        }
        self
    }

    /// Shared call counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl PlanSynthesizer for ScriptedSynthesizer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn synthesize(
        &self,
        _prefs: &UserPreferences,
        _pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some((delay, outcome)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                outcome()
            }
            None => (self.fallback)(),
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini stand-in
// ---------------------------------------------------------------------------

/// Path the live strategy posts to for the default model.
pub fn generate_content_path() -> String {
    format!("/v1beta/models/{DEFAULT_MODEL}:generateContent")
}

/// A `generateContent` success envelope whose only part is `text`.
pub fn gemini_text_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 20, "totalTokenCount": 30 }
    })
}

/// A `generateContent` envelope wrapping `plan` as minified JSON text.
pub fn gemini_plan_response(plan: &CookingPlan) -> Value {
    let text = serde_json::to_string(plan).unwrap_or_default();
    gemini_text_response(&text)
}

/// Start a server that answers every `generateContent` call with
/// `status` and `body`.
pub async fn mock_gemini_server(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// Config pointing the live strategy at `server`.
pub fn gemini_config_for(server: &MockServer) -> GeminiConfig {
    GeminiConfig::default().with_base_url(format!("{}/v1beta", server.uri()))
}
