//! The synthesis boundary: picks mock or live per request.
//!
//! * pantry contains `test_mode` (any case) -> mock strategy, with its delay
//! * live strategy has no credential -> warn, return the mock plan at once
//! * live strategy fails any other way -> error surfaced unchanged

use async_trait::async_trait;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::credentials::resolve_api_key;
use super::error::{SynthesisError, TransportError};
use super::gemini::{GeminiConfig, GeminiSynthesizer};
use super::mock::{MockSynthesizer, mock_plan};
use super::trait_def::PlanSynthesizer;
use crate::model::{CookingPlan, UserPreferences, is_test_mode};

pub struct SynthesisService {
    mock: MockSynthesizer,
    live: Box<dyn PlanSynthesizer>,
}

impl SynthesisService {
    pub fn new(mock: MockSynthesizer, live: Box<dyn PlanSynthesizer>) -> Self {
        Self { mock, live }
    }

    /// Service over a [`GeminiSynthesizer`], resolving the key from
    /// `explicit_key`, the environment, then the build.
    pub fn from_config(
        config: GeminiConfig,
        explicit_key: Option<&str>,
    ) -> Result<Self, TransportError> {
        let key = resolve_api_key(explicit_key);
        match &key {
            Some(k) => info!(source = %k.source(), model = %config.model, "Gemini key resolved"),
            None => info!("no Gemini key configured; live requests will use the mock plan"),
        }
        let live = GeminiSynthesizer::new(config, key)?;
        Ok(Self::new(MockSynthesizer::new(), Box::new(live)))
    }

    pub fn live_name(&self) -> &str {
        self.live.name()
    }
}

#[async_trait]
impl PlanSynthesizer for SynthesisService {
    fn name(&self) -> &str {
        "service"
    }

    async fn synthesize(
        &self,
        prefs: &UserPreferences,
        pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        let request_id = Uuid::new_v4();

        if is_test_mode(pantry) {
            info!(%request_id, strategy = self.mock.name(), "test_mode pantry, serving mock plan");
            return self.mock.synthesize(prefs, pantry).await;
        }

        info!(%request_id, strategy = self.live.name(), persona = %prefs.persona, "synthesizing plan");
        match self.live.synthesize(prefs, pantry).await {
            Ok(plan) => {
                info!(%request_id, plan_id = %plan.id, "plan synthesized");
                Ok(plan)
            }
            Err(SynthesisError::MissingCredential) => {
                warn!(%request_id, "no API key available, falling back to mock plan");
                Ok(mock_plan())
            }
            Err(e) => {
                error!(%request_id, kind = e.kind(), error = %e, "plan synthesis failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::synthesis::mock::{DEFAULT_MOCK_DELAY, MOCK_PLAN_ID};

    struct Fixed {
        calls: Arc<AtomicUsize>,
        outcome: fn() -> Result<CookingPlan, SynthesisError>,
    }

    #[async_trait]
    impl PlanSynthesizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn synthesize(
            &self,
            _prefs: &UserPreferences,
            _pantry: &str,
        ) -> Result<CookingPlan, SynthesisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn service(
        outcome: fn() -> Result<CookingPlan, SynthesisError>,
    ) -> (SynthesisService, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let live = Fixed {
            calls: calls.clone(),
            outcome,
        };
        (
            SynthesisService::new(MockSynthesizer::new(), Box::new(live)),
            calls,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn sentinel_pantry_never_touches_live() {
        let (svc, calls) = service(|| Err(SynthesisError::EmptyResponse));
        let started = tokio::time::Instant::now();
        let plan = svc
            .synthesize(&UserPreferences::default(), "test_mode")
            .await
            .unwrap();
        assert_eq!(plan.id, MOCK_PLAN_ID);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(started.elapsed() >= DEFAULT_MOCK_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn sentinel_matches_anywhere_in_any_case() {
        let (svc, calls) = service(|| Err(SynthesisError::EmptyResponse));
        let plan = svc
            .synthesize(&UserPreferences::default(), "rice, Test_Mode, dal")
            .await
            .unwrap();
        assert_eq!(plan, mock_plan());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let err = svc
            .synthesize(&UserPreferences::default(), "test mode")
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::EmptyResponse));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_credential_returns_mock_without_delay() {
        let (svc, _) = service(|| Err(SynthesisError::MissingCredential));
        let started = tokio::time::Instant::now();
        let plan = svc
            .synthesize(&UserPreferences::default(), "rice, dal")
            .await
            .unwrap();
        assert_eq!(plan, mock_plan());
        assert!(started.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test]
    async fn live_errors_are_surfaced() {
        let (svc, _) = service(|| {
            Err(TransportError::Status {
                status: 500,
                message: "boom".into(),
            }
            .into())
        });
        let err = svc
            .synthesize(&UserPreferences::default(), "rice")
            .await
            .unwrap_err();
        assert!(err.is_surfaced());
        assert_eq!(err.kind(), "transport_failure");
    }

    #[tokio::test]
    async fn live_success_passes_through() {
        let (svc, calls) = service(|| {
            let mut plan = mock_plan();
            plan.id = "live-123".into();
            Ok(plan)
        });
        let plan = svc
            .synthesize(&UserPreferences::default(), "quinoa")
            .await
            .unwrap();
        assert_eq!(plan.id, "live-123");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.live_name(), "fixed");
    }
}
