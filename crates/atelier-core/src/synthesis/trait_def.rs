//! The `PlanSynthesizer` trait: the capability every synthesis strategy
//! provides.
//!
//! The trait is object-safe so a strategy can be held as
//! `Box<dyn PlanSynthesizer>` and swapped for a fake in tests.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::SynthesisError;
use crate::model::{CookingPlan, UserPreferences};

/// Turns preferences and pantry text into a [`CookingPlan`].
#[async_trait]
pub trait PlanSynthesizer: Send + Sync {
    /// Strategy name for logs (e.g. "mock", "gemini").
    fn name(&self) -> &str;

    /// Produce a plan. May suspend on network I/O.
    async fn synthesize(
        &self,
        prefs: &UserPreferences,
        pantry: &str,
    ) -> Result<CookingPlan, SynthesisError>;
}

#[async_trait]
impl<T: PlanSynthesizer + ?Sized> PlanSynthesizer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn synthesize(
        &self,
        prefs: &UserPreferences,
        pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        (**self).synthesize(prefs, pantry).await
    }
}

#[async_trait]
impl<T: PlanSynthesizer + ?Sized> PlanSynthesizer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn synthesize(
        &self,
        prefs: &UserPreferences,
        pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        (**self).synthesize(prefs, pantry).await
    }
}

// Compile-time assertion: PlanSynthesizer must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanSynthesizer) {}
};
