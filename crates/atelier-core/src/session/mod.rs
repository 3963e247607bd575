//! Interactive session: navigation step, preferences, pantry, the current
//! plan and the hydration counter.
//!
//! The session never runs synthesis itself. [`Session::begin_synthesis`]
//! hands out a [`SynthesisTicket`] carrying the inputs; whoever runs the
//! strategy reports back through [`Session::complete_synthesis`]. This keeps
//! the step graph synchronous and lets the caller decide where the future
//! runs (inline in the CLI, on a spawned task in the dashboard).

pub mod hydration;
pub mod slot;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{CookingPlan, Persona, UserPreferences, is_submittable};
use crate::synthesis::{PlanSynthesizer, SynthesisError};

pub use hydration::{HYDRATION_START, HYDRATION_STEP, HYDRATION_TARGET, Hydration};
pub use slot::PlanSlot;

/// Which screen the session is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Dashboard,
    Planner,
    Calendar,
    Grocery,
    OnboardingPersona,
    OnboardingPantry,
    Generating,
    Error,
}

impl Step {
    /// Steps reachable from the navigation bar.
    pub const NAV: [Step; 4] = [Step::Dashboard, Step::Planner, Step::Calendar, Step::Grocery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Planner => "planner",
            Self::Calendar => "calendar",
            Self::Grocery => "grocery",
            Self::OnboardingPersona => "onboarding_persona",
            Self::OnboardingPantry => "onboarding_pantry",
            Self::Generating => "generating",
            Self::Error => "error",
        }
    }

    pub fn is_nav(&self) -> bool {
        Self::NAV.contains(self)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `from -> to` is an edge in the step graph.
///
/// ```text
/// any but generating -> dashboard | planner | calendar | grocery
/// planner            -> onboarding_persona
/// onboarding_persona -> onboarding_pantry
/// onboarding_pantry  -> onboarding_persona   (back)
/// onboarding_pantry  -> generating
/// generating         -> dashboard            (success)
/// generating         -> error                (failure)
/// error              -> onboarding_pantry    (retry)
/// ```
pub fn is_valid_transition(from: Step, to: Step) -> bool {
    if from != Step::Generating && to.is_nav() {
        return true;
    }
    matches!(
        (from, to),
        (Step::Planner, Step::OnboardingPersona)
            | (Step::OnboardingPersona, Step::OnboardingPantry)
            | (Step::OnboardingPantry, Step::OnboardingPersona)
            | (Step::OnboardingPantry, Step::Generating)
            | (Step::Generating, Step::Dashboard)
            | (Step::Generating, Step::Error)
            | (Step::Error, Step::OnboardingPantry)
    )
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid step transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: Step,
    pub to: Step,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("pantry is empty; describe at least one ingredient")]
    EmptyPantry,

    #[error("a synthesis request is already in flight")]
    AlreadyGenerating,

    #[error("synthesis ticket {0} is not the request in flight")]
    StaleTicket(u64),
}

/// Inputs captured for one synthesis request.
///
/// Only the ticket returned by the latest [`Session::begin_synthesis`] is
/// accepted on completion.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisTicket {
    id: u64,
    pub prefs: UserPreferences,
    pub pantry: String,
}

impl SynthesisTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub struct Session {
    step: Step,
    prefs: UserPreferences,
    pantry: String,
    plan: PlanSlot,
    hydration: Hydration,
    in_flight: Option<u64>,
    next_ticket: u64,
    last_error: Option<String>,
}

impl Session {
    /// Fresh session on the dashboard, with no plan.
    pub fn new(prefs: UserPreferences) -> Self {
        Self {
            step: Step::Dashboard,
            prefs,
            pantry: String::new(),
            plan: PlanSlot::new(),
            hydration: Hydration::new(),
            in_flight: None,
            next_ticket: 1,
            last_error: None,
        }
    }

    /// Session that starts with a previously saved plan.
    pub fn with_plan(prefs: UserPreferences, plan: CookingPlan) -> Self {
        let session = Self::new(prefs);
        session.plan.replace(plan);
        session
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.prefs
    }

    pub fn preferences_mut(&mut self) -> &mut UserPreferences {
        &mut self.prefs
    }

    pub fn pantry(&self) -> &str {
        &self.pantry
    }

    pub fn plan(&self) -> Option<Arc<CookingPlan>> {
        self.plan.current()
    }

    /// Handle to the plan slot, for observers outside the session.
    pub fn plan_slot(&self) -> PlanSlot {
        self.plan.clone()
    }

    pub fn hydration(&self) -> Hydration {
        self.hydration
    }

    /// Message from the last failed synthesis, shown on the error step.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    fn transition(&mut self, to: Step) -> Result<(), TransitionError> {
        if !is_valid_transition(self.step, to) {
            return Err(TransitionError {
                from: self.step,
                to,
            });
        }
        debug!(from = %self.step, to = %to, "step transition");
        self.step = to;
        Ok(())
    }

    /// Move to another step along a valid edge.
    ///
    /// Entering or leaving [`Step::Generating`] goes through
    /// [`Self::begin_synthesis`] and [`Self::complete_synthesis`] instead.
    pub fn navigate(&mut self, to: Step) -> Result<(), SessionError> {
        if to == Step::Generating || self.step == Step::Generating {
            return Err(TransitionError {
                from: self.step,
                to,
            }
            .into());
        }
        self.transition(to)?;
        Ok(())
    }

    /// Record the persona picked during onboarding and advance to the
    /// pantry step.
    pub fn choose_persona(&mut self, persona: Persona) -> Result<(), SessionError> {
        self.transition(Step::OnboardingPantry)?;
        self.prefs.persona = persona;
        Ok(())
    }

    pub fn set_pantry(&mut self, text: impl Into<String>) {
        self.pantry = text.into();
    }

    /// Enter [`Step::Generating`] and capture the inputs for one request.
    pub fn begin_synthesis(&mut self) -> Result<SynthesisTicket, SessionError> {
        if self.in_flight.is_some() {
            return Err(SessionError::AlreadyGenerating);
        }
        if !is_submittable(&self.pantry) {
            return Err(SessionError::EmptyPantry);
        }
        self.transition(Step::Generating)?;

        let id = self.next_ticket;
        self.next_ticket += 1;
        self.in_flight = Some(id);
        self.last_error = None;
        info!(ticket = id, persona = %self.prefs.persona, "synthesis started");

        Ok(SynthesisTicket {
            id,
            prefs: self.prefs.clone(),
            pantry: self.pantry.clone(),
        })
    }

    /// Apply the outcome of the request named by `ticket`.
    ///
    /// Success replaces the plan and lands on the dashboard. Failure lands
    /// on the error step and keeps whatever plan was there before.
    pub fn complete_synthesis(
        &mut self,
        ticket: SynthesisTicket,
        result: Result<CookingPlan, SynthesisError>,
    ) -> Result<Step, SessionError> {
        if self.in_flight != Some(ticket.id) {
            warn!(ticket = ticket.id, "ignoring completion for stale ticket");
            return Err(SessionError::StaleTicket(ticket.id));
        }
        self.in_flight = None;

        match result {
            Ok(plan) => {
                info!(ticket = ticket.id, plan_id = %plan.id, "plan installed");
                self.plan.replace(plan);
                self.transition(Step::Dashboard)?;
            }
            Err(e) => {
                warn!(ticket = ticket.id, kind = e.kind(), error = %e, "synthesis failed");
                self.last_error = Some(e.to_string());
                self.transition(Step::Error)?;
            }
        }
        Ok(self.step)
    }

    /// Begin, run and complete one synthesis inline.
    pub async fn synthesize_with(
        &mut self,
        synthesizer: &dyn PlanSynthesizer,
    ) -> Result<Step, SessionError> {
        let ticket = self.begin_synthesis()?;
        let result = synthesizer.synthesize(&ticket.prefs, &ticket.pantry).await;
        self.complete_synthesis(ticket, result)
    }

    /// Discard the current plan. The step is unchanged.
    pub fn reset_plan(&mut self) {
        if self.plan.clear().is_some() {
            info!("plan cleared");
        }
    }

    /// Log one glass of water; returns the new total in litres.
    pub fn log_hydration(&mut self) -> f64 {
        self.hydration.log()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}
