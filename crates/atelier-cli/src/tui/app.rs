//! TUI application state: a [`Session`] plus the bits of UI state the
//! session does not own (selection, spinner, status line).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use atelier_core::calendar::{DtEnd, export_filename, generate_ics};
use atelier_core::model::{CookingPlan, DAYS_PER_PLAN, Persona};
use atelier_core::session::{Session, SessionError, Step, SynthesisTicket};
use atelier_core::synthesis::{PlanSynthesizer, SynthesisError};

type Completion = (SynthesisTicket, Result<CookingPlan, SynthesisError>);

/// Application state for the TUI.
pub struct App {
    pub session: Session,
    synthesizer: Arc<dyn PlanSynthesizer>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    pub selected_persona: usize,
    /// 0-based index into the plan's days.
    pub selected_day: usize,
    pub spinner: usize,
    pub export_dir: PathBuf,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App {
    pub fn new(session: Session, synthesizer: Arc<dyn PlanSynthesizer>, export_dir: PathBuf) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            session,
            synthesizer,
            completions_tx,
            completions_rx,
            selected_persona: 0,
            selected_day: 0,
            spinner: 0,
            export_dir,
            tick_rate: Duration::from_millis(120),
            should_quit: false,
            status_message: None,
        }
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn plan(&self) -> Option<Arc<CookingPlan>> {
        self.session.plan()
    }

    // -- Background synthesis --

    /// Start synthesis on a spawned task. The result comes back through
    /// [`Self::poll_synthesis`].
    pub fn start_synthesis(&mut self) -> Result<(), SessionError> {
        let ticket = self.session.begin_synthesis()?;
        let synthesizer = self.synthesizer.clone();
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = synthesizer.synthesize(&ticket.prefs, &ticket.pantry).await;
            let _ = tx.send((ticket, result));
        });
        Ok(())
    }

    /// Apply any finished synthesis. Returns true if one was applied.
    pub fn poll_synthesis(&mut self) -> bool {
        let mut applied = false;
        while let Ok((ticket, result)) = self.completions_rx.try_recv() {
            match self.session.complete_synthesis(ticket, result) {
                Ok(Step::Dashboard) => {
                    self.selected_day = 0;
                    self.status_message = Some("Plan ready".to_string());
                }
                Ok(_) => {}
                Err(e) => self.status_message = Some(e.to_string()),
            }
            applied = true;
        }
        applied
    }

    /// Wait for the in-flight synthesis and apply it (used by tests).
    pub async fn wait_for_synthesis(&mut self) {
        if let Some(completion) = self.completions_rx.recv().await {
            let _ = self.session.complete_synthesis(completion.0, completion.1);
        }
    }

    pub fn on_tick(&mut self) {
        if self.session.is_generating() {
            self.spinner = self.spinner.wrapping_add(1);
        }
    }

    // -- Actions --

    /// Write the whole week's schedule to `export_dir`.
    pub fn export_calendar(&mut self) -> anyhow::Result<PathBuf> {
        let plan = self
            .plan()
            .ok_or_else(|| anyhow::anyhow!("no plan to export yet"))?;
        let ics = generate_ics(&plan.all_events(), DtEnd::default())?;
        let path = self.export_dir.join(export_filename(&plan.id));
        std::fs::write(&path, ics)?;
        Ok(path)
    }

    pub fn log_hydration(&mut self) {
        let litres = self.session.log_hydration();
        self.status_message = Some(format!("Hydration {litres:.2} L"));
    }

    fn navigate(&mut self, to: Step) {
        if let Err(e) = self.session.navigate(to) {
            self.status_message = Some(e.to_string());
        }
    }

    fn begin_onboarding(&mut self) {
        if self.step() != Step::Planner {
            self.navigate(Step::Planner);
        }
        self.navigate(Step::OnboardingPersona);
        self.selected_persona = Persona::ALL
            .iter()
            .position(|p| *p == self.session.preferences().persona)
            .unwrap_or(0);
    }

    // -- Keys --

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        self.status_message = None;

        match self.step() {
            Step::Generating => {}
            Step::OnboardingPantry => self.handle_pantry_key(key.code),
            Step::OnboardingPersona => self.handle_persona_key(key.code),
            Step::Error => match key.code {
                KeyCode::Char('r') | KeyCode::Enter => self.navigate(Step::OnboardingPantry),
                other => self.handle_global_key(other),
            },
            Step::Planner | Step::Calendar => match key.code {
                KeyCode::Left | KeyCode::Char('[') => {
                    self.selected_day = self.selected_day.saturating_sub(1);
                }
                KeyCode::Right | KeyCode::Char(']') => {
                    self.selected_day = (self.selected_day + 1).min(DAYS_PER_PLAN - 1);
                }
                KeyCode::Char('n') => self.begin_onboarding(),
                KeyCode::Enter if self.plan().is_none() => self.begin_onboarding(),
                KeyCode::Char('r') if self.step() == Step::Planner => {
                    self.session.reset_plan();
                    self.status_message = Some("Plan cleared".to_string());
                }
                other => self.handle_global_key(other),
            },
            Step::Dashboard | Step::Grocery => match key.code {
                KeyCode::Char('n') => self.begin_onboarding(),
                other => self.handle_global_key(other),
            },
        }
    }

    fn handle_global_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('1') => self.navigate(Step::Dashboard),
            KeyCode::Char('2') => self.navigate(Step::Planner),
            KeyCode::Char('3') => self.navigate(Step::Calendar),
            KeyCode::Char('4') => self.navigate(Step::Grocery),
            KeyCode::Tab => {
                let next = match self.step() {
                    Step::Dashboard => Step::Planner,
                    Step::Planner => Step::Calendar,
                    Step::Calendar => Step::Grocery,
                    _ => Step::Dashboard,
                };
                self.navigate(next);
            }
            KeyCode::Char('h') => self.log_hydration(),
            KeyCode::Char('e') => match self.export_calendar() {
                Ok(path) => {
                    self.status_message = Some(format!("Calendar saved to {}", path.display()));
                }
                Err(e) => self.status_message = Some(format!("Export failed: {e}")),
            },
            _ => {}
        }
    }

    fn handle_persona_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_persona = self.selected_persona.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected_persona = (self.selected_persona + 1).min(Persona::ALL.len() - 1);
            }
            KeyCode::Enter => {
                let persona = Persona::ALL[self.selected_persona];
                if let Err(e) = self.session.choose_persona(persona) {
                    self.status_message = Some(e.to_string());
                }
            }
            KeyCode::Esc => self.navigate(Step::Planner),
            _ => {}
        }
    }

    fn handle_pantry_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => {
                let mut text = self.session.pantry().to_string();
                text.push(c);
                self.session.set_pantry(text);
            }
            KeyCode::Backspace => {
                let mut text = self.session.pantry().to_string();
                text.pop();
                self.session.set_pantry(text);
            }
            KeyCode::Esc => self.navigate(Step::OnboardingPersona),
            KeyCode::Enter => {
                if let Err(e) = self.start_synthesis() {
                    self.status_message = Some(e.to_string());
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
