//! Interactive TUI dashboard: onboarding, weekly planner, calendar and
//! grocery views over one session.

pub mod app;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use atelier_core::session::Session;
use atelier_core::synthesis::PlanSynthesizer;

use app::App;

/// Launch the interactive TUI dashboard.
pub async fn run_dashboard(
    session: Session,
    synthesizer: Arc<dyn PlanSynthesizer>,
    export_dir: PathBuf,
) -> Result<()> {
    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, synthesizer, export_dir);
    info!(step = %app.step(), "dashboard started");

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = app.tick_rate;

    loop {
        app.poll_synthesis();
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        } else {
            app.on_tick();
        }

        if app.should_quit {
            return Ok(());
        }

        // Let the spawned synthesis task make progress on this thread.
        tokio::task::yield_now().await;
    }
}
