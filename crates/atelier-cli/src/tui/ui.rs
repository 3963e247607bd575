//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table, Wrap};

use atelier_core::model::{CookingPlan, EventType, Persona, Priority};
use atelier_core::session::Step;

use super::app::App;
use crate::render::inr;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the current step.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    match app.step() {
        Step::Dashboard => render_dashboard(f, app, chunks[0]),
        Step::Planner => render_planner(f, app, chunks[0]),
        Step::Calendar => render_calendar(f, app, chunks[0]),
        Step::Grocery => render_grocery(f, app, chunks[0]),
        Step::OnboardingPersona => render_persona_picker(f, app, chunks[0]),
        Step::OnboardingPantry => render_pantry_input(f, app, chunks[0]),
        Step::Generating => render_generating(f, app, chunks[0]),
        Step::Error => render_error(f, app, chunks[0]),
    }

    render_status_bar(f, app, chunks[1]);
}

fn titled(title: &str) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(format!(" {title} "))
}

fn header_row(cells: &[&'static str]) -> Row<'static> {
    Row::new(
        cells
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow))),
    )
    .height(1)
}

fn no_plan(f: &mut Frame, area: Rect, title: &str) {
    let text = vec![
        Line::from(""),
        Line::from("  No plan yet."),
        Line::from("  Press n to start onboarding."),
    ];
    f.render_widget(Paragraph::new(text).block(titled(title)), area);
}

// -- Dashboard --

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // summary
            Constraint::Length(3), // hydration
            Constraint::Min(4),    // consistency
        ])
        .split(area);

    match app.plan() {
        Some(plan) => {
            render_summary(f, &plan, chunks[0]);
            render_consistency(f, &plan, chunks[2]);
        }
        None => {
            no_plan(f, chunks[0], "Summary");
            f.render_widget(Paragraph::new("").block(titled("Consistency")), chunks[2]);
        }
    }

    let hydration = app.session.hydration();
    let color = if hydration.is_complete() {
        Color::Green
    } else {
        Color::Cyan
    };
    let gauge = Gauge::default()
        .block(titled("Hydration"))
        .gauge_style(Style::default().fg(color))
        .ratio(hydration.progress_percent() / 100.0)
        .label(format!("{:.2} L  (h to log a glass)", hydration.litres()));
    f.render_widget(gauge, chunks[1]);
}

fn render_summary(f: &mut Frame, plan: &CookingPlan, area: Rect) {
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::Yellow));
    let a = &plan.analytics;
    let text = vec![
        Line::from(vec![
            label("Weekly cost: "),
            Span::raw(inr(plan.summary.total_cost)),
            Span::raw("   "),
            label("Avg protein: "),
            Span::raw(format!("{:.0} g", plan.summary.avg_protein)),
            Span::raw("   "),
            label("Efficiency: "),
            Span::raw(format!("{:.0}", plan.summary.efficiency_score)),
        ]),
        Line::from(vec![
            label("Sustainability: "),
            Span::raw(plan.summary.sustainability_rating.clone()),
        ]),
        Line::from(vec![
            label("Calorie efficiency: "),
            Span::raw(format!("{:.0}", a.calorie_efficiency)),
            Span::raw("   "),
            label("Micronutrients: "),
            Span::raw(format!("{:.0}", a.micronutrient_balance)),
            Span::raw("   "),
            label("Sleep: "),
            Span::raw(format!("{:.0}", a.sleep_score)),
        ]),
        Line::from(Span::styled(
            plan.summary.nutrition_philosophy.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(titled(&format!("Plan {}", plan.id)));
    f.render_widget(p, area);
}

fn render_consistency(f: &mut Frame, plan: &CookingPlan, area: Rect) {
    let header = header_row(&["Day", "Consistency", "Protein trend"]);
    let rows = plan
        .analytics
        .weekly_consistency
        .iter()
        .zip(&plan.analytics.protein_trends)
        .enumerate()
        .map(|(i, (consistency, protein))| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(bar(*consistency, 100.0, 20)),
                Cell::from(format!("{protein:.0} g")),
            ])
        });
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(24),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(titled("Consistency"));
    f.render_widget(table, area);
}

// -- Planner --

fn render_planner(f: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = app.plan() else {
        return no_plan(f, area, "Planner");
    };
    let Some(day) = plan.days.get(app.selected_day) else {
        return no_plan(f, area, "Planner");
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let header = Paragraph::new(format!(
        " {}  |  wellness {:.0}  |  {:.0} kcal  |  {:.0} g protein  |  {}",
        day.daily_insight,
        day.wellness_score,
        day.total_calories(),
        day.total_protein(),
        inr(day.total_cost()),
    ))
    .block(titled(&format!("Day {} - {}", day.day, day.date)));
    f.render_widget(header, chunks[0]);

    let rows = day.meals.iter().map(|meal| {
        let ingredients = meal
            .ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Row::new(vec![
            Cell::from(meal.meal_type.as_str()),
            Cell::from(meal.name.clone()),
            Cell::from(format!("{} min", meal.total_time())),
            Cell::from(format!("{:.0} g", meal.protein_grams)),
            Cell::from(inr(meal.cost)),
            Cell::from(ingredients),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Percentage(25),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header_row(&["Meal", "Dish", "Time", "Protein", "Cost", "Ingredients"]))
    .block(titled("Meals"));
    f.render_widget(table, chunks[1]);
}

// -- Calendar --

fn render_calendar(f: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = app.plan() else {
        return no_plan(f, area, "Calendar");
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, plan.days.len().max(1) as u32); plan.days.len()])
        .split(area);

    for (i, (day, column)) in plan.days.iter().zip(columns.iter()).enumerate() {
        let lines: Vec<Line> = day
            .schedule
            .iter()
            .flat_map(|ev| {
                [
                    Line::from(Span::styled(
                        ev.start_time.clone(),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Line::from(event_colored(ev.event_type, &ev.title)),
                    Line::from(""),
                ]
            })
            .collect();
        let border = if i == app.selected_day {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
            titled(&format!("Day {}", day.day)).border_style(border),
        );
        f.render_widget(p, *column);
    }
}

// -- Grocery --

fn render_grocery(f: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = app.plan() else {
        return no_plan(f, area, "Grocery");
    };

    let mut rows = Vec::new();
    for group in plan.grocery_by_category() {
        rows.push(
            Row::new(vec![
                Cell::from(group.category.to_string()),
                Cell::from(""),
                Cell::from(inr(group.total)),
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        );
        for item in group.items {
            rows.push(Row::new(vec![
                Cell::from(format!("  {}", item.item)),
                Cell::from(priority_colored(item.priority)),
                Cell::from(inr(item.estimated_cost)),
            ]));
        }
    }

    let total: f64 = plan.grocery_list.iter().map(|i| i.estimated_cost).sum();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Length(10),
            Constraint::Length(14),
        ],
    )
    .header(header_row(&["Item", "Priority", "Cost"]))
    .block(titled(&format!("Grocery ({})", inr(total))));
    f.render_widget(table, area);
}

// -- Onboarding --

fn render_persona_picker(f: &mut Frame, app: &App, area: Rect) {
    let rows = Persona::ALL.iter().enumerate().map(|(i, persona)| {
        let style = if i == app.selected_persona {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(persona.label()),
            Cell::from(persona.as_str()),
        ])
        .style(style)
    });
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(10)])
        .block(titled("Who are we cooking for?"));
    f.render_widget(table, area);
}

fn render_pantry_input(f: &mut Frame, app: &App, area: Rect) {
    let prefs = app.session.preferences();
    let text = vec![
        Line::from(vec![
            Span::styled("Persona: ", Style::default().fg(Color::Yellow)),
            Span::raw(prefs.persona.label()),
            Span::raw("   "),
            Span::styled("Diet: ", Style::default().fg(Color::Yellow)),
            Span::raw(prefs.diet.as_str()),
            Span::raw("   "),
            Span::styled("Budget: ", Style::default().fg(Color::Yellow)),
            Span::raw(inr(prefs.budget_limit)),
        ]),
        Line::from(""),
        Line::from("What is in your pantry?"),
        Line::from(vec![
            Span::raw("> "),
            Span::styled(app.session.pantry(), Style::default().fg(Color::Cyan)),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: synthesize   Esc: back",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(titled("Pantry"));
    f.render_widget(p, area);
}

fn render_generating(f: &mut Frame, app: &App, area: Rect) {
    let frame = SPINNER[app.spinner % SPINNER.len()];
    let text = vec![
        Line::from(""),
        Line::from(format!("  {frame} Synthesizing your week...")),
    ];
    f.render_widget(Paragraph::new(text).block(titled("Atelier")), area);
}

fn render_error(f: &mut Frame, app: &App, area: Rect) {
    let message = app.session.last_error().unwrap_or("unknown error");
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Synthesis failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("  {message}")),
        Line::from(""),
        Line::from("  r: retry   1: back to dashboard"),
    ];
    let p = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(titled("Error"));
    f.render_widget(p, area);
}

// -- Status bar --

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_msg = app.status_message.as_deref().unwrap_or("");
    let keys = match app.step() {
        Step::OnboardingPantry | Step::OnboardingPersona | Step::Generating => "",
        _ => "  q:quit  1-4:views  n:new plan  e:export  h:water",
    };

    let bar = Line::from(vec![
        Span::styled(
            format!(" {} ", app.step()),
            Style::default().bg(Color::Blue).fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw(keys),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("{}{} {value:.0}", "#".repeat(filled), ".".repeat(width - filled))
}

fn event_colored(event_type: EventType, title: &str) -> Span<'static> {
    let color = match event_type {
        EventType::Shopping => Color::Magenta,
        EventType::Prep => Color::Yellow,
        EventType::Cooking => Color::Red,
        EventType::Hydration => Color::Cyan,
        EventType::Meal => Color::Green,
    };
    Span::styled(title.to_string(), Style::default().fg(color))
}

fn priority_colored(priority: Priority) -> Span<'static> {
    let color = match priority {
        Priority::Must => Color::Red,
        Priority::Optional => Color::DarkGray,
    };
    Span::styled(priority.to_string(), Style::default().fg(color))
}
