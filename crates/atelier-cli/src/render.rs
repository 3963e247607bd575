//! Plain-text views of a plan, used by `synthesize` and `show`.

use std::fmt::Write as _;

use atelier_core::model::{CookingPlan, DayPlan, Meal};

/// Format a rupee amount without trailing zeros for whole values.
pub fn inr(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("INR {amount:.0}")
    } else {
        format!("INR {amount:.2}")
    }
}

/// Summary metrics, philosophy and a one-line-per-day outline.
pub fn render_overview(plan: &CookingPlan) -> String {
    let mut out = String::new();
    let s = &plan.summary;
    let _ = writeln!(out, "Plan {}", plan.id);
    let _ = writeln!(out, "  {}", s.nutrition_philosophy);
    let _ = writeln!(out);
    let _ = writeln!(out, "  Weekly cost      {}", inr(s.total_cost));
    let _ = writeln!(out, "  Avg protein      {:.0} g/day", s.avg_protein);
    let _ = writeln!(out, "  Efficiency       {:.0}%", s.efficiency_score);
    let _ = writeln!(out, "  Sustainability   {}", s.sustainability_rating);
    if !s.waste_reduction_hacks.is_empty() {
        let _ = writeln!(out, "  Zero-waste       {}", s.waste_reduction_hacks.join("; "));
    }
    let _ = writeln!(out);
    for day in &plan.days {
        let _ = writeln!(
            out,
            "  Day {} {}  {:>5.0} kcal  {:>4.0} g protein  {:>3} meals  wellness {:.0}",
            day.day,
            day.date,
            day.total_calories(),
            day.total_protein(),
            day.meals.len(),
            day.wellness_score,
        );
    }
    out
}

fn render_meal(out: &mut String, meal: &Meal) {
    let m = &meal.macros;
    let _ = writeln!(
        out,
        "  [{}] {}  ({} min, {})",
        meal.meal_type,
        meal.name,
        meal.total_time(),
        inr(meal.cost)
    );
    let _ = writeln!(
        out,
        "      {:.0} kcal  P {:.0}g  C {:.0}g  F {:.0}g{}",
        meal.calories,
        m.p,
        m.c,
        m.f,
        m.fiber.map(|f| format!("  fibre {f:.0}g")).unwrap_or_default()
    );
    let _ = writeln!(out, "      {} / {}", meal.health_benefit, meal.fresh_factor);
    for ing in &meal.ingredients {
        let lock = if ing.is_locked { " (locked)" } else { "" };
        let _ = writeln!(out, "      - {} {}{}", ing.quantity, ing.name, lock);
    }
    for (i, step) in meal.instructions.iter().enumerate() {
        let _ = writeln!(out, "      {}. {}", i + 1, step);
    }
}

/// Meals with macros, ingredients and steps, then the day's schedule.
pub fn render_day(day: &DayPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Day {} ({})", day.day, day.date);
    let _ = writeln!(out, "  {}", day.daily_insight);
    let _ = writeln!(out);
    for meal in &day.meals {
        render_meal(&mut out, meal);
    }
    if !day.schedule.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Rituals");
        for event in &day.schedule {
            let _ = writeln!(
                out,
                "    {} {:<10} {} ({} min): {}",
                event.start_time,
                event.event_type.as_str(),
                event.title,
                event.duration_minutes,
                event.description
            );
        }
    }
    out
}

/// Grocery list grouped by category with per-category totals.
pub fn render_grocery(plan: &CookingPlan) -> String {
    let mut out = String::new();
    let groups = plan.grocery_by_category();
    if groups.is_empty() {
        out.push_str("Grocery list is empty.\n");
        return out;
    }
    let mut grand_total = 0.0;
    for group in groups {
        let _ = writeln!(out, "{}  ({})", group.category, inr(group.total));
        for item in &group.items {
            let _ = writeln!(
                out,
                "  {:<9} {:<28} {}",
                item.priority.to_string(),
                item.item,
                inr(item.estimated_cost)
            );
        }
        grand_total += group.total;
    }
    let _ = writeln!(out, "Total  {}", inr(grand_total));
    out
}
