//! Prompt construction for the live synthesis request.
//!
//! Pure string assembly; no I/O.

use crate::model::UserPreferences;

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "Output ONLY a minified JSON object matching the \
CookingPlan schema. No markdown, no code fences, no prose before or after the JSON.";

/// Fixed guidance appended after the user profile.
const INSTRUCTIONS: &str = "INSTRUCTIONS:
1. Act as a world-class nutritionist and artisan chef.
2. Optimize for zero waste and scientific macro balance.
3. Calculate costs from local Indian market averages (INR).
4. Provide exactly 7 distinct days of nourishment and rituals, numbered 1 to 7.
5. Every grocery item priority must be MUST or OPTIONAL.
6. analytics.weeklyConsistency and analytics.proteinTrends must each hold 7 numbers.
";

/// Render a list for the prompt, or `None` when it is empty.
fn joined(items: &[String]) -> Option<String> {
    let kept: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    (!kept.is_empty()).then(|| kept.join(", "))
}

/// Build the user prompt for one synthesis request.
///
/// Always embeds persona, diet, health goal, pantry and budget (INR). The
/// remaining preferences are included only when set.
pub fn build_synthesis_prompt(prefs: &UserPreferences, pantry: &str) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("TASK: SYNTHESIZE_WELLNESS_BLUEPRINT\n");
    prompt.push_str(&format!("PROFILE: {}\n", prefs.persona));

    let goal = prefs
        .health_goal
        .map(|g| g.to_string())
        .unwrap_or_else(|| "General Wellness".to_string());
    prompt.push_str(&format!("RESTRICTIONS: {} | GOAL: {goal}\n", prefs.diet.trim()));
    prompt.push_str(&format!("STASH: {}\n", pantry.trim()));
    prompt.push_str(&format!("BUDGET: INR {}\n", prefs.budget_limit));

    if let Some(allergies) = joined(&prefs.allergies) {
        prompt.push_str(&format!("ALLERGIES (never include): {allergies}\n"));
    }
    if let Some(dislikes) = joined(&prefs.dislikes) {
        prompt.push_str(&format!("DISLIKES (avoid): {dislikes}\n"));
    }
    prompt.push_str(&format!("PROTEIN FOCUS: {}\n", prefs.protein_focus));
    prompt.push_str(&format!(
        "PREP TIME LIMIT: {} minutes per meal\n",
        prefs.prep_time_limit
    ));
    if let Some(tools) = joined(&prefs.kitchen_tools) {
        prompt.push_str(&format!("KITCHEN TOOLS: {tools}\n"));
    }
    if !prefs.cooking_window.trim().is_empty() {
        prompt.push_str(&format!("COOKING WINDOW: {}\n", prefs.cooking_window.trim()));
    }
    prompt.push_str(&format!("REMINDERS: {}\n", prefs.reminder_preference));

    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);

    prompt
}
