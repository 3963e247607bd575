//! `atelier synthesize`: one plan from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use atelier_core::model::{
    HealthGoal, Persona, ProteinFocus, ReminderPreference, UserPreferences, is_submittable,
};
use atelier_core::synthesis::{PlanSynthesizer, SynthesisService};

use crate::config::AtelierConfig;
use crate::plan_io::save_plan;
use crate::render::render_overview;

/// Per-run preference overrides. Unset flags keep the configured value.
#[derive(Debug, Default, Args)]
pub struct PreferenceArgs {
    /// Persona: professional, gym_enthusiast, household, parent_kid_focus, student
    #[arg(long)]
    pub persona: Option<Persona>,
    /// Free-text diet description
    #[arg(long)]
    pub diet: Option<String>,
    /// Allergy to exclude (repeatable)
    #[arg(long = "allergy")]
    pub allergies: Vec<String>,
    /// Disliked ingredient to avoid (repeatable)
    #[arg(long = "dislike")]
    pub dislikes: Vec<String>,
    /// Protein focus: high, moderate, standard
    #[arg(long)]
    pub protein_focus: Option<ProteinFocus>,
    /// Weekly budget in INR
    #[arg(long)]
    pub budget: Option<f64>,
    /// Maximum prep minutes per meal
    #[arg(long)]
    pub prep_time: Option<u32>,
    /// Kitchen tool available (repeatable)
    #[arg(long = "tool")]
    pub kitchen_tools: Vec<String>,
    /// Preferred cooking window, e.g. "6:00 AM - 7:00 AM"
    #[arg(long)]
    pub cooking_window: Option<String>,
    /// Reminders: morning, evening, both
    #[arg(long)]
    pub reminders: Option<ReminderPreference>,
    /// Health goal: immunity, growth, strength, weight_loss, energy
    #[arg(long)]
    pub goal: Option<HealthGoal>,
}

impl PreferenceArgs {
    /// Overlay the flags that were given onto `prefs`.
    pub fn apply(&self, prefs: &mut UserPreferences) -> Result<()> {
        if let Some(p) = self.persona {
            prefs.persona = p;
        }
        if let Some(d) = &self.diet {
            prefs.diet = d.clone();
        }
        if !self.allergies.is_empty() {
            prefs.allergies = self.allergies.clone();
        }
        if !self.dislikes.is_empty() {
            prefs.dislikes = self.dislikes.clone();
        }
        if let Some(p) = self.protein_focus {
            prefs.protein_focus = p;
        }
        if let Some(b) = self.budget {
            if !b.is_finite() || b < 0.0 {
                bail!("--budget must be a non-negative amount, got {b}");
            }
            prefs.budget_limit = b;
        }
        if let Some(t) = self.prep_time {
            prefs.prep_time_limit = t;
        }
        if !self.kitchen_tools.is_empty() {
            prefs.kitchen_tools = self.kitchen_tools.clone();
        }
        if let Some(w) = &self.cooking_window {
            prefs.cooking_window = w.clone();
        }
        if let Some(r) = self.reminders {
            prefs.reminder_preference = r;
        }
        if let Some(g) = self.goal {
            prefs.health_goal = Some(g);
        }
        Ok(())
    }
}

/// Run the synthesize command.
pub async fn run_synthesize(
    config: AtelierConfig,
    pantry: &str,
    args: &PreferenceArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    if !is_submittable(pantry) {
        bail!("pantry is empty; pass at least one ingredient with --pantry");
    }

    let mut prefs = config.preferences;
    args.apply(&mut prefs)?;

    let service = SynthesisService::from_config(config.gemini, config.explicit_api_key.as_deref())
        .context("failed to build Gemini client")?;

    eprintln!("Synthesizing a week for {}...", prefs.persona.label());
    let plan = service
        .synthesize(&prefs, pantry)
        .await
        .context("plan synthesis failed")?;

    print!("{}", render_overview(&plan));

    if let Some(path) = output {
        save_plan(&path, &plan)?;
        println!();
        println!("Plan written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flags_keep_existing_values() {
        let mut prefs = UserPreferences::default();
        PreferenceArgs::default().apply(&mut prefs).unwrap();
        assert_eq!(prefs, UserPreferences::default());
    }

    #[test]
    fn flags_override_fields() {
        let args = PreferenceArgs {
            persona: Some(Persona::ParentKidFocus),
            allergies: vec!["peanut".into(), "sesame".into()],
            budget: Some(900.0),
            goal: Some(HealthGoal::Growth),
            ..PreferenceArgs::default()
        };
        let mut prefs = UserPreferences::default();
        args.apply(&mut prefs).unwrap();
        assert_eq!(prefs.persona, Persona::ParentKidFocus);
        assert_eq!(prefs.allergies, vec!["peanut", "sesame"]);
        assert_eq!(prefs.budget_limit, 900.0);
        assert_eq!(prefs.health_goal, Some(HealthGoal::Growth));
        assert_eq!(prefs.diet, "Plant-Based");
    }

    #[test]
    fn negative_budget_is_rejected() {
        let args = PreferenceArgs {
            budget: Some(-1.0),
            ..PreferenceArgs::default()
        };
        assert!(args.apply(&mut UserPreferences::default()).is_err());
    }
}
