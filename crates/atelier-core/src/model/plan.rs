//! The synthesized cooking plan: one week of meals, rituals, groceries and
//! analytics.
//!
//! These types mirror the JSON document the generative API is constrained to
//! produce (see [`crate::synthesis::schema`]), so field names are camelCase on
//! the wire. A plan is an immutable value once produced; callers share it as
//! `Arc<CookingPlan>` and replace it wholesale.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of days in every plan.
pub const DAYS_PER_PLAN: usize = 7;

// ---------------------------------------------------------------------------
// Tag enums
// ---------------------------------------------------------------------------

/// Which slot of the day a meal fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "BREAKFAST",
            Self::Lunch => "LUNCH",
            Self::Dinner => "DINNER",
            Self::Snack => "SNACK",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of scheduled ritual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Shopping,
    Prep,
    Cooking,
    Hydration,
    Meal,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shopping => "SHOPPING",
            Self::Prep => "PREP",
            Self::Cooking => "COOKING",
            Self::Hydration => "HYDRATION",
            Self::Meal => "MEAL",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a grocery item is essential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "MUST")]
    Must,
    #[serde(rename = "OPTIONAL")]
    Optional,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Must => "MUST",
            Self::Optional => "OPTIONAL",
        })
    }
}

// ---------------------------------------------------------------------------
// Plan components
// ---------------------------------------------------------------------------

/// Protein / carbohydrate / fat grams, plus optional fibre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroMatrix {
    pub p: f64,
    pub c: f64,
    pub f: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
}

impl MacroMatrix {
    /// Total macro grams (fibre excluded).
    pub fn total_grams(&self) -> f64 {
        self.p + self.c + self.f
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    /// Free-text quantity such as "50g" or "2 cups".
    pub quantity: String,
    pub cost: f64,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    pub cost: f64,
    /// Minutes.
    pub prep_time: u32,
    /// Minutes.
    pub cook_time: u32,
    pub protein_grams: f64,
    pub calories: f64,
    pub macros: MacroMatrix,
    pub ingredients: Vec<Ingredient>,
    /// Sequential steps.
    pub instructions: Vec<String>,
    pub health_benefit: String,
    pub fresh_factor: String,
}

impl Meal {
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }
}

/// A scheduled ritual (shopping trip, prep block, hydration reminder, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    /// `HH:MM`, 24-hour clock.
    pub start_time: String,
    pub duration_minutes: u32,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// 1-based day index within the week.
    pub day: u32,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub daily_insight: String,
    pub wellness_score: f64,
    pub meals: Vec<Meal>,
    pub schedule: Vec<CalendarEvent>,
}

impl DayPlan {
    pub fn total_calories(&self) -> f64 {
        self.meals.iter().map(|m| m.calories).sum()
    }

    pub fn total_protein(&self) -> f64 {
        self.meals.iter().map(|m| m.protein_grams).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.meals.iter().map(|m| m.cost).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_cost: f64,
    pub avg_protein: f64,
    /// 0-100.
    pub efficiency_score: f64,
    pub waste_reduction_hacks: Vec<String>,
    pub sustainability_rating: String,
    pub nutrition_philosophy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub item: String,
    pub category: String,
    pub estimated_cost: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    /// One value per day of the week.
    pub weekly_consistency: Vec<f64>,
    /// One value per day of the week.
    pub protein_trends: Vec<f64>,
    pub calorie_efficiency: f64,
    pub micronutrient_balance: f64,
    pub sleep_score: f64,
    pub hydration_compliance: f64,
}

/// The full synthesized artifact for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingPlan {
    pub id: String,
    pub summary: PlanSummary,
    pub days: Vec<DayPlan>,
    pub grocery_list: Vec<GroceryItem>,
    pub analytics: AnalyticsData,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Structural problems found in a plan.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanValidationError {
    #[error("plan must contain exactly 7 days, found {0}")]
    WrongDayCount(usize),

    #[error("day at position {position} is numbered {found}, expected {expected}")]
    DayOutOfOrder {
        position: usize,
        found: u32,
        expected: u32,
    },

    #[error("{series} must contain 7 values, found {found}")]
    SeriesLength { series: &'static str, found: usize },

    #[error("{0} is not a finite number")]
    NonFinite(String),
}

fn finite(value: f64, field: impl FnOnce() -> String) -> Result<(), PlanValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlanValidationError::NonFinite(field()))
    }
}

impl CookingPlan {
    /// Check the structural invariants consumers rely on.
    ///
    /// Grocery priorities need no check here: [`Priority`] only admits the
    /// two literals, so an unknown value already fails deserialization.
    pub fn validate(&self) -> Result<(), PlanValidationError> {
        if self.days.len() != DAYS_PER_PLAN {
            return Err(PlanValidationError::WrongDayCount(self.days.len()));
        }
        for (i, day) in self.days.iter().enumerate() {
            let expected = i as u32 + 1;
            if day.day != expected {
                return Err(PlanValidationError::DayOutOfOrder {
                    position: i,
                    found: day.day,
                    expected,
                });
            }
        }

        let s = &self.summary;
        finite(s.total_cost, || "summary.totalCost".into())?;
        finite(s.avg_protein, || "summary.avgProtein".into())?;
        finite(s.efficiency_score, || "summary.efficiencyScore".into())?;

        for day in &self.days {
            finite(day.wellness_score, || format!("days[{}].wellnessScore", day.day))?;
            for meal in &day.meals {
                let m = &meal.macros;
                for (name, v) in [("p", m.p), ("c", m.c), ("f", m.f)] {
                    finite(v, || format!("meal {:?} macros.{name}", meal.id))?;
                }
                finite(meal.cost, || format!("meal {:?} cost", meal.id))?;
                finite(meal.calories, || format!("meal {:?} calories", meal.id))?;
                finite(meal.protein_grams, || format!("meal {:?} proteinGrams", meal.id))?;
            }
        }

        for item in &self.grocery_list {
            finite(item.estimated_cost, || format!("grocery {:?} estimatedCost", item.item))?;
        }

        let a = &self.analytics;
        for (series, values) in [
            ("analytics.weeklyConsistency", &a.weekly_consistency),
            ("analytics.proteinTrends", &a.protein_trends),
        ] {
            if values.len() != DAYS_PER_PLAN {
                return Err(PlanValidationError::SeriesLength {
                    series,
                    found: values.len(),
                });
            }
            for (i, v) in values.iter().enumerate() {
                finite(*v, || format!("{series}[{i}]"))?;
            }
        }
        for (name, v) in [
            ("analytics.calorieEfficiency", a.calorie_efficiency),
            ("analytics.micronutrientBalance", a.micronutrient_balance),
            ("analytics.sleepScore", a.sleep_score),
            ("analytics.hydrationCompliance", a.hydration_compliance),
        ] {
            finite(v, || name.to_string())?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// Grocery items sharing one category label.
#[derive(Debug, Clone, PartialEq)]
pub struct GroceryGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a GroceryItem>,
    pub total: f64,
}

impl CookingPlan {
    /// Look up a day by its 1-based number.
    pub fn day(&self, number: u32) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day == number)
    }

    /// Every scheduled event across the week, in day order.
    pub fn all_events(&self) -> Vec<CalendarEvent> {
        self.days
            .iter()
            .flat_map(|d| d.schedule.iter().cloned())
            .collect()
    }

    /// Grocery items grouped by category, in first-seen category order.
    pub fn grocery_by_category(&self) -> Vec<GroceryGroup<'_>> {
        let mut groups: Vec<GroceryGroup<'_>> = Vec::new();
        for item in &self.grocery_list {
            match groups.iter_mut().find(|g| g.category == item.category) {
                Some(group) => {
                    group.items.push(item);
                    group.total += item.estimated_cost;
                }
                None => groups.push(GroceryGroup {
                    category: &item.category,
                    items: vec![item],
                    total: item.estimated_cost,
                }),
            }
        }
        groups
    }

    /// SHA-256 of the canonical JSON encoding, hex-encoded.
    ///
    /// Two plans with equal content always have equal fingerprints.
    pub fn fingerprint(&self) -> String {
        // Serializing plain structs with string keys cannot fail.
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&bytes))
    }
}
