//! Deterministic mock strategy.
//!
//! Serves a fixed, fully populated plan so the rest of the system can be
//! exercised without credentials or network access. The plan never varies
//! between calls.

use std::time::Duration;

use async_trait::async_trait;

use super::error::SynthesisError;
use super::trait_def::PlanSynthesizer;
use crate::model::{
    AnalyticsData, CalendarEvent, CookingPlan, DayPlan, EventType, GroceryItem, Ingredient,
    MacroMatrix, Meal, MealType, PlanSummary, Priority, UserPreferences,
};

/// Identifier carried by the mock plan.
pub const MOCK_PLAN_ID: &str = "atelier-eval-deterministic";

/// Simulated latency so loading states get exercised.
pub const DEFAULT_MOCK_DELAY: Duration = Duration::from_millis(800);

/// Upper bound on the simulated latency.
pub const MAX_MOCK_DELAY: Duration = Duration::from_millis(999);

const MOCK_DATES: [&str; 7] = [
    "2026-01-17",
    "2026-01-18",
    "2026-01-19",
    "2026-01-20",
    "2026-01-21",
    "2026-01-22",
    "2026-01-23",
];

/// Build the fixed mock plan.
pub fn mock_plan() -> CookingPlan {
    CookingPlan {
        id: MOCK_PLAN_ID.to_string(),
        summary: PlanSummary {
            total_cost: 1250.0,
            avg_protein: 72.0,
            efficiency_score: 94.0,
            waste_reduction_hacks: vec![
                "Citrus peel infusion".to_string(),
                "Stem-based broths".to_string(),
                "Regrowing scallions".to_string(),
            ],
            sustainability_rating: "A+".to_string(),
            nutrition_philosophy: "Scientific precision meets seasonal vitality.".to_string(),
        },
        days: MOCK_DATES
            .iter()
            .enumerate()
            .map(|(i, date)| mock_day(i, date))
            .collect(),
        grocery_list: vec![
            GroceryItem {
                item: "Organic Tempeh".to_string(),
                category: "Artisan Grocer".to_string(),
                estimated_cost: 450.0,
                priority: Priority::Must,
            },
            GroceryItem {
                item: "Seasonal Greens".to_string(),
                category: "Farmer's Market".to_string(),
                estimated_cost: 200.0,
                priority: Priority::Must,
            },
        ],
        analytics: AnalyticsData {
            weekly_consistency: vec![85.0, 90.0, 88.0, 92.0, 95.0, 80.0, 90.0],
            protein_trends: vec![65.0, 70.0, 72.0, 68.0, 75.0, 70.0, 72.0],
            calorie_efficiency: 88.0,
            micronutrient_balance: 92.0,
            sleep_score: 85.0,
            hydration_compliance: 90.0,
        },
    }
}

fn mock_day(index: usize, date: &str) -> DayPlan {
    DayPlan {
        day: index as u32 + 1,
        date: date.to_string(),
        daily_insight: "Optimizing metabolic flexibility through high-fiber greens.".to_string(),
        wellness_score: 92.0,
        meals: vec![
            Meal {
                id: format!("m-breakfast-{index}"),
                name: "Artisan Oats with Flax".to_string(),
                meal_type: MealType::Breakfast,
                cost: 45.0,
                prep_time: 5,
                cook_time: 10,
                protein_grams: 18.0,
                calories: 380.0,
                macros: MacroMatrix {
                    p: 18.0,
                    c: 55.0,
                    f: 12.0,
                    fiber: None,
                },
                ingredients: vec![Ingredient {
                    name: "Organic Oats".to_string(),
                    quantity: "50g".to_string(),
                    cost: 20.0,
                    is_locked: false,
                    source_hint: None,
                }],
                instructions: vec![
                    "Simmer oats with water".to_string(),
                    "Fold in freshly ground flaxseeds".to_string(),
                ],
                health_benefit: "Sustained Energy".to_string(),
                fresh_factor: "Morning Fresh".to_string(),
            },
            Meal {
                id: format!("m-lunch-{index}"),
                name: "Tempeh & Seasonal Roots".to_string(),
                meal_type: MealType::Lunch,
                cost: 120.0,
                prep_time: 15,
                cook_time: 10,
                protein_grams: 28.0,
                calories: 520.0,
                macros: MacroMatrix {
                    p: 28.0,
                    c: 45.0,
                    f: 18.0,
                    fiber: None,
                },
                ingredients: vec![Ingredient {
                    name: "Tempeh".to_string(),
                    quantity: "150g".to_string(),
                    cost: 80.0,
                    is_locked: false,
                    source_hint: None,
                }],
                instructions: vec![
                    "Lightly sear tempeh".to_string(),
                    "Steam seasonal roots".to_string(),
                    "Dress with tahini".to_string(),
                ],
                health_benefit: "Probiotic Strength".to_string(),
                fresh_factor: "Farm to Table".to_string(),
            },
        ],
        schedule: vec![
            CalendarEvent {
                id: format!("s-h-{index}"),
                title: "Sunlight Ritual".to_string(),
                description: "10 mins outdoor hydration".to_string(),
                start_time: "07:30".to_string(),
                duration_minutes: 10,
                event_type: EventType::Hydration,
                date: date.to_string(),
            },
            CalendarEvent {
                id: format!("s-c-{index}"),
                title: "Artisan Prep".to_string(),
                description: "Efficient batch chopping".to_string(),
                start_time: "11:30".to_string(),
                duration_minutes: 20,
                event_type: EventType::Prep,
                date: date.to_string(),
            },
        ],
    }
}

/// Strategy that always returns [`mock_plan`] after a short fixed delay.
///
/// Infallible: it has no external dependency.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    delay: Duration,
}

impl MockSynthesizer {
    /// Mock with the default simulated delay.
    pub fn new() -> Self {
        Self {
            delay: DEFAULT_MOCK_DELAY,
        }
    }

    /// Mock with a custom delay, clamped to [`MAX_MOCK_DELAY`].
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: delay.min(MAX_MOCK_DELAY),
        }
    }

    /// Mock with no delay at all.
    pub fn instant() -> Self {
        Self {
            delay: Duration::ZERO,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanSynthesizer for MockSynthesizer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(
        &self,
        _prefs: &UserPreferences,
        _pantry: &str,
    ) -> Result<CookingPlan, SynthesisError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(mock_plan())
    }
}
