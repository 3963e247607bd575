//! Plain data types exchanged between synthesis and its consumers.

pub mod plan;
pub mod preferences;

pub use plan::{
    AnalyticsData, CalendarEvent, CookingPlan, DAYS_PER_PLAN, DayPlan, EventType, GroceryGroup,
    GroceryItem, Ingredient, MacroMatrix, Meal, MealType, PlanSummary, PlanValidationError,
    Priority,
};
pub use preferences::{
    HealthGoal, Persona, PreferenceParseError, ProteinFocus, ReminderPreference,
    TEST_MODE_SENTINEL, UserPreferences, is_submittable, is_test_mode,
};
