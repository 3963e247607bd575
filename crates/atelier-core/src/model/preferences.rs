//! User preference types: the input half of a synthesis request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Parse error shared by the preference enums
// ---------------------------------------------------------------------------

/// Error returned when a preference enum is parsed from an unknown string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceParseError {
    /// Which field was being parsed (e.g. "persona").
    pub field: &'static str,
    /// The rejected input.
    pub value: String,
    /// Accepted values, for the error message.
    pub expected: &'static str,
}

impl fmt::Display for PreferenceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid {}: {:?} (expected one of: {})",
            self.field, self.value, self.expected
        )
    }
}

impl std::error::Error for PreferenceParseError {}

/// Normalize user input so `gym-enthusiast`, `Gym Enthusiast` and
/// `GYM_ENTHUSIAST` compare equal.
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Persona
// ---------------------------------------------------------------------------

/// Who the plan is being cooked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Persona {
    Student,
    #[default]
    Professional,
    Household,
    GymEnthusiast,
    ParentKidFocus,
}

impl Persona {
    /// Every persona, in the order the onboarding picker shows them.
    pub const ALL: [Persona; 5] = [
        Self::Professional,
        Self::GymEnthusiast,
        Self::Household,
        Self::ParentKidFocus,
        Self::Student,
    ];

    /// The wire value used in prompts and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Professional => "PROFESSIONAL",
            Self::Household => "HOUSEHOLD",
            Self::GymEnthusiast => "GYM_ENTHUSIAST",
            Self::ParentKidFocus => "PARENT_KID_FOCUS",
        }
    }

    /// Display label for the onboarding picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Student => "Campus Kitchen",
            Self::Professional => "Artisan Pro",
            Self::Household => "Collective Home",
            Self::GymEnthusiast => "Iron & Earth",
            Self::ParentKidFocus => "Little Sprouts",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "STUDENT" => Ok(Self::Student),
            "PROFESSIONAL" => Ok(Self::Professional),
            "HOUSEHOLD" => Ok(Self::Household),
            "GYM_ENTHUSIAST" | "GYM" => Ok(Self::GymEnthusiast),
            "PARENT_KID_FOCUS" | "PARENT" => Ok(Self::ParentKidFocus),
            _ => Err(PreferenceParseError {
                field: "persona",
                value: s.to_owned(),
                expected: "professional, gym_enthusiast, household, parent_kid_focus, student",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Protein focus
// ---------------------------------------------------------------------------

/// How strongly the plan should lean towards protein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProteinFocus {
    High,
    Moderate,
    #[default]
    Standard,
}

impl fmt::Display for ProteinFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Moderate => "Moderate",
            Self::Standard => "Standard",
        })
    }
}

impl FromStr for ProteinFocus {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "HIGH" => Ok(Self::High),
            "MODERATE" => Ok(Self::Moderate),
            "STANDARD" => Ok(Self::Standard),
            _ => Err(PreferenceParseError {
                field: "protein focus",
                value: s.to_owned(),
                expected: "high, moderate, standard",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Reminder preference
// ---------------------------------------------------------------------------

/// When the user would like reminders delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReminderPreference {
    Morning,
    Evening,
    #[default]
    Both,
}

impl fmt::Display for ReminderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Morning => "Morning",
            Self::Evening => "Evening",
            Self::Both => "Both",
        })
    }
}

impl FromStr for ReminderPreference {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "MORNING" => Ok(Self::Morning),
            "EVENING" => Ok(Self::Evening),
            "BOTH" => Ok(Self::Both),
            _ => Err(PreferenceParseError {
                field: "reminder preference",
                value: s.to_owned(),
                expected: "morning, evening, both",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Health goal
// ---------------------------------------------------------------------------

/// Optional health outcome the plan should steer towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthGoal {
    Immunity,
    Growth,
    Strength,
    #[serde(rename = "Weight Loss")]
    WeightLoss,
    Energy,
}

impl fmt::Display for HealthGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Immunity => "Immunity",
            Self::Growth => "Growth",
            Self::Strength => "Strength",
            Self::WeightLoss => "Weight Loss",
            Self::Energy => "Energy",
        })
    }
}

impl FromStr for HealthGoal {
    type Err = PreferenceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "IMMUNITY" => Ok(Self::Immunity),
            "GROWTH" => Ok(Self::Growth),
            "STRENGTH" => Ok(Self::Strength),
            "WEIGHT_LOSS" | "WEIGHTLOSS" => Ok(Self::WeightLoss),
            "ENERGY" => Ok(Self::Energy),
            _ => Err(PreferenceParseError {
                field: "health goal",
                value: s.to_owned(),
                expected: "immunity, growth, strength, weight_loss, energy",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// UserPreferences
// ---------------------------------------------------------------------------

/// Everything the user told us about how they want to eat this week.
///
/// Owned by the caller and passed by reference into synthesis; synthesis
/// never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub persona: Persona,
    /// Free-text diet description (e.g. "Plant-Based", "Keto, no gluten").
    pub diet: String,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    pub protein_focus: ProteinFocus,
    /// Weekly budget ceiling in Indian Rupees.
    pub budget_limit: f64,
    /// Maximum prep time per meal, in minutes.
    pub prep_time_limit: u32,
    #[serde(default)]
    pub kitchen_tools: Vec<String>,
    pub cooking_window: String,
    pub reminder_preference: ReminderPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_goal: Option<HealthGoal>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            persona: Persona::Professional,
            diet: "Plant-Based".to_string(),
            allergies: Vec::new(),
            dislikes: Vec::new(),
            protein_focus: ProteinFocus::Standard,
            budget_limit: 2000.0,
            prep_time_limit: 25,
            kitchen_tools: vec!["Blender".to_string(), "Stove".to_string()],
            cooking_window: "Morning".to_string(),
            reminder_preference: ReminderPreference::Both,
            health_goal: Some(HealthGoal::Immunity),
        }
    }
}

// ---------------------------------------------------------------------------
// Pantry helpers
// ---------------------------------------------------------------------------

/// Reserved substring that switches synthesis to the deterministic mock.
pub const TEST_MODE_SENTINEL: &str = "test_mode";

/// Whether the pantry text carries the test-mode sentinel (any letter case).
pub fn is_test_mode(pantry: &str) -> bool {
    pantry.to_lowercase().contains(TEST_MODE_SENTINEL)
}

/// Whether the pantry text is worth submitting (non-blank).
pub fn is_submittable(pantry: &str) -> bool {
    !pantry.trim().is_empty()
}
