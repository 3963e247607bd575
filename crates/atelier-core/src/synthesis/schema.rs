//! Response schema handed to Gemini as `generationConfig.responseSchema`.
//!
//! Uses Gemini's OpenAPI subset (`OBJECT`, `ARRAY`, `STRING`, `NUMBER`,
//! `INTEGER`, `BOOLEAN`). Every field of [`crate::model::CookingPlan`] is
//! listed, with `required` arrays and enum literals for the tagged strings,
//! so the response deserializes straight into the model types.

use serde_json::{Value, json};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn string_enum(values: &[&str]) -> Value {
    json!({ "type": "STRING", "enum": values })
}

fn array_of(items: Value) -> Value {
    json!({ "type": "ARRAY", "items": items })
}

/// An `OBJECT` whose listed properties are all required.
fn object(properties: &[(&str, Value)]) -> Value {
    object_with_optional(properties, &[])
}

/// An `OBJECT` where `optional` names the properties that may be omitted.
fn object_with_optional(properties: &[(&str, Value)], optional: &[(&str, Value)]) -> Value {
    let mut props = serde_json::Map::new();
    let mut required = Vec::with_capacity(properties.len());
    for (name, schema) in properties {
        props.insert((*name).to_string(), schema.clone());
        required.push(Value::String((*name).to_string()));
    }
    for (name, schema) in optional {
        props.insert((*name).to_string(), schema.clone());
    }
    json!({
        "type": "OBJECT",
        "properties": Value::Object(props),
        "required": required,
    })
}

fn macros_schema() -> Value {
    object_with_optional(
        &[("p", number()), ("c", number()), ("f", number())],
        &[("fiber", number())],
    )
}

fn ingredient_schema() -> Value {
    object_with_optional(
        &[
            ("name", string()),
            ("quantity", string()),
            ("cost", number()),
            ("isLocked", json!({ "type": "BOOLEAN" })),
        ],
        &[("sourceHint", string())],
    )
}

fn meal_schema() -> Value {
    object(&[
        ("id", string()),
        ("name", string()),
        ("type", string_enum(&["BREAKFAST", "LUNCH", "DINNER", "SNACK"])),
        ("cost", number()),
        ("prepTime", integer()),
        ("cookTime", integer()),
        ("proteinGrams", number()),
        ("calories", number()),
        ("macros", macros_schema()),
        ("ingredients", array_of(ingredient_schema())),
        ("instructions", array_of(string())),
        ("healthBenefit", string()),
        ("freshFactor", string()),
    ])
}

fn event_schema() -> Value {
    object(&[
        ("id", string()),
        ("title", string()),
        ("description", string()),
        ("startTime", string()),
        ("durationMinutes", integer()),
        (
            "type",
            string_enum(&["SHOPPING", "PREP", "COOKING", "HYDRATION", "MEAL"]),
        ),
        ("date", string()),
    ])
}

fn day_schema() -> Value {
    object(&[
        ("day", integer()),
        ("date", string()),
        ("dailyInsight", string()),
        ("wellnessScore", number()),
        ("meals", array_of(meal_schema())),
        ("schedule", array_of(event_schema())),
    ])
}

/// The full `CookingPlan` response schema.
pub fn response_schema() -> Value {
    object(&[
        ("id", string()),
        (
            "summary",
            object(&[
                ("totalCost", number()),
                ("avgProtein", number()),
                ("efficiencyScore", number()),
                ("wasteReductionHacks", array_of(string())),
                ("sustainabilityRating", string()),
                ("nutritionPhilosophy", string()),
            ]),
        ),
        ("days", array_of(day_schema())),
        (
            "groceryList",
            array_of(object(&[
                ("item", string()),
                ("category", string()),
                ("estimatedCost", number()),
                ("priority", string_enum(&["MUST", "OPTIONAL"])),
            ])),
        ),
        (
            "analytics",
            object(&[
                ("weeklyConsistency", array_of(number())),
                ("proteinTrends", array_of(number())),
                ("calorieEfficiency", number()),
                ("micronutrientBalance", number()),
                ("sleepScore", number()),
                ("hydrationCompliance", number()),
            ]),
        ),
    ])
}
