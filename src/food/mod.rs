//! Food search, food details and the nutrition preview shown before a meal
//! is added.
//!
//! Details come back in FatSecret's `food.get` shape, where
//! `servings.serving` is an array for most foods but a bare object when the
//! food has a single serving. The preview always reads the first serving.

pub mod debounce;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::api::types::{FoodSearchResponse, FoodSummary, NewMeal, value_as_f64};
use crate::api::{ApiClient, ApiError};

// ---------------------------------------------------------------------------
// Search / details
// ---------------------------------------------------------------------------

/// `GET /food/search?q=…`.
///
/// Queries shorter than `min_chars` after trimming return an empty list
/// without touching the network.
pub fn search(
    client: &ApiClient,
    query: &str,
    min_chars: usize,
    max_results: usize,
) -> Result<Vec<FoodSummary>, ApiError> {
    let query = query.trim();
    if query.chars().count() < min_chars.max(1) {
        return Ok(Vec::new());
    }

    let resp: FoodSearchResponse = client.get("/food/search", &[("q", query)])?;
    let mut foods = resp.foods;
    foods.truncate(max_results);
    Ok(foods)
}

/// `GET /food/details/:id`, returned raw.
pub fn details(client: &ApiClient, food_id: &str) -> Result<Value, ApiError> {
    let id = urlencoding::encode(food_id.trim());
    client.get(&format!("/food/details/{id}"), &[])
}

/// Fetch details and build the preview in one step.
pub fn select(client: &ApiClient, food_id: &str) -> anyhow::Result<NutritionPreview> {
    let json = details(client, food_id)?;
    NutritionPreview::from_details(&json)
        .ok_or_else(|| anyhow::anyhow!("No nutrition information available for this food"))
}

// ---------------------------------------------------------------------------
// Nutrition preview
// ---------------------------------------------------------------------------

/// Per-serving nutrition of the selected food.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionPreview {
    pub food_id: String,
    pub food_name: String,
    pub brand_name: Option<String>,
    pub serving_description: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutritionPreview {
    /// Build the preview from a `food.get` payload (with or without the outer
    /// `food` wrapper). Returns `None` when there is no serving to read.
    pub fn from_details(details: &Value) -> Option<Self> {
        let food = details.get("food").unwrap_or(details);
        let servings = food.get("servings")?.get("serving")?;

        let serving = match servings {
            Value::Array(list) => list.first()?,
            Value::Object(_) => servings,
            _ => return None,
        };

        let number = |key: &str| serving.get(key).and_then(value_as_f64).unwrap_or(0.0);
        let text = |v: &Value, key: &str| {
            v.get(key).map(|field| match field {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        };

        Some(Self {
            food_id: text(food, "food_id").unwrap_or_default(),
            food_name: text(food, "food_name").unwrap_or_default(),
            brand_name: text(food, "brand_name").filter(|b| !b.is_empty()),
            serving_description: text(serving, "serving_description")
                .unwrap_or_else(|| "1 serving".to_string()),
            calories: number("calories"),
            protein: number("protein"),
            carbs: number("carbohydrate"),
            fat: number("fat"),
        })
    }

    /// Nutrition for `quantity` servings, rounded to one decimal.
    pub fn scaled(&self, quantity: f64) -> Self {
        let scale = |v: f64| round1(v * quantity);
        Self {
            calories: scale(self.calories),
            protein: scale(self.protein),
            carbs: scale(self.carbs),
            fat: scale(self.fat),
            ..self.clone()
        }
    }

    /// Turn the preview into the add-meal payload.
    pub fn to_new_meal(&self, meal_type: &str, quantity: f64) -> NewMeal {
        let scaled = self.scaled(quantity);
        NewMeal {
            meal_type: meal_type.to_string(),
            food_name: self.food_name.clone(),
            quantity,
            calories: scaled.calories,
            protein: scaled.protein,
            carbs: scaled.carbs,
            fat: scaled.fat,
            food_id: self.food_id.clone(),
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Search-result descriptions
// ---------------------------------------------------------------------------

/// Macros parsed from a search hit's one-line description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DescriptionMacros {
    pub serving: Option<String>,
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
}

/// `Per 100g - ...`
static SERVING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*per\s+(.+?)\s+-\s").expect("serving regex must compile"));

/// `Calories: 52kcal | Fat: 0.17g | ...`
static MACRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(calories|fat|carbs|protein):\s*([0-9]+(?:\.[0-9]+)?)")
        .expect("macro regex must compile")
});

/// Parse a FatSecret summary like
/// `"Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g"`.
pub fn parse_description(description: &str) -> DescriptionMacros {
    let mut macros = DescriptionMacros {
        serving: SERVING_RE
            .captures(description)
            .map(|c| c[1].to_string()),
        ..DescriptionMacros::default()
    };

    for cap in MACRO_RE.captures_iter(description) {
        let value = cap[2].parse::<f64>().ok();
        match cap[1].to_ascii_lowercase().as_str() {
            "calories" => macros.calories = value,
            "fat" => macros.fat = value,
            "carbs" => macros.carbs = value,
            "protein" => macros.protein = value,
            _ => {}
        }
    }

    macros
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn preview_uses_first_serving_when_array() {
        let details = json!({
            "food": {
                "food_id": "35718",
                "food_name": "Apple",
                "servings": {
                    "serving": [
                        {
                            "serving_description": "1 medium (3\" dia)",
                            "calories": "95",
                            "protein": "0.47",
                            "carbohydrate": "25.13",
                            "fat": "0.31"
                        },
                        {
                            "serving_description": "100 g",
                            "calories": "52",
                            "protein": "0.26",
                            "carbohydrate": "13.81",
                            "fat": "0.17"
                        }
                    ]
                }
            }
        });

        let preview = NutritionPreview::from_details(&details).unwrap();
        assert_eq!(preview.food_name, "Apple");
        assert_eq!(preview.serving_description, "1 medium (3\" dia)");
        assert_eq!(preview.calories, 95.0);
        assert_eq!(preview.carbs, 25.13);
        assert_eq!(preview.brand_name, None);
    }

    #[test]
    fn preview_accepts_single_serving_object() {
        let details = json!({
            "food": {
                "food_id": 1,
                "food_name": "Protein Bar",
                "brand_name": "Acme",
                "servings": {
                    "serving": {
                        "serving_description": "1 bar",
                        "calories": 210,
                        "protein": 20,
                        "carbohydrate": 22,
                        "fat": 7
                    }
                }
            }
        });

        let preview = NutritionPreview::from_details(&details).unwrap();
        assert_eq!(preview.food_id, "1");
        assert_eq!(preview.brand_name.as_deref(), Some("Acme"));
        assert_eq!(preview.protein, 20.0);
    }

    #[test]
    fn preview_none_without_servings() {
        assert!(NutritionPreview::from_details(&json!({"food": {"food_name": "x"}})).is_none());
        assert!(
            NutritionPreview::from_details(&json!({"food": {"servings": {"serving": []}}}))
                .is_none()
        );
    }

    #[test]
    fn scaled_preview_builds_meal() {
        let preview = NutritionPreview {
            food_id: "7".into(),
            food_name: "Rice".into(),
            brand_name: None,
            serving_description: "1 cup".into(),
            calories: 205.0,
            protein: 4.25,
            carbs: 44.5,
            fat: 0.44,
        };
        let meal = preview.to_new_meal("dinner", 1.5);
        assert_eq!(meal.calories, 307.5);
        assert_eq!(meal.protein, 6.4);
        assert_eq!(meal.fat, 0.7);
        assert_eq!(meal.food_id, "7");
        assert_eq!(meal.quantity, 1.5);
    }

    #[test]
    fn parses_fatsecret_description() {
        let macros = parse_description(
            "Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g",
        );
        assert_eq!(macros.serving.as_deref(), Some("100g"));
        assert_eq!(macros.calories, Some(52.0));
        assert_eq!(macros.fat, Some(0.17));
        assert_eq!(macros.carbs, Some(13.81));
        assert_eq!(macros.protein, Some(0.26));
    }

    #[test]
    fn unparseable_description_is_empty() {
        assert_eq!(parse_description("Tasty"), DescriptionMacros::default());
    }
}
