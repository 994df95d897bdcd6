//! Mirrors of the JSON shapes the backend sends and accepts.
//!
//! The backend is loose about numbers (FatSecret passes them as strings, the
//! meal store keeps whatever the form sent), so numeric fields go through
//! [`lenient_f64`]. Missing fields default rather than failing the decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Accept a JSON number, a numeric string, or null (→ 0.0).
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value).unwrap_or(0.0))
}

/// Numeric view of a JSON value, accepting numeric strings.
pub fn value_as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accept a string or a number (ids arrive both ways).
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: String,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Meals
// ---------------------------------------------------------------------------

/// Today's totals from `GET /meals/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealStats {
    #[serde(deserialize_with = "lenient_f64")]
    pub total_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_fat: f64,
    pub meals_count: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub goal_progress: f64,
    pub streak: u32,
}

/// A logged meal as returned by `GET /meals`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meal {
    #[serde(rename = "_id", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "mealType")]
    pub meal_type: String,
    #[serde(rename = "foodName")]
    pub food_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub quantity: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fat: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub food_id: String,
    pub date: String,
    pub created_at: String,
}

/// Body of `POST /meal/add`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMeal {
    #[serde(rename = "mealType")]
    pub meal_type: String,
    #[serde(rename = "foodName")]
    pub food_name: String,
    pub quantity: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub food_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMealResponse {
    #[serde(default)]
    pub message: String,
    pub meal: Meal,
}

// ---------------------------------------------------------------------------
// Food
// ---------------------------------------------------------------------------

/// One hit from `GET /food/search`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub food_id: String,
    pub food_name: String,
    pub food_description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub brand_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodSearchResponse {
    #[serde(default)]
    pub foods: Vec<FoodSummary>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Stored profile with server-computed goals (`GET /profile`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub age: f64,
    pub gender: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub height: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub weight: f64,
    pub activity_level: String,
    pub primary_goal: String,
    pub target_weight: Option<serde_json::Value>,
    pub diet_preference: Option<String>,
    #[serde(deserialize_with = "lenient_f64")]
    pub weekly_goal: f64,
    pub health_conditions: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub bmr: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub tdee: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub daily_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub daily_protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub daily_carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub daily_fat: f64,
}

#[derive(Debug, Deserialize)]
pub struct SaveProfileResponse {
    #[serde(default)]
    pub message: String,
    pub profile: Profile,
}

// ---------------------------------------------------------------------------
// Period analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyTotals {
    #[serde(deserialize_with = "lenient_f64")]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fat: f64,
    pub meals: u32,
}

/// `GET /meals/analysis?period=…`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionAnalysis {
    pub period: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub total_fat: f64,
    pub total_meals: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_calories: f64,
    /// Keyed by `YYYY-MM-DD`, so iteration is chronological.
    pub daily_data: BTreeMap<String, DailyTotals>,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// AI panels
// ---------------------------------------------------------------------------

/// Protein/carbs/fat split in percent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroDistribution {
    #[serde(deserialize_with = "lenient_f64")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fat: f64,
}

/// `POST /ai/diet-classification`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietClassification {
    pub success: bool,
    pub diet_type: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
    pub description: String,
    pub macro_distribution: MacroDistribution,
    pub recommendations: Vec<String>,
    pub meals_analyzed: u32,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterProfile {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterFeatures {
    #[serde(deserialize_with = "lenient_f64")]
    pub avg_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub protein_ratio: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub carbs_ratio: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub fat_ratio: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub meal_frequency: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub calorie_consistency: f64,
}

/// Insight card shared by the clustering and forecasting panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insight {
    /// `warning`, `info` or `success`; empty for clustering insights.
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub title: String,
    pub message: String,
}

/// `POST /ai/cluster-analysis`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterAnalysis {
    pub success: bool,
    pub algorithm: String,
    pub cluster_id: u32,
    pub cluster_profile: ClusterProfile,
    pub features_analyzed: ClusterFeatures,
    pub insights: Vec<Insight>,
    pub similar_users: u32,
    pub meals_analyzed: u32,
    pub message: Option<String>,
    pub meals_logged: Option<u32>,
    pub required_meals: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPeriod {
    pub start_date: String,
    pub end_date: String,
    pub days_analyzed: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastStats {
    #[serde(deserialize_with = "lenient_f64")]
    pub average_daily_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub recent_average: f64,
    /// `increasing`, `decreasing` or `stable`.
    pub trend: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub trend_strength: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub volatility_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRange {
    #[serde(deserialize_with = "lenient_f64")]
    pub lower: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub upper: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    pub date: String,
    pub day_name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub predicted_calories: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub confidence: f64,
    pub range: ForecastRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalPoint {
    pub date: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub calories: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationData {
    pub historical: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastDay>,
}

/// `POST /ai/forecast-intake`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeForecast {
    pub success: bool,
    pub model: String,
    pub analysis_period: AnalysisPeriod,
    pub current_stats: ForecastStats,
    pub forecasts: Vec<ForecastDay>,
    pub insights: Vec<Insight>,
    pub visualization_data: VisualizationData,
    pub message: Option<String>,
    pub min_days_needed: Option<u32>,
}
