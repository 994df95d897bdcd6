//! Analytics panels: period analysis plus the three AI panels (diet
//! classification, cluster analysis and intake forecast).
//!
//! The AI endpoints answer `200` with `success: false` when the user has not
//! logged enough meals; that comes back as [`Panel::Unavailable`] carrying
//! the backend's message so it can be shown inline. With
//! `features.ai_insights` off the AI panels short-circuit to
//! [`Panel::Disabled`] without sending anything.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use crate::api::types::{
    ClusterAnalysis, DietClassification, IntakeForecast, MacroDistribution, NutritionAnalysis,
};
use crate::api::{ApiClient, ApiError};
use crate::config::resolve::FeatureFlags;

/// Window for `GET /meals/analysis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    #[default]
    Week,
    Month,
}

impl Period {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" | "day" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of loading one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Ready(T),
    /// The backend declined (usually too little data); message for display.
    Unavailable(String),
    /// AI insights are switched off.
    Disabled,
}

impl<T> Panel<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }
}

pub const DISABLED_NOTICE: &str = "AI insights are turned off (features.ai_insights = false).";

const NOT_ENOUGH_DATA: &str = "Not enough data yet. Keep logging meals!";

/// `GET /meals/analysis?period=…`
pub fn fetch_analysis(client: &ApiClient, period: Period) -> Result<NutritionAnalysis, ApiError> {
    client.get("/meals/analysis", &[("period", period.as_str())])
}

/// `POST /ai/diet-classification`
pub fn fetch_classification(
    client: &ApiClient,
    flags: &FeatureFlags,
) -> Result<Panel<DietClassification>, ApiError> {
    if !flags.ai_insights {
        return Ok(Panel::Disabled);
    }
    let resp: DietClassification = client.post("/ai/diet-classification", &json!({}))?;
    Ok(if resp.success {
        Panel::Ready(resp)
    } else {
        Panel::Unavailable(unavailable_message(resp.message))
    })
}

/// `POST /ai/cluster-analysis`
pub fn fetch_clusters(
    client: &ApiClient,
    flags: &FeatureFlags,
) -> Result<Panel<ClusterAnalysis>, ApiError> {
    if !flags.ai_insights {
        return Ok(Panel::Disabled);
    }
    let resp: ClusterAnalysis = client.post("/ai/cluster-analysis", &json!({}))?;
    if resp.success {
        return Ok(Panel::Ready(resp));
    }

    let mut message = unavailable_message(resp.message);
    if let (Some(logged), Some(required)) = (resp.meals_logged, resp.required_meals) {
        message = format!("{message} ({logged}/{required} meals logged)");
    }
    Ok(Panel::Unavailable(message))
}

/// `POST /ai/forecast-intake` for `days` days ahead (at least one).
pub fn fetch_forecast(
    client: &ApiClient,
    flags: &FeatureFlags,
    days: u32,
) -> Result<Panel<IntakeForecast>, ApiError> {
    if !flags.ai_insights {
        return Ok(Panel::Disabled);
    }
    let resp: IntakeForecast =
        client.post("/ai/forecast-intake", &json!({ "days": days.max(1) }))?;
    if resp.success {
        return Ok(Panel::Ready(resp));
    }

    let mut message = unavailable_message(resp.message);
    if let Some(min_days) = resp.min_days_needed {
        message = format!("{message} (at least {min_days} days of history needed)");
    }
    Ok(Panel::Unavailable(message))
}

fn unavailable_message(message: Option<String>) -> String {
    message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| NOT_ENOUGH_DATA.to_string())
}

/// Share of calories from each macro in percent, from gram totals.
///
/// All zeros when nothing was eaten.
pub fn macro_split(protein_g: f64, carbs_g: f64, fat_g: f64) -> MacroDistribution {
    let protein = protein_g.max(0.0) * 4.0;
    let carbs = carbs_g.max(0.0) * 4.0;
    let fat = fat_g.max(0.0) * 9.0;
    let total = protein + carbs + fat;
    if total <= 0.0 {
        return MacroDistribution::default();
    }
    let pct = |v: f64| (v / total * 1000.0).round() / 10.0;
    MacroDistribution {
        protein: pct(protein),
        carbs: pct(carbs),
        fat: pct(fat),
    }
}

impl NutritionAnalysis {
    pub fn macro_split(&self) -> MacroDistribution {
        macro_split(self.total_protein, self.total_carbs, self.total_fat)
    }
}
