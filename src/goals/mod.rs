//! Profile and goals panel.
//!
//! The macro-goal calculator runs locally so the form can preview targets
//! before anything is saved:
//!
//! | Step | Formula |
//! |------|---------|
//! | BMR (Mifflin-St Jeor) | `10·kg + 6.25·cm − 5·age + 5` (male), `− 161` otherwise |
//! | TDEE | `BMR × activity multiplier` |
//! | Daily calories | `TDEE + weekly goal (kg) × 7700 / 7` |
//! | Protein / carbs / fat | 25% / 45% / 30% of calories, at 4 / 4 / 9 kcal per gram |
//!
//! Saving posts the profile; the backend recomputes the same numbers and
//! returns them with the stored profile.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::api::types::{Profile, SaveProfileResponse};
use crate::api::{ApiClient, ApiError};

/// kcal in one kilogram of body weight.
const KCAL_PER_KG: f64 = 7700.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Self::Male),
            "female" | "f" => Some(Self::Female),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::Light,
        Self::Moderate,
        Self::Active,
        Self::VeryActive,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sedentary" => Some(Self::Sedentary),
            "light" => Some(Self::Light),
            "moderate" => Some(Self::Moderate),
            "active" => Some(Self::Active),
            "very_active" => Some(Self::VeryActive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Inputs to the calculator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub age: u32,
    pub gender: Gender,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity: ActivityLevel,
    /// Planned change per week in kg (negative to lose).
    pub weekly_goal_kg: f64,
}

/// Calculated daily targets, rounded like the backend rounds them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroGoals {
    pub bmr: f64,
    pub tdee: f64,
    pub daily_calories: f64,
    pub daily_protein: f64,
    pub daily_carbs: f64,
    pub daily_fat: f64,
}

impl MacroGoals {
    pub fn calculate(m: &BodyMetrics) -> Self {
        let base = 10.0 * m.weight_kg + 6.25 * m.height_cm - 5.0 * f64::from(m.age);
        let bmr = match m.gender {
            Gender::Male => base + 5.0,
            Gender::Female | Gender::Other => base - 161.0,
        };
        let tdee = bmr * m.activity.multiplier();
        let daily_calories = tdee + m.weekly_goal_kg * KCAL_PER_KG / 7.0;

        Self {
            bmr: bmr.round(),
            tdee: tdee.round(),
            daily_calories: daily_calories.round(),
            daily_protein: (daily_calories * 0.25 / 4.0).round(),
            daily_carbs: (daily_calories * 0.45 / 4.0).round(),
            daily_fat: (daily_calories * 0.30 / 9.0).round(),
        }
    }

    /// Targets stored with a profile, or calculated from its body metrics
    /// when the backend sent none.
    pub fn from_profile(profile: &Profile) -> Self {
        if profile.daily_calories <= 0.0
            && let Some(metrics) = BodyMetrics::from_profile(profile)
        {
            return Self::calculate(&metrics);
        }
        Self {
            bmr: profile.bmr,
            tdee: profile.tdee,
            daily_calories: profile.daily_calories,
            daily_protein: profile.daily_protein,
            daily_carbs: profile.daily_carbs,
            daily_fat: profile.daily_fat,
        }
    }
}

impl BodyMetrics {
    /// Metrics of a stored profile. An unrecognised activity level counts as
    /// sedentary and an unrecognised gender as other; `None` when age,
    /// height or weight is missing.
    pub fn from_profile(profile: &Profile) -> Option<Self> {
        if profile.age <= 0.0 || profile.height <= 0.0 || profile.weight <= 0.0 {
            return None;
        }
        Some(Self {
            age: profile.age.round() as u32,
            gender: Gender::parse(&profile.gender).unwrap_or(Gender::Other),
            height_cm: profile.height,
            weight_kg: profile.weight,
            activity: ActivityLevel::parse(&profile.activity_level).unwrap_or(ActivityLevel::Sedentary),
            weekly_goal_kg: profile.weekly_goal,
        })
    }
}

// ---------------------------------------------------------------------------
// Profile form
// ---------------------------------------------------------------------------

/// Raw form fields, as typed.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub full_name: String,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
    pub activity_level: String,
    pub primary_goal: String,
    pub target_weight: String,
    pub diet_preference: String,
    pub weekly_goal: String,
    pub health_conditions: String,
}

/// Body of `POST /profile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub full_name: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub activity_level: ActivityLevel,
    pub primary_goal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preference: Option<String>,
    pub weekly_goal: f64,
    pub health_conditions: String,
}

impl ProfileInput {
    pub fn metrics(&self) -> BodyMetrics {
        BodyMetrics {
            age: self.age,
            gender: self.gender,
            height_cm: self.height,
            weight_kg: self.weight,
            activity: self.activity_level,
            weekly_goal_kg: self.weekly_goal,
        }
    }

    pub fn goals(&self) -> MacroGoals {
        MacroGoals::calculate(&self.metrics())
    }
}

impl ProfileForm {
    /// Prefill the form from a stored profile.
    pub fn from_profile(profile: &Profile) -> Self {
        let number = |v: f64| if v == 0.0 { String::new() } else { format!("{v}") };
        Self {
            full_name: profile.full_name.clone(),
            age: number(profile.age),
            gender: profile.gender.clone(),
            height: number(profile.height),
            weight: number(profile.weight),
            activity_level: profile.activity_level.clone(),
            primary_goal: profile.primary_goal.clone(),
            target_weight: profile
                .target_weight
                .as_ref()
                .and_then(crate::api::types::value_as_f64)
                .map(|v| format!("{v}"))
                .unwrap_or_default(),
            diet_preference: profile.diet_preference.clone().unwrap_or_default(),
            weekly_goal: number(profile.weekly_goal),
            health_conditions: profile.health_conditions.clone(),
        }
    }

    /// Check required fields and parse numbers.
    pub fn validate(&self) -> Result<ProfileInput> {
        let full_name = required(&self.full_name, "full name")?;
        let age: u32 = required(&self.age, "age")?
            .parse()
            .ok()
            .filter(|a| (1..=120).contains(a))
            .context("Age must be a whole number between 1 and 120")?;
        let gender = Gender::parse(required(&self.gender, "gender")?)
            .context("Gender must be male, female or other")?;
        let height = positive(required(&self.height, "height")?, "Height (cm)")?;
        let weight = positive(required(&self.weight, "weight")?, "Weight (kg)")?;
        let activity_level = ActivityLevel::parse(required(&self.activity_level, "activity level")?)
            .context("Activity level must be sedentary, light, moderate, active or very_active")?;
        let primary_goal = required(&self.primary_goal, "primary goal")?.to_string();

        let target_weight = match self.target_weight.trim() {
            "" => None,
            raw => Some(positive(raw, "Target weight")?),
        };
        let weekly_goal = match self.weekly_goal.trim() {
            "" => 0.0,
            raw => raw
                .parse::<f64>()
                .ok()
                .filter(|g| g.is_finite() && g.abs() <= 2.0)
                .context("Weekly goal must be between -2 and 2 kg")?,
        };
        let diet_preference = Some(self.diet_preference.trim().to_string()).filter(|d| !d.is_empty());

        Ok(ProfileInput {
            full_name: full_name.to_string(),
            age,
            gender,
            height,
            weight,
            activity_level,
            primary_goal,
            target_weight,
            diet_preference,
            weekly_goal,
            health_conditions: self.health_conditions.trim().to_string(),
        })
    }
}

fn required<'a>(value: &'a str, label: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("Missing field: {label}");
    }
    Ok(value)
}

fn positive(raw: &str, label: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .with_context(|| format!("{label} must be a positive number"))
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// `GET /profile`; a 404 means no profile yet.
pub fn load_profile(client: &ApiClient) -> Result<Option<Profile>, ApiError> {
    client.get_optional("/profile", &[])
}

/// `POST /profile`; returns the stored profile with server-side goals.
pub fn save_profile(client: &ApiClient, input: &ProfileInput) -> Result<Profile, ApiError> {
    let resp: SaveProfileResponse = client.post("/profile", input)?;
    Ok(resp.profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> BodyMetrics {
        BodyMetrics {
            age: 30,
            gender: Gender::Male,
            height_cm: 180.0,
            weight_kg: 80.0,
            activity: ActivityLevel::Moderate,
            weekly_goal_kg: 0.0,
        }
    }

    #[test]
    fn male_maintenance_goals() {
        // BMR = 800 + 1125 - 150 + 5 = 1780; TDEE = 1780 * 1.55 = 2759
        let goals = MacroGoals::calculate(&metrics());
        assert_eq!(goals.bmr, 1780.0);
        assert_eq!(goals.tdee, 2759.0);
        assert_eq!(goals.daily_calories, 2759.0);
        assert_eq!(goals.daily_protein, 172.0); // 2759 * .25 / 4 = 172.4
        assert_eq!(goals.daily_carbs, 310.0); // 2759 * .45 / 4 = 310.4
        assert_eq!(goals.daily_fat, 92.0); // 2759 * .30 / 9 = 91.97
    }

    #[test]
    fn female_weight_loss_goals() {
        let m = BodyMetrics {
            age: 40,
            gender: Gender::Female,
            height_cm: 165.0,
            weight_kg: 70.0,
            activity: ActivityLevel::Sedentary,
            weekly_goal_kg: -0.5,
        };
        // BMR = 700 + 1031.25 - 200 - 161 = 1370.25
        // TDEE = 1644.3; daily = 1644.3 - 550 = 1094.3
        let goals = MacroGoals::calculate(&m);
        assert_eq!(goals.bmr, 1370.0);
        assert_eq!(goals.tdee, 1644.0);
        assert_eq!(goals.daily_calories, 1094.0);
        assert_eq!(goals.daily_fat, 36.0);
    }

    #[test]
    fn profile_without_server_goals_is_calculated() {
        let profile = Profile {
            age: 30.0,
            gender: "male".into(),
            height: 180.0,
            weight: 80.0,
            activity_level: "couch potato".into(),
            ..Profile::default()
        };
        // Unknown activity level: BMR 1780 * 1.2
        let goals = MacroGoals::from_profile(&profile);
        assert_eq!(goals.tdee, 2136.0);

        let stored = Profile {
            daily_calories: 1900.0,
            ..profile
        };
        assert_eq!(MacroGoals::from_profile(&stored).daily_calories, 1900.0);
        assert!(BodyMetrics::from_profile(&Profile::default()).is_none());
    }

    #[test]
    fn activity_levels_parse() {
        assert_eq!(ActivityLevel::parse("very-active"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::parse("Light"), Some(ActivityLevel::Light));
        assert_eq!(ActivityLevel::parse("couch"), None);
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::parse(level.as_str()), Some(level));
        }
    }

    fn form() -> ProfileForm {
        ProfileForm {
            full_name: "Ada Lovelace".into(),
            age: "36".into(),
            gender: "female".into(),
            height: "165".into(),
            weight: "60".into(),
            activity_level: "light".into(),
            primary_goal: "maintain".into(),
            weekly_goal: String::new(),
            ..ProfileForm::default()
        }
    }

    #[test]
    fn valid_form_produces_input() {
        let input = form().validate().unwrap();
        assert_eq!(input.age, 36);
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.weekly_goal, 0.0);
        assert_eq!(input.target_weight, None);

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["activityLevel"], "light");
        assert_eq!(json["gender"], "female");
        assert!(json.get("targetWeight").is_none());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut f = form();
        f.primary_goal = " ".into();
        let err = f.validate().unwrap_err().to_string();
        assert_eq!(err, "Missing field: primary goal");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut f = form();
        f.age = "abc".into();
        assert!(f.validate().is_err());

        let mut f = form();
        f.weight = "-3".into();
        assert!(f.validate().is_err());

        let mut f = form();
        f.weekly_goal = "5".into();
        assert!(f.validate().is_err());
    }

    #[test]
    fn form_round_trips_profile() {
        let profile = Profile {
            full_name: "Ada".into(),
            age: 36.0,
            gender: "female".into(),
            height: 165.0,
            weight: 60.5,
            activity_level: "light".into(),
            primary_goal: "maintain".into(),
            target_weight: Some(serde_json::json!("58")),
            ..Profile::default()
        };
        let f = ProfileForm::from_profile(&profile);
        assert_eq!(f.weight, "60.5");
        assert_eq!(f.target_weight, "58");
        let input = f.validate().unwrap();
        assert_eq!(input.target_weight, Some(58.0));
    }
}
