//! Main dashboard: today's stats, today's meals and the calorie goal.

use serde::Serialize;

use crate::api::types::{Meal, MealStats, Profile};
use crate::api::{ApiClient, ApiError};
use crate::goals;
use crate::meals;
use crate::session::UserPreferences;

/// Everything the dashboard screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub stats: MealStats,
    pub meals: Vec<Meal>,
    pub profile: Option<Profile>,
    pub user: Option<UserPreferences>,
    pub calorie_goal: f64,
}

impl DashboardData {
    /// Percent of the calorie goal eaten today, capped at 100.
    pub fn progress_pct(&self) -> f64 {
        progress_pct(self.stats.total_calories, self.calorie_goal)
    }

    pub fn remaining_calories(&self) -> f64 {
        (self.calorie_goal - self.stats.total_calories).max(0.0)
    }

    /// Greeting name from the cached preferences.
    pub fn greeting_name(&self) -> Option<&str> {
        self.user.as_ref().map(UserPreferences::display_name)
    }
}

/// Fetch stats, today's meals and the profile (in that order).
///
/// The goal comes from the profile's `dailyCalories` when one is stored and
/// positive, otherwise `default_goal`.
pub fn load(client: &ApiClient, default_goal: f64) -> Result<DashboardData, ApiError> {
    let stats = meals::stats(client)?;
    let meals = meals::today(client)?;
    let profile = goals::load_profile(client)?;

    let calorie_goal = profile
        .as_ref()
        .map(|p| p.daily_calories)
        .filter(|c| *c > 0.0)
        .unwrap_or(default_goal);

    Ok(DashboardData {
        stats,
        meals,
        profile,
        user: client.session().preferences(),
        calorie_goal,
    })
}

pub fn progress_pct(eaten: f64, goal: f64) -> f64 {
    if goal <= 0.0 {
        return 0.0;
    }
    (eaten / goal * 100.0).clamp(0.0, 100.0)
}
