//! Meal CRUD panel: add, list, delete (after confirmation) and today's stats.

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::api::types::{AddMealResponse, Meal, MealStats, MessageResponse, NewMeal};
use crate::api::{ApiClient, ApiError};

/// Meal slots offered by the add form.
pub const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

impl NewMeal {
    /// Check the form before it is sent.
    pub fn validate(&self) -> Result<()> {
        if !MEAL_TYPES.contains(&self.meal_type.as_str()) {
            anyhow::bail!(
                "Meal type must be one of: {}",
                MEAL_TYPES.join(", ")
            );
        }
        if self.food_name.trim().is_empty() {
            anyhow::bail!("Please enter a food name");
        }
        if !(self.quantity > 0.0) {
            anyhow::bail!("Quantity must be greater than zero");
        }
        let macros = [self.calories, self.protein, self.carbs, self.fat];
        if macros.iter().any(|v| !v.is_finite() || *v < 0.0) {
            anyhow::bail!("Nutrition values cannot be negative");
        }
        Ok(())
    }
}

/// Normalize a user-typed meal type (`"Lunch "` → `"lunch"`).
pub fn normalize_meal_type(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// `POST /meal/add`. Validates first; an invalid form issues no request.
pub fn add(client: &ApiClient, meal: &NewMeal) -> Result<Meal> {
    meal.validate()?;
    let resp: AddMealResponse = client.post("/meal/add", meal)?;
    Ok(resp.meal)
}

/// Meals for one day (`GET /meals?date=YYYY-MM-DD`), or all meals.
pub fn list(client: &ApiClient, date: Option<NaiveDate>) -> Result<Vec<Meal>, ApiError> {
    match date {
        Some(date) => {
            let date = date.format("%Y-%m-%d").to_string();
            client.get("/meals", &[("date", date.as_str())])
        }
        None => client.get("/meals", &[]),
    }
}

/// Today's meals. The backend buckets meals by UTC day.
pub fn today(client: &ApiClient) -> Result<Vec<Meal>, ApiError> {
    list(client, Some(Utc::now().date_naive()))
}

/// `GET /meals/stats`
pub fn stats(client: &ApiClient) -> Result<MealStats, ApiError> {
    client.get("/meals/stats", &[])
}

/// Data re-fetched after a delete.
#[derive(Debug, Clone, PartialEq)]
pub struct MealRefresh {
    pub message: String,
    pub stats: MealStats,
    pub meals: Vec<Meal>,
}

/// Delete a meal once the user confirms.
///
/// `confirm` is asked first; when it declines nothing is sent and `Ok(None)`
/// comes back. After a confirmed delete the stats and today's meals are
/// fetched again so the caller can redraw both panels.
pub fn delete_confirmed<F>(
    client: &ApiClient,
    meal_id: &str,
    confirm: F,
) -> Result<Option<MealRefresh>, ApiError>
where
    F: FnOnce(&str) -> bool,
{
    if !confirm(meal_id) {
        return Ok(None);
    }

    let id = urlencoding::encode(meal_id.trim());
    let resp: MessageResponse = client.delete(&format!("/meal/delete/{id}"))?;

    let stats = stats(client)?;
    let meals = today(client)?;

    Ok(Some(MealRefresh {
        message: if resp.message.is_empty() {
            "Meal deleted".to_string()
        } else {
            resp.message
        },
        stats,
        meals,
    }))
}

/// Sum of the macros over a set of meals, as `(calories, protein, carbs, fat)`.
pub fn totals(meals: &[Meal]) -> (f64, f64, f64, f64) {
    meals.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, m| {
        (
            acc.0 + m.calories,
            acc.1 + m.protein,
            acc.2 + m.carbs,
            acc.3 + m.fat,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal() -> NewMeal {
        NewMeal {
            meal_type: "lunch".into(),
            food_name: "Apple".into(),
            quantity: 1.0,
            calories: 52.0,
            protein: 0.3,
            carbs: 13.8,
            fat: 0.2,
            food_id: String::new(),
        }
    }

    #[test]
    fn valid_meal_passes() {
        assert!(meal().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_meal_type() {
        let mut m = meal();
        m.meal_type = "brunch".into();
        let err = m.validate().unwrap_err().to_string();
        assert!(err.contains("breakfast, lunch, dinner, snack"));
    }

    #[test]
    fn rejects_non_positive_quantity_and_negative_macros() {
        let mut m = meal();
        m.quantity = 0.0;
        assert!(m.validate().is_err());
        m.quantity = f64::NAN;
        assert!(m.validate().is_err());

        let mut m = meal();
        m.fat = -1.0;
        assert!(m.validate().is_err());
    }

    #[test]
    fn rejects_blank_food_name() {
        let mut m = meal();
        m.food_name = "  ".into();
        assert!(m.validate().is_err());
    }

    #[test]
    fn normalize_meal_type_lowercases() {
        assert_eq!(normalize_meal_type(" Dinner "), "dinner");
    }

    #[test]
    fn totals_sum_macros() {
        let meals = vec![
            Meal {
                calories: 100.0,
                protein: 10.0,
                carbs: 5.0,
                fat: 2.0,
                ..Meal::default()
            },
            Meal {
                calories: 50.0,
                protein: 1.0,
                carbs: 10.0,
                fat: 0.5,
                ..Meal::default()
            },
        ];
        assert_eq!(totals(&meals), (150.0, 11.0, 15.0, 2.5));
    }
}
