//! Dashboard body: stat cards, today's meals, the add-meal form and the food
//! search partial.

use std::fmt::Write as _;

use crate::api::types::{FoodSummary, Meal, MealStats};
use crate::dashboard::DashboardData;
use crate::food::{NutritionPreview, parse_description};
use crate::meals::MEAL_TYPES;

use super::chart::ChartHandle;
use super::{Notice, escape_html, fmt_1, fmt_int, notice_html};

/// Inputs for [`dashboard_body`].
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub data: &'a DashboardData,
    pub selected: Option<&'a NutritionPreview>,
    pub notice: Option<&'a Notice>,
    pub macro_chart: Option<&'a ChartHandle>,
    /// Search box settings handed to the page script.
    pub debounce_ms: u64,
    pub min_query_chars: usize,
}

pub fn dashboard_body(view: &DashboardView<'_>) -> String {
    let data = view.data;
    let greeting = match data.greeting_name() {
        Some(name) => format!("Welcome back, {}!", escape_html(name)),
        None => "Welcome back!".to_string(),
    };
    let chart = view
        .macro_chart
        .map(ChartHandle::to_html)
        .unwrap_or_default();

    format!(
        r#"{notice}
<h2>{greeting}</h2>
{cards}
<div class="grid">
<section class="card">
<h3>Today's macros</h3>
{chart}
</section>
<section class="card">
<h3>Add a meal</h3>
{search}
{form}
</section>
</div>
<section class="card">
<h3>Today's meals</h3>
{meals}
</section>"#,
        notice = notice_html(view.notice),
        cards = stat_cards(&data.stats, data.calorie_goal, data.progress_pct()),
        search = search_box(view.debounce_ms, view.min_query_chars),
        form = add_meal_form(view.selected),
        meals = meal_list(&data.meals),
    )
}

pub fn stat_cards(stats: &MealStats, goal: f64, progress_pct: f64) -> String {
    format!(
        r#"<div class="stats">
<div class="stat"><span class="label">Calories</span><span class="value">{cal}</span><span class="sub">of {goal} kcal</span>
<div class="progress"><div class="bar" style="width:{pct:.0}%"></div></div></div>
<div class="stat"><span class="label">Protein</span><span class="value">{protein} g</span></div>
<div class="stat"><span class="label">Carbs</span><span class="value">{carbs} g</span></div>
<div class="stat"><span class="label">Fat</span><span class="value">{fat} g</span></div>
<div class="stat"><span class="label">Meals</span><span class="value">{count}</span></div>
<div class="stat"><span class="label">Streak</span><span class="value">{streak} d</span></div>
</div>"#,
        cal = fmt_int(stats.total_calories),
        goal = fmt_int(goal),
        pct = progress_pct,
        protein = fmt_1(stats.total_protein),
        carbs = fmt_1(stats.total_carbs),
        fat = fmt_1(stats.total_fat),
        count = stats.meals_count,
        streak = stats.streak,
    )
}

pub fn meal_list(meals: &[Meal]) -> String {
    if meals.is_empty() {
        return r#"<p class="empty">No meals logged today.</p>"#.to_string();
    }

    let mut rows = String::new();
    for meal in meals {
        let _ = write!(
            rows,
            r#"<tr><td><span class="tag {ty}">{ty}</span></td><td>{name}</td><td class="num">{qty}</td><td class="num">{cal}</td><td class="num">{p}</td><td class="num">{c}</td><td class="num">{f}</td><td><a class="danger" href="/meals/delete?id={id}">Delete</a></td></tr>"#,
            ty = escape_html(&meal.meal_type),
            name = escape_html(&meal.food_name),
            qty = fmt_1(meal.quantity),
            cal = fmt_int(meal.calories),
            p = fmt_1(meal.protein),
            c = fmt_1(meal.carbs),
            f = fmt_1(meal.fat),
            id = escape_html(&urlencoding::encode(&meal.id)),
        );
    }

    format!(
        r#"<table class="meals">
<thead><tr><th>Type</th><th>Food</th><th>Qty</th><th>kcal</th><th>P</th><th>C</th><th>F</th><th></th></tr></thead>
<tbody>{rows}</tbody>
</table>"#
    )
}

fn search_box(debounce_ms: u64, min_chars: usize) -> String {
    format!(
        r#"<div class="search">
<input type="search" id="food-search" name="q" placeholder="Search foods…" autocomplete="off" data-debounce-ms="{debounce_ms}" data-min-chars="{min_chars}">
<div id="search-results" aria-live="polite"></div>
</div>"#
    )
}

fn meal_type_options() -> String {
    MEAL_TYPES
        .iter()
        .map(|t| format!(r#"<option value="{t}">{t}</option>"#))
        .collect()
}

/// Add form. With a selected food the macros come from the preview and only
/// quantity and meal type are asked; otherwise everything is typed in.
pub fn add_meal_form(selected: Option<&NutritionPreview>) -> String {
    let options = meal_type_options();
    match selected {
        Some(food) => format!(
            r#"{preview}
<form method="post" action="/meals/add" class="meal-form">
<input type="hidden" name="food_id" value="{id}">
<label>Meal <select name="meal_type">{options}</select></label>
<label>Servings <input type="number" name="quantity" value="1" min="0.1" step="0.1" required></label>
<button type="submit">Add meal</button>
</form>
<form method="post" action="/food/clear" class="inline"><button type="submit" class="secondary">Close</button></form>"#,
            preview = preview_html(food),
            id = escape_html(&food.food_id),
        ),
        None => format!(
            r#"<form method="post" action="/meals/add" class="meal-form">
<label>Meal <select name="meal_type">{options}</select></label>
<label>Food <input type="text" name="food_name" required></label>
<label>Servings <input type="number" name="quantity" value="1" min="0.1" step="0.1" required></label>
<label>kcal <input type="number" name="calories" min="0" step="any" required></label>
<label>Protein g <input type="number" name="protein" min="0" step="any" value="0"></label>
<label>Carbs g <input type="number" name="carbs" min="0" step="any" value="0"></label>
<label>Fat g <input type="number" name="fat" min="0" step="any" value="0"></label>
<button type="submit">Add meal</button>
</form>"#
        ),
    }
}

/// Per-serving nutrition of the selected food.
pub fn preview_html(food: &NutritionPreview) -> String {
    let brand = food
        .brand_name
        .as_deref()
        .map(|b| format!(r#" <span class="brand">{}</span>"#, escape_html(b)))
        .unwrap_or_default();
    format!(
        r#"<div class="preview" id="nutrition-preview">
<h4>{name}{brand}</h4>
<p class="serving">Per {serving}</p>
<ul class="macros">
<li><b>{cal}</b> kcal</li><li><b>{p}</b> g protein</li><li><b>{c}</b> g carbs</li><li><b>{f}</b> g fat</li>
</ul>
</div>"#,
        name = escape_html(&food.food_name),
        serving = escape_html(&food.serving_description),
        cal = fmt_int(food.calories),
        p = fmt_1(food.protein),
        c = fmt_1(food.carbs),
        f = fmt_1(food.fat),
    )
}

/// Results partial for `GET /food/search`.
pub fn search_results(query: &str, foods: &[FoodSummary]) -> String {
    if query.trim().is_empty() {
        return String::new();
    }
    if foods.is_empty() {
        return format!(
            r#"<p class="empty">No foods match “{}”.</p>"#,
            escape_html(query.trim())
        );
    }

    let mut items = String::new();
    for food in foods {
        let macros = parse_description(&food.food_description);
        let summary = match macros.calories {
            Some(cal) => format!(
                "{} kcal per {}",
                fmt_int(cal),
                macros.serving.as_deref().unwrap_or("serving")
            ),
            None => food.food_description.clone(),
        };
        let brand = if food.brand_name.is_empty() {
            String::new()
        } else {
            format!(r#" <span class="brand">{}</span>"#, escape_html(&food.brand_name))
        };
        let _ = write!(
            items,
            r#"<li><a href="/food/select?id={id}">{name}</a>{brand} <span class="muted">{summary}</span></li>"#,
            id = escape_html(&urlencoding::encode(&food.food_id)),
            name = escape_html(&food.food_name),
            summary = escape_html(&summary),
        );
    }
    format!(r#"<ul class="results">{items}</ul>"#)
}
