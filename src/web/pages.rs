//! Route table and page handlers.
//!
//! Handlers return `Result<Page, ApiError>`. An error that means the user is
//! not (or no longer) logged in becomes a redirect to `/login`; any other
//! error either shows inline where the handler catches it or ends up on the
//! error page.

use std::collections::HashMap;

use tiny_http::Method;

use crate::api::types::NewMeal;
use crate::api::ApiError;
use crate::auth::{self, LoginForm, RegistrationForm};
use crate::config::NutriboardConfig;
use crate::config::resolve::ResolvedEnv;
use crate::dashboard;
use crate::food::{self, NutritionPreview};
use crate::goals::{self, MacroGoals, ProfileForm};
use crate::insights::{self, Panel, Period};
use crate::meals;
use crate::render::chart::{Chart, ChartKind};
use crate::render::dashboard::DashboardView;
use crate::render::{self, Notice, Viewer, forms};
use crate::session::UserPreferences;

use super::{Page, WebRequest, WebState, frontend};

type Handled = Result<Page, ApiError>;
type Form = HashMap<String, String>;

/// Everything a handler may touch for one request.
pub(super) struct Ctx<'a> {
    pub config: &'a NutriboardConfig,
    pub env: &'a ResolvedEnv,
    pub client: &'a crate::api::ApiClient,
    pub state: &'a mut WebState,
}

pub(super) fn dispatch(ctx: &mut Ctx<'_>, req: &WebRequest) -> Page {
    let result = match (&req.method, req.path()) {
        (&Method::Get, "/") => dashboard_page(ctx),

        // Auth
        (&Method::Get, "/login") => Ok(login_get(ctx)),
        (&Method::Post, "/login") => Ok(login_post(ctx, &req.form())),
        (&Method::Get, "/register") => Ok(html(ctx, "Register", &forms::register_form("", "", None))),
        (&Method::Post, "/register") => Ok(register_post(ctx, &req.form())),
        (&Method::Post, "/logout") => Ok(logout(ctx)),

        // Food search and selection
        (&Method::Get, "/food/search") => food_search(ctx, &req.query()),
        (&Method::Get, "/food/select") => food_select(ctx, &req.query()),
        (&Method::Post, "/food/clear") => {
            ctx.state.selected_food = None;
            Ok(Page::redirect("/"))
        }

        // Meals
        (&Method::Post, "/meals/add") => meal_add(ctx, &req.form()),
        (&Method::Get, "/meals/delete") => meal_delete_confirm(ctx, &req.query()),
        (&Method::Post, "/meals/delete") => meal_delete(ctx, &req.form()),

        // Insights
        (&Method::Get, "/insights/analysis") => insights_analysis(ctx, &req.query()),
        (&Method::Get, "/insights/classification") => insights_classification(ctx),
        (&Method::Get, "/insights/clusters") => insights_clusters(ctx),
        (&Method::Get, "/insights/forecast") => insights_forecast(ctx, &req.query()),

        // Profile
        (&Method::Get, "/profile") => profile_get(ctx),
        (&Method::Post, "/profile") => profile_post(ctx, &req.form()),

        // Assets
        (&Method::Get, "/static/app.css") => {
            Ok(Page::asset("text/css; charset=utf-8", frontend::APP_CSS))
        }
        (&Method::Get, "/static/app.js") => Ok(Page::asset(
            "application/javascript; charset=utf-8",
            frontend::APP_JS,
        )),

        (_, path) => {
            let body = render::not_found_page(path, &viewer(ctx, &current_user(ctx)));
            Ok(Page::html(body).with_status(404))
        }
    };

    match result {
        Ok(page) => page,
        Err(e) if e.requires_login() => {
            ctx.state.charts.clear();
            ctx.state.selected_food = None;
            ctx.state.flash = Some(Notice::info(match e {
                ApiError::Unauthorized => "Your session has expired. Please log in again.",
                _ => "Please log in to continue.",
            }));
            Page::redirect("/login")
        }
        Err(e) => {
            let body = render::error_page(&e.user_message(), &viewer(ctx, &current_user(ctx)));
            Page::html(body).with_status(e.status().filter(|s| *s >= 400).unwrap_or(502))
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn current_user(ctx: &Ctx<'_>) -> Option<UserPreferences> {
    let session = ctx.client.session();
    if !session.is_authenticated() {
        return None;
    }
    Some(
        session
            .preferences()
            .unwrap_or_else(|| UserPreferences::new(Some("Account".into()), "")),
    )
}

fn viewer<'a>(ctx: &'a Ctx<'_>, user: &'a Option<UserPreferences>) -> Viewer<'a> {
    Viewer {
        name: user.as_ref().map(UserPreferences::display_name),
        debug: ctx.env.flags.debug,
        api_base_url: &ctx.env.api_base_url,
    }
}

/// Full page in the common layout.
fn html(ctx: &Ctx<'_>, title: &str, body: &str) -> Page {
    let user = current_user(ctx);
    Page::html(render::page(title, &viewer(ctx, &user), body))
}

/// Trimmed text field, empty when absent.
fn field(form: &Form, key: &str) -> String {
    form.get(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn number(form: &Form, key: &str) -> Option<f64> {
    form.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
}

/// Split an `anyhow` error from a panel operation: login errors propagate,
/// anything else becomes a display message.
fn split_error(err: anyhow::Error) -> Result<String, ApiError> {
    match err.downcast::<ApiError>() {
        Ok(api) if api.requires_login() => Err(api),
        Ok(api) => Ok(api.user_message()),
        Err(other) => Ok(format!("{other:#}")),
    }
}

/// Show a failed AI call inside its panel instead of failing the page.
fn inline<T>(result: Result<Panel<T>, ApiError>) -> Result<Panel<T>, ApiError> {
    match result {
        Err(e) if !e.requires_login() => Ok(Panel::Unavailable(e.user_message())),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn dashboard_page(ctx: &mut Ctx<'_>) -> Handled {
    let data = dashboard::load(ctx.client, ctx.config.goals.default_calorie_goal)?;
    let split = insights::macro_split(
        data.stats.total_protein,
        data.stats.total_carbs,
        data.stats.total_fat,
    );
    let chart = ctx.state.charts.mount(Chart::Macros(split)).clone();
    let flash = ctx.state.flash.take();

    let body = render::dashboard::dashboard_body(&DashboardView {
        data: &data,
        selected: ctx.state.selected_food.as_ref(),
        notice: flash.as_ref(),
        macro_chart: Some(&chart),
        debounce_ms: ctx.config.search.debounce_ms,
        min_query_chars: ctx.config.search.min_query_chars,
    });
    Ok(html(ctx, "Dashboard", &body))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn login_get(ctx: &mut Ctx<'_>) -> Page {
    if ctx.client.session().is_authenticated() {
        return Page::redirect("/");
    }
    let flash = ctx.state.flash.take();
    html(ctx, "Log in", &forms::login_form("", flash.as_ref()))
}

fn login_post(ctx: &mut Ctx<'_>, form: &Form) -> Page {
    let login = LoginForm {
        email: field(form, "email"),
        password: form.get("password").cloned().unwrap_or_default(),
    };
    match auth::login(ctx.client, &login) {
        Ok(prefs) => {
            ctx.state.flash = Some(Notice::success(format!(
                "Welcome back, {}!",
                prefs.display_name()
            )));
            Page::redirect("/")
        }
        Err(e) => {
            let notice = Notice::error(e.user_message());
            html(ctx, "Log in", &forms::login_form(&login.email, Some(&notice)))
        }
    }
}

fn register_post(ctx: &mut Ctx<'_>, form: &Form) -> Page {
    let registration = RegistrationForm {
        name: field(form, "name"),
        email: field(form, "email"),
        password: form.get("password").cloned().unwrap_or_default(),
        confirm_password: form.get("confirm_password").cloned(),
    };
    match auth::register(ctx.client, &registration) {
        Ok(message) => {
            let notice = Notice::success(message);
            html(ctx, "Log in", &forms::login_form(&registration.email, Some(&notice)))
        }
        Err(e) => {
            let notice = Notice::error(e.user_message());
            let body = forms::register_form(&registration.name, &registration.email, Some(&notice));
            html(ctx, "Register", &body)
        }
    }
}

fn logout(ctx: &mut Ctx<'_>) -> Page {
    ctx.state.charts.clear();
    ctx.state.selected_food = None;
    ctx.state.flash = Some(match auth::logout(ctx.client.session()) {
        Ok(()) => Notice::success("You have been logged out."),
        Err(e) => Notice::error(format!("Could not clear the session: {e:#}")),
    });
    Page::redirect("/login")
}

// ---------------------------------------------------------------------------
// Food
// ---------------------------------------------------------------------------

/// HTML fragment for the search box; no layout.
fn food_search(ctx: &mut Ctx<'_>, query: &Form) -> Handled {
    let q = field(query, "q");
    let search = &ctx.config.search;
    match food::search(ctx.client, &q, search.min_query_chars, search.max_results) {
        Ok(foods) => Ok(Page::html(render::dashboard::search_results(&q, &foods))),
        Err(e) if e.requires_login() => Err(e),
        Err(e) => Ok(Page::html(Notice::error(e.user_message()).to_html())),
    }
}

fn food_select(ctx: &mut Ctx<'_>, query: &Form) -> Handled {
    let id = field(query, "id");
    if id.is_empty() {
        return Ok(Page::redirect("/"));
    }
    match food::select(ctx.client, &id) {
        Ok(preview) => ctx.state.selected_food = Some(preview),
        Err(e) => ctx.state.flash = Some(Notice::error(split_error(e)?)),
    }
    Ok(Page::redirect("/"))
}

// ---------------------------------------------------------------------------
// Meals
// ---------------------------------------------------------------------------

/// Build the add-meal payload from the form and the selected food.
fn meal_from_form(form: &Form, selected: Option<&NutritionPreview>) -> NewMeal {
    let meal_type = meals::normalize_meal_type(&field(form, "meal_type"));
    let quantity = number(form, "quantity").unwrap_or(f64::NAN);
    let food_id = field(form, "food_id");

    if let Some(food) = selected
        && (food_id.is_empty() || food_id == food.food_id)
    {
        return food.to_new_meal(&meal_type, quantity);
    }

    let typed = NutritionPreview {
        food_id: String::new(),
        food_name: field(form, "food_name"),
        brand_name: None,
        serving_description: "1 serving".to_string(),
        calories: number(form, "calories").unwrap_or(f64::NAN),
        protein: number(form, "protein").unwrap_or(0.0),
        carbs: number(form, "carbs").unwrap_or(0.0),
        fat: number(form, "fat").unwrap_or(0.0),
    };
    typed.to_new_meal(&meal_type, quantity)
}

fn meal_add(ctx: &mut Ctx<'_>, form: &Form) -> Handled {
    let meal = meal_from_form(form, ctx.state.selected_food.as_ref());
    match meals::add(ctx.client, &meal) {
        Ok(saved) => {
            ctx.state.selected_food = None;
            let name = if saved.food_name.is_empty() {
                meal.food_name
            } else {
                saved.food_name
            };
            ctx.state.flash = Some(Notice::success(format!("Added {name}.")));
        }
        Err(e) => ctx.state.flash = Some(Notice::error(split_error(e)?)),
    }
    Ok(Page::redirect("/"))
}

fn meal_delete_confirm(ctx: &mut Ctx<'_>, query: &Form) -> Handled {
    let id = field(query, "id");
    if id.is_empty() {
        return Ok(Page::redirect("/"));
    }
    let today = meals::today(ctx.client)?;
    let meal = today.iter().find(|m| m.id == id);
    Ok(html(ctx, "Delete meal", &forms::confirm_delete(&id, meal)))
}

/// The POST is the confirmation: the user has already answered the prompt.
fn meal_delete(ctx: &mut Ctx<'_>, form: &Form) -> Handled {
    let id = field(form, "id");
    if id.is_empty() {
        ctx.state.flash = Some(Notice::error("No meal selected."));
        return Ok(Page::redirect("/"));
    }
    ctx.state.flash = Some(match meals::delete_confirmed(ctx.client, &id, |_| true) {
        Ok(Some(refresh)) => Notice::success(refresh.message),
        Ok(None) => Notice::info("Nothing deleted."),
        Err(e) if e.requires_login() => return Err(e),
        Err(e) => Notice::error(e.user_message()),
    });
    Ok(Page::redirect("/"))
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

fn insights_analysis(ctx: &mut Ctx<'_>, query: &Form) -> Handled {
    let period = Period::parse(&field(query, "period")).unwrap_or_default();
    let analysis = insights::fetch_analysis(ctx.client, period)?;
    let chart = ctx
        .state
        .charts
        .mount(Chart::Macros(analysis.macro_split()))
        .clone();
    let body = render::insights::analysis_panel(&analysis, period, Some(&chart));
    Ok(html(ctx, "Analysis", &body))
}

fn insights_classification(ctx: &mut Ctx<'_>) -> Handled {
    let panel = inline(insights::fetch_classification(ctx.client, &ctx.env.flags))?;
    Ok(html(ctx, "Diet type", &render::insights::classification_panel(&panel)))
}

fn insights_clusters(ctx: &mut Ctx<'_>) -> Handled {
    let panel = inline(insights::fetch_clusters(ctx.client, &ctx.env.flags))?;
    Ok(html(ctx, "Eating pattern", &render::insights::cluster_panel(&panel)))
}

fn insights_forecast(ctx: &mut Ctx<'_>, query: &Form) -> Handled {
    let days = query
        .get("days")
        .and_then(|d| d.trim().parse::<u32>().ok())
        .unwrap_or(ctx.env.flags.forecast_days);
    let panel = inline(insights::fetch_forecast(ctx.client, &ctx.env.flags, days))?;

    let chart = match &panel {
        Panel::Ready(fc) => {
            let viz = &fc.visualization_data;
            let forecast = if viz.forecast.is_empty() {
                fc.forecasts.clone()
            } else {
                viz.forecast.clone()
            };
            Some(
                ctx.state
                    .charts
                    .mount(Chart::Forecast {
                        historical: viz.historical.clone(),
                        forecast,
                    })
                    .clone(),
            )
        }
        _ => {
            ctx.state.charts.destroy(ChartKind::Forecast);
            None
        }
    };

    let body = render::insights::forecast_panel(&panel, chart.as_ref());
    Ok(html(ctx, "Forecast", &body))
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

fn profile_get(ctx: &mut Ctx<'_>) -> Handled {
    let body = match goals::load_profile(ctx.client)? {
        Some(profile) => {
            let targets = Some(MacroGoals::from_profile(&profile)).filter(|g| g.daily_calories > 0.0);
            forms::profile_form(&ProfileForm::from_profile(&profile), targets.as_ref(), None)
        }
        None => {
            let notice =
                Notice::info("No profile yet. Fill in the form to calculate your daily targets.");
            forms::profile_form(&ProfileForm::default(), None, Some(&notice))
        }
    };
    Ok(html(ctx, "Profile", &body))
}

fn profile_post(ctx: &mut Ctx<'_>, form: &Form) -> Handled {
    let submitted = ProfileForm {
        full_name: field(form, "full_name"),
        age: field(form, "age"),
        gender: field(form, "gender"),
        height: field(form, "height"),
        weight: field(form, "weight"),
        activity_level: field(form, "activity_level"),
        primary_goal: field(form, "primary_goal"),
        target_weight: field(form, "target_weight"),
        diet_preference: field(form, "diet_preference"),
        weekly_goal: field(form, "weekly_goal"),
        health_conditions: field(form, "health_conditions"),
    };

    let input = match submitted.validate() {
        Ok(input) => input,
        Err(e) => {
            let notice = Notice::error(e.to_string());
            return Ok(html(ctx, "Profile", &forms::profile_form(&submitted, None, Some(&notice))));
        }
    };

    let body = if field(form, "action") == "preview" {
        let notice = Notice::info("Preview only. Press Save to store these targets.");
        forms::profile_form(&submitted, Some(&input.goals()), Some(&notice))
    } else {
        match goals::save_profile(ctx.client, &input) {
            Ok(saved) => {
                let notice = Notice::success("Profile saved.");
                forms::profile_form(
                    &ProfileForm::from_profile(&saved),
                    Some(&MacroGoals::from_profile(&saved)),
                    Some(&notice),
                )
            }
            Err(e) if e.requires_login() => return Err(e),
            Err(e) => {
                let notice = Notice::error(e.user_message());
                forms::profile_form(&submitted, Some(&input.goals()), Some(&notice))
            }
        }
    };
    Ok(html(ctx, "Profile", &body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> Form {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn apple() -> NutritionPreview {
        NutritionPreview {
            food_id: "35718".into(),
            food_name: "Apple".into(),
            brand_name: None,
            serving_description: "1 medium".into(),
            calories: 95.0,
            protein: 0.5,
            carbs: 25.0,
            fat: 0.3,
        }
    }

    #[test]
    fn selected_food_supplies_macros() {
        let f = form(&[("meal_type", "Snack"), ("quantity", "2"), ("food_id", "35718")]);
        let meal = meal_from_form(&f, Some(&apple()));
        assert_eq!(meal.meal_type, "snack");
        assert_eq!(meal.food_name, "Apple");
        assert_eq!(meal.calories, 190.0);
        assert_eq!(meal.food_id, "35718");
    }

    #[test]
    fn typed_meal_ignores_stale_selection() {
        let f = form(&[
            ("meal_type", "lunch"),
            ("quantity", "1"),
            ("food_id", "999"),
            ("food_name", "Soup"),
            ("calories", "120"),
        ]);
        let meal = meal_from_form(&f, Some(&apple()));
        assert_eq!(meal.food_name, "Soup");
        assert_eq!(meal.calories, 120.0);
        assert_eq!(meal.fat, 0.0);
        assert!(meal.food_id.is_empty());
    }

    #[test]
    fn missing_calories_fail_validation() {
        let f = form(&[("meal_type", "lunch"), ("quantity", "1"), ("food_name", "Soup")]);
        assert!(meal_from_form(&f, None).validate().is_err());
    }

    #[test]
    fn split_error_keeps_login_errors() {
        let err = anyhow::Error::from(ApiError::Unauthorized);
        assert!(matches!(split_error(err), Err(ApiError::Unauthorized)));

        let err = anyhow::Error::from(ApiError::Status {
            status: 404,
            message: "Food not found".into(),
        });
        assert_eq!(split_error(err).unwrap(), "Food not found");

        let err = anyhow::anyhow!("Quantity must be greater than zero");
        assert_eq!(split_error(err).unwrap(), "Quantity must be greater than zero");
    }
}
