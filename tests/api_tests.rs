/// Client behavior against a fake backend.
///
/// Covers what goes over the wire: which requests are sent, in which
/// order, with which token, and what happens to the session when the
/// backend rejects it.
mod common;

use common::{MockBackend, empty_session, logged_in_session, route, today};
use nutriboard::api::ApiError;
use nutriboard::auth::{self, AuthError, LoginForm, RegistrationForm, ValidationError};
use nutriboard::config::resolve::FeatureFlags;
use nutriboard::dashboard;
use nutriboard::food;
use nutriboard::goals;
use nutriboard::insights::{self, Panel, Period};
use nutriboard::meals;
use nutriboard::session::{Session, UserPreferences};
use nutriboard::storage::{MemoryStorage, Storage};
use serde_json::json;
use std::sync::Arc;

/// Storage that can be read and written but refuses removals, like a
/// session file on a read-only disk.
#[derive(Default)]
struct NoRemoveStorage(MemoryStorage);

impl Storage for NoRemoveStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.0.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.set_item(key, value)
    }

    fn remove_item(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("read-only file system")
    }
}

fn flags(ai_insights: bool) -> FeatureFlags {
    FeatureFlags {
        ai_insights,
        debug: false,
        forecast_days: 7,
    }
}

fn registration(password: &str) -> RegistrationForm {
    RegistrationForm {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        password: password.into(),
        confirm_password: None,
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[test]
fn registration_sends_exactly_one_post() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/register",
        201,
        json!({"message": "User registered successfully"}),
    )]);
    let client = backend.client(empty_session());

    let message = auth::register(&client, &registration("secret1")).unwrap();

    assert_eq!(message, "User registered successfully");
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].line(), "POST /register");
    assert!(requests[0].authorization.is_none());
    assert_eq!(
        requests[0].json(),
        json!({"name": "Ada", "email": "ada@example.com", "password": "secret1"})
    );
    // Name is cached for the greeting, but nobody is logged in yet.
    assert!(!client.session().is_authenticated());
    assert_eq!(client.session().preferences().unwrap().display_name(), "Ada");
}

#[test]
fn short_password_never_reaches_the_backend() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(empty_session());

    let err = auth::register(&client, &registration("abc")).unwrap_err();

    assert!(matches!(
        err,
        AuthError::Invalid(ValidationError::PasswordTooShort)
    ));
    assert_eq!(err.user_message(), "Password must be at least 6 characters");
    assert_eq!(backend.count(), 0);
}

#[test]
fn registration_conflict_shows_server_message() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/register",
        400,
        json!({"error": "User already exists"}),
    )]);
    let client = backend.client(empty_session());

    let err = auth::register(&client, &registration("secret1")).unwrap_err();
    assert_eq!(err.user_message(), "User already exists");
}

#[test]
fn login_stores_token_and_keeps_cached_name() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/login",
        200,
        json!({"message": "Login successful", "token": "jwt-123"}),
    )]);
    let session = empty_session();
    session
        .set_preferences(&nutriboard::session::UserPreferences::new(
            Some("Ada".into()),
            "ada@example.com",
        ))
        .unwrap();
    let client = backend.client(session);

    let prefs = auth::login(
        &client,
        &LoginForm {
            email: "ADA@example.com".into(),
            password: "secret1".into(),
        },
    )
    .unwrap();

    assert_eq!(client.session().token().as_deref(), Some("jwt-123"));
    assert_eq!(prefs.display_name(), "Ada");
    assert!(prefs.last_login.is_some());
}

#[test]
fn failed_login_leaves_session_empty() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/login",
        401,
        json!({"error": "Invalid credentials"}),
    )]);
    let client = backend.client(empty_session());

    let err = auth::login(
        &client,
        &LoginForm {
            email: "ada@example.com".into(),
            password: "wrong-pass".into(),
        },
    )
    .unwrap_err();

    // A 401 on a public endpoint is a plain error, not a forced logout.
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!client.session().is_authenticated());
}

// ---------------------------------------------------------------------------
// Session handling
// ---------------------------------------------------------------------------

#[test]
fn authenticated_calls_carry_bearer_token() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/meals/stats",
        200,
        json!({"total_calories": 500, "meals_count": 2}),
    )]);
    let client = backend.client(logged_in_session());

    let stats = meals::stats(&client).unwrap();

    assert_eq!(stats.total_calories, 500.0);
    assert_eq!(
        backend.requests()[0].authorization.as_deref(),
        Some("Bearer test-token")
    );
}

#[test]
fn unauthorized_response_clears_session() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/meals/stats",
        401,
        json!({"error": "Invalid token"}),
    )]);
    let client = backend.client(logged_in_session());

    let err = meals::stats(&client).unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert!(err.requires_login());
    assert!(client.session().token().is_none());
    assert!(client.session().preferences().is_none());
}

#[test]
fn unauthorized_response_reports_a_session_that_could_not_be_cleared() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/meals/stats",
        401,
        json!({"error": "Invalid token"}),
    )]);
    let session = Session::new(Arc::new(NoRemoveStorage::default()));
    session
        .store_login("stale-token", UserPreferences::new(None, "ada@example.com"))
        .unwrap();
    let client = backend.client(session);

    let err = meals::stats(&client).unwrap_err();

    match &err {
        ApiError::SessionNotCleared(reason) => assert!(reason.contains("read-only")),
        other => panic!("expected SessionNotCleared, got {other:?}"),
    }
    assert_eq!(err.status(), Some(401));
    assert!(!err.requires_login());
}

#[test]
fn missing_token_fails_without_a_request() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(empty_session());

    let err = meals::stats(&client).unwrap_err();

    assert!(matches!(err, ApiError::NotLoggedIn));
    assert_eq!(backend.count(), 0);
}

#[test]
fn unreachable_backend_is_a_network_error() {
    // Port 9 (discard) is not listening in the test environment.
    let client = nutriboard::api::ApiClient::new(
        "http://127.0.0.1:9",
        std::time::Duration::from_millis(500),
        logged_in_session(),
    );
    let err = meals::stats(&client).unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(client.session().is_authenticated());
}

// ---------------------------------------------------------------------------
// Food
// ---------------------------------------------------------------------------

#[test]
fn short_query_skips_search() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(logged_in_session());

    let foods = food::search(&client, " a ", 2, 10).unwrap();

    assert!(foods.is_empty());
    assert_eq!(backend.count(), 0);
}

#[test]
fn search_passes_query_and_caps_results() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/food/search",
        200,
        json!({"foods": [
            {"food_id": 1, "food_name": "Apple", "food_description": "Per 1 medium - Calories: 95kcal"},
            {"food_id": "2", "food_name": "Apple Pie", "food_description": ""},
            {"food_id": "3", "food_name": "Apple Juice", "food_description": ""}
        ]}),
    )]);
    let client = backend.client(logged_in_session());

    let foods = food::search(&client, "apple pie", 2, 2).unwrap();

    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0].food_id, "1");
    assert_eq!(backend.requests()[0].query, "q=apple+pie");
}

#[test]
fn selection_previews_first_serving() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/food/details/35718",
        200,
        json!({"food": {
            "food_id": "35718",
            "food_name": "Apple",
            "servings": {"serving": [
                {"serving_description": "1 medium", "calories": "95", "protein": "0.47",
                 "carbohydrate": "25.13", "fat": "0.31"},
                {"serving_description": "100 g", "calories": "52", "protein": "0.26",
                 "carbohydrate": "13.81", "fat": "0.17"}
            ]}
        }}),
    )]);
    let client = backend.client(logged_in_session());

    let preview = food::select(&client, "35718").unwrap();

    assert_eq!(preview.serving_description, "1 medium");
    assert_eq!(preview.calories, 95.0);
    assert_eq!(preview.carbs, 25.13);
    let meal = preview.to_new_meal("snack", 2.0);
    assert_eq!(meal.calories, 190.0);
    assert_eq!(meal.carbs, 50.3);
}

// ---------------------------------------------------------------------------
// Meals
// ---------------------------------------------------------------------------

fn meal_routes() -> Vec<common::Route> {
    vec![
        route("DELETE", "/meal/delete/m1", 200, json!({"message": "Meal deleted"})),
        route(
            "GET",
            "/meals/stats",
            200,
            json!({"total_calories": 300, "meals_count": 1, "streak": 2}),
        ),
        route(
            "GET",
            "/meals",
            200,
            json!([{"_id": "m2", "mealType": "lunch", "foodName": "Soup", "calories": 300}]),
        ),
    ]
}

#[test]
fn declined_delete_sends_nothing() {
    let backend = MockBackend::start(meal_routes());
    let client = backend.client(logged_in_session());

    let outcome = meals::delete_confirmed(&client, "m1", |_| false).unwrap();

    assert!(outcome.is_none());
    assert_eq!(backend.count(), 0);
}

#[test]
fn confirmed_delete_refreshes_stats_then_meals() {
    let backend = MockBackend::start(meal_routes());
    let client = backend.client(logged_in_session());

    let mut asked = None;
    let refresh = meals::delete_confirmed(&client, "m1", |id| {
        asked = Some(id.to_string());
        true
    })
    .unwrap()
    .unwrap();

    assert_eq!(asked.as_deref(), Some("m1"));
    assert_eq!(
        backend.lines(),
        ["DELETE /meal/delete/m1", "GET /meals/stats", "GET /meals"]
    );
    assert_eq!(backend.requests()[2].query, format!("date={}", today()));
    assert_eq!(refresh.message, "Meal deleted");
    assert_eq!(refresh.stats.total_calories, 300.0);
    assert_eq!(refresh.meals[0].id, "m2");
}

#[test]
fn invalid_meal_is_rejected_locally() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(logged_in_session());

    let preview = food::NutritionPreview {
        food_id: String::new(),
        food_name: "Soup".into(),
        brand_name: None,
        serving_description: "1 serving".into(),
        calories: 120.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };
    let meal = preview.to_new_meal("lunch", 0.0);

    assert!(meals::add(&client, &meal).is_err());
    assert_eq!(backend.count(), 0);
}

#[test]
fn add_posts_meal_payload() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/meal/add",
        201,
        json!({"message": "Meal added", "meal": {"_id": "m9", "mealType": "dinner", "foodName": "Rice"}}),
    )]);
    let client = backend.client(logged_in_session());

    let preview = food::NutritionPreview {
        food_id: "42".into(),
        food_name: "Rice".into(),
        brand_name: None,
        serving_description: "1 cup".into(),
        calories: 205.0,
        protein: 4.3,
        carbs: 44.5,
        fat: 0.4,
    };
    let saved = meals::add(&client, &preview.to_new_meal("dinner", 1.5)).unwrap();

    assert_eq!(saved.id, "m9");
    let body = backend.requests()[0].json();
    assert_eq!(body["mealType"], "dinner");
    assert_eq!(body["foodName"], "Rice");
    assert_eq!(body["quantity"], 1.5);
    assert_eq!(body["calories"], 307.5);
    assert_eq!(body["food_id"], "42");
}

// ---------------------------------------------------------------------------
// Dashboard, profile, insights
// ---------------------------------------------------------------------------

#[test]
fn dashboard_uses_profile_goal_when_present() {
    let backend = MockBackend::start(vec![
        route("GET", "/meals/stats", 200, json!({"total_calories": 900})),
        route("GET", "/meals", 200, json!([])),
        route(
            "GET",
            "/profile",
            200,
            json!({"fullName": "Ada Lovelace", "dailyCalories": 1800}),
        ),
    ]);
    let client = backend.client(logged_in_session());

    let data = dashboard::load(&client, 2000.0).unwrap();

    assert_eq!(data.calorie_goal, 1800.0);
    assert_eq!(data.progress_pct(), 50.0);
    assert_eq!(
        backend.lines(),
        ["GET /meals/stats", "GET /meals", "GET /profile"]
    );
}

#[test]
fn dashboard_falls_back_to_default_goal_without_profile() {
    let backend = MockBackend::start(vec![
        route("GET", "/meals/stats", 200, json!({"total_calories": 2500})),
        route("GET", "/meals", 200, json!([])),
    ]);
    let client = backend.client(logged_in_session());

    let data = dashboard::load(&client, 2000.0).unwrap();

    assert!(data.profile.is_none());
    assert_eq!(data.calorie_goal, 2000.0);
    assert_eq!(data.progress_pct(), 100.0);
}

#[test]
fn profile_404_means_no_profile() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(logged_in_session());
    assert!(goals::load_profile(&client).unwrap().is_none());
}

#[test]
fn analysis_sends_period() {
    let backend = MockBackend::start(vec![route(
        "GET",
        "/meals/analysis",
        200,
        json!({"period": "month", "total_calories": 42000, "total_meals": 60}),
    )]);
    let client = backend.client(logged_in_session());

    let analysis = insights::fetch_analysis(&client, Period::Month).unwrap();

    assert_eq!(analysis.total_meals, 60);
    assert_eq!(backend.requests()[0].query, "period=month");
}

#[test]
fn disabled_ai_panels_send_nothing() {
    let backend = MockBackend::start(vec![]);
    let client = backend.client(logged_in_session());
    let off = flags(false);

    assert_eq!(
        insights::fetch_classification(&client, &off).unwrap(),
        Panel::Disabled
    );
    assert_eq!(insights::fetch_clusters(&client, &off).unwrap(), Panel::Disabled);
    assert_eq!(
        insights::fetch_forecast(&client, &off, 7).unwrap(),
        Panel::Disabled
    );
    assert_eq!(backend.count(), 0);
}

#[test]
fn forecast_posts_days_and_reports_shortfall() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/ai/forecast-intake",
        200,
        json!({"success": false, "message": "Not enough data", "min_days_needed": 7}),
    )]);
    let client = backend.client(logged_in_session());

    let panel = insights::fetch_forecast(&client, &flags(true), 14).unwrap();

    assert_eq!(backend.requests()[0].line(), "POST /ai/forecast-intake");
    assert_eq!(backend.requests()[0].json(), json!({"days": 14}));
    match panel {
        Panel::Unavailable(message) => {
            assert!(message.starts_with("Not enough data"));
            assert!(message.contains('7'));
        }
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[test]
fn cluster_shortfall_shows_meal_counts() {
    let backend = MockBackend::start(vec![route(
        "POST",
        "/ai/cluster-analysis",
        200,
        json!({"success": false, "message": "Need more meals", "meals_logged": 3, "required_meals": 10}),
    )]);
    let client = backend.client(logged_in_session());

    let panel = insights::fetch_clusters(&client, &flags(true)).unwrap();

    assert_eq!(
        panel,
        Panel::Unavailable("Need more meals (3/10 meals logged)".into())
    );
}
