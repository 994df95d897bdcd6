//! CLI command implementations.
//!
//! Every handler returns `anyhow::Result<()>` and prints either a colored
//! table or JSON. Backend errors that mean "log in first" get a hint
//! pointing at `nutriboard login`.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{Confirm, Password};

use crate::activity::reporter::{self, ActivitySummary};
use crate::activity::ActivityLogger;
use crate::api::types::{FoodSummary, Meal, NewMeal, Profile};
use crate::api::{ApiClient, ApiError};
use crate::auth::{self, LoginForm, RegistrationForm};
use crate::config::resolve::{self, ResolvedEnv};
use crate::config::{self, NutriboardConfig};
use crate::dashboard::{self, DashboardData};
use crate::food::debounce::{Debouncer, LatestOnly};
use crate::food::{self, NutritionPreview};
use crate::goals::{self, ActivityLevel, BodyMetrics, Gender, MacroGoals, ProfileForm};
use crate::insights::{self, DISABLED_NOTICE, Panel, Period};
use crate::meals;
use crate::render::chart::{Chart, ChartHandles};
use crate::render::{self, Viewer};
use crate::session::Session;
use crate::storage::FileStorage;
use crate::web::{self, WebApp};

/// Output format for data commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

/// Loaded config, resolved environment and a ready client.
pub struct Context {
    pub config: NutriboardConfig,
    pub env: ResolvedEnv,
    pub client: ApiClient,
}

impl Context {
    /// Load config, open `~/.nutriboard/local-storage.json` and build the
    /// client for the configured host.
    pub fn load() -> Result<Self> {
        let config = config::load();
        let storage = FileStorage::open_default()?;
        let session = Session::new(Arc::new(storage));
        Ok(Self::with_session(config, session))
    }

    pub fn with_session(config: NutriboardConfig, session: Session) -> Self {
        let env = resolve::resolve(&config.api.host, &config);
        let client = ApiClient::new(
            &env.api_base_url,
            Duration::from_millis(config.api.timeout_ms),
            session,
        )
        .with_activity(ActivityLogger::from_config(&config.logging));
        Self {
            config,
            env,
            client,
        }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }
}

/// Turn a backend error into a message for the terminal.
fn explain(err: ApiError) -> anyhow::Error {
    if err.requires_login() {
        anyhow::anyhow!("{err}. Run `nutriboard login` first.")
    } else {
        anyhow::anyhow!(err.user_message())
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn heading(title: &str, width: usize) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(width));
}

fn ok(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Use `--password` when given, otherwise ask without echoing.
fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(p) => Ok(p),
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password"),
    }
}

// ---------------------------------------------------------------------------
// nutriboard register | login | logout | whoami
// ---------------------------------------------------------------------------

pub fn run_register(
    ctx: &Context,
    name: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let form = RegistrationForm {
        name: name.to_string(),
        email: email.to_string(),
        password,
        confirm_password: None,
    };
    let message = auth::register(&ctx.client, &form).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    ok(&message);
    Ok(())
}

pub fn run_login(ctx: &Context, email: &str, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let form = LoginForm {
        email: email.to_string(),
        password,
    };
    let prefs = auth::login(&ctx.client, &form).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    ok(&format!("Logged in as {}", prefs.display_name().bold()));
    Ok(())
}

pub fn run_logout(ctx: &Context) -> Result<()> {
    auth::logout(ctx.session())?;
    ok("Logged out");
    Ok(())
}

pub fn run_whoami(ctx: &Context, format: OutputFormat) -> Result<()> {
    let prefs = ctx.session().preferences();
    let logged_in = ctx.session().is_authenticated();

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "logged_in": logged_in,
            "user": prefs,
            "environment": ctx.env,
        }));
    }

    heading("Session", 50);
    match (&prefs, logged_in) {
        (Some(p), true) => {
            println!("  {} {}", "User:       ".bold(), p.display_name());
            println!("  {} {}", "Email:      ".bold(), p.email);
            if let Some(at) = p.last_login {
                println!(
                    "  {} {}",
                    "Last login: ".bold(),
                    at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                );
            }
        }
        (_, true) => println!("  {}", "Logged in (no cached profile)".yellow()),
        (_, false) => println!("  {}", "Not logged in".yellow()),
    }
    println!("  {} {}", "Environment:".bold(), ctx.env.environment);
    println!("  {} {}", "API:        ".bold(), ctx.env.api_base_url);
    println!(
        "  {} {}",
        "AI insights:".bold(),
        if ctx.env.flags.ai_insights { "on" } else { "off" }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// nutriboard dashboard
// ---------------------------------------------------------------------------

pub fn run_dashboard(ctx: &Context, format: OutputFormat, html: Option<&Path>) -> Result<()> {
    let data = dashboard::load(&ctx.client, ctx.config.goals.default_calorie_goal).map_err(explain)?;

    if let Some(path) = html {
        export_dashboard_html(ctx, &data, path)?;
        ok(&format!("Dashboard written to {}", path.display()));
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&data),
        OutputFormat::Table => {
            print_dashboard(&data);
            Ok(())
        }
    }
}

fn export_dashboard_html(ctx: &Context, data: &DashboardData, path: &Path) -> Result<()> {
    let mut charts = ChartHandles::new();
    let split = insights::macro_split(
        data.stats.total_protein,
        data.stats.total_carbs,
        data.stats.total_fat,
    );
    let chart = charts.mount(Chart::Macros(split));
    let body = render::dashboard::dashboard_body(&render::dashboard::DashboardView {
        data,
        selected: None,
        notice: None,
        macro_chart: Some(chart),
        debounce_ms: ctx.config.search.debounce_ms,
        min_query_chars: ctx.config.search.min_query_chars,
    });
    let viewer = Viewer {
        name: data.greeting_name(),
        debug: ctx.env.flags.debug,
        api_base_url: &ctx.env.api_base_url,
    };
    let page = render::page("Dashboard", &viewer, &body);
    fs::write(path, page).with_context(|| format!("failed to write {}", path.display()))
}

fn print_dashboard(data: &DashboardData) {
    heading("Nutriboard Dashboard", 60);
    if let Some(name) = data.greeting_name() {
        println!("  Welcome back, {}!", name.bold());
    }
    println!();

    let s = &data.stats;
    let pct = data.progress_pct();
    println!(
        "  {} {} / {} kcal ({:.0}%) {}",
        "Calories:".bold(),
        render::fmt_int(s.total_calories),
        render::fmt_int(data.calorie_goal),
        pct,
        progress_bar(pct, 20)
    );
    println!(
        "  {} {} g   {} {} g   {} {} g",
        "Protein:".bold(),
        render::fmt_1(s.total_protein),
        "Carbs:".bold(),
        render::fmt_1(s.total_carbs),
        "Fat:".bold(),
        render::fmt_1(s.total_fat)
    );
    println!(
        "  {} {}   {} {} days",
        "Meals today:".bold(),
        s.meals_count,
        "Streak:".bold(),
        s.streak
    );
    println!();

    println!("{}", "Today's Meals".bold().cyan());
    print_meal_table(&data.meals);
}

fn progress_bar(pct: f64, width: usize) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
    if pct >= 100.0 {
        bar.yellow().to_string()
    } else {
        bar.green().to_string()
    }
}

fn print_meal_table(meals: &[Meal]) {
    if meals.is_empty() {
        println!("  {}", "No meals logged.".dimmed());
        return;
    }
    println!(
        "  {:<10} {:<24} {:>5} {:>7} {:>6} {:>6} {:>6}  ID",
        "Type", "Food", "Qty", "kcal", "P", "C", "F"
    );
    println!("  {}", "-".repeat(78));
    for (i, m) in meals.iter().enumerate() {
        let line = format!(
            "  {:<10} {:<24} {:>5} {:>7} {:>6} {:>6} {:>6}  {}",
            m.meal_type,
            truncate(&m.food_name, 24),
            render::fmt_1(m.quantity),
            render::fmt_int(m.calories),
            render::fmt_1(m.protein),
            render::fmt_1(m.carbs),
            render::fmt_1(m.fat),
            m.id,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// nutriboard meal add | list | delete
// ---------------------------------------------------------------------------

/// Arguments for `meal add`.
#[derive(Debug, Clone, Default)]
pub struct MealAddArgs {
    pub meal_type: String,
    pub food_id: Option<String>,
    pub food_name: Option<String>,
    pub quantity: f64,
    pub calories: Option<f64>,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

fn meal_from_args(ctx: &Context, args: &MealAddArgs) -> Result<NewMeal> {
    let meal_type = meals::normalize_meal_type(&args.meal_type);
    if let Some(id) = &args.food_id {
        let preview = food::select(&ctx.client, id).map_err(|e| match e.downcast::<ApiError>() {
            Ok(api) => explain(api),
            Err(other) => other,
        })?;
        return Ok(preview.to_new_meal(&meal_type, args.quantity));
    }

    let food_name = args
        .food_name
        .clone()
        .context("Pass --food-id, or --name with --calories")?;
    let calories = args
        .calories
        .context("--calories is required when no --food-id is given")?;
    let typed = NutritionPreview {
        food_id: String::new(),
        food_name,
        brand_name: None,
        serving_description: "1 serving".to_string(),
        calories,
        protein: args.protein,
        carbs: args.carbs,
        fat: args.fat,
    };
    Ok(typed.to_new_meal(&meal_type, args.quantity))
}

pub fn run_meal_add(ctx: &Context, args: &MealAddArgs) -> Result<()> {
    let meal = meal_from_args(ctx, args)?;
    let saved = meals::add(&ctx.client, &meal).map_err(|e| match e.downcast::<ApiError>() {
        Ok(api) => explain(api),
        Err(other) => other,
    })?;
    ok(&format!(
        "Added {} ({} kcal) to {}",
        meal.food_name.bold(),
        render::fmt_int(meal.calories),
        meal.meal_type
    ));
    if !saved.id.is_empty() {
        println!("  {} {}", "id:".dimmed(), saved.id.dimmed());
    }
    Ok(())
}

pub fn run_meal_list(
    ctx: &Context,
    date: Option<NaiveDate>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let day = if all {
        None
    } else {
        Some(date.unwrap_or_else(|| chrono::Utc::now().date_naive()))
    };
    let list = meals::list(&ctx.client, day).map_err(explain)?;

    match format {
        OutputFormat::Json => print_json(&list),
        OutputFormat::Table => {
            let title = match day {
                Some(d) => format!("Meals on {d}"),
                None => "All Meals".to_string(),
            };
            heading(&title, 80);
            print_meal_table(&list);
            let (cal, p, c, f) = meals::totals(&list);
            if !list.is_empty() {
                println!("  {}", "-".repeat(78));
                println!(
                    "  {:<35} {:>7} {:>6} {:>6} {:>6}",
                    "Total".bold(),
                    render::fmt_int(cal),
                    render::fmt_1(p),
                    render::fmt_1(c),
                    render::fmt_1(f)
                );
            }
            Ok(())
        }
    }
}

/// Delete after a y/N prompt (skipped with `--yes`), then show the
/// refreshed stats and today's meals.
pub fn run_meal_delete(ctx: &Context, meal_id: &str, yes: bool) -> Result<()> {
    let confirm = |id: &str| {
        if yes {
            return true;
        }
        Confirm::new()
            .with_prompt(format!("Delete meal {}?", id.bold()))
            .default(false)
            .interact()
            .unwrap_or(false)
    };

    match meals::delete_confirmed(&ctx.client, meal_id, confirm).map_err(explain)? {
        None => println!("{}", "Cancelled.".yellow()),
        Some(refresh) => {
            ok(&refresh.message);
            println!(
                "  {} {} kcal across {} meals",
                "Today:".bold(),
                render::fmt_int(refresh.stats.total_calories),
                refresh.stats.meals_count
            );
            println!();
            println!("{}", "Today's Meals".bold().cyan());
            print_meal_table(&refresh.meals);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// nutriboard food search | show
// ---------------------------------------------------------------------------

pub fn run_food_search(ctx: &Context, query: &str, format: OutputFormat) -> Result<()> {
    let search = &ctx.config.search;
    let foods = food::search(&ctx.client, query, search.min_query_chars, search.max_results)
        .map_err(explain)?;
    match format {
        OutputFormat::Json => print_json(&foods),
        OutputFormat::Table => {
            print_food_results(query, &foods);
            Ok(())
        }
    }
}

fn print_food_results(query: &str, foods: &[FoodSummary]) {
    if foods.is_empty() {
        println!("{}", format!("No foods match \"{}\".", query.trim()).yellow());
        return;
    }
    println!(
        "  {:<10} {:<32} {:>7}  {}",
        "ID", "Food", "kcal", "Per"
    );
    println!("  {}", "-".repeat(64));
    for (i, f) in foods.iter().enumerate() {
        let macros = food::parse_description(&f.food_description);
        let name = if f.brand_name.is_empty() {
            f.food_name.clone()
        } else {
            format!("{} ({})", f.food_name, f.brand_name)
        };
        let line = format!(
            "  {:<10} {:<32} {:>7}  {}",
            f.food_id,
            truncate(&name, 32),
            macros.calories.map(render::fmt_int).unwrap_or_default(),
            macros.serving.unwrap_or_default()
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

/// Read queries from stdin, one per line. Lines typed in quick succession
/// are collapsed into the last one; a search result that arrives after a
/// newer search was started is discarded.
pub fn run_food_interactive(ctx: &Context) -> Result<()> {
    let search = ctx.config.search.clone();
    let debouncer = Debouncer::from_millis(search.debounce_ms);
    let latest = Arc::new(LatestOnly::new());

    println!(
        "{}",
        "Type a food name and press Enter (Ctrl+D to quit).".dimmed()
    );

    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut workers = Vec::new();
    while let Some(query) = debouncer.next(&rx) {
        let ticket = latest.issue();
        let client = ctx.client.clone();
        let latest = Arc::clone(&latest);
        let (min_chars, max_results) = (search.min_query_chars, search.max_results);

        workers.push(thread::spawn(move || {
            let result = food::search(&client, &query, min_chars, max_results);
            latest.publish_if_current(ticket, || match result {
                Ok(foods) if query.trim().chars().count() >= min_chars.max(1) => {
                    println!("{}", format!("Results for \"{}\"", query.trim()).bold().cyan());
                    print_food_results(&query, &foods);
                }
                Ok(_) => println!("{}", format!("Type at least {min_chars} characters.").dimmed()),
                Err(e) => eprintln!("{} {}", "✗".red().bold(), explain(e)),
            });
        }));
        workers.retain(|w| !w.is_finished());
    }

    for worker in workers {
        let _ = worker.join();
    }
    Ok(())
}

pub fn run_food_show(ctx: &Context, food_id: &str, quantity: f64, format: OutputFormat) -> Result<()> {
    let preview = food::select(&ctx.client, food_id).map_err(|e| match e.downcast::<ApiError>() {
        Ok(api) => explain(api),
        Err(other) => other,
    })?;
    let scaled = preview.scaled(quantity);

    if format == OutputFormat::Json {
        return print_json(&scaled);
    }

    let title = match &preview.brand_name {
        Some(brand) => format!("{} ({brand})", preview.food_name),
        None => preview.food_name.clone(),
    };
    heading(&title, 50);
    println!("  {} {}", "Serving: ".bold(), preview.serving_description);
    if quantity != 1.0 {
        println!("  {} {}", "Servings:".bold(), render::fmt_1(quantity));
    }
    println!("  {} {} kcal", "Calories:".bold(), render::fmt_int(scaled.calories));
    println!("  {} {} g", "Protein: ".bold(), render::fmt_1(scaled.protein));
    println!("  {} {} g", "Carbs:   ".bold(), render::fmt_1(scaled.carbs));
    println!("  {} {} g", "Fat:     ".bold(), render::fmt_1(scaled.fat));
    Ok(())
}

// ---------------------------------------------------------------------------
// nutriboard insights analysis | classify | cluster | forecast
// ---------------------------------------------------------------------------

pub fn run_insights_analysis(ctx: &Context, period: Period, format: OutputFormat) -> Result<()> {
    let analysis = insights::fetch_analysis(&ctx.client, period).map_err(explain)?;
    if format == OutputFormat::Json {
        return print_json(&analysis);
    }

    heading(&format!("Nutrition Analysis ({period})"), 60);
    println!(
        "  {} {} kcal over {} meals (avg {} per meal)",
        "Total:".bold(),
        render::fmt_int(analysis.total_calories),
        analysis.total_meals,
        render::fmt_int(analysis.avg_calories)
    );
    let split = analysis.macro_split();
    println!(
        "  {} protein {}%  carbs {}%  fat {}%",
        "Split:".bold(),
        render::fmt_1(split.protein),
        render::fmt_1(split.carbs),
        render::fmt_1(split.fat)
    );
    println!();

    if !analysis.daily_data.is_empty() {
        println!(
            "  {:<12} {:>7} {:>7} {:>7} {:>7} {:>6}",
            "Date", "kcal", "P", "C", "F", "Meals"
        );
        println!("  {}", "-".repeat(52));
        for (date, d) in &analysis.daily_data {
            println!(
                "  {:<12} {:>7} {:>7} {:>7} {:>7} {:>6}",
                date,
                render::fmt_int(d.calories),
                render::fmt_1(d.protein),
                render::fmt_1(d.carbs),
                render::fmt_1(d.fat),
                d.meals
            );
        }
        println!();
    }
    print_recommendations(&analysis.recommendations);
    Ok(())
}

fn print_recommendations(items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{}", "Recommendations".bold().cyan());
    for r in items {
        println!("  • {r}");
    }
}

/// Print the notice for a panel that did not load. Returns the ready value.
fn ready_or_notice<T>(panel: Panel<T>) -> Option<T> {
    match panel {
        Panel::Ready(v) => Some(v),
        Panel::Unavailable(message) => {
            println!("{}", message.yellow());
            None
        }
        Panel::Disabled => {
            println!("{}", DISABLED_NOTICE.yellow());
            None
        }
    }
}

pub fn run_insights_classify(ctx: &Context, format: OutputFormat) -> Result<()> {
    let panel = insights::fetch_classification(&ctx.client, &ctx.env.flags).map_err(explain)?;
    let Some(c) = ready_or_notice(panel) else {
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&c);
    }

    heading("Diet Classification", 50);
    println!(
        "  {} {} ({}% confidence)",
        "Diet type:".bold(),
        c.diet_type.bold().green(),
        render::fmt_1(c.confidence)
    );
    if !c.description.is_empty() {
        println!("  {}", c.description.dimmed());
    }
    println!(
        "  {} protein {}%  carbs {}%  fat {}%",
        "Macros:   ".bold(),
        render::fmt_1(c.macro_distribution.protein),
        render::fmt_1(c.macro_distribution.carbs),
        render::fmt_1(c.macro_distribution.fat)
    );
    println!("  {} {}", "Meals:    ".bold(), c.meals_analyzed);
    println!();
    print_recommendations(&c.recommendations);
    Ok(())
}

pub fn run_insights_cluster(ctx: &Context, format: OutputFormat) -> Result<()> {
    let panel = insights::fetch_clusters(&ctx.client, &ctx.env.flags).map_err(explain)?;
    let Some(a) = ready_or_notice(panel) else {
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&a);
    }

    heading("Eating Pattern", 50);
    println!(
        "  {} {} {}",
        a.cluster_profile.icon,
        a.cluster_profile.name.bold().green(),
        format!("({})", a.algorithm).dimmed()
    );
    if !a.cluster_profile.description.is_empty() {
        println!("  {}", a.cluster_profile.description.dimmed());
    }
    let f = &a.features_analyzed;
    println!("  {} {}", "Avg kcal/meal:".bold(), render::fmt_int(f.avg_calories));
    println!(
        "  {} {}% / {}% / {}%",
        "P / C / F:    ".bold(),
        render::fmt_1(f.protein_ratio),
        render::fmt_1(f.carbs_ratio),
        render::fmt_1(f.fat_ratio)
    );
    println!("  {} {}", "Meals/day:    ".bold(), render::fmt_1(f.meal_frequency));
    println!("  {} {}%", "Consistency:  ".bold(), render::fmt_1(f.calorie_consistency));
    println!(
        "  {} {} similar users, {} meals analysed",
        "Based on:     ".bold(),
        a.similar_users,
        a.meals_analyzed
    );
    println!();
    for insight in &a.insights {
        println!("  {} {}: {}", insight.icon, insight.title.bold(), insight.message);
    }
    Ok(())
}

pub fn run_insights_forecast(ctx: &Context, days: Option<u32>, format: OutputFormat) -> Result<()> {
    let days = days.unwrap_or(ctx.env.flags.forecast_days);
    let panel = insights::fetch_forecast(&ctx.client, &ctx.env.flags, days).map_err(explain)?;
    let Some(fc) = ready_or_notice(panel) else {
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&fc);
    }

    heading(&format!("Calorie Forecast ({} days)", fc.forecasts.len()), 60);
    let s = &fc.current_stats;
    let trend = match s.trend.as_str() {
        "increasing" => s.trend.yellow(),
        "decreasing" => s.trend.blue(),
        _ => s.trend.green(),
    };
    println!(
        "  {} {} kcal/day (last 7: {}), trend {}",
        "Average:".bold(),
        render::fmt_int(s.average_daily_calories),
        render::fmt_int(s.recent_average),
        trend
    );
    println!();
    println!(
        "  {:<12} {:<10} {:>9} {:>15} {:>6}",
        "Date", "Day", "kcal", "Range", "Conf"
    );
    println!("  {}", "-".repeat(56));
    for d in &fc.forecasts {
        println!(
            "  {:<12} {:<10} {:>9} {:>15} {:>5}%",
            d.date,
            d.day_name,
            render::fmt_int(d.predicted_calories),
            format!(
                "{}-{}",
                render::fmt_int(d.range.lower),
                render::fmt_int(d.range.upper)
            ),
            render::fmt_1(d.confidence)
        );
    }
    println!();
    for insight in &fc.insights {
        let title = match insight.kind.as_str() {
            "warning" => insight.title.yellow().bold(),
            "success" => insight.title.green().bold(),
            _ => insight.title.bold(),
        };
        println!("  {} {}: {}", insight.icon, title, insight.message);
    }
    println!(
        "  {}",
        format!("{} · {} days analysed", fc.model, fc.analysis_period.days_analyzed).dimmed()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// nutriboard profile show | save, nutriboard goals
// ---------------------------------------------------------------------------

pub fn run_profile_show(ctx: &Context, format: OutputFormat) -> Result<()> {
    let profile = goals::load_profile(&ctx.client).map_err(explain)?;
    let Some(profile) = profile else {
        println!(
            "{}",
            "No profile yet. Run `nutriboard profile save ...` to create one.".yellow()
        );
        return Ok(());
    };
    if format == OutputFormat::Json {
        return print_json(&profile);
    }
    print_profile(&profile);
    Ok(())
}

fn print_profile(p: &Profile) {
    heading("Profile", 50);
    println!("  {} {}", "Name:    ".bold(), p.full_name);
    println!(
        "  {} {} y, {}, {} cm, {} kg",
        "Body:    ".bold(),
        render::fmt_int(p.age),
        p.gender,
        render::fmt_1(p.height),
        render::fmt_1(p.weight)
    );
    println!("  {} {}", "Activity:".bold(), p.activity_level);
    println!("  {} {}", "Goal:    ".bold(), p.primary_goal);
    if p.weekly_goal != 0.0 {
        println!("  {} {} kg/week", "Change:  ".bold(), render::fmt_1(p.weekly_goal));
    }
    if let Some(diet) = p.diet_preference.as_deref().filter(|d| !d.is_empty()) {
        println!("  {} {}", "Diet:    ".bold(), diet);
    }
    println!();
    print_goals(&MacroGoals::from_profile(p));
}

fn print_goals(g: &MacroGoals) {
    println!("{}", "Daily Targets".bold().cyan());
    println!("  {} {} kcal", "BMR:     ".bold(), render::fmt_int(g.bmr));
    println!("  {} {} kcal", "TDEE:    ".bold(), render::fmt_int(g.tdee));
    println!(
        "  {} {} kcal",
        "Calories:".bold(),
        render::fmt_int(g.daily_calories).green().bold()
    );
    println!(
        "  {} {} g protein, {} g carbs, {} g fat",
        "Macros:  ".bold(),
        render::fmt_int(g.daily_protein),
        render::fmt_int(g.daily_carbs),
        render::fmt_int(g.daily_fat)
    );
}

/// Validate and either preview (local calculation only) or save.
pub fn run_profile_save(ctx: &Context, form: &ProfileForm, preview: bool) -> Result<()> {
    let input = form.validate()?;
    if preview {
        println!("{}", "Preview (not saved)".dimmed());
        print_goals(&input.goals());
        return Ok(());
    }
    let saved = goals::save_profile(&ctx.client, &input).map_err(explain)?;
    ok("Profile saved");
    println!();
    print_profile(&saved);
    Ok(())
}

/// Local calculator; no network.
pub fn run_goals(
    age: u32,
    gender: &str,
    height_cm: f64,
    weight_kg: f64,
    activity: &str,
    weekly_goal_kg: f64,
    format: OutputFormat,
) -> Result<()> {
    let metrics = BodyMetrics {
        age,
        gender: Gender::parse(gender).context("gender must be male, female or other")?,
        height_cm,
        weight_kg,
        activity: ActivityLevel::parse(activity)
            .context("activity must be sedentary, light, moderate, active or very_active")?,
        weekly_goal_kg,
    };
    let goals = MacroGoals::calculate(&metrics);
    match format {
        OutputFormat::Json => print_json(&goals),
        OutputFormat::Table => {
            print_goals(&goals);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// nutriboard activity
// ---------------------------------------------------------------------------

pub fn run_activity(ctx: &Context, days: Option<u32>, format: OutputFormat) -> Result<()> {
    let Some(path) = ctx.config.logging.resolved_path() else {
        println!("{}", "Activity logging is disabled (logging.path is empty).".yellow());
        return Ok(());
    };
    let summary = reporter::compute_summary(&path, days);

    if summary.total_requests == 0 {
        println!(
            "{}",
            "No activity yet. Requests made by nutriboard are logged here.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&summary),
        OutputFormat::Table => {
            print_activity(&summary, days);
            Ok(())
        }
    }
}

fn print_activity(summary: &ActivitySummary, days: Option<u32>) {
    let title = match days {
        Some(d) => format!("API Activity (last {d} days)"),
        None => "API Activity".to_string(),
    };
    heading(&title, 70);
    println!("  {} {}", "Requests:     ".bold(), summary.total_requests);
    println!(
        "  {} {} ({:.1}%)",
        "Failures:     ".bold(),
        summary.failures,
        summary.failure_pct()
    );
    println!("  {} {}", "Unauthorized: ".bold(), summary.unauthorized);
    println!("  {} {}", "Network errs: ".bold(), summary.network_errors);
    println!("  {} {:.0} ms", "Avg latency:  ".bold(), summary.avg_latency_ms);
    println!();

    println!(
        "  {:<7} {:<28} {:>7} {:>9} {:>10}",
        "Method", "Endpoint", "Count", "Failures", "Avg ms"
    );
    println!("  {}", "-".repeat(66));
    for (i, e) in summary.endpoints.iter().enumerate() {
        let line = format!(
            "  {:<7} {:<28} {:>7} {:>9} {:>10.0}",
            e.method,
            truncate(&e.endpoint, 28),
            e.count,
            e.failures,
            e.avg_latency_ms
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

// ---------------------------------------------------------------------------
// nutriboard config show | init | set | reset | path
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration and the resolved environment.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    heading("Effective nutriboard Configuration", 50);
    println!();
    println!("{toml_str}");

    let cfg = config::load();
    let env = resolve::resolve(&cfg.api.host, &cfg);
    println!("{}", "Resolved for this host:".dimmed());
    println!("  {} {} ({})", "·".dimmed(), env.api_base_url, env.environment);

    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (label, path) in [
        ("~/.nutriboard/config.toml", config::global_config_file()),
        (".nutriboard.toml", config::project_config_file()),
    ] {
        if path.is_some_and(|p| p.exists()) {
            println!("  {} {}", "✓".green(), label.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
        }
    }
    println!("  {} {}", "·".dimmed(), "NUTRIBOARD_* environment variables".dimmed());
    Ok(())
}

pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    ok(&format!("Config written to {}", path.display()));
    Ok(())
}

pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    ok(&format!("Set {} = {}", key.bold(), value));
    Ok(())
}

pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    ok(&format!("Config reset to defaults at {}", path.display()));
    Ok(())
}

pub fn run_config_path() -> Result<()> {
    let global = config::global_config_file().context("could not determine home directory")?;
    println!("{}", global.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// nutriboard serve
// ---------------------------------------------------------------------------

pub fn run_serve(ctx: Context, addr: Option<&str>, no_open: bool) -> Result<()> {
    let addr = addr.unwrap_or(&ctx.config.web.addr).to_string();
    let open = ctx.config.web.open_browser && !no_open;
    let activity = ActivityLogger::from_config(&ctx.config.logging);
    let session = ctx.client.session().clone();
    let app = WebApp::new(ctx.config, session, activity);
    web::serve(app, &addr, open)
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
