use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use nutriboard::cli::{self, Context, MealAddArgs, OutputFormat};
use nutriboard::goals::ProfileForm;
use nutriboard::insights::Period;

#[derive(Debug, Parser)]
#[command(name = "nutriboard")]
#[command(about = "Track meals, nutrition goals and AI insights from the terminal or a local dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored token and cached user
    Logout,
    /// Show the current session and resolved environment
    Whoami {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Today's totals, goal progress and meals
    Dashboard {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Write the dashboard as a standalone HTML page instead
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Add, list or delete meals
    Meal {
        #[command(subcommand)]
        action: MealAction,
    },
    /// Search the food database
    Food {
        #[command(subcommand)]
        action: FoodAction,
    },
    /// Nutrition analysis and AI insights
    Insights {
        #[command(subcommand)]
        action: InsightsAction,
    },
    /// Show or save the body profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Calculate daily calorie and macro targets locally
    Goals {
        #[arg(long)]
        age: u32,
        /// male, female or other
        #[arg(long)]
        gender: String,
        /// Height in cm
        #[arg(long)]
        height: f64,
        /// Weight in kg
        #[arg(long)]
        weight: f64,
        /// sedentary, light, moderate, active or very_active
        #[arg(long, default_value = "moderate")]
        activity: String,
        /// Desired change in kg per week (negative to lose)
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        weekly_goal: f64,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Summarize the local log of API requests
    Activity {
        /// Only include the last N days
        #[arg(long)]
        days: Option<u32>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Run the local web dashboard
    Serve {
        /// Address to bind (default from config: 127.0.0.1:8787)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser
        #[arg(long)]
        no_open: bool,
    },
}

#[derive(Debug, Subcommand)]
enum MealAction {
    /// Log a meal from a food id or typed-in values
    Add {
        /// breakfast, lunch, dinner or snack
        #[arg(long = "type", default_value = "snack")]
        meal_type: String,
        /// Food database id; macros come from its first serving
        #[arg(long)]
        food_id: Option<String>,
        /// Food name when no id is given
        #[arg(long)]
        name: Option<String>,
        /// Number of servings
        #[arg(long, default_value = "1")]
        quantity: f64,
        /// Per serving
        #[arg(long)]
        calories: Option<f64>,
        #[arg(long, default_value = "0")]
        protein: f64,
        #[arg(long, default_value = "0")]
        carbs: f64,
        #[arg(long, default_value = "0")]
        fat: f64,
    },
    /// List meals for a day (default: today)
    List {
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Every meal, not just one day
        #[arg(long, conflicts_with = "date")]
        all: bool,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Delete a meal after confirmation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
enum FoodAction {
    /// Search once, or read queries from stdin with --interactive
    Search {
        query: Option<String>,
        #[arg(long, short)]
        interactive: bool,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Nutrition for a food's first serving
    Show {
        id: String,
        /// Number of servings
        #[arg(long, default_value = "1")]
        quantity: f64,
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum InsightsAction {
    /// Totals, daily breakdown and recommendations
    Analysis {
        /// today, week (default) or month
        #[arg(long, default_value = "week")]
        period: String,
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Classify the diet from logged meals
    Classify {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Compare eating patterns with other users
    Cluster {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Predict calorie intake for the coming days
    Forecast {
        /// Default from config: features.forecast_days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum ProfileAction {
    /// Show the saved profile and its targets
    Show {
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Validate and save the profile; --preview only calculates targets
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        gender: String,
        /// cm
        #[arg(long)]
        height: String,
        /// kg
        #[arg(long)]
        weight: String,
        #[arg(long, default_value = "moderate")]
        activity: String,
        /// e.g. lose_weight, maintain, gain_muscle
        #[arg(long, default_value = "maintain")]
        goal: String,
        #[arg(long)]
        target_weight: Option<String>,
        #[arg(long)]
        diet: Option<String>,
        /// kg per week, negative to lose
        #[arg(long, allow_hyphen_values = true)]
        weekly_goal: Option<String>,
        #[arg(long)]
        health: Option<String>,
        #[arg(long)]
        preview: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `config set api.host localhost`
    Set { key: String, value: String },
    /// Overwrite the config file with defaults
    Reset,
    /// Print the config file path
    Path,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
            ConfigAction::Path => cli::run_config_path(),
        },
        Commands::Goals {
            age,
            gender,
            height,
            weight,
            activity,
            weekly_goal,
            format,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_goals(age, &gender, height, weight, &activity, weekly_goal, fmt)
        }
        Commands::Register {
            name,
            email,
            password,
        } => cli::run_register(&ctx()?, &name, &email, password),
        Commands::Login { email, password } => cli::run_login(&ctx()?, &email, password),
        Commands::Logout => cli::run_logout(&ctx()?),
        Commands::Whoami { format } => {
            cli::run_whoami(&ctx()?, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Dashboard { format, html } => cli::run_dashboard(
            &ctx()?,
            OutputFormat::from_str_opt(Some(&format)),
            html.as_deref(),
        ),
        Commands::Meal { action } => match action {
            MealAction::Add {
                meal_type,
                food_id,
                name,
                quantity,
                calories,
                protein,
                carbs,
                fat,
            } => cli::run_meal_add(
                &ctx()?,
                &MealAddArgs {
                    meal_type,
                    food_id,
                    food_name: name,
                    quantity,
                    calories,
                    protein,
                    carbs,
                    fat,
                },
            ),
            MealAction::List { date, all, format } => {
                let date = date
                    .map(|d| {
                        NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                            .with_context(|| format!("invalid date '{d}', expected YYYY-MM-DD"))
                    })
                    .transpose()?;
                cli::run_meal_list(&ctx()?, date, all, OutputFormat::from_str_opt(Some(&format)))
            }
            MealAction::Delete { id, yes } => cli::run_meal_delete(&ctx()?, &id, yes),
        },
        Commands::Food { action } => match action {
            FoodAction::Search {
                query,
                interactive,
                format,
            } => match (interactive, query) {
                (true, _) => cli::run_food_interactive(&ctx()?),
                (false, Some(q)) => {
                    cli::run_food_search(&ctx()?, &q, OutputFormat::from_str_opt(Some(&format)))
                }
                (false, None) => anyhow::bail!("Pass a query, or --interactive"),
            },
            FoodAction::Show {
                id,
                quantity,
                format,
            } => cli::run_food_show(&ctx()?, &id, quantity, OutputFormat::from_str_opt(Some(&format))),
        },
        Commands::Insights { action } => match action {
            InsightsAction::Analysis { period, format } => {
                let period = Period::parse(&period)
                    .with_context(|| format!("invalid period '{period}', expected today, week or month"))?;
                cli::run_insights_analysis(&ctx()?, period, OutputFormat::from_str_opt(Some(&format)))
            }
            InsightsAction::Classify { format } => {
                cli::run_insights_classify(&ctx()?, OutputFormat::from_str_opt(Some(&format)))
            }
            InsightsAction::Cluster { format } => {
                cli::run_insights_cluster(&ctx()?, OutputFormat::from_str_opt(Some(&format)))
            }
            InsightsAction::Forecast { days, format } => {
                cli::run_insights_forecast(&ctx()?, days, OutputFormat::from_str_opt(Some(&format)))
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show { format } => {
                cli::run_profile_show(&ctx()?, OutputFormat::from_str_opt(Some(&format)))
            }
            ProfileAction::Save {
                name,
                age,
                gender,
                height,
                weight,
                activity,
                goal,
                target_weight,
                diet,
                weekly_goal,
                health,
                preview,
            } => {
                let form = ProfileForm {
                    full_name: name,
                    age,
                    gender,
                    height,
                    weight,
                    activity_level: activity,
                    primary_goal: goal,
                    target_weight: target_weight.unwrap_or_default(),
                    diet_preference: diet.unwrap_or_default(),
                    weekly_goal: weekly_goal.unwrap_or_default(),
                    health_conditions: health.unwrap_or_default(),
                };
                cli::run_profile_save(&ctx()?, &form, preview)
            }
        },
        Commands::Activity { days, format } => {
            cli::run_activity(&ctx()?, days, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Serve { addr, no_open } => cli::run_serve(ctx()?, addr.as_deref(), no_open),
    }
}

/// Config, session and client for commands that talk to the backend.
fn ctx() -> Result<Context> {
    Context::load()
}
