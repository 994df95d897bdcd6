//! Login, registration, profile and delete-confirmation forms.

use crate::api::types::Meal;
use crate::auth::MIN_PASSWORD_LEN;
use crate::goals::{ActivityLevel, MacroGoals, ProfileForm};

use super::{Notice, escape_html, fmt_1, fmt_int, notice_html};

pub fn login_form(email: &str, notice: Option<&Notice>) -> String {
    format!(
        r#"<section class="card narrow">
<h2>Log in</h2>
{notice}
<form method="post" action="/login">
<label>Email <input type="email" name="email" value="{email}" required autofocus></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p class="muted">No account? <a href="/register">Register</a></p>
</section>"#,
        notice = notice_html(notice),
        email = escape_html(email),
    )
}

pub fn register_form(name: &str, email: &str, notice: Option<&Notice>) -> String {
    format!(
        r#"<section class="card narrow">
<h2>Create an account</h2>
{notice}
<form method="post" action="/register">
<label>Name <input type="text" name="name" value="{name}" required autofocus></label>
<label>Email <input type="email" name="email" value="{email}" required></label>
<label>Password <input type="password" name="password" minlength="{min}" required></label>
<label>Confirm password <input type="password" name="confirm_password" minlength="{min}" required></label>
<button type="submit">Register</button>
</form>
<p class="muted">Already registered? <a href="/login">Log in</a></p>
</section>"#,
        notice = notice_html(notice),
        name = escape_html(name),
        email = escape_html(email),
        min = MIN_PASSWORD_LEN,
    )
}

fn select(name: &str, current: &str, options: &[(&str, &str)]) -> String {
    let mut html = format!(r#"<select name="{name}">"#);
    for (value, label) in options {
        let selected = if current.eq_ignore_ascii_case(value) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            r#"<option value="{value}"{selected}>{label}</option>"#
        ));
    }
    html.push_str("</select>");
    html
}

/// Profile form with the calculated targets alongside.
pub fn profile_form(form: &ProfileForm, goals: Option<&MacroGoals>, notice: Option<&Notice>) -> String {
    let activity: Vec<(&str, &str)> = ActivityLevel::ALL
        .iter()
        .map(|level| {
            let label = match level {
                ActivityLevel::Sedentary => "Sedentary",
                ActivityLevel::Light => "Lightly active",
                ActivityLevel::Moderate => "Moderately active",
                ActivityLevel::Active => "Active",
                ActivityLevel::VeryActive => "Very active",
            };
            (level.as_str(), label)
        })
        .collect();

    let field = |label: &str, name: &str, value: &str, kind: &str| {
        format!(
            r#"<label>{label} <input type="{kind}" name="{name}" value="{}" step="any"></label>"#,
            escape_html(value)
        )
    };

    let goals_html = match goals {
        Some(g) => goals_card(g),
        None => r#"<p class="muted">Fill in the form and press Preview to see your daily targets.</p>"#
            .to_string(),
    };

    format!(
        r#"<h2>Profile &amp; goals</h2>
{notice}
<div class="grid">
<section class="card">
<form method="post" action="/profile" class="profile-form">
{full_name}
{age}
<label>Gender {gender}</label>
{height}
{weight}
<label>Activity {activity}</label>
<label>Primary goal {goal}</label>
{target}
{weekly}
<label>Diet preference {diet}</label>
<label>Health conditions <textarea name="health_conditions">{health}</textarea></label>
<div class="actions">
<button type="submit" name="action" value="preview" class="secondary">Preview</button>
<button type="submit" name="action" value="save">Save</button>
</div>
</form>
</section>
<section class="card">
<h3>Daily targets</h3>
{goals_html}
</section>
</div>"#,
        notice = notice_html(notice),
        full_name = field("Full name", "full_name", &form.full_name, "text"),
        age = field("Age", "age", &form.age, "number"),
        gender = select(
            "gender",
            &form.gender,
            &[("male", "Male"), ("female", "Female"), ("other", "Other")]
        ),
        height = field("Height (cm)", "height", &form.height, "number"),
        weight = field("Weight (kg)", "weight", &form.weight, "number"),
        activity = select("activity_level", &form.activity_level, &activity),
        goal = select(
            "primary_goal",
            &form.primary_goal,
            &[
                ("lose", "Lose weight"),
                ("maintain", "Maintain weight"),
                ("gain", "Gain weight"),
                ("muscle", "Build muscle"),
            ]
        ),
        target = field("Target weight (kg)", "target_weight", &form.target_weight, "number"),
        weekly = field("Weekly change (kg)", "weekly_goal", &form.weekly_goal, "number"),
        diet = select(
            "diet_preference",
            &form.diet_preference,
            &[
                ("", "No preference"),
                ("balanced", "Balanced"),
                ("vegetarian", "Vegetarian"),
                ("vegan", "Vegan"),
                ("keto", "Keto"),
                ("paleo", "Paleo"),
            ]
        ),
        health = escape_html(&form.health_conditions),
    )
}

pub fn goals_card(g: &MacroGoals) -> String {
    format!(
        r#"<dl class="goals">
<dt>BMR</dt><dd>{bmr} kcal</dd>
<dt>TDEE</dt><dd>{tdee} kcal</dd>
<dt>Daily calories</dt><dd><b>{cal} kcal</b></dd>
<dt>Protein</dt><dd>{p} g</dd>
<dt>Carbs</dt><dd>{c} g</dd>
<dt>Fat</dt><dd>{f} g</dd>
</dl>"#,
        bmr = fmt_int(g.bmr),
        tdee = fmt_int(g.tdee),
        cal = fmt_int(g.daily_calories),
        p = fmt_int(g.daily_protein),
        c = fmt_int(g.daily_carbs),
        f = fmt_int(g.daily_fat),
    )
}

/// Confirmation step before a delete. `meal` is the matching entry from
/// today's list when it could be found.
pub fn confirm_delete(meal_id: &str, meal: Option<&Meal>) -> String {
    let what = match meal {
        Some(m) => format!(
            "{} ({}, {} kcal)",
            escape_html(&m.food_name),
            escape_html(&m.meal_type),
            fmt_1(m.calories)
        ),
        None => "this meal".to_string(),
    };
    format!(
        r#"<section class="card narrow">
<h2>Delete meal?</h2>
<p>Are you sure you want to delete {what}?</p>
<form method="post" action="/meals/delete">
<input type="hidden" name="id" value="{id}">
<button type="submit" class="danger">Delete</button>
<a href="/" class="button secondary">Cancel</a>
</form>
</section>"#,
        id = escape_html(meal_id),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_keeps_escaped_email() {
        let html = login_form(r#"a"b@c.de"#, Some(&Notice::error("Invalid email or password")));
        assert!(html.contains(r#"value="a&quot;b@c.de""#));
        assert!(html.contains("Invalid email or password"));
    }

    #[test]
    fn register_form_enforces_min_length() {
        assert!(register_form("", "", None).contains(r#"minlength="6""#));
    }

    #[test]
    fn profile_form_marks_selected_options() {
        let form = ProfileForm {
            gender: "female".into(),
            activity_level: "very_active".into(),
            primary_goal: "lose".into(),
            ..ProfileForm::default()
        };
        let html = profile_form(&form, None, None);
        assert!(html.contains(r#"<option value="female" selected>"#));
        assert!(html.contains(r#"<option value="very_active" selected>"#));
        assert!(html.contains(r#"<option value="lose" selected>"#));
        assert!(html.contains("press Preview"));
    }

    #[test]
    fn profile_form_shows_goals() {
        let goals = MacroGoals {
            bmr: 1780.0,
            tdee: 2759.0,
            daily_calories: 2759.0,
            daily_protein: 172.0,
            daily_carbs: 310.0,
            daily_fat: 92.0,
        };
        let html = profile_form(&ProfileForm::default(), Some(&goals), None);
        assert!(html.contains("<b>2,759 kcal</b>"));
        assert!(html.contains("172 g"));
    }

    #[test]
    fn confirm_delete_names_meal() {
        let meal = Meal {
            id: "m1".into(),
            food_name: "Toast".into(),
            meal_type: "breakfast".into(),
            calories: 150.0,
            ..Meal::default()
        };
        let html = confirm_delete("m1", Some(&meal));
        assert!(html.contains("Toast (breakfast, 150 kcal)"));
        assert!(html.contains(r#"name="id" value="m1""#));
        assert!(confirm_delete("zz", None).contains("this meal"));
    }
}
