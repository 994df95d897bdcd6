//! Period analysis and AI insight panels.

use std::fmt::Write as _;

use crate::api::types::{
    ClusterAnalysis, DietClassification, Insight, IntakeForecast, NutritionAnalysis,
};
use crate::insights::{DISABLED_NOTICE, Panel, Period};

use super::chart::ChartHandle;
use super::{Notice, escape_html, fmt_1, fmt_int};

fn period_tabs(active: Period) -> String {
    let mut html = String::from(r#"<div class="tabs">"#);
    for period in [Period::Today, Period::Week, Period::Month] {
        let class = if period == active { " class=\"active\"" } else { "" };
        let _ = write!(
            html,
            r#"<a href="/insights/analysis?period={p}"{class}>{p}</a>"#,
            p = period.as_str()
        );
    }
    html.push_str("</div>");
    html
}

fn recommendations(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let list: String = items
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(r)))
        .collect();
    format!(r#"<h4>Recommendations</h4><ul class="recommendations">{list}</ul>"#)
}

fn insight_cards(items: &[Insight]) -> String {
    let mut html = String::from(r#"<div class="insights">"#);
    for insight in items {
        let kind = if insight.kind.is_empty() { "info" } else { insight.kind.as_str() };
        let _ = write!(
            html,
            r#"<div class="insight {kind}"><span class="icon">{icon}</span><div><b>{title}</b><p>{msg}</p></div></div>"#,
            kind = escape_html(kind),
            icon = escape_html(&insight.icon),
            title = escape_html(&insight.title),
            msg = escape_html(&insight.message),
        );
    }
    html.push_str("</div>");
    html
}

/// Panel body for a declined or disabled AI panel; `None` when ready.
fn panel_notice<T>(panel: &Panel<T>) -> Option<String> {
    match panel {
        Panel::Ready(_) => None,
        Panel::Unavailable(message) => Some(Notice::info(message.as_str()).to_html()),
        Panel::Disabled => Some(Notice::info(DISABLED_NOTICE).to_html()),
    }
}

pub fn analysis_panel(
    analysis: &NutritionAnalysis,
    period: Period,
    chart: Option<&ChartHandle>,
) -> String {
    let mut days = String::new();
    for (date, totals) in &analysis.daily_data {
        let _ = write!(
            days,
            r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            escape_html(date),
            fmt_int(totals.calories),
            fmt_1(totals.protein),
            fmt_1(totals.carbs),
            fmt_1(totals.fat),
            totals.meals,
        );
    }
    let table = if days.is_empty() {
        r#"<p class="empty">No meals in this period.</p>"#.to_string()
    } else {
        format!(
            r#"<table><thead><tr><th>Date</th><th>kcal</th><th>P</th><th>C</th><th>F</th><th>Meals</th></tr></thead><tbody>{days}</tbody></table>"#
        )
    };

    format!(
        r#"<section class="card">
<h2>Nutrition analysis</h2>
{tabs}
<div class="stats">
<div class="stat"><span class="label">Total kcal</span><span class="value">{total}</span></div>
<div class="stat"><span class="label">Avg kcal / meal</span><span class="value">{avg}</span></div>
<div class="stat"><span class="label">Meals</span><span class="value">{meals}</span></div>
</div>
{chart}
{table}
{recs}
</section>"#,
        tabs = period_tabs(period),
        total = fmt_int(analysis.total_calories),
        avg = fmt_int(analysis.avg_calories),
        meals = analysis.total_meals,
        chart = chart.map(ChartHandle::to_html).unwrap_or_default(),
        recs = recommendations(&analysis.recommendations),
    )
}

pub fn classification_panel(panel: &Panel<DietClassification>) -> String {
    let body = match (panel_notice(panel), panel.ready()) {
        (Some(notice), _) => notice,
        (None, Some(cls)) => format!(
            r#"<p class="diet-type"><b>{diet}</b> <span class="muted">{conf}% confidence · {meals} meals analysed</span></p>
<p>{desc}</p>
<ul class="macros"><li>Protein {p}%</li><li>Carbs {c}%</li><li>Fat {f}%</li></ul>
{recs}"#,
            diet = escape_html(&cls.diet_type),
            conf = fmt_1(cls.confidence),
            meals = cls.meals_analyzed,
            desc = escape_html(&cls.description),
            p = fmt_1(cls.macro_distribution.protein),
            c = fmt_1(cls.macro_distribution.carbs),
            f = fmt_1(cls.macro_distribution.fat),
            recs = recommendations(&cls.recommendations),
        ),
        (None, None) => String::new(),
    };
    format!(r#"<section class="card"><h2>Diet classification</h2>{body}</section>"#)
}

pub fn cluster_panel(panel: &Panel<ClusterAnalysis>) -> String {
    let body = match (panel_notice(panel), panel.ready()) {
        (Some(notice), _) => notice,
        (None, Some(a)) => {
            let f = &a.features_analyzed;
            format!(
                r#"<p class="cluster" style="border-color:{color}"><span class="icon">{icon}</span> <b>{name}</b></p>
<p>{desc}</p>
<dl class="features">
<dt>Avg kcal / meal</dt><dd>{avg}</dd>
<dt>Protein / carbs / fat</dt><dd>{pr}% / {cr}% / {fr}%</dd>
<dt>Meals per day</dt><dd>{freq}</dd>
<dt>Consistency</dt><dd>{cons}%</dd>
</dl>
<p class="muted">{algo} · {similar} similar users · {meals} meals analysed</p>
{cards}"#,
                color = escape_html(&a.cluster_profile.color),
                icon = escape_html(&a.cluster_profile.icon),
                name = escape_html(&a.cluster_profile.name),
                desc = escape_html(&a.cluster_profile.description),
                avg = fmt_int(f.avg_calories),
                pr = fmt_1(f.protein_ratio),
                cr = fmt_1(f.carbs_ratio),
                fr = fmt_1(f.fat_ratio),
                freq = fmt_1(f.meal_frequency),
                cons = fmt_1(f.calorie_consistency),
                algo = escape_html(&a.algorithm),
                similar = a.similar_users,
                meals = a.meals_analyzed,
                cards = insight_cards(&a.insights),
            )
        }
        (None, None) => String::new(),
    };
    format!(r#"<section class="card"><h2>Eating pattern</h2>{body}</section>"#)
}

pub fn forecast_panel(panel: &Panel<IntakeForecast>, chart: Option<&ChartHandle>) -> String {
    let body = match (panel_notice(panel), panel.ready()) {
        (Some(notice), _) => notice,
        (None, Some(fc)) => {
            let mut rows = String::new();
            for day in &fc.forecasts {
                let _ = write!(
                    rows,
                    r#"<tr><td>{} {}</td><td class="num">{}</td><td class="num">{}–{}</td><td class="num">{}%</td></tr>"#,
                    escape_html(&day.day_name),
                    escape_html(&day.date),
                    fmt_int(day.predicted_calories),
                    fmt_int(day.range.lower),
                    fmt_int(day.range.upper),
                    fmt_1(day.confidence),
                );
            }
            let s = &fc.current_stats;
            format!(
                r#"<div class="stats">
<div class="stat"><span class="label">Daily average</span><span class="value">{avg}</span></div>
<div class="stat"><span class="label">Last 7 days</span><span class="value">{recent}</span></div>
<div class="stat"><span class="label">Trend</span><span class="value">{trend}</span></div>
</div>
{chart}
<table><thead><tr><th>Day</th><th>Predicted kcal</th><th>Range</th><th>Confidence</th></tr></thead><tbody>{rows}</tbody></table>
<p class="muted">{model} · {days} days analysed</p>
{cards}"#,
                avg = fmt_int(s.average_daily_calories),
                recent = fmt_int(s.recent_average),
                trend = escape_html(&s.trend),
                chart = chart.map(ChartHandle::to_html).unwrap_or_default(),
                model = escape_html(&fc.model),
                days = fc.analysis_period.days_analyzed,
                cards = insight_cards(&fc.insights),
            )
        }
        (None, None) => String::new(),
    };
    format!(r#"<section class="card"><h2>Intake forecast</h2>{body}</section>"#)
}
