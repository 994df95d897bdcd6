//! Inline SVG charts and the handles that own them.
//!
//! There are two chart slots on the dashboard: the macro split and the
//! calorie forecast. Mounting a chart into a slot always destroys whatever
//! was there first, so a slot never holds more than one live chart.

use std::fmt::Write as _;

use crate::api::types::{ForecastDay, HistoricalPoint, MacroDistribution};

use super::{escape_html, fmt_1, fmt_int};

const PROTEIN_COLOR: &str = "#3fb950";
const CARBS_COLOR: &str = "#58a6ff";
const FAT_COLOR: &str = "#d29922";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Macros,
    Forecast,
}

impl ChartKind {
    /// DOM id of the element the chart is drawn into.
    pub fn canvas_id(self) -> &'static str {
        match self {
            Self::Macros => "macros-chart",
            Self::Forecast => "forecast-chart",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// Percent of calories from protein, carbs and fat.
    Macros(MacroDistribution),
    /// Past daily calories followed by the predicted days with their range.
    Forecast {
        historical: Vec<HistoricalPoint>,
        forecast: Vec<ForecastDay>,
    },
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self {
            Self::Macros(_) => ChartKind::Macros,
            Self::Forecast { .. } => ChartKind::Forecast,
        }
    }

    pub fn to_svg(&self) -> String {
        match self {
            Self::Macros(split) => macros_svg(split),
            Self::Forecast {
                historical,
                forecast,
            } => forecast_svg(historical, forecast),
        }
    }
}

/// A mounted chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub id: u64,
    pub chart: Chart,
}

impl ChartHandle {
    pub fn canvas_id(&self) -> &'static str {
        self.chart.kind().canvas_id()
    }

    /// The chart wrapped in its slot element.
    pub fn to_html(&self) -> String {
        format!(
            r#"<figure id="{}" class="chart" data-chart-id="{}">{}</figure>"#,
            self.canvas_id(),
            self.id,
            self.chart.to_svg()
        )
    }
}

/// Owner of the two chart slots.
#[derive(Debug, Default)]
pub struct ChartHandles {
    macros: Option<ChartHandle>,
    forecast: Option<ChartHandle>,
    next_id: u64,
    destroyed: u64,
}

impl ChartHandles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the chart in `chart`'s slot (if any), then mount `chart`.
    pub fn mount(&mut self, chart: Chart) -> &ChartHandle {
        let kind = chart.kind();
        self.destroy(kind);
        self.next_id += 1;
        let handle = ChartHandle {
            id: self.next_id,
            chart,
        };
        self.slot_mut(kind).insert(handle)
    }

    /// Remove the chart in one slot. Returns whether one was there.
    pub fn destroy(&mut self, kind: ChartKind) -> bool {
        let had = self.slot_mut(kind).take().is_some();
        if had {
            self.destroyed += 1;
        }
        had
    }

    pub fn current(&self, kind: ChartKind) -> Option<&ChartHandle> {
        match kind {
            ChartKind::Macros => self.macros.as_ref(),
            ChartKind::Forecast => self.forecast.as_ref(),
        }
    }

    /// Destroy both charts (logout).
    pub fn clear(&mut self) {
        self.destroy(ChartKind::Macros);
        self.destroy(ChartKind::Forecast);
    }

    /// How many charts have been torn down so far.
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    pub fn live(&self) -> usize {
        usize::from(self.macros.is_some()) + usize::from(self.forecast.is_some())
    }

    fn slot_mut(&mut self, kind: ChartKind) -> &mut Option<ChartHandle> {
        match kind {
            ChartKind::Macros => &mut self.macros,
            ChartKind::Forecast => &mut self.forecast,
        }
    }
}

// ---------------------------------------------------------------------------
// SVG
// ---------------------------------------------------------------------------

fn macros_svg(split: &MacroDistribution) -> String {
    const WIDTH: f64 = 320.0;
    let total = split.protein + split.carbs + split.fat;
    if total <= 0.0 {
        return r#"<svg class="macros" viewBox="0 0 320 40" role="img" aria-label="No macro data"><text x="0" y="24">No meals logged</text></svg>"#.to_string();
    }

    let parts = [
        ("Protein", split.protein, PROTEIN_COLOR),
        ("Carbs", split.carbs, CARBS_COLOR),
        ("Fat", split.fat, FAT_COLOR),
    ];

    let mut svg = String::from(
        r#"<svg class="macros" viewBox="0 0 320 56" role="img" aria-label="Macro split">"#,
    );
    let mut x = 0.0;
    for (label, pct, color) in parts {
        let w = pct / total * WIDTH;
        if w > 0.0 {
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="0" width="{w:.1}" height="20" fill="{color}"><title>{label} {}%</title></rect>"#,
                fmt_1(pct)
            );
        }
        x += w;
    }
    for (i, (label, pct, color)) in parts.iter().enumerate() {
        let lx = i as f64 * 108.0;
        let _ = write!(
            svg,
            r#"<rect x="{lx}" y="34" width="10" height="10" fill="{color}"/><text x="{}" y="44">{label} {}%</text>"#,
            lx + 14.0,
            fmt_1(*pct)
        );
    }
    svg.push_str("</svg>");
    svg
}

fn forecast_svg(historical: &[HistoricalPoint], forecast: &[ForecastDay]) -> String {
    const W: f64 = 600.0;
    const H: f64 = 220.0;
    const PAD: f64 = 32.0;

    let n = historical.len() + forecast.len();
    if n == 0 {
        return r#"<svg class="forecast" viewBox="0 0 600 40" role="img" aria-label="No forecast data"><text x="0" y="24">No forecast yet</text></svg>"#.to_string();
    }

    let values = historical
        .iter()
        .map(|p| p.calories)
        .chain(forecast.iter().flat_map(|d| {
            [d.predicted_calories, d.range.lower, d.range.upper]
        }));
    let (lo, hi) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let lo = lo.min(0.0);
    let span = (hi - lo).max(1.0);

    let step = if n > 1 { (W - 2.0 * PAD) / (n - 1) as f64 } else { 0.0 };
    let px = |i: usize| PAD + i as f64 * step;
    let py = |v: f64| H - PAD - (v - lo) / span * (H - 2.0 * PAD);

    let mut svg = format!(
        r#"<svg class="forecast" viewBox="0 0 {W} {H}" role="img" aria-label="Calorie forecast">"#
    );
    let _ = write!(
        svg,
        r#"<line x1="{PAD}" y1="{y0:.1}" x2="{x1}" y2="{y0:.1}" class="axis"/><text x="2" y="{ty:.1}" class="tick">{}</text><text x="2" y="{PAD}" class="tick">{}</text>"#,
        fmt_int(lo),
        fmt_int(hi),
        y0 = py(lo),
        x1 = W - PAD,
        ty = py(lo) + 4.0,
    );

    let offset = historical.len();
    if !forecast.is_empty() {
        // Confidence band: upper edge left to right, lower edge back.
        let mut band: Vec<String> = forecast
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{:.1},{:.1}", px(offset + i), py(d.range.upper)))
            .collect();
        band.extend(
            forecast
                .iter()
                .enumerate()
                .rev()
                .map(|(i, d)| format!("{:.1},{:.1}", px(offset + i), py(d.range.lower))),
        );
        let _ = write!(svg, r#"<polygon class="band" points="{}"/>"#, band.join(" "));
    }

    if !historical.is_empty() {
        let points: Vec<String> = historical
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:.1},{:.1}", px(i), py(p.calories)))
            .collect();
        let _ = write!(svg, r#"<polyline class="history" points="{}"/>"#, points.join(" "));
    }

    if !forecast.is_empty() {
        // Join the predicted line to the last real day.
        let mut points: Vec<String> = historical
            .last()
            .map(|p| format!("{:.1},{:.1}", px(offset - 1), py(p.calories)))
            .into_iter()
            .collect();
        points.extend(
            forecast
                .iter()
                .enumerate()
                .map(|(i, d)| format!("{:.1},{:.1}", px(offset + i), py(d.predicted_calories))),
        );
        let _ = write!(svg, r#"<polyline class="predicted" points="{}"/>"#, points.join(" "));

        for (i, d) in forecast.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<circle cx="{:.1}" cy="{:.1}" r="3" class="predicted-dot"><title>{} {}: {} kcal</title></circle>"#,
                px(offset + i),
                py(d.predicted_calories),
                escape_html(&d.day_name),
                escape_html(&d.date),
                fmt_int(d.predicted_calories)
            );
        }
    }

    svg.push_str("</svg>");
    svg
}
