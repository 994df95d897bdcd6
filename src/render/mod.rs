//! HTML rendering for the local web dashboard.
//!
//! Everything is built with `format!` into strings; there is no template
//! engine. Every value that came from the user or the backend goes through
//! [`escape_html`] before it is interpolated.

pub mod chart;
pub mod dashboard;
pub mod forms;
pub mod insights;

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Flash message shown above a panel or form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn to_html(&self) -> String {
        let class = match self.kind {
            NoticeKind::Success => "notice success",
            NoticeKind::Error => "notice error",
            NoticeKind::Info => "notice info",
        };
        format!(
            r#"<div class="{class}" role="status">{}</div>"#,
            escape_html(&self.text)
        )
    }
}

pub(crate) fn notice_html(notice: Option<&Notice>) -> String {
    notice.map(Notice::to_html).unwrap_or_default()
}

/// Signed-in identity for the page header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewer<'a> {
    pub name: Option<&'a str>,
    pub debug: bool,
    pub api_base_url: &'a str,
}

/// Wrap a body in the common page shell.
pub fn page(title: &str, viewer: &Viewer<'_>, body: &str) -> String {
    let nav = match viewer.name {
        Some(name) => format!(
            r#"<nav>
  <a href="/">Dashboard</a>
  <a href="/insights/analysis">Analysis</a>
  <a href="/insights/classification">Diet type</a>
  <a href="/insights/clusters">Eating pattern</a>
  <a href="/insights/forecast">Forecast</a>
  <a href="/profile">Profile</a>
  <span class="who">{}</span>
  <form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>
</nav>"#,
            escape_html(name)
        ),
        None => r#"<nav><a href="/login">Log in</a> <a href="/register">Register</a></nav>"#
            .to_string(),
    };

    let debug = if viewer.debug {
        format!(
            r#"<footer class="debug">API: <code>{}</code></footer>"#,
            escape_html(viewer.api_base_url)
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · nutriboard</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<header><h1><a href="/">nutri<span class="logo">board</span></a></h1>
{nav}
</header>
<main>
{body}
</main>
{debug}
<script src="/static/app.js"></script>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Page for an unknown route.
pub fn not_found_page(path: &str, viewer: &Viewer<'_>) -> String {
    page(
        "Not found",
        viewer,
        &format!(
            r#"<section class="card"><h2>Not found</h2><p>No page at <code>{}</code>.</p><p><a href="/">Back to the dashboard</a></p></section>"#,
            escape_html(path)
        ),
    )
}

/// Page for a failure that has no better home.
pub fn error_page(message: &str, viewer: &Viewer<'_>) -> String {
    page(
        "Error",
        viewer,
        &format!(
            r#"<section class="card">{}<p><a href="/">Back to the dashboard</a></p></section>"#,
            Notice::error(message).to_html()
        ),
    )
}

/// Whole number with thousands separators (`1,234`).
pub fn fmt_int(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        format!("-{out}")
    } else {
        out
    }
}

/// One decimal, trailing `.0` dropped (`12.5`, `3`).
pub fn fmt_1(value: f64) -> String {
    let v = (value * 10.0).round() / 10.0;
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}
