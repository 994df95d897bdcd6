//! Local web dashboard.
//!
//! A small synchronous HTTP server (`tiny_http`) that renders the dashboard
//! as server-side HTML. Each request's `Host` header goes through the config
//! resolver, so opening the dashboard as `localhost` talks to the local
//! backend while a deployed hostname talks to production. Hosts that are
//! neither local nor configured get a 400 and never reach the API client.
//!
//! Launched via `nutriboard serve` (default: `http://127.0.0.1:8787`).

mod frontend;
mod pages;

use std::collections::HashMap;
use std::io::Cursor;
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::activity::ActivityLogger;
use crate::api::ApiClient;
use crate::config::NutriboardConfig;
use crate::config::resolve::{self, ResolvedEnv};
use crate::food::NutritionPreview;
use crate::render::Notice;
use crate::render::chart::ChartHandles;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// The parts of an HTTP request the handlers look at.
#[derive(Debug, Clone)]
pub struct WebRequest {
    pub method: Method,
    /// Path plus query string.
    pub url: String,
    /// `Host` header, when sent.
    pub host: Option<String>,
    pub body: Option<String>,
}

impl WebRequest {
    pub fn get(url: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.to_string(),
            host: None,
            body: None,
        }
    }

    pub fn post(url: &str, body: &str) -> Self {
        Self {
            method: Method::Post,
            url: url.to_string(),
            host: None,
            body: Some(body.to_string()),
        }
    }

    pub fn with_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn query(&self) -> HashMap<String, String> {
        self.url
            .split_once('?')
            .map(|(_, q)| parse_form(q))
            .unwrap_or_default()
    }

    pub fn form(&self) -> HashMap<String, String> {
        self.body.as_deref().map(parse_form).unwrap_or_default()
    }
}

/// A rendered response, before it is turned into a `tiny_http` one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Set for redirects.
    pub location: Option<String>,
}

impl Page {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
            location: None,
        }
    }

    pub fn asset(content_type: &'static str, body: &str) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.to_string(),
            location: None,
        }
    }

    /// `303 See Other`, so a POST is followed by a GET.
    pub fn redirect(to: &str) -> Self {
        Self {
            status: 303,
            content_type: "text/plain; charset=utf-8",
            body: String::new(),
            location: Some(to.to_string()),
        }
    }

    pub fn plain(status: u16, text: &str) -> Self {
        Self::asset("text/plain; charset=utf-8", text).with_status(status)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut resp =
            Response::from_data(self.body.into_bytes()).with_status_code(StatusCode(self.status));
        if let Some(h) = header("Content-Type", self.content_type) {
            resp = resp.with_header(h);
        }
        if let Some(h) = self.location.as_deref().and_then(|l| header("Location", l)) {
            resp = resp.with_header(h);
        }
        resp
    }
}

/// Decode `application/x-www-form-urlencoded` pairs. Later keys win.
pub fn parse_form(input: &str) -> HashMap<String, String> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// Dashboard state shared by every request to this server.
#[derive(Debug, Default)]
pub struct WebState {
    pub charts: ChartHandles,
    /// Food picked from search, kept until a meal is added or the preview
    /// is closed.
    pub selected_food: Option<NutritionPreview>,
    /// Shown once on the next rendered page.
    pub flash: Option<Notice>,
}

/// The dashboard application behind the HTTP loop.
#[derive(Debug)]
pub struct WebApp {
    config: NutriboardConfig,
    session: Session,
    activity: ActivityLogger,
    state: WebState,
}

impl WebApp {
    pub fn new(config: NutriboardConfig, session: Session, activity: ActivityLogger) -> Self {
        Self {
            config,
            session,
            activity,
            state: WebState::default(),
        }
    }

    pub fn state(&self) -> &WebState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve the environment for a request's host. Falls back to the
    /// configured `api.host` when the header is missing.
    pub fn environment(&self, host: Option<&str>) -> ResolvedEnv {
        let host = host.unwrap_or(&self.config.api.host);
        resolve::resolve(host, &self.config)
    }

    fn client(&self, env: &ResolvedEnv) -> ApiClient {
        ApiClient::new(
            &env.api_base_url,
            Duration::from_millis(self.config.api.timeout_ms),
            self.session.clone(),
        )
        .with_activity(self.activity.clone())
    }

    /// Route one request.
    pub fn handle(&mut self, request: &WebRequest) -> Page {
        if let Some(host) = request.host.as_deref()
            && !resolve::is_allowed_host(host, &self.config)
        {
            return Page::plain(400, &format!("Unrecognized host: {host}"));
        }
        let env = self.environment(request.host.as_deref());
        let client = self.client(&env);
        let mut ctx = pages::Ctx {
            config: &self.config,
            env: &env,
            client: &client,
            state: &mut self.state,
        };
        pages::dispatch(&mut ctx, request)
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Run the dashboard server on `addr` until the process is stopped.
///
/// Requests are handled one at a time; a single local user never needs
/// more.
pub fn serve(mut app: WebApp, addr: &str, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let bound = server
        .server_addr()
        .to_ip()
        .map(|a| a.to_string())
        .unwrap_or_else(|| addr.to_string());
    let env = app.environment(None);
    println!("nutriboard dashboard running at http://{bound}");
    println!("API: {} ({})", env.api_base_url, env.environment);
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{bound}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let host = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Host"))
            .map(|h| h.value.as_str().to_string());

        let body = if matches!(method, Method::Post | Method::Put | Method::Patch) {
            let mut buf = String::new();
            request.as_reader().read_to_string(&mut buf).map(|_| Some(buf))
        } else {
            Ok(None)
        };

        let page = match body {
            Ok(body) => app.handle(&WebRequest {
                method: method.clone(),
                url: url.clone(),
                host,
                body,
            }),
            Err(e) => Page::plain(400, &format!("Unreadable request body: {e}")),
        };
        let status = page.status;
        let _ = request.respond(page.into_response());

        println!(
            "{} {} {} {}",
            chrono::Local::now().format("%H:%M:%S"),
            method,
            url,
            status
        );
    }

    Ok(())
}

/// `None` when the value is not valid header text.
fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
