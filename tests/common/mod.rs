//! In-process fake of the nutrition backend.
//!
//! Serves canned JSON per `METHOD /path` on an ephemeral port and records
//! every request it sees, so tests can assert on what the client sent and
//! in what order.

#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use nutriboard::api::ApiClient;
use nutriboard::session::{Session, UserPreferences};
use nutriboard::storage::MemoryStorage;
use serde_json::Value;
use tiny_http::{Header, Response, Server};

/// One request as the backend received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path without the query string.
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    /// `"GET /meals/stats"`
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Canned answer for one `METHOD /path`.
#[derive(Debug, Clone)]
pub struct Route {
    method: String,
    path: String,
    status: u16,
    body: String,
}

pub fn route(method: &str, path: &str, status: u16, body: Value) -> Route {
    Route {
        method: method.to_string(),
        path: path.to_string(),
        status,
        body: body.to_string(),
    }
}

pub struct MockBackend {
    pub base_url: String,
    server: Arc<Server>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    handle: Option<JoinHandle<()>>,
}

impl MockBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock backend"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock backend has an IP address")
            .port();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            std::thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let url = request.url().to_string();
                    let (path, query) = match url.split_once('?') {
                        Some((p, q)) => (p.to_string(), q.to_string()),
                        None => (url.clone(), String::new()),
                    };
                    let method = request.method().to_string();
                    let authorization = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);

                    requests.lock().unwrap().push(Recorded {
                        method: method.clone(),
                        path: path.clone(),
                        query,
                        authorization,
                        body,
                    });

                    let (status, body) = routes
                        .iter()
                        .find(|r| r.method == method && r.path == path)
                        .map(|r| (r.status, r.body.clone()))
                        .unwrap_or((404, r#"{"error":"Not found"}"#.to_string()));
                    let header =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                    let response = Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            server,
            requests,
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Every request as `"METHOD /path"`, in arrival order.
    pub fn lines(&self) -> Vec<String> {
        self.requests().iter().map(Recorded::line).collect()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// A client for this backend over `session`.
    pub fn client(&self, session: Session) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5), session)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn empty_session() -> Session {
    Session::new(Arc::new(MemoryStorage::new()))
}

/// A session that already holds a token and cached preferences.
pub fn logged_in_session() -> Session {
    let session = empty_session();
    session
        .store_login(
            "test-token",
            UserPreferences::new(Some("Ada".into()), "ada@example.com"),
        )
        .unwrap();
    session
}

pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
