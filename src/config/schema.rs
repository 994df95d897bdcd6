/// Configuration schema and defaults for nutriboard.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[features]`, `[search]`, `[goals]`, `[web]` and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level nutriboard configuration.
///
/// Maps directly to the `~/.nutriboard/config.toml` and `.nutriboard.toml`
/// file schemas. All sections and fields are optional; missing values fall
/// back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NutriboardConfig {
    pub api: ApiConfig,
    pub features: FeaturesConfig,
    pub search: SearchConfig,
    pub goals: GoalsConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Backend API location and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Hostname the CLI pretends to be served from. Fed to the resolver the
    /// same way the web dashboard feeds it the request `Host` header.
    pub host: String,
    /// Explicit API base URL. When non-empty it wins over host resolution.
    pub base_url: String,
    /// Base URL used for local hosts (`localhost`, `127.0.0.1`, `*.local`).
    pub local_url: String,
    /// Base URL used for every other host. Empty means same-origin
    /// `https://{host}/api`.
    pub production_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            base_url: String::new(),
            local_url: "http://localhost:5000".to_string(),
            production_url: String::new(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [features]
// ---------------------------------------------------------------------------

/// Feature flags. `debug` is also switched on for local hosts by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Show the AI panels (classification, clustering, forecasting).
    pub ai_insights: bool,
    /// Number of days the intake forecast asks for.
    pub forecast_days: u32,
    /// Verbose diagnostics in rendered pages and CLI output.
    pub debug: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            ai_insights: true,
            forecast_days: 7,
            debug: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [search]
// ---------------------------------------------------------------------------

/// Food search behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet interval before a typed query is sent (milliseconds).
    pub debounce_ms: u64,
    /// Queries shorter than this (after trimming) are not sent.
    pub min_query_chars: usize,
    /// Maximum number of results shown.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_chars: 2,
            max_results: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// [goals]
// ---------------------------------------------------------------------------

/// Goal defaults used when the user has no saved profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalsConfig {
    /// Daily calorie goal shown on the dashboard without a profile.
    pub default_calorie_goal: f64,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            default_calorie_goal: 2000.0,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Local web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `nutriboard serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
    /// Extra non-local hostnames the dashboard answers to. Requests naming
    /// any other host are refused before a client is built.
    pub allowed_hosts: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8787".to_string(),
            open_browser: true,
            allowed_hosts: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// API activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether API requests are recorded.
    pub enabled: bool,
    /// Path to the activity log file. `~` is expanded to the home directory.
    pub path: String,
    /// Entries older than this many days are dropped when a logger starts.
    /// `0` keeps everything.
    pub retention_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.nutriboard/activity.jsonl".to_string(),
            retention_days: 30,
        }
    }
}

impl LoggingConfig {
    /// Resolve the configured log path, expanding a leading `~`.
    pub fn resolved_path(&self) -> Option<std::path::PathBuf> {
        if let Some(rest) = self.path.strip_prefix("~/") {
            dirs::home_dir().map(|home| home.join(rest))
        } else if self.path.is_empty() {
            None
        } else {
            Some(std::path::PathBuf::from(&self.path))
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML
// ---------------------------------------------------------------------------

impl NutriboardConfig {
    /// Annotated default config written by `nutriboard config init`.
    pub fn default_toml() -> String {
        r#"# nutriboard Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (NUTRIBOARD_*)
#   2. Project config (.nutriboard.toml in current directory)
#   3. User global config (~/.nutriboard/config.toml)
#   4. Built-in defaults

[api]
host = "localhost"                     # Hostname fed to the API resolver
base_url = ""                          # Explicit API URL (wins over host resolution)
local_url = "http://localhost:5000"    # Used for localhost / 127.0.0.1 / *.local
production_url = ""                    # Empty -> https://{host}/api
timeout_ms = 15000

[features]
ai_insights = true                     # Classification, clustering, forecasting panels
forecast_days = 7
debug = false

[search]
debounce_ms = 300
min_query_chars = 2
max_results = 10

[goals]
default_calorie_goal = 2000.0          # Used until a profile is saved

[web]
addr = "127.0.0.1:8787"
open_browser = true
allowed_hosts = []                     # Non-local hostnames served besides api.host

[logging]
enabled = true
path = "~/.nutriboard/activity.jsonl"
retention_days = 30                    # 0 keeps the whole log
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = NutriboardConfig::default();
        assert_eq!(config.api.host, "localhost");
        assert!(config.api.base_url.is_empty());
        assert_eq!(config.api.timeout_ms, 15_000);
        assert!(config.features.ai_insights);
        assert_eq!(config.features.forecast_days, 7);
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.goals.default_calorie_goal, 2000.0);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let toml_str = r#"
[search]
debounce_ms = 500
"#;
        let config: NutriboardConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.search.min_query_chars, 2);
        assert_eq!(config.api.local_url, "http://localhost:5000");
    }

    #[test]
    fn default_toml_parses_back() {
        let toml_str = NutriboardConfig::default_toml();
        let config: NutriboardConfig = toml::from_str(&toml_str).unwrap();
        assert!(config.logging.enabled);
        assert_eq!(config.web.addr, "127.0.0.1:8787");
        assert!(config.web.allowed_hosts.is_empty());
    }

    #[test]
    fn logging_path_expands_home() {
        let config = LoggingConfig::default();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                config.resolved_path(),
                Some(home.join(".nutriboard/activity.jsonl"))
            );
        }
    }

    #[test]
    fn logging_path_empty_is_none() {
        let config = LoggingConfig {
            enabled: true,
            path: String::new(),
            retention_days: 0,
        };
        assert_eq!(config.resolved_path(), None);
    }
}
