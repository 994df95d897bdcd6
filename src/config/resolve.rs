//! Hostname → API environment resolution.
//!
//! The dashboard may be opened from `localhost` during development or from a
//! deployed hostname. Both the API base URL and the feature flags follow from
//! that hostname; an explicit `api.base_url` short-circuits the lookup.

use serde::Serialize;

use super::NutriboardConfig;

/// Deployment environment inferred from the hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Feature flags after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub ai_insights: bool,
    pub debug: bool,
    pub forecast_days: u32,
}

/// Result of resolving a hostname against the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnv {
    pub host: String,
    pub environment: Environment,
    /// Base URL with no trailing slash.
    pub api_base_url: String,
    pub flags: FeatureFlags,
}

/// Resolve a hostname (optionally with port) to an API environment.
pub fn resolve(host: &str, config: &NutriboardConfig) -> ResolvedEnv {
    let host = normalize_host(host);
    let environment = if is_local_host(&host) {
        Environment::Development
    } else {
        Environment::Production
    };

    let base = if !config.api.base_url.trim().is_empty() {
        config.api.base_url.trim().to_string()
    } else {
        match environment {
            Environment::Development => config.api.local_url.clone(),
            Environment::Production if !config.api.production_url.trim().is_empty() => {
                config.api.production_url.trim().to_string()
            }
            Environment::Production => format!("https://{host}/api"),
        }
    };

    let flags = FeatureFlags {
        ai_insights: config.features.ai_insights,
        debug: config.features.debug || environment == Environment::Development,
        forecast_days: config.features.forecast_days.max(1),
    };

    ResolvedEnv {
        host,
        environment,
        api_base_url: base.trim_end_matches('/').to_string(),
        flags,
    }
}

/// Whether the dashboard may serve a request that names `host`.
///
/// Local names, the configured `api.host` and `web.allowed_hosts` pass. A
/// non-local host resolves to `https://{host}/api`, so anything else would
/// let the caller pick where the session token is sent.
pub fn is_allowed_host(host: &str, config: &NutriboardConfig) -> bool {
    let host = normalize_host(host);
    is_local_host(&host)
        || host == normalize_host(&config.api.host)
        || config
            .web
            .allowed_hosts
            .iter()
            .any(|allowed| normalize_host(allowed) == host)
}

/// Lowercase and strip the port (and IPv6 brackets) from a `Host` value.
fn normalize_host(raw: &str) -> String {
    let raw = raw.trim().to_ascii_lowercase();

    if let Some(rest) = raw.strip_prefix('[') {
        // [::1]:8787
        return rest.split(']').next().unwrap_or_default().to_string();
    }

    // A bare IPv6 address has several colons and no port.
    if raw.matches(':').count() > 1 {
        return raw;
    }

    raw.split(':').next().unwrap_or_default().to_string()
}

fn is_local_host(host: &str) -> bool {
    host.is_empty()
        || matches!(host, "localhost" | "127.0.0.1" | "::1" | "0.0.0.0")
        || host.ends_with(".localhost")
        || host.ends_with(".local")
}
