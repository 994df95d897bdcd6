//! Aggregates the JSONL request log for
//! `nutriboard activity`.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use crate::activity::logger::{self, ActivityEntry};

/// Summary of logged API traffic.
#[derive(Debug, Default, Serialize)]
pub struct ActivitySummary {
    pub total_requests: usize,
    pub failures: usize,
    /// Requests answered with 401 (each one forced a logout).
    pub unauthorized: usize,
    /// Requests that never got a response.
    pub network_errors: usize,
    pub avg_latency_ms: f64,
    pub endpoints: Vec<EndpointStat>,
}

/// Per-endpoint aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStat {
    pub method: String,
    pub endpoint: String,
    pub count: usize,
    pub failures: usize,
    pub avg_latency_ms: f64,
}

impl ActivitySummary {
    /// Failure rate in percent, 0.0 when nothing was logged.
    pub fn failure_pct(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.failures as f64 / self.total_requests as f64) * 100.0
        }
    }
}

/// Summarize the log at `path`, optionally limited to the last `days` days.
pub fn compute_summary(path: &Path, days: Option<u32>) -> ActivitySummary {
    let entries = logger::read_entries_since_days(path, days);
    build_summary(&entries)
}

fn build_summary(entries: &[ActivityEntry]) -> ActivitySummary {
    if entries.is_empty() {
        return ActivitySummary::default();
    }

    let mut groups: HashMap<(String, String), (usize, usize, u64)> = HashMap::new();
    for entry in entries {
        let slot = groups
            .entry((entry.method.clone(), entry.endpoint.clone()))
            .or_insert((0, 0, 0));
        slot.0 += 1;
        if !entry.success {
            slot.1 += 1;
        }
        slot.2 += entry.latency_ms;
    }

    let mut endpoints: Vec<EndpointStat> = groups
        .into_iter()
        .map(|((method, endpoint), (count, failures, latency))| EndpointStat {
            method,
            endpoint,
            count,
            failures,
            avg_latency_ms: latency as f64 / count as f64,
        })
        .collect();
    endpoints.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.endpoint.cmp(&b.endpoint))
    });

    let total_latency: u64 = entries.iter().map(|e| e.latency_ms).sum();

    ActivitySummary {
        total_requests: entries.len(),
        failures: entries.iter().filter(|e| !e.success).count(),
        unauthorized: entries.iter().filter(|e| e.status == Some(401)).count(),
        network_errors: entries.iter().filter(|e| e.status.is_none()).count(),
        avg_latency_ms: total_latency as f64 / entries.len() as f64,
        endpoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(method: &str, endpoint: &str, status: Option<u16>, latency_ms: u64) -> ActivityEntry {
        ActivityEntry {
            timestamp: "2026-10-18T08:00:00+00:00".to_string(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            status,
            latency_ms,
            success: status.is_some_and(|s| (200..300).contains(&s)),
        }
    }

    #[test]
    fn empty_log_gives_empty_summary() {
        let summary = build_summary(&[]);
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.failure_pct(), 0.0);
        assert!(summary.endpoints.is_empty());
    }

    #[test]
    fn summary_groups_by_method_and_endpoint() {
        let entries = vec![
            entry("GET", "/meals/stats", Some(200), 10),
            entry("GET", "/meals/stats", Some(200), 30),
            entry("GET", "/meals", Some(401), 5),
            entry("POST", "/login", None, 15_000),
        ];
        let summary = build_summary(&entries);

        assert_eq!(summary.total_requests, 4);
        assert_eq!(summary.failures, 2);
        assert_eq!(summary.unauthorized, 1);
        assert_eq!(summary.network_errors, 1);
        assert!((summary.failure_pct() - 50.0).abs() < f64::EPSILON);

        let top = &summary.endpoints[0];
        assert_eq!(top.endpoint, "/meals/stats");
        assert_eq!(top.count, 2);
        assert!((top.avg_latency_ms - 20.0).abs() < f64::EPSILON);
    }
}
