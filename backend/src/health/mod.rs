//! Named, tagged health checks and the reports built from running them.

pub mod basic;
pub mod report;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

pub use basic::BasicHealthCheck;

/// Closed set of outcomes, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub enum HealthStatus {
    Unhealthy,
    Degraded,
    Healthy,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Unhealthy => "Unhealthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Healthy => "Healthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub description: Option<String>,
    pub data: IndexMap<String, serde_json::Value>,
}

impl HealthCheckResult {
    fn new(status: HealthStatus, description: impl Into<String>) -> Self {
        Self {
            status,
            description: Some(description.into()),
            data: IndexMap::new(),
        }
    }

    pub fn healthy(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Healthy, description)
    }

    pub fn degraded(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Degraded, description)
    }

    pub fn unhealthy(description: impl Into<String>) -> Self {
        Self::new(HealthStatus::Unhealthy, description)
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// A probe of one dependency. Must return quickly and never fail;
/// problems are reported through the returned status.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> HealthCheckResult;
}

#[derive(Debug, Clone)]
pub struct HealthReportEntry {
    pub status: HealthStatus,
    pub description: Option<String>,
    pub duration: Duration,
    pub tags: Vec<String>,
    pub data: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub entries: IndexMap<String, HealthReportEntry>,
    pub total_duration: Duration,
}

impl HealthReport {
    /// Worst entry status wins; a report with no entries is healthy.
    pub fn from_entries(entries: IndexMap<String, HealthReportEntry>, total_duration: Duration) -> Self {
        let status = entries
            .values()
            .map(|entry| entry.status)
            .min()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            entries,
            total_duration,
        }
    }
}

struct Registration {
    name: String,
    tags: Vec<String>,
    check: Arc<dyn HealthCheck>,
}

/// Registry of health checks, read-only once the server starts.
pub struct HealthChecks {
    registrations: Vec<Registration>,
    timeout: Duration,
}

impl HealthChecks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            registrations: Vec::new(),
            timeout,
        }
    }

    pub fn register(
        mut self,
        name: impl Into<String>,
        tags: &[&str],
        check: impl HealthCheck + 'static,
    ) -> Self {
        self.registrations.push(Registration {
            name: name.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            check: Arc::new(check),
        });
        self
    }

    /// Runs every check carrying `tag` concurrently and aggregates the results.
    pub async fn run(&self, tag: &str) -> HealthReport {
        let start = Instant::now();

        let selected = self
            .registrations
            .iter()
            .filter(|r| r.tags.iter().any(|t| t == tag));

        let entries = join_all(selected.map(|registration| self.run_one(registration))).await;
        let report = HealthReport::from_entries(entries.into_iter().collect(), start.elapsed());

        debug!(
            tag,
            status = %report.status,
            checks = report.entries.len(),
            elapsed_ms = report.total_duration.as_millis() as u64,
            "Health checks completed"
        );

        report
    }

    async fn run_one(&self, registration: &Registration) -> (String, HealthReportEntry) {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, registration.check.check()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(check = %registration.name, timeout_ms = self.timeout.as_millis() as u64, "Health check timed out");
                HealthCheckResult::unhealthy("Health check timed out")
            }
        };

        let entry = HealthReportEntry {
            status: result.status,
            description: result.description,
            duration: start.elapsed(),
            tags: registration.tags.clone(),
            data: result.data,
        };

        (registration.name.clone(), entry)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Check that always reports the same result.
    pub(crate) struct FixedCheck(pub HealthCheckResult);

    #[async_trait]
    impl HealthCheck for FixedCheck {
        async fn check(&self) -> HealthCheckResult {
            self.0.clone()
        }
    }

    struct SlowCheck;

    #[async_trait]
    impl HealthCheck for SlowCheck {
        async fn check(&self) -> HealthCheckResult {
            tokio::time::sleep(Duration::from_secs(60)).await;
            HealthCheckResult::healthy("too late")
        }
    }

    #[test]
    fn status_orders_from_worst_to_best() {
        assert!(HealthStatus::Unhealthy < HealthStatus::Degraded);
        assert!(HealthStatus::Degraded < HealthStatus::Healthy);
        assert_eq!(HealthStatus::Degraded.to_string(), "Degraded");
    }

    #[tokio::test]
    async fn empty_registry_is_healthy() {
        let report = HealthChecks::new(Duration::from_secs(1)).run("ready").await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.entries.is_empty());
    }

    #[tokio::test]
    async fn worst_status_wins() {
        let checks = HealthChecks::new(Duration::from_secs(1))
            .register("a", &["ready"], FixedCheck(HealthCheckResult::healthy("ok")))
            .register("b", &["ready"], FixedCheck(HealthCheckResult::degraded("slow")))
            .register("c", &["live"], FixedCheck(HealthCheckResult::unhealthy("down")));

        let ready = checks.run("ready").await;
        assert_eq!(ready.status, HealthStatus::Degraded);
        assert_eq!(ready.entries.keys().collect::<Vec<_>>(), vec!["a", "b"]);

        let live = checks.run("live").await;
        assert_eq!(live.status, HealthStatus::Unhealthy);
        assert_eq!(live.entries.len(), 1);
    }

    #[tokio::test]
    async fn entries_keep_tags_and_data() {
        let checks = HealthChecks::new(Duration::from_secs(1)).register(
            "db",
            &["ready", "live"],
            FixedCheck(HealthCheckResult::healthy("up").with_data("latency_ms", 3)),
        );

        let report = checks.run("live").await;
        let entry = &report.entries["db"];
        assert_eq!(entry.tags, vec!["ready", "live"]);
        assert_eq!(entry.description.as_deref(), Some("up"));
        assert_eq!(entry.data["latency_ms"], serde_json::json!(3));
    }

    #[tokio::test]
    async fn slow_check_times_out_as_unhealthy() {
        let checks = HealthChecks::new(Duration::from_millis(50))
            .register("slow", &["ready"], SlowCheck);

        let report = checks.run("ready").await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(
            report.entries["slow"].description.as_deref(),
            Some("Health check timed out")
        );
    }
}
