use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::{HealthReport, HealthStatus};
use crate::{error::AppResult, AppState};

// ── Wire shape ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReportBody {
    pub status: HealthStatus,
    pub health_checks: Vec<NamedHealthEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NamedHealthEntry {
    pub name: String,
    pub report: HealthEntryBody,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthEntryBody {
    pub status: HealthStatus,
    pub descriptions: Option<String>,
    pub elapsed_milliseconds: f64,
    pub tags: Vec<String>,
    pub data: Vec<HealthDataItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDataItem {
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

impl From<&HealthReport> for HealthReportBody {
    fn from(report: &HealthReport) -> Self {
        let health_checks = report
            .entries
            .iter()
            .map(|(name, entry)| NamedHealthEntry {
                name: name.clone(),
                report: HealthEntryBody {
                    status: entry.status,
                    descriptions: entry.description.clone(),
                    elapsed_milliseconds: entry.duration.as_secs_f64() * 1000.0,
                    tags: entry.tags.clone(),
                    data: entry
                        .data
                        .iter()
                        .map(|(key, value)| HealthDataItem {
                            key: key.clone(),
                            value: value.clone(),
                        })
                        .collect(),
                },
            })
            .collect();

        Self {
            status: report.status,
            health_checks,
        }
    }
}

/// Renders a report as indented JSON with caching disabled.
pub fn write_response(report: &HealthReport) -> AppResult<Response> {
    let body = serde_json::to_string_pretty(&HealthReportBody::from(report))
        .context("failed to serialize health report")?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store, no-cache")),
            (header::PRAGMA, HeaderValue::from_static("no-cache")),
            (
                header::EXPIRES,
                HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 GMT"),
            ),
        ],
        body,
    )
        .into_response())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// Readiness probe: runs the checks tagged `ready`.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses((status = 200, description = "Health report", body = HealthReportBody))
)]
pub async fn ready(State(state): State<AppState>) -> AppResult<Response> {
    write_response(&state.health.run("ready").await)
}

/// Liveness probe: runs the checks tagged `live`.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses((status = 200, description = "Health report", body = HealthReportBody))
)]
pub async fn live(State(state): State<AppState>) -> AppResult<Response> {
    write_response(&state.health.run("live").await)
}
