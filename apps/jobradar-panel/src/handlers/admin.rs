use axum::{
    Json,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use jobradar_shared::api::{ModerateRequest, SourceCount, StatsSummary};

use crate::AppState;
use crate::services::report_service::ModerationAction;

/// Shared-secret gate for every admin route. The header must equal the
/// configured key byte-for-byte; a missing key disables the whole surface.
/// Rejection happens here, before any engine logic runs.
pub async fn require_admin_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    match req.headers().get("x-admin-key").and_then(|v| v.to_str().ok()) {
        Some(provided) if provided == expected => next.run(req).await,
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Fire-and-forget: the response only says the populate started.
pub async fn populate_survey(State(state): State<AppState>) -> impl IntoResponse {
    let survey = state.survey_service.clone();
    tokio::spawn(async move {
        match survey.populate().await {
            Ok(n) => tracing::info!("Admin-triggered survey populate wrote {} records", n),
            Err(e) => tracing::error!("Survey populate failed: {:#}", e),
        }
    });
    (StatusCode::ACCEPTED, Json(json!({ "started": true })))
}

/// Fire-and-forget: the sequential sweep can run for minutes.
pub async fn fetch_external(State(state): State<AppState>) -> impl IntoResponse {
    let fetcher = state.estimation_api.clone();
    tokio::spawn(async move {
        fetcher.fetch_all().await;
    });
    (StatusCode::ACCEPTED, Json(json!({ "started": true })))
}

pub async fn pending_reports(State(state): State<AppState>) -> impl IntoResponse {
    match state.report_service.pending_count().await {
        Ok(count) => Json(json!({ "pending": count })).into_response(),
        Err(e) => {
            tracing::error!("Pending report count failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn moderate_report(
    State(state): State<AppState>,
    Path(report_id): Path<i64>,
    Json(req): Json<ModerateRequest>,
) -> impl IntoResponse {
    let Ok(action) = req.action.parse::<ModerationAction>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "action must be approve or reject" })),
        )
            .into_response();
    };

    let success = state.report_service.moderate(report_id, action).await;
    Json(json!({ "success": success })).into_response()
}

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let summary = async {
        let total_records = state.records.count().await?;
        let records_by_source = state
            .records
            .count_by_source()
            .await?
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect();
        let by_status = state.reports.count_by_status().await?;
        let status_count = |name: &str| {
            by_status
                .iter()
                .find(|(status, _)| status == name)
                .map_or(0, |(_, count)| *count)
        };

        anyhow::Ok(StatsSummary {
            total_records,
            records_by_source,
            reports_pending: status_count("pending"),
            reports_approved: status_count("approved"),
            reports_rejected: status_count("rejected"),
        })
    }
    .await;

    match summary {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            tracing::error!("Stats summary failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
