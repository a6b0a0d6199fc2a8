use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

use jobradar_db::normalize::normalize;
use jobradar_shared::api::{Estimate, EstimateRequest, SubmitReportRequest};

use crate::AppState;
use crate::services::estimate_cache::EstimateCache;

pub async fn company_records(
    State(state): State<AppState>,
    Path(company): Path<String>,
) -> impl IntoResponse {
    let company_normalized = normalize(&company);
    match state.records.find_all_for_company(&company_normalized).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!("Company record lookup failed for '{}': {:#}", company, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct LookupParams {
    pub company: String,
    #[serde(default)]
    pub title: Option<String>,
}

pub async fn lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> impl IntoResponse {
    let company_normalized = normalize(&params.company);
    let title_normalized = params
        .title
        .as_deref()
        .map(normalize)
        .filter(|t| !t.is_empty());

    match state
        .records
        .find(&company_normalized, title_normalized.as_deref())
        .await
    {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!("Salary lookup failed for '{}': {:#}", params.company, e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn cached_estimate(state: &AppState, req: &EstimateRequest) -> Estimate {
    let key = EstimateCache::key(req.company.as_deref(), req.title.as_deref());
    if let Some(hit) = state.estimate_cache.get(&key) {
        return hit;
    }
    let estimate = state.estimator.estimate(req).await;
    state.estimate_cache.insert(key, estimate.clone());
    estimate
}

pub async fn estimate(
    State(state): State<AppState>,
    Json(req): Json<EstimateRequest>,
) -> Json<Estimate> {
    Json(cached_estimate(&state, &req).await)
}

pub async fn estimate_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<EstimateRequest>>,
) -> Json<Vec<Estimate>> {
    let mut estimates = Vec::with_capacity(requests.len());
    for req in &requests {
        estimates.push(cached_estimate(&state, req).await);
    }
    Json(estimates)
}

pub async fn submit_report(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<SubmitReportRequest>,
) -> impl IntoResponse {
    let user_id: Option<i64> = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let ip = addr.ip().to_string();

    let outcome = state.report_service.submit(req, user_id, Some(&ip)).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(outcome))
}
