use crate::infra::AppState;
use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use condo_valuation::error::AppError;
use condo_valuation::valuation::cities::normalize;
use condo_valuation::valuation::share::share_query;
use condo_valuation::valuation::{
    parse_share_query, MortgageComparison, PropertyDetails, PsfTable, ValuationResponse,
    ValuationService, CITIES, SUPPORTED_YEARS,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValuationRequest {
    #[serde(flatten)]
    pub(crate) details: PropertyDetails,
    #[serde(default)]
    pub(crate) current_year: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValuationEnvelope {
    pub(crate) details: PropertyDetails,
    pub(crate) current_year: i32,
    #[serde(flatten)]
    pub(crate) valuation: ValuationResponse,
    pub(crate) origin_label: &'static str,
    pub(crate) profit: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mortgage: Option<MortgageComparison>,
    pub(crate) share_query: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CityOption {
    pub(crate) name: &'static str,
    pub(crate) market: &'static str,
}

pub(crate) fn valuation_router(service: Arc<ValuationService>) -> Router {
    Router::new()
        .route("/api/v1/cities", get(cities_endpoint))
        .route("/api/v1/valuations", post(valuation_endpoint))
        .route(
            "/api/v1/valuations/shared",
            get(shared_valuation_endpoint),
        )
        .with_state(service)
}

pub(crate) fn with_valuation_routes(service: Arc<ValuationService>) -> Router {
    valuation_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn cities_endpoint() -> Json<serde_json::Value> {
    let cities: Vec<CityOption> = CITIES
        .iter()
        .map(|&name| CityOption {
            name,
            market: normalize(name),
        })
        .collect();
    Json(json!({
        "cities": cities,
        "detailedMarkets": PsfTable::reference().detailed_cities(),
        "years": { "min": SUPPORTED_YEARS.start(), "max": SUPPORTED_YEARS.end() },
    }))
}

pub(crate) async fn valuation_endpoint(
    State(service): State<Arc<ValuationService>>,
    Json(payload): Json<ValuationRequest>,
) -> Result<Json<ValuationEnvelope>, AppError> {
    let ValuationRequest {
        details,
        current_year,
    } = payload;
    let current_year = current_year.unwrap_or_else(|| service.current_year());
    value_property(&service, details, current_year).await
}

/// Re-runs a valuation from a share link's query string.
pub(crate) async fn shared_valuation_endpoint(
    State(service): State<Arc<ValuationService>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ValuationEnvelope>, AppError> {
    let details = parse_share_query(query.as_deref().unwrap_or_default())?;
    let current_year = service.current_year();
    value_property(&service, details, current_year).await
}

async fn value_property(
    service: &ValuationService,
    details: PropertyDetails,
    current_year: i32,
) -> Result<Json<ValuationEnvelope>, AppError> {
    let valuation = service.appraise(&details, current_year).await?;
    let mortgage = valuation
        .data
        .interest_rates
        .map(|rates| MortgageComparison::new(&details, rates));

    Ok(Json(ValuationEnvelope {
        profit: valuation.data.profit(&details),
        origin_label: valuation.origin.label(),
        share_query: share_query(&details),
        current_year,
        mortgage,
        valuation,
        details,
    }))
}
