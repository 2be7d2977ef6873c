//! HTTP handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::info;
use wfi_core::CoreError;

use crate::AppState;
use crate::error::ApiError;
use crate::schemas::{
    AttritionRequest, AttritionResponse, ChatApiRequest, ChatApiResponse, ForecastRequest,
    ForecastResponse, HealthResponse, MobilityRequest, MobilityResponse, QueryRequest,
    QueryResponse, TrendingResponse,
};

/// Default forecast horizon when the request leaves it unset.
const DEFAULT_MONTHS_AHEAD: u32 = 6;

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let indexed_chunks = state.retriever.store().count().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        indexed_chunks,
        tools: state.dispatcher.tool_names().into_iter().map(String::from).collect(),
    }))
}

/// `POST /rag/query`
pub async fn rag_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    require_non_empty("query", &request.query)?;
    let k = request.top_k.unwrap_or(state.retriever.config().top_k);

    let results = state.retriever.retrieve(&request.query, k).await?;
    Ok(Json(QueryResponse { results: results.into_iter().map(Into::into).collect() }))
}

/// `POST /chat`
///
/// Retrieves context for the message, then runs the agent conversation.
/// Tool failures produce a degraded 200, not an error status.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, ApiError> {
    require_non_empty("message", &request.message)?;
    let k = request.top_k.unwrap_or(state.retriever.config().top_k);

    let context = state.retriever.retrieve(&request.message, k).await?;
    info!(passages = context.len(), "running chat turn");

    let answer = state.dispatcher.answer(&request.message, &context).await?;
    Ok(Json(ChatApiResponse {
        answer: answer.text,
        citations: answer.citations,
        tool_failures: answer.tool_failures,
        degraded: answer.degraded,
        timestamp: chrono::Utc::now(),
    }))
}

/// `POST /attrition/predict`
pub async fn attrition_predict(
    State(state): State<AppState>,
    Json(request): Json<AttritionRequest>,
) -> Result<Json<AttritionResponse>, ApiError> {
    let predictor = state.attrition.as_ref().ok_or_else(|| ApiError::unavailable("attrition"))?;
    let prediction = predictor.predict(&request.features)?;
    Ok(Json(AttritionResponse { prediction }))
}

/// `POST /forecast`
pub async fn forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let forecaster = state.forecaster.as_ref().ok_or_else(|| ApiError::unavailable("forecast"))?;
    require_non_empty("skill_name", &request.skill_name)?;

    let months = request.months_ahead.unwrap_or(DEFAULT_MONTHS_AHEAD);
    let forecast = forecaster.forecast(&request.skill_name, months)?;
    Ok(Json(ForecastResponse { skill_name: request.skill_name, forecast }))
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default = "default_trending_top_n")]
    top_n: usize,
}

fn default_trending_top_n() -> usize {
    5
}

/// `GET /forecast/trending`
pub async fn trending_skills(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<TrendingResponse>, ApiError> {
    let forecaster = state.forecaster.as_ref().ok_or_else(|| ApiError::unavailable("forecast"))?;
    Ok(Json(TrendingResponse { trending: forecaster.trending_skills(query.top_n) }))
}

/// `POST /mobility/recommend`
pub async fn mobility_recommend(
    State(state): State<AppState>,
    Json(request): Json<MobilityRequest>,
) -> Result<Json<MobilityResponse>, ApiError> {
    let analyzer = state.mobility.as_ref().ok_or_else(|| ApiError::unavailable("mobility"))?;
    require_non_empty("employee_id", &request.employee_id)?;

    let current_skills = analyzer.employee_skills(&request.employee_id);
    let recommended_paths =
        analyzer.recommend_paths(&request.employee_id, request.target_role.as_deref());
    let similar_employees = analyzer.similar_employees(&request.employee_id, 5);

    Ok(Json(MobilityResponse {
        employee_id: request.employee_id,
        current_skills,
        recommended_paths,
        similar_employees,
    }))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("'{field}' must not be empty")).into());
    }
    Ok(())
}
