//! # wfi-server
//!
//! The HTTP surface of Workforce Intelligence. A thin axum layer over the
//! library crates: retrieval queries, the chat agent, and the three
//! prediction services. Handlers translate JSON bodies to library calls
//! and library errors to status codes; no business logic lives here.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wfi_agent::AgentDispatcher;
use wfi_predict::{AttritionPredictor, MobilityAnalyzer, SkillDemandForecaster};
use wfi_rag::Retriever;

pub mod config;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod schemas;

pub use config::ServerConfig;
pub use error::ApiError;

/// Shared handler state. Everything is read-only after startup except the
/// vector index, which synchronizes internally.
#[derive(Clone)]
pub struct AppState {
    /// The retrieval pipeline.
    pub retriever: Arc<Retriever>,
    /// The chat agent with its registered tools.
    pub dispatcher: Arc<AgentDispatcher>,
    /// Attrition prediction, if its artifact was configured.
    pub attrition: Option<Arc<AttritionPredictor>>,
    /// Skill-demand forecasting, if its artifact was configured.
    pub forecaster: Option<Arc<SkillDemandForecaster>>,
    /// Career mobility analysis, if its artifact was configured.
    pub mobility: Option<Arc<MobilityAnalyzer>>,
}

/// Build the API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/rag/query", post(routes::rag_query))
        .route("/chat", post(routes::chat))
        .route("/attrition/predict", post(routes::attrition_predict))
        .route("/forecast", post(routes::forecast))
        .route("/forecast/trending", get(routes::trending_skills))
        .route("/mobility/recommend", post(routes::mobility_recommend))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
