//! End-to-end router tests over in-memory components.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wfi_agent::{AgentConfig, AgentDispatcher, MockLlm};
use wfi_predict::{
    AttritionArtifact, AttritionPredictor, ForecastArtifact, MobilityAnalyzer, MobilityArtifact,
    RosterEntry, SkillDemandForecaster,
};
use wfi_rag::{
    Document, EmbeddingProvider, FixedSizeChunker, InMemoryIndex, RagConfig, Retriever, Similarity,
};
use wfi_server::{AppState, build_router};

/// Deterministic embedder: a 4-dim vector derived from character counts.
struct FakeEmbedder;

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> wfi_rag::Result<Vec<f32>> {
        let mut v = [0.0f32; 4];
        for (i, c) in text.chars().enumerate() {
            v[i % 4] += (c as u32 % 17) as f32;
        }
        Ok(v.to_vec())
    }

    fn dimensions(&self) -> usize {
        4
    }
}

fn attrition_artifact() -> AttritionArtifact {
    AttritionArtifact {
        feature_names: vec!["age".into(), "tenure_years".into()],
        means: vec![35.0, 5.0],
        stds: vec![10.0, 3.0],
        coefficients: vec![-0.8, -0.5],
        intercept: 0.2,
    }
}

fn forecast_artifact() -> ForecastArtifact {
    use chrono::NaiveDate;
    use wfi_predict::DemandPoint;

    let history = (0..14)
        .map(|i| DemandPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(30 * i),
            demand: 20.0 + i as f64,
        })
        .collect();
    ForecastArtifact {
        coefficients: vec![0.0; 10],
        intercept: 30.0,
        history: HashMap::from([("Rust".to_string(), history)]),
    }
}

fn mobility_artifact() -> MobilityArtifact {
    MobilityArtifact {
        embeddings: HashMap::from([
            ("EMP1".to_string(), vec![1.0, 0.0]),
            ("EMP2".to_string(), vec![0.9, 0.1]),
            ("Rust".to_string(), vec![0.5, 0.5]),
        ]),
        employee_skills: HashMap::from([
            ("EMP1".to_string(), vec!["Rust".to_string()]),
            ("EMP2".to_string(), vec!["Rust".to_string(), "SQL".to_string()]),
        ]),
        roster: HashMap::from([
            ("EMP1".to_string(), RosterEntry {
                job_role: "Engineer".into(),
                department: "Platform".into(),
            }),
            ("EMP2".to_string(), RosterEntry {
                job_role: "Data Engineer".into(),
                department: "Analytics".into(),
            }),
        ]),
    }
}

async fn test_app(llm: MockLlm) -> Router {
    let retriever = Arc::new(
        Retriever::builder()
            .config(RagConfig::builder().chunk_size(64).chunk_overlap(16).build().unwrap())
            .embedder(Arc::new(FakeEmbedder))
            .store(Arc::new(InMemoryIndex::new(Similarity::Cosine)))
            .chunker(Arc::new(FixedSizeChunker::new(64, 16).unwrap()))
            .build()
            .unwrap(),
    );
    let mut document = Document::new("remote_work", "Employees may work remotely after 90 days.");
    document.metadata.insert("source".to_string(), "remote_work.txt".to_string());
    retriever.index(&document).await.unwrap();

    let state = AppState {
        retriever,
        dispatcher: Arc::new(AgentDispatcher::new(Arc::new(llm), AgentConfig::default())),
        attrition: Some(Arc::new(AttritionPredictor::new(attrition_artifact()).unwrap())),
        forecaster: Some(Arc::new(SkillDemandForecaster::new(forecast_artifact()).unwrap())),
        mobility: Some(Arc::new(MobilityAnalyzer::new(mobility_artifact()).unwrap())),
    };
    build_router(state)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_reports_index_and_tools() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["indexed_chunks"], 1);
}

#[tokio::test]
async fn rag_query_returns_scored_chunks() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) =
        post_json(app, "/rag/query", json!({ "query": "remote work policy" })).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0]["document_id"], "remote_work");
    assert_eq!(results[0]["source"], "remote_work.txt");
}

#[tokio::test]
async fn empty_query_is_rejected() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) = post_json(app, "/rag/query", json!({ "query": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn chat_returns_cited_answer() {
    let app = test_app(MockLlm::text("Remote work is allowed after 90 days [S1].")).await;
    let (status, body) =
        post_json(app, "/chat", json!({ "message": "Can I work remotely?" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["degraded"], false);
    let citations = body["citations"].as_array().unwrap();
    assert_eq!(citations.len(), 1);
    assert_eq!(citations[0]["source"], "remote_work.txt");
}

#[tokio::test]
async fn chat_with_exhausted_llm_is_bad_gateway() {
    let app = test_app(MockLlm::new(vec![])).await;
    let (status, _) = post_json(app, "/chat", json!({ "message": "hello" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn attrition_predicts_from_features() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) = post_json(
        app,
        "/attrition/predict",
        json!({ "features": { "age": 25, "tenure_years": 1 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["probability"].as_f64().unwrap() > 0.0);
    assert!(body["risk_level"].is_string());
    assert!(body["recommendations"].is_array());
}

#[tokio::test]
async fn attrition_with_missing_feature_is_bad_request() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) =
        post_json(app, "/attrition/predict", json!({ "features": { "age": 25 } })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("tenure_years"));
}

#[tokio::test]
async fn forecast_returns_requested_horizon() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) =
        post_json(app, "/forecast", json!({ "skill_name": "Rust", "months_ahead": 3 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn forecast_of_unknown_skill_is_empty() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) = post_json(app, "/forecast", json!({ "skill_name": "COBOL" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["forecast"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn forecast_horizon_out_of_range_is_bad_request() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, _) =
        post_json(app, "/forecast", json!({ "skill_name": "Rust", "months_ahead": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn trending_skills_are_listed() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) = get(app, "/forecast/trending?top_n=2").await;
    assert_eq!(status, StatusCode::OK);
    let trending = body["trending"].as_array().unwrap();
    assert_eq!(trending.len(), 1);
    assert_eq!(trending[0]["skill_name"], "Rust");
}

#[tokio::test]
async fn mobility_recommends_paths() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) =
        post_json(app, "/mobility/recommend", json!({ "employee_id": "EMP1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["employee_id"], "EMP1");
    assert_eq!(body["current_skills"], json!(["Rust"]));
    let paths = body["recommended_paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0]["target_role"], "Data Engineer");
}

#[tokio::test]
async fn mobility_for_unknown_employee_is_empty() {
    let app = test_app(MockLlm::text("unused")).await;
    let (status, body) =
        post_json(app, "/mobility/recommend", json!({ "employee_id": "EMP999" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["recommended_paths"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn disabled_service_is_unavailable() {
    let retriever = Arc::new(
        Retriever::builder()
            .config(RagConfig::default())
            .embedder(Arc::new(FakeEmbedder))
            .store(Arc::new(InMemoryIndex::default()))
            .chunker(Arc::new(FixedSizeChunker::new(64, 16).unwrap()))
            .build()
            .unwrap(),
    );
    let state = AppState {
        retriever,
        dispatcher: Arc::new(AgentDispatcher::new(
            Arc::new(MockLlm::text("unused")),
            AgentConfig::default(),
        )),
        attrition: None,
        forecaster: None,
        mobility: None,
    };
    let app = build_router(state);
    let (status, body) =
        post_json(app, "/attrition/predict", json!({ "features": {} })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("attrition"));
}
