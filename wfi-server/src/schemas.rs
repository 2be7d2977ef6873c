//! Request and response bodies for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wfi_agent::{Citation, ToolFailure};
use wfi_predict::{AttritionPrediction, CareerPath, ForecastPoint, SimilarEmployee, TrendingSkill};
use wfi_rag::SearchResult;

/// `GET /health` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the server responds.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of chunks in the vector index.
    pub indexed_chunks: usize,
    /// Tools registered with the chat agent.
    pub tools: Vec<String>,
}

/// `POST /rag/query` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Natural-language query.
    pub query: String,
    /// Result count override. Defaults to the server's configured top-k.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// One retrieved passage.
#[derive(Debug, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Stable chunk id.
    pub chunk_id: String,
    /// Parent document id.
    pub document_id: String,
    /// Chunk text.
    pub text: String,
    /// Source label (file name or document id).
    pub source: String,
    /// Similarity score, higher is more relevant.
    pub score: f32,
}

impl From<SearchResult> for RetrievedChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            chunk_id: result.chunk.id.clone(),
            document_id: result.chunk.document_id.clone(),
            source: result.chunk.source().to_string(),
            text: result.chunk.text,
            score: result.score,
        }
    }
}

/// `POST /rag/query` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Retrieved passages, best first.
    pub results: Vec<RetrievedChunk>,
}

/// `POST /chat` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiRequest {
    /// The user's message.
    pub message: String,
    /// How many passages of context to retrieve before answering.
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// `POST /chat` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatApiResponse {
    /// The agent's answer.
    pub answer: String,
    /// Citations resolved from markers in the answer.
    pub citations: Vec<Citation>,
    /// Tool invocations that failed while answering.
    pub tool_failures: Vec<ToolFailure>,
    /// True when the answer is partial (tool failure, citation fallback,
    /// or exhausted tool budget).
    pub degraded: bool,
    /// When the answer was produced.
    pub timestamp: DateTime<Utc>,
}

/// `POST /attrition/predict` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttritionRequest {
    /// Feature mapping, keys per the loaded model's feature names.
    pub features: Map<String, Value>,
}

/// `POST /attrition/predict` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AttritionResponse {
    /// The structured prediction.
    #[serde(flatten)]
    pub prediction: AttritionPrediction,
}

/// `POST /forecast` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Skill to forecast.
    pub skill_name: String,
    /// Horizon in months, 1 to 24. Defaults to 6.
    #[serde(default)]
    pub months_ahead: Option<u32>,
}

/// `POST /forecast` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// The requested skill.
    pub skill_name: String,
    /// Forecasted months, oldest first. Empty for an unknown skill.
    pub forecast: Vec<ForecastPoint>,
}

/// `GET /forecast/trending` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrendingResponse {
    /// Skills ranked by recent demand growth.
    pub trending: Vec<TrendingSkill>,
}

/// `POST /mobility/recommend` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct MobilityRequest {
    /// Employee to recommend paths for.
    pub employee_id: String,
    /// Restrict recommendations to one role.
    #[serde(default)]
    pub target_role: Option<String>,
}

/// `POST /mobility/recommend` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MobilityResponse {
    /// The queried employee.
    pub employee_id: String,
    /// The employee's recorded skills.
    pub current_skills: Vec<String>,
    /// Ranked career-path recommendations, at most five.
    pub recommended_paths: Vec<CareerPath>,
    /// Most similar employees in embedding space.
    pub similar_employees: Vec<SimilarEmployee>,
}

/// JSON body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub error: String,
}
