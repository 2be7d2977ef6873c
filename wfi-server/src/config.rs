//! Server configuration from environment variables.
//!
//! Every knob has a default, so a `.env` file with just `OPENAI_API_KEY`
//! is enough for a local run. Invalid values fail startup with
//! [`CoreError::Config`] rather than being silently replaced.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use wfi_core::CoreError;
use wfi_rag::Similarity;

/// Runtime configuration for the WFI server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8000`.
    pub bind_addr: String,
    /// Directory of policy documents (`.txt` / `.md`) ingested at startup.
    pub docs_dir: PathBuf,
    /// Attrition model artifact. `None` disables the service.
    pub attrition_model: Option<PathBuf>,
    /// Forecast model artifact. `None` disables the service.
    pub forecast_model: Option<PathBuf>,
    /// Mobility model artifact. `None` disables the service.
    pub mobility_model: Option<PathBuf>,
    /// Chat model identifier.
    pub chat_model: String,
    /// Embedding model identifier.
    pub embed_model: String,
    /// Embedding vector dimensionality.
    pub embed_dimensions: usize,
    /// Base URL for OpenAI-compatible APIs.
    pub openai_base_url: Option<String>,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Chunk overlap in characters.
    pub chunk_overlap: usize,
    /// Default result count for retrieval.
    pub top_k: usize,
    /// Similarity metric for the vector index.
    pub similarity: Similarity,
    /// Per-request timeout applied by the HTTP layer.
    pub request_timeout: Duration,
    /// Timeout for each LLM call.
    pub llm_timeout: Duration,
    /// Maximum attempts per LLM call (including the first).
    pub llm_retries: u32,
    /// Which tools are registered with the chat agent.
    pub tools: ToolFlags,
}

/// Per-tool enablement flags for the chat agent.
///
/// A disabled tool is simply not registered; its HTTP endpoint is governed
/// separately by whether the model artifact is configured.
#[derive(Debug, Clone)]
pub struct ToolFlags {
    /// The policy-search tool.
    pub search: bool,
    /// The attrition prediction tool.
    pub attrition: bool,
    /// The skill-demand forecast tool.
    pub forecast: bool,
    /// The career-mobility tool.
    pub mobility: bool,
}

impl Default for ToolFlags {
    fn default() -> Self {
        Self { search: true, attrition: true, forecast: true, mobility: true }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            docs_dir: PathBuf::from("data/policies"),
            attrition_model: Some(PathBuf::from("models/attrition.json")),
            forecast_model: Some(PathBuf::from("models/forecast.json")),
            mobility_model: Some(PathBuf::from("models/mobility.json")),
            chat_model: "gpt-4o-mini".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            embed_dimensions: 1536,
            openai_base_url: None,
            chunk_size: 512,
            chunk_overlap: 100,
            top_k: 3,
            similarity: Similarity::Cosine,
            request_timeout: Duration::from_secs(60),
            llm_timeout: Duration::from_secs(30),
            llm_retries: 3,
            tools: ToolFlags::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `WFI_*` environment variables, falling back
    /// to defaults for anything unset.
    ///
    /// Model artifact paths can be disabled explicitly by setting the
    /// variable to the empty string.
    pub fn from_env() -> wfi_core::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: env_string("WFI_BIND_ADDR").unwrap_or(defaults.bind_addr),
            docs_dir: env_string("WFI_DOCS_DIR").map(PathBuf::from).unwrap_or(defaults.docs_dir),
            attrition_model: env_path("WFI_ATTRITION_MODEL", defaults.attrition_model),
            forecast_model: env_path("WFI_FORECAST_MODEL", defaults.forecast_model),
            mobility_model: env_path("WFI_MOBILITY_MODEL", defaults.mobility_model),
            chat_model: env_string("WFI_CHAT_MODEL").unwrap_or(defaults.chat_model),
            embed_model: env_string("WFI_EMBED_MODEL").unwrap_or(defaults.embed_model),
            embed_dimensions: env_parse("WFI_EMBED_DIMENSIONS", defaults.embed_dimensions)?,
            openai_base_url: env_string("WFI_OPENAI_BASE_URL"),
            chunk_size: env_parse("WFI_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: env_parse("WFI_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: env_parse("WFI_TOP_K", defaults.top_k)?,
            similarity: env_parse("WFI_SIMILARITY", defaults.similarity)?,
            request_timeout: Duration::from_secs(env_parse(
                "WFI_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            llm_timeout: Duration::from_secs(env_parse(
                "WFI_LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )?),
            llm_retries: env_parse("WFI_LLM_RETRIES", defaults.llm_retries)?,
            tools: ToolFlags {
                search: env_parse("WFI_TOOL_SEARCH", defaults.tools.search)?,
                attrition: env_parse("WFI_TOOL_ATTRITION", defaults.tools.attrition)?,
                forecast: env_parse("WFI_TOOL_FORECAST", defaults.tools.forecast)?,
                mobility: env_parse("WFI_TOOL_MOBILITY", defaults.tools.mobility)?,
            },
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_path(key: &str, default: Option<PathBuf>) -> Option<PathBuf> {
    match std::env::var(key) {
        Ok(value) if value.is_empty() => None,
        Ok(value) => Some(PathBuf::from(value)),
        Err(_) => default,
    }
}

fn env_parse<T>(key: &str, default: T) -> wfi_core::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| CoreError::Config(format!("invalid value for {key} ({raw}): {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.top_k, 3);
        assert!(config.chunk_overlap < config.chunk_size);
        assert!(config.attrition_model.is_some());
    }

    #[test]
    fn empty_model_path_disables_the_service() {
        assert_eq!(env_path("WFI_TEST_UNSET_MODEL", None), None);
    }
}
