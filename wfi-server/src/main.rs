//! The WFI server binary.
//!
//! Startup order: env file, logging, config, model artifacts, retrieval
//! pipeline, agent tools, document ingestion, then serve.

use std::sync::Arc;

use anyhow::Context;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wfi_agent::{AgentConfig, AgentDispatcher, OpenAiChatModel};
use wfi_predict::{
    AttritionArtifact, AttritionPredictor, AttritionTool, ForecastArtifact, ForecastTool,
    MobilityAnalyzer, MobilityArtifact, MobilityTool, SkillDemandForecaster,
};
use wfi_rag::{
    CachedEmbedder, FixedSizeChunker, InMemoryIndex, OpenAiEmbedder, RagConfig, RetrievalTool,
    Retriever,
};
use wfi_server::{AppState, ServerConfig, build_router, ingest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env().context("loading configuration")?;
    info!(bind = %config.bind_addr, "starting WFI server");

    let state = build_state(&config).await?;

    let indexed = ingest::ingest_dir(&state.retriever, &config.docs_dir)
        .await
        .context("ingesting policy documents")?;
    info!(chunks = indexed, "document index ready");

    let app = build_router(state).layer(TimeoutLayer::new(config.request_timeout));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let mut embedder = OpenAiEmbedder::from_env()
        .context("configuring embedding client")?
        .with_model(&config.embed_model, config.embed_dimensions);
    if let Some(base_url) = &config.openai_base_url {
        embedder = embedder.with_base_url(base_url);
    }

    let rag_config = RagConfig::builder()
        .chunk_size(config.chunk_size)
        .chunk_overlap(config.chunk_overlap)
        .top_k(config.top_k)
        .similarity(config.similarity)
        .build()
        .context("validating retrieval configuration")?;

    let retriever = Arc::new(
        Retriever::builder()
            .config(rag_config)
            .embedder(Arc::new(CachedEmbedder::new(embedder)))
            .store(Arc::new(InMemoryIndex::new(config.similarity)))
            .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?))
            .build()
            .context("building retriever")?,
    );

    let attrition = load_service(config.attrition_model.as_deref(), "attrition", |path| {
        Ok(Arc::new(AttritionPredictor::new(AttritionArtifact::load(path)?)?))
    })?;
    let forecaster = load_service(config.forecast_model.as_deref(), "forecast", |path| {
        Ok(Arc::new(SkillDemandForecaster::new(ForecastArtifact::load(path)?)?))
    })?;
    let mobility = load_service(config.mobility_model.as_deref(), "mobility", |path| {
        Ok(Arc::new(MobilityAnalyzer::new(MobilityArtifact::load(path)?)?))
    })?;

    let mut chat = OpenAiChatModel::from_env()
        .context("configuring chat client")?
        .with_model(&config.chat_model)
        .with_timeout(config.llm_timeout)
        .context("configuring chat client timeout")?;
    if let Some(base_url) = &config.openai_base_url {
        chat = chat.with_base_url(base_url);
    }

    let agent_config =
        AgentConfig { llm_retries: config.llm_retries, ..AgentConfig::default() };
    let mut dispatcher = AgentDispatcher::new(Arc::new(chat), agent_config);
    if config.tools.search {
        dispatcher = dispatcher.with_tool(Arc::new(RetrievalTool::new(retriever.clone())));
    }
    if let (true, Some(predictor)) = (config.tools.attrition, &attrition) {
        dispatcher = dispatcher.with_tool(Arc::new(AttritionTool::new(predictor.clone())));
    }
    if let (true, Some(forecaster)) = (config.tools.forecast, &forecaster) {
        dispatcher = dispatcher.with_tool(Arc::new(ForecastTool::new(forecaster.clone())));
    }
    if let (true, Some(analyzer)) = (config.tools.mobility, &mobility) {
        dispatcher = dispatcher.with_tool(Arc::new(MobilityTool::new(analyzer.clone())));
    }

    let tool_names: Vec<String> = dispatcher.tool_names().into_iter().map(String::from).collect();
    info!(tools = ?tool_names, "agent ready");

    Ok(AppState {
        retriever,
        dispatcher: Arc::new(dispatcher),
        attrition,
        forecaster,
        mobility,
    })
}

/// Load a prediction service from its artifact path, or disable it when no
/// path is configured.
fn load_service<T>(
    path: Option<&std::path::Path>,
    name: &str,
    build: impl FnOnce(&std::path::Path) -> wfi_predict::Result<Arc<T>>,
) -> anyhow::Result<Option<Arc<T>>> {
    let Some(path) = path else {
        warn!(service = name, "no model artifact configured, service disabled");
        return Ok(None);
    };
    let service =
        build(path).with_context(|| format!("loading {name} model from {}", path.display()))?;
    info!(service = name, path = %path.display(), "model artifact loaded");
    Ok(Some(service))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to install ctrl-c handler");
    }
    info!("shutting down");
}
