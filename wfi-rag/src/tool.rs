//! Retrieval as an agent tool.
//!
//! [`RetrievalTool`] wraps a [`Retriever`] as a [`wfi_core::Tool`] so the
//! chat agent can search the policy knowledge base mid-reasoning.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{error, info};
use wfi_core::{CoreError, Tool};

use crate::retriever::Retriever;

/// A policy-search tool backed by a [`Retriever`].
///
/// Accepts a required `query` string and an optional `top_k` override.
pub struct RetrievalTool {
    retriever: Arc<Retriever>,
}

impl RetrievalTool {
    /// Create a new `RetrievalTool`.
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for RetrievalTool {
    fn name(&self) -> &str {
        "search_policies"
    }

    fn description(&self) -> &str {
        "Search the HR policy knowledge base for passages relevant to a query"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "top_k": {
                    "type": "integer",
                    "description": "Maximum number of passages to return. Uses the configured default if omitted."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> wfi_core::Result<Value> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| CoreError::Validation("missing required 'query' parameter".into()))?;

        let top_k = match args.get("top_k").and_then(|v| v.as_u64()) {
            Some(k) => k as usize,
            None => self.retriever.config().top_k,
        };

        info!(query, top_k, "search_policies tool called");

        let results = self.retriever.retrieve(query, top_k).await.map_err(|e| {
            error!(error = %e, "search_policies failed");
            CoreError::Tool { tool: "search_policies".into(), message: e.to_string() }
        })?;

        serde_json::to_value(&results).map_err(|e| CoreError::Tool {
            tool: "search_policies".into(),
            message: format!("failed to serialize results: {e}"),
        })
    }
}
