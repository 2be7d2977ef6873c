//! The agent dispatcher: context + query → LLM → tools → cited answer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wfi_core::retry::{self, RetryPolicy};
use wfi_core::{
    ChatMessage, ChatRequest, ChatResponse, CoreError, GenerationConfig, Llm, Tool, ToolCall,
    ToolDescriptor,
};
use wfi_rag::SearchResult;

use crate::prompt::{self, Citation};

/// Default instruction for the HR assistant.
const DEFAULT_INSTRUCTION: &str = "You are a workforce-intelligence assistant. Answer questions \
     about HR policies, attrition risk, skill demand, and career mobility. Use the available \
     tools when a question needs a prediction, and say so honestly when you do not know.";

/// Configuration for the [`AgentDispatcher`].
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System instruction prefixed to every conversation.
    pub instruction: String,
    /// Maximum LLM round trips spent on tool calls before degrading.
    pub max_tool_rounds: u32,
    /// Maximum attempts per LLM call (including the first).
    pub llm_retries: u32,
    /// Delay before the first LLM retry; doubles on each retry.
    pub retry_base_delay: Duration,
    /// Generation parameters forwarded to the model.
    pub generation: Option<GenerationConfig>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            max_tool_rounds: 4,
            llm_retries: 3,
            retry_base_delay: Duration::from_millis(500),
            generation: None,
        }
    }
}

/// A tool invocation the agent could not complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolFailure {
    /// Name of the tool the model asked for.
    pub tool: String,
    /// What went wrong.
    pub message: String,
}

/// The dispatcher's formatted answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAnswer {
    /// Answer text.
    pub text: String,
    /// Citations resolved from `[Sn]` markers in the text.
    pub citations: Vec<Citation>,
    /// Tool invocations that failed along the way. The answer still stands,
    /// with the failures noted.
    pub tool_failures: Vec<ToolFailure>,
    /// True when the answer is partial: a tool failed, citations could not
    /// be parsed, or the tool-round budget ran out.
    pub degraded: bool,
}

/// Composes retrieved context with a user query, drives the LLM's tool
/// calls against a closed tool set, and formats the final cited answer.
///
/// # Example
///
/// ```rust,ignore
/// use wfi_agent::{AgentConfig, AgentDispatcher};
///
/// let dispatcher = AgentDispatcher::new(llm, AgentConfig::default())
///     .with_tool(Arc::new(attrition_tool))
///     .with_tool(Arc::new(retrieval_tool));
///
/// let answer = dispatcher.answer("Is EMP1001 an attrition risk?", &context).await?;
/// ```
pub struct AgentDispatcher {
    llm: Arc<dyn Llm>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
    config: AgentConfig,
}

impl AgentDispatcher {
    /// Create a dispatcher with no tools registered.
    pub fn new(llm: Arc<dyn Llm>, config: AgentConfig) -> Self {
        Self { llm, tools: BTreeMap::new(), config }
    }

    /// Register a tool. The tool's name must be unique.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Names of the registered tools, sorted.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.values().map(|t| ToolDescriptor::from_tool(t.as_ref())).collect()
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.llm_retries,
            base_delay: self.config.retry_base_delay,
        }
    }

    async fn call_llm(&self, messages: &[ChatMessage]) -> wfi_core::Result<ChatResponse> {
        retry::with_backoff(self.retry_policy(), CoreError::is_retryable, || {
            self.llm.chat(ChatRequest {
                messages: messages.to_vec(),
                tools: self.descriptors(),
                config: self.config.generation.clone(),
            })
        })
        .await
    }

    /// Answer a user query given already-retrieved context.
    ///
    /// Tool failures and unparseable citations degrade the answer rather
    /// than failing the call; only an unreachable LLM (after bounded
    /// retries) is an error.
    pub async fn answer(
        &self,
        query: &str,
        context: &[SearchResult],
    ) -> wfi_core::Result<AgentAnswer> {
        let mut messages = vec![
            ChatMessage::system(prompt::system_prompt(&self.config.instruction, context)),
            ChatMessage::user(query),
        ];
        let mut tool_failures: Vec<ToolFailure> = Vec::new();
        let mut last_content = String::new();

        for round in 0..=self.config.max_tool_rounds {
            let response = self.call_llm(&messages).await?;

            if !response.content.is_empty() {
                last_content = response.content.clone();
            }

            if !response.wants_tools() {
                return Ok(self.finish(response.content, context, tool_failures));
            }
            if round == self.config.max_tool_rounds {
                break;
            }

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let result = self.invoke_tool(call, &mut tool_failures).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), result));
            }
        }

        warn!(max_tool_rounds = self.config.max_tool_rounds, "tool-round budget exhausted");
        let text = if last_content.is_empty() {
            "I could not complete the requested tool calls within the allotted budget.".to_string()
        } else {
            last_content
        };
        let mut answer = self.finish(text, context, tool_failures);
        answer.degraded = true;
        Ok(answer)
    }

    /// Run one tool call, recording failures instead of propagating them.
    ///
    /// The returned string is fed back to the model as the tool result, so
    /// the model can react to errors (e.g. ask the user for a valid id).
    async fn invoke_tool(&self, call: &ToolCall, failures: &mut Vec<ToolFailure>) -> String {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "model requested unknown tool");
            failures.push(ToolFailure {
                tool: call.name.clone(),
                message: "no such tool".to_string(),
            });
            return format!("error: no such tool '{}'", call.name);
        };

        info!(tool = %call.name, "dispatching tool call");
        match tool.execute(call.arguments.clone()).await {
            Ok(value) => value.to_string(),
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool invocation failed");
                failures.push(ToolFailure { tool: call.name.clone(), message: err.to_string() });
                format!("error: {err}")
            }
        }
    }

    fn finish(
        &self,
        text: String,
        context: &[SearchResult],
        tool_failures: Vec<ToolFailure>,
    ) -> AgentAnswer {
        let (citations, parse_failed) = match prompt::parse_citations(&text, context) {
            Ok(citations) => (citations, false),
            Err(err) => {
                warn!(error = %err, "citation parsing failed, returning raw text");
                (Vec::new(), true)
            }
        };

        let degraded = parse_failed || !tool_failures.is_empty();
        let mut text = text;
        if !tool_failures.is_empty() {
            let names: Vec<&str> = tool_failures.iter().map(|f| f.tool.as_str()).collect();
            text.push_str(&format!(
                "\n\nNote: the following tool call(s) failed: {}.",
                names.join(", ")
            ));
        }

        AgentAnswer { text, citations, tool_failures, degraded }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use wfi_rag::Chunk;

    use crate::mock::MockLlm;

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the arguments back"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn execute(&self, args: Value) -> wfi_core::Result<Value> {
            Ok(json!({ "echoed": args }))
        }
    }

    fn context(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| SearchResult {
                chunk: Chunk {
                    id: format!("doc_{i}"),
                    document_id: "doc".into(),
                    text: format!("passage {i}"),
                    start: 0,
                    end: 0,
                    embedding: Vec::new(),
                    metadata: HashMap::new(),
                },
                score: 1.0,
            })
            .collect()
    }

    fn tool_call(name: &str) -> ChatResponse {
        ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "call_1".into(),
                name: name.into(),
                arguments: json!({ "q": 1 }),
            }],
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse { content: text.into(), tool_calls: Vec::new() }
    }

    fn quick_config() -> AgentConfig {
        AgentConfig { retry_base_delay: Duration::from_millis(1), ..AgentConfig::default() }
    }

    #[tokio::test]
    async fn plain_answer_with_citations() {
        let llm = Arc::new(MockLlm::text("Remote work needs 90 days of tenure [S1]."));
        let dispatcher = AgentDispatcher::new(llm, quick_config());

        let answer = dispatcher.answer("Who can work remotely?", &context(2)).await.unwrap();
        assert!(!answer.degraded);
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].chunk_id, "doc_0");
    }

    #[tokio::test]
    async fn tool_roundtrip_feeds_result_back() {
        let llm = Arc::new(MockLlm::new(vec![
            Ok(tool_call("echo")),
            Ok(text_response("Done.")),
        ]));
        let dispatcher = AgentDispatcher::new(llm.clone(), quick_config())
            .with_tool(Arc::new(EchoTool));

        let answer = dispatcher.answer("do the thing", &[]).await.unwrap();
        assert_eq!(answer.text, "Done.");
        assert!(!answer.degraded);

        // The second request carries the tool result message.
        let requests = llm.requests().await;
        assert_eq!(requests.len(), 2);
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.tool_call_id.as_deref(), Some("call_1"));
        assert!(last.content.contains("echoed"));
    }

    #[tokio::test]
    async fn unknown_tool_degrades_but_succeeds() {
        let llm = Arc::new(MockLlm::new(vec![
            Ok(tool_call("launch_rockets")),
            Ok(text_response("I could not run that lookup.")),
        ]));
        let dispatcher =
            AgentDispatcher::new(llm, quick_config()).with_tool(Arc::new(EchoTool));

        let answer = dispatcher.answer("do the thing", &[]).await.unwrap();
        assert!(answer.degraded);
        assert_eq!(answer.tool_failures.len(), 1);
        assert_eq!(answer.tool_failures[0].tool, "launch_rockets");
        assert!(answer.text.contains("tool call(s) failed"));
    }

    #[tokio::test]
    async fn invalid_citation_falls_back_to_raw_text() {
        let llm = Arc::new(MockLlm::text("Policy says so [S9]."));
        let dispatcher = AgentDispatcher::new(llm, quick_config());

        let answer = dispatcher.answer("question", &context(1)).await.unwrap();
        assert!(answer.degraded);
        assert!(answer.citations.is_empty());
        assert_eq!(answer.text, "Policy says so [S9].");
    }

    #[tokio::test]
    async fn llm_failure_is_retried_then_surfaces() {
        let llm = Arc::new(MockLlm::new(vec![
            Err(CoreError::Llm { provider: "mock".into(), message: "down".into() }),
            Ok(text_response("Recovered.")),
        ]));
        let dispatcher = AgentDispatcher::new(llm, quick_config());
        let answer = dispatcher.answer("q", &[]).await.unwrap();
        assert_eq!(answer.text, "Recovered.");

        let llm = Arc::new(MockLlm::new(vec![
            Err(CoreError::Llm { provider: "mock".into(), message: "down".into() }),
            Err(CoreError::Llm { provider: "mock".into(), message: "down".into() }),
            Err(CoreError::Llm { provider: "mock".into(), message: "down".into() }),
        ]));
        let dispatcher = AgentDispatcher::new(llm, quick_config());
        assert!(matches!(dispatcher.answer("q", &[]).await, Err(CoreError::Llm { .. })));
    }

    #[tokio::test]
    async fn tool_round_budget_produces_degraded_answer() {
        // The model keeps asking for tools until the script runs dry.
        let script: Vec<wfi_core::Result<ChatResponse>> =
            (0..6).map(|_| Ok(tool_call("echo"))).collect();
        let llm = Arc::new(MockLlm::new(script));
        let config = AgentConfig { max_tool_rounds: 2, ..quick_config() };
        let dispatcher = AgentDispatcher::new(llm, config).with_tool(Arc::new(EchoTool));

        let answer = dispatcher.answer("loop forever", &[]).await.unwrap();
        assert!(answer.degraded);
        assert!(answer.text.contains("could not complete"));
    }
}
