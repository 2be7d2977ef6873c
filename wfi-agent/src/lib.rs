//! Chat agent for workforce intelligence.
//!
//! The [`AgentDispatcher`] glues the pieces together: it renders retrieved
//! context into the system prompt, runs the LLM conversation, dispatches
//! the model's tool calls against a closed registry, and resolves citation
//! markers in the final answer.
//!
//! Tool failures do not fail the conversation. The error is fed back to the
//! model as the tool result, recorded on the answer, and the answer is
//! marked degraded.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wfi_agent::{AgentConfig, AgentDispatcher, OpenAiChatModel};
//!
//! # async fn run() -> wfi_core::Result<()> {
//! let llm = Arc::new(OpenAiChatModel::from_env()?);
//! let dispatcher = AgentDispatcher::new(llm, AgentConfig::default());
//! let answer = dispatcher.answer("Summarise the remote work policy.", &[]).await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod mock;
pub mod openai;
pub mod prompt;

pub use dispatcher::{AgentAnswer, AgentConfig, AgentDispatcher, ToolFailure};
pub use mock::MockLlm;
pub use openai::OpenAiChatModel;
pub use prompt::{Citation, parse_citations, render_context, system_prompt};
