//! # wfi-core
//!
//! Shared building blocks for the Workforce Intelligence (WFI) services:
//!
//! - [`CoreError`] — the error taxonomy the HTTP layer maps to status codes
//! - [`Tool`] — named callables the chat agent can invoke mid-reasoning
//! - [`Llm`] — the request/response language-model interface
//! - [`retry`] — bounded backoff for network-facing calls
//!
//! Services take their dependencies explicitly (behind `Arc<dyn Trait>`)
//! rather than through ambient singletons, so every external call site can
//! be swapped for an in-memory fake in tests.

pub mod error;
pub mod llm;
pub mod retry;
pub mod tool;

pub use error::{CoreError, Result};
pub use llm::{ChatMessage, ChatRequest, ChatResponse, GenerationConfig, Llm, Role, ToolCall};
pub use retry::{RetryPolicy, with_backoff};
pub use tool::{Tool, ToolDescriptor};
