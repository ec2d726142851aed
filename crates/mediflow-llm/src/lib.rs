//! Mediflow LLM crate - chat-completion client with function calling.
//!
//! Provides a trait-based abstraction over an OpenAI-compatible
//! chat-completion endpoint, the wire message types, the three scheduling
//! tool schemas, and a mock implementation for testing without a network.

mod client;
mod error;
mod tools;

pub use client::OpenAiClient;
pub use error::LlmError;
pub use tools::tool_schemas;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Wire types
// =============================================================================

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

/// The function invocation inside a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the provider sent it.
    pub arguments: String,
}

/// A structured request from the completion service to invoke a local tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn new(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: function_type(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }
}

/// One message in a conversation transcript, in the provider's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self::text(ChatRole::System, content)
    }

    pub fn user(content: &str) -> Self {
        Self::text(ChatRole::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::text(ChatRole::Assistant, content)
    }

    /// An assistant message carrying tool-call requests and no text.
    pub fn assistant_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: None,
            tool_calls,
            tool_call_id: None,
        }
    }

    /// A tool-result message answering the given tool call.
    pub fn tool_result(tool_call_id: &str, content: &str) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }

    fn text(role: ChatRole, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

/// The completion service's reply for one round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionReply {
    /// Assistant text, when the reply is (or includes) plain text.
    pub content: Option<String>,
    /// Requested tool invocations; empty for a plain-text reply.
    pub tool_calls: Vec<ToolCall>,
}

impl CompletionReply {
    pub fn text(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool(calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls: calls,
        }
    }

    /// Whether this reply requests tool invocations.
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Service producing chat completions with optional function calling.
#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Send the full transcript plus tool schemas, returning the reply.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[serde_json::Value],
    ) -> Result<CompletionReply, LlmError>;
}

// =============================================================================
// Mock implementation
// =============================================================================

/// Scripted completion service for tests.
///
/// Pops queued replies in order; once the queue is drained, every further
/// call returns a clone of the fallback reply. Counts round trips so tests
/// can assert the orchestration loop's bound.
pub struct MockCompletionService {
    replies: Mutex<VecDeque<CompletionReply>>,
    fallback: CompletionReply,
    calls: AtomicUsize,
}

impl MockCompletionService {
    /// Replies served in order, then the fallback forever.
    pub fn scripted(replies: Vec<CompletionReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: CompletionReply::text("How else can I help?"),
            calls: AtomicUsize::new(0),
        }
    }

    /// The same reply for every call (e.g. a tool request, forever).
    pub fn always(reply: CompletionReply) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of round trips served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletionService for MockCompletionService {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[serde_json::Value],
    ) -> Result<CompletionReply, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| self.fallback.clone());
        Ok(reply)
    }
}
