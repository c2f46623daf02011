// ABOUTME: LLM gateway abstraction for the resolution pipeline
// ABOUTME: Defines message/request/outcome types, tool specs, and the LlmGateway trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # LLM Gateway Service Provider Interface
//!
//! The gateway is a stateless transport: one request in, one outcome out.
//! Conversation continuity lives entirely in the provider-held
//! [`ConversationHandle`] returned by every call; the caller threads it into
//! the next request. The gateway never executes tools; when the model
//! requests one, the invocation is surfaced for the pipeline to resolve.
//!
//! ## Example
//!
//! ```rust,no_run
//! use macrolog::llm::{ChatMessage, GatewayRequest, LlmGateway, OpenAiResponsesProvider};
//!
//! async fn example(gateway: &dyn LlmGateway) {
//!     let request = GatewayRequest::new("gpt-4o-mini", "You are a nutrition assistant.")
//!         .with_message(ChatMessage::user("2 eggs and toast"));
//!     let outcome = gateway.call(&request).await;
//! }
//! ```

mod openai;
pub mod contract;
pub mod prompts;

pub use openai::OpenAiResponsesProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

// ============================================================================
// Capability Flags
// ============================================================================

bitflags::bitflags! {
    /// Gateway capability flags
    ///
    /// Indicates which features a provider supports, used to decide whether a
    /// tool-advertising request can be sent at all.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GatewayCapabilities: u8 {
        /// Provider supports function/tool calling
        const FUNCTION_CALLING = 0b0000_0001;
        /// Provider supports instructions separate from user content
        const SYSTEM_INSTRUCTIONS = 0b0000_0010;
        /// Provider retains conversation state behind a response handle
        const CONVERSATION_STATE = 0b0000_0100;
        /// Provider supports JSON mode output
        const JSON_MODE = 0b0000_1000;
    }
}

impl GatewayCapabilities {
    /// Check if function calling is supported
    #[must_use]
    pub const fn supports_function_calling(&self) -> bool {
        self.contains(Self::FUNCTION_CALLING)
    }

    /// Check if provider-held conversation state is supported
    #[must_use]
    pub const fn supports_conversation_state(&self) -> bool {
        self.contains(Self::CONVERSATION_STATE)
    }
}

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Conversation Handle
// ============================================================================

/// Opaque provider-held conversation token.
///
/// This is a capability token owned by the LLM provider, not application
/// state: threading it into the next call resumes the same reasoning context
/// without resending history. Handles must never be reused across concurrent
/// runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHandle(String);

impl ConversationHandle {
    /// Wrap a raw provider response id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw provider-side id
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConversationHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ConversationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// Declaration of a callable function advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameters schema (JSON Schema format)
    pub parameters: serde_json::Value,
}

/// A tool invocation requested by the model.
///
/// The gateway surfaces these; resolving them (and feeding the output back
/// via [`ToolOutput`]) is the pipeline's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the requested function
    pub name: String,
    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
    /// Provider-side call id, echoed back with the output
    pub call_id: String,
}

/// Output of an executed tool call, fed back on the next gateway request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The call id this output answers
    pub call_id: String,
    /// Serialized tool result
    pub output: String,
}

// ============================================================================
// Request/Outcome Types
// ============================================================================

/// A single gateway call
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    /// Model identifier
    pub model: String,
    /// System instructions, always sent distinct from user content
    pub instructions: String,
    /// Conversation messages for this call
    pub messages: Vec<ChatMessage>,
    /// Handle from the previous call in this run, if any
    pub conversation: Option<ConversationHandle>,
    /// Functions the model may invoke
    pub tools: Vec<FunctionSpec>,
    /// Outputs of previously surfaced tool calls
    pub tool_outputs: Vec<ToolOutput>,
}

impl GatewayRequest {
    /// Create a request with a model and system instructions
    #[must_use]
    pub fn new(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            messages: Vec::new(),
            conversation: None,
            tools: Vec::new(),
            tool_outputs: Vec::new(),
        }
    }

    /// Append a message
    #[must_use]
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Append several messages
    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Thread the handle from the previous call
    #[must_use]
    pub fn with_conversation(mut self, handle: Option<ConversationHandle>) -> Self {
        self.conversation = handle;
        self
    }

    /// Advertise a callable tool
    #[must_use]
    pub fn with_tool(mut self, tool: FunctionSpec) -> Self {
        self.tools.push(tool);
        self
    }

    /// Attach an executed tool call's output
    #[must_use]
    pub fn with_tool_output(mut self, output: ToolOutput) -> Self {
        self.tool_outputs.push(output);
        self
    }
}

/// Result of one gateway call: a text reply or a tool invocation, plus the
/// fresh conversation handle for the next call.
#[derive(Debug, Clone)]
pub struct GatewayOutcome {
    /// Plain text output, if the model replied with text
    pub text: Option<String>,
    /// Tool invocation, if the model requested one
    pub tool_call: Option<ToolInvocation>,
    /// Fresh handle; thread into the next call to preserve context
    pub conversation: ConversationHandle,
}

impl GatewayOutcome {
    /// Check whether the model requested a tool call
    #[must_use]
    pub fn has_tool_call(&self) -> bool {
        self.tool_call.is_some()
    }

    /// The text output, if present
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

// ============================================================================
// Gateway Trait
// ============================================================================

/// Stateless LLM transport.
///
/// Implementations issue exactly one provider request per [`call`]: no
/// caching, no retry beyond what the HTTP layer guarantees. Transport
/// failures, non-2xx responses, and malformed payloads surface as errors;
/// the pipeline decides whether they are fatal for the current item.
///
/// [`call`]: LlmGateway::call
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Unique provider identifier (e.g. "openai")
    fn name(&self) -> &'static str;

    /// Provider capabilities
    fn capabilities(&self) -> GatewayCapabilities;

    /// Default model to use if not specified in the request
    fn default_model(&self) -> &str;

    /// Perform a single call
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or a payload
    /// that cannot be interpreted as text or a tool invocation.
    async fn call(&self, request: &GatewayRequest) -> AppResult<GatewayOutcome>;
}

#[async_trait]
impl<T: LlmGateway + ?Sized> LlmGateway for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capabilities(&self) -> GatewayCapabilities {
        (**self).capabilities()
    }

    fn default_model(&self) -> &str {
        (**self).default_model()
    }

    async fn call(&self, request: &GatewayRequest) -> AppResult<GatewayOutcome> {
        (**self).call(request).await
    }
}
