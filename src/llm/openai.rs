// ABOUTME: OpenAI Responses API implementation of the LlmGateway trait
// ABOUTME: Threads previous_response_id as the conversation handle and surfaces tool calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Macrolog Contributors

//! # OpenAI Responses Provider
//!
//! Implementation of [`LlmGateway`] against the OpenAI Responses API.
//!
//! ## Configuration
//!
//! Set the `OPENAI_API_KEY` environment variable. The base URL can be
//! overridden via `MACROLOG_LLM_BASE_URL` for proxies or compatible local
//! gateways.
//!
//! ## Conversation state
//!
//! Every response carries an id; sending it back as `previous_response_id`
//! resumes the provider-held context. The provider itself keeps no local
//! session state.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, warn};

use super::{
    ConversationHandle, FunctionSpec, GatewayCapabilities, GatewayOutcome, GatewayRequest,
    LlmGateway, ToolInvocation,
};
use crate::config::LlmConfig;
use crate::errors::AppError;

/// Default model when the request leaves it unset
const DEFAULT_MODEL: &str = "gpt-4o-mini";

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Responses API request body
#[derive(Debug, Serialize)]
struct ResponsesRequest {
    model: String,
    instructions: String,
    input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

/// One input item: a role-tagged message or a tool-call output
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum InputItem {
    Message {
        role: String,
        content: String,
    },
    FunctionCallOutput {
        #[serde(rename = "type")]
        kind: &'static str,
        call_id: String,
        output: String,
    },
}

/// Function tool definition in Responses API format
#[derive(Debug, Serialize)]
struct ToolDefinition {
    #[serde(rename = "type")]
    kind: &'static str,
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&FunctionSpec> for ToolDefinition {
    fn from(spec: &FunctionSpec) -> Self {
        Self {
            kind: "function",
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        }
    }
}

/// Responses API response body
#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    id: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

/// One output item; `kind` distinguishes messages from function calls.
///
/// Unknown kinds (reasoning traces, annotations) are skipped rather than
/// rejected.
#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<Vec<ContentPart>>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
    #[serde(default)]
    call_id: Option<String>,
}

/// Part of a message output
#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenAI Responses API gateway
pub struct OpenAiResponsesProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiResponsesProvider {
    /// Create a provider from an [`LlmConfig`]
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                AppError::internal(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            default_model: config.fast_model.clone(),
        })
    }

    /// Create a provider from environment configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self, AppError> {
        let config = LlmConfig::from_env()?;
        Self::new(&config)
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Convert a gateway request into the Responses API body
    fn build_request_body(&self, request: &GatewayRequest) -> ResponsesRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let mut input: Vec<InputItem> = request
            .messages
            .iter()
            .map(|msg| InputItem::Message {
                role: msg.role.as_str().to_owned(),
                content: msg.content.clone(),
            })
            .collect();

        for tool_output in &request.tool_outputs {
            input.push(InputItem::FunctionCallOutput {
                kind: "function_call_output",
                call_id: tool_output.call_id.clone(),
                output: tool_output.output.clone(),
            });
        }

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(request.tools.iter().map(ToolDefinition::from).collect())
        };
        let tool_choice = tools.as_ref().map(|_| "auto".to_owned());

        ResponsesRequest {
            model,
            instructions: request.instructions.clone(),
            input,
            previous_response_id: request
                .conversation
                .as_ref()
                .map(|handle| handle.as_str().to_owned()),
            tools,
            tool_choice,
        }
    }

    /// Parse error response from the OpenAI API
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let error_type = error_response
                .error
                .error_type
                .unwrap_or_else(|| "unknown".to_owned());

            match status.as_u16() {
                401 => AppError::external_auth(
                    "OpenAI",
                    format!("authentication failed: {}", error_response.error.message),
                ),
                429 => AppError::external_service(
                    "OpenAI",
                    format!("rate limit exceeded: {}", error_response.error.message),
                ),
                400 => AppError::invalid_input(format!(
                    "OpenAI API validation error: {}",
                    error_response.error.message
                )),
                _ => AppError::external_service(
                    "OpenAI",
                    format!("{} - {}", error_type, error_response.error.message),
                ),
            }
        } else {
            AppError::external_service(
                "OpenAI",
                format!(
                    "API error ({}): {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            )
        }
    }

    /// Pull the first text output and the first tool call out of the payload
    fn interpret_output(response: ResponsesResponse) -> GatewayOutcome {
        let mut text: Option<String> = None;
        let mut tool_call: Option<ToolInvocation> = None;

        for item in response.output {
            match item.kind.as_str() {
                "message" => {
                    if text.is_none() {
                        text = item.content.and_then(|parts| {
                            parts
                                .into_iter()
                                .find(|part| part.kind == "output_text")
                                .and_then(|part| part.text)
                                .map(|t| t.trim().to_owned())
                        });
                    }
                }
                "function_call" => {
                    if tool_call.is_none() {
                        let arguments = item
                            .arguments
                            .as_deref()
                            .and_then(|raw| serde_json::from_str(raw).ok())
                            .unwrap_or_else(|| serde_json::json!({}));

                        tool_call = Some(ToolInvocation {
                            name: item.name.unwrap_or_default(),
                            arguments,
                            call_id: item.call_id.unwrap_or_default(),
                        });
                    }
                }
                other => {
                    debug!("Skipping unhandled output item type: {other}");
                }
            }
        }

        GatewayOutcome {
            text,
            tool_call,
            conversation: ConversationHandle::new(response.id),
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiResponsesProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn capabilities(&self) -> GatewayCapabilities {
        GatewayCapabilities::FUNCTION_CALLING
            | GatewayCapabilities::SYSTEM_INSTRUCTIONS
            | GatewayCapabilities::CONVERSATION_STATE
            | GatewayCapabilities::JSON_MODE
    }

    fn default_model(&self) -> &str {
        if self.default_model.is_empty() {
            DEFAULT_MODEL
        } else {
            &self.default_model
        }
    }

    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    async fn call(&self, request: &GatewayRequest) -> Result<GatewayOutcome, AppError> {
        debug!("Sending request to OpenAI Responses API");

        let body = self.build_request_body(request);

        let response = self
            .client
            .post(self.api_url("responses"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenAI API: {}", e);
                AppError::external_service("OpenAI", format!("Failed to connect: {e}"))
            })?;

        let status = response.status();
        let payload = response.text().await.map_err(|e| {
            error!("Failed to read OpenAI API response: {}", e);
            AppError::external_service("OpenAI", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &payload));
        }

        let parsed: ResponsesResponse = serde_json::from_str(&payload).map_err(|e| {
            error!("Failed to parse OpenAI API response: {}", e);
            AppError::external_service("OpenAI", format!("Failed to parse response: {e}"))
        })?;

        let outcome = Self::interpret_output(parsed);

        if outcome.text.is_none() && outcome.tool_call.is_none() {
            warn!("OpenAI response contained neither text nor a tool call");
        }

        debug!(
            has_text = outcome.text.is_some(),
            has_tool_call = outcome.tool_call.is_some(),
            "Received response from OpenAI"
        );

        Ok(outcome)
    }
}
