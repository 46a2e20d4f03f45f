// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Chat completion wire types and conversions.

use kpilot_common_config::{SecretString, DEFAULT_BASE_URL};
use kpilot_common_core::{LlmError, LlmRequest, LlmResponse, Message, Role, ToolCall, ToolDefinition, Usage};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for the OpenAI-compatible client.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
	pub api_key: SecretString,
	pub base_url: String,
}

impl OpenAIConfig {
	pub fn new(api_key: SecretString) -> Self {
		Self {
			api_key,
			base_url: DEFAULT_BASE_URL.to_string(),
		}
	}

	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	pub fn completions_url(&self) -> String {
		format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
	}
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIRequest {
	pub model: String,
	pub messages: Vec<OpenAIMessage>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub tools: Vec<OpenAITool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
	pub role: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIToolCall {
	pub id: String,
	#[serde(rename = "type", default = "function_type")]
	pub call_type: String,
	pub function: OpenAIFunctionCall,
}

fn function_type() -> String {
	"function".to_string()
}

/// `arguments` is a JSON document encoded as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIFunctionCall {
	pub name: String,
	#[serde(default)]
	pub arguments: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAITool {
	#[serde(rename = "type")]
	pub tool_type: String,
	pub function: OpenAIFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAIFunction {
	pub name: String,
	pub description: String,
	pub parameters: Value,
}

/// Chat completion response. Compatible servers differ in which envelope
/// fields they send, so only `choices` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub model: String,
	pub choices: Vec<OpenAIChoice>,
	#[serde(default)]
	pub usage: Option<OpenAIUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
	#[serde(default)]
	pub index: u32,
	pub message: OpenAIMessage,
	#[serde(default)]
	pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIUsage {
	pub prompt_tokens: u32,
	pub completion_tokens: u32,
	#[serde(default)]
	pub total_tokens: u32,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIError {
	pub error: OpenAIErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorDetail {
	pub message: String,
	#[serde(rename = "type", default)]
	pub error_type: Option<String>,
}

fn encode_arguments(arguments: &Value) -> String {
	match arguments {
		// Unparseable arguments were kept verbatim on the way in.
		Value::String(raw) => raw.clone(),
		other => other.to_string(),
	}
}

/// Empty arguments mean "no arguments"; anything that is not valid JSON is
/// passed through as a string so the executor can reject it.
pub fn decode_arguments(raw: &str) -> Value {
	if raw.trim().is_empty() {
		return Value::Object(Default::default());
	}
	serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl From<&ToolCall> for OpenAIToolCall {
	fn from(call: &ToolCall) -> Self {
		Self {
			id: call.id.clone(),
			call_type: function_type(),
			function: OpenAIFunctionCall {
				name: call.name.clone(),
				arguments: encode_arguments(&call.arguments),
			},
		}
	}
}

impl From<&Message> for OpenAIMessage {
	fn from(msg: &Message) -> Self {
		let role = match msg.role {
			Role::System => "system",
			Role::User => "user",
			Role::Assistant => "assistant",
			Role::Tool => "tool",
		};

		let tool_calls = if msg.tool_calls.is_empty() {
			None
		} else {
			Some(msg.tool_calls.iter().map(OpenAIToolCall::from).collect())
		};

		// Assistant turns that only request tools carry no content.
		let content = if msg.content.is_empty() && tool_calls.is_some() {
			None
		} else {
			Some(msg.content.clone())
		};

		Self {
			role: role.to_string(),
			content,
			name: msg.name.clone(),
			tool_call_id: msg.tool_call_id.clone(),
			tool_calls,
		}
	}
}

impl From<&ToolDefinition> for OpenAITool {
	fn from(tool: &ToolDefinition) -> Self {
		Self {
			tool_type: function_type(),
			function: OpenAIFunction {
				name: tool.name.clone(),
				description: tool.description.clone(),
				parameters: tool.parameters.clone(),
			},
		}
	}
}

impl From<&LlmRequest> for OpenAIRequest {
	fn from(request: &LlmRequest) -> Self {
		Self {
			model: request.model.clone(),
			messages: request.messages.iter().map(OpenAIMessage::from).collect(),
			max_tokens: request.max_tokens,
			temperature: request.temperature,
			tools: request.tools.iter().map(OpenAITool::from).collect(),
			tool_choice: if request.tools.is_empty() {
				None
			} else {
				Some("auto".to_string())
			},
		}
	}
}

impl TryFrom<OpenAIResponse> for LlmResponse {
	type Error = LlmError;

	fn try_from(response: OpenAIResponse) -> Result<Self, Self::Error> {
		let choice = response
			.choices
			.into_iter()
			.next()
			.ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))?;

		let content = choice.message.content.unwrap_or_default();
		let tool_calls: Vec<ToolCall> = choice
			.message
			.tool_calls
			.unwrap_or_default()
			.into_iter()
			.map(|tc| ToolCall::new(tc.id, tc.function.name, decode_arguments(&tc.function.arguments)))
			.collect();

		let usage = response.usage.map(|u| Usage {
			input_tokens: u.prompt_tokens,
			output_tokens: u.completion_tokens,
		});

		Ok(Self {
			message: Message::assistant_with_tool_calls(content, tool_calls.clone()),
			tool_calls,
			usage,
			finish_reason: choice.finish_reason,
		})
	}
}
