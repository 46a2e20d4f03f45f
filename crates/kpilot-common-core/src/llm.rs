// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Model backend abstraction: one request in, one complete response out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::message::{Message, ToolCall};
use crate::tool::ToolDefinition;

/// A chat-completion request.
///
/// `messages` already includes the system prompt when one is used. An empty
/// `tools` list means the model is not offered any function to call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmRequest {
	pub model: String,
	pub messages: Vec<Message>,
	pub tools: Vec<ToolDefinition>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f32>,
}

impl LlmRequest {
	pub fn new(model: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			messages: Vec::new(),
			tools: Vec::new(),
			max_tokens: None,
			temperature: None,
		}
	}

	pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
		self.messages = messages;
		self
	}

	pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
		self.tools = tools;
		self
	}

	pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
		self.max_tokens = Some(max_tokens);
		self
	}

	pub fn with_temperature(mut self, temperature: f32) -> Self {
		self.temperature = Some(temperature);
		self
	}
}

/// The model's answer: either plain content or a batch of tool calls
/// (possibly alongside some content).
#[derive(Clone, Debug)]
pub struct LlmResponse {
	pub message: Message,
	pub tool_calls: Vec<ToolCall>,
	pub usage: Option<Usage>,
	pub finish_reason: Option<String>,
}

impl LlmResponse {
	/// A content-only response, mostly useful for fakes.
	pub fn text(content: impl Into<String>) -> Self {
		Self {
			message: Message::assistant(content),
			tool_calls: Vec::new(),
			usage: None,
			finish_reason: Some("stop".to_string()),
		}
	}

	/// A response requesting the given tool calls.
	pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
		Self {
			message: Message::assistant_with_tool_calls(content, tool_calls.clone()),
			tool_calls,
			usage: None,
			finish_reason: Some("tool_calls".to_string()),
		}
	}

	pub fn has_tool_calls(&self) -> bool {
		!self.tool_calls.is_empty()
	}
}

/// Token usage statistics reported by the backend.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Usage {
	pub input_tokens: u32,
	pub output_tokens: u32,
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
	/// Sends a completion request and waits for the full response.
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn builder_sets_fields() {
		let request = LlmRequest::new("openai/gpt-oss-120b")
			.with_messages(vec![Message::user("list pods")])
			.with_tools(vec![ToolDefinition::new("list_pods", "List pods", json!({}))])
			.with_max_tokens(512)
			.with_temperature(0.2);

		assert_eq!(request.model, "openai/gpt-oss-120b");
		assert_eq!(request.messages.len(), 1);
		assert_eq!(request.tools.len(), 1);
		assert_eq!(request.max_tokens, Some(512));
		assert_eq!(request.temperature, Some(0.2));
	}

	#[test]
	fn tool_call_response_mirrors_calls_in_message() {
		let calls = vec![ToolCall::new("a", "list_pods", json!({}))];
		let response = LlmResponse::with_tool_calls("", calls.clone());

		assert!(response.has_tool_calls());
		assert_eq!(response.message.tool_calls, calls);
		assert!(!LlmResponse::text("done").has_tool_calls());
	}
}
