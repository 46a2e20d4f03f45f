// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Conversation messages exchanged with the model.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// Only ever prepended to a request, never stored in history.
	System,
	User,
	Assistant,
	/// The result of one requested tool call.
	Tool,
}

/// A tool call requested by the model.
///
/// `id` is the model-assigned call identifier; the matching tool message
/// carries it back so results can be correlated with requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
	pub id: String,
	pub name: String,
	pub arguments: serde_json::Value,
}

impl ToolCall {
	pub fn new(
		id: impl Into<String>,
		name: impl Into<String>,
		arguments: serde_json::Value,
	) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			arguments,
		}
	}
}

/// A single entry in a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	pub content: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tool_calls: Vec<ToolCall>,
}

impl Message {
	fn with_role(role: Role, content: impl Into<String>) -> Self {
		Self {
			role,
			content: content.into(),
			tool_call_id: None,
			name: None,
			tool_calls: Vec::new(),
		}
	}

	pub fn system(content: impl Into<String>) -> Self {
		Self::with_role(Role::System, content)
	}

	pub fn user(content: impl Into<String>) -> Self {
		Self::with_role(Role::User, content)
	}

	pub fn assistant(content: impl Into<String>) -> Self {
		Self::with_role(Role::Assistant, content)
	}

	/// An assistant message that asks for one or more tool calls.
	pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
		Self {
			tool_calls,
			..Self::with_role(Role::Assistant, content)
		}
	}

	/// The result of the tool call identified by `call`.
	pub fn tool_result(call: &ToolCall, content: impl Into<String>) -> Self {
		Self {
			tool_call_id: Some(call.id.clone()),
			name: Some(call.name.clone()),
			..Self::with_role(Role::Tool, content)
		}
	}

	/// True for assistant messages carrying tool calls.
	pub fn requests_tools(&self) -> bool {
		self.role == Role::Assistant && !self.tool_calls.is_empty()
	}
}
