// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

/// A callable function advertised to the model.
///
/// `parameters` is a JSON Schema object describing the accepted arguments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
	pub name: String,
	pub description: String,
	pub parameters: serde_json::Value,
}

impl ToolDefinition {
	pub fn new(
		name: impl Into<String>,
		description: impl Into<String>,
		parameters: serde_json::Value,
	) -> Self {
		let name = name.into();
		tracing::trace!(tool_name = %name, "creating tool definition");
		Self {
			name,
			description: description.into(),
			parameters,
		}
	}

	/// Names listed under the schema's `required` key.
	pub fn required(&self) -> Vec<&str> {
		self
			.parameters
			.get("required")
			.and_then(|r| r.as_array())
			.map(|items| items.iter().filter_map(|v| v.as_str()).collect())
			.unwrap_or_default()
	}
}
