// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Uniform result of one operation: `data` when it succeeded, `error` when
/// it did not, never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl ResultEnvelope {
	pub fn ok(data: Value) -> Self {
		Self {
			success: true,
			data: Some(data),
			error: None,
		}
	}

	pub fn failure(error: impl Into<String>) -> Self {
		Self {
			success: false,
			data: None,
			error: Some(error.into()),
		}
	}

	pub fn is_success(&self) -> bool {
		self.success
	}

	/// The text placed in a tool-result message.
	pub fn to_json_string(&self) -> String {
		serde_json::to_string(self).unwrap_or_else(|e| {
			format!(r#"{{"success":false,"error":"failed to encode result: {e}"}}"#)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn success_has_data_only() {
		let value = serde_json::to_value(ResultEnvelope::ok(json!([1, 2]))).unwrap();
		assert_eq!(value, json!({"success": true, "data": [1, 2]}));
	}

	#[test]
	fn failure_has_error_only() {
		let envelope = ResultEnvelope::failure("unknown tool: x");
		assert!(!envelope.is_success());
		assert_eq!(
			envelope.to_json_string(),
			r#"{"success":false,"error":"unknown tool: x"}"#
		);
	}

	#[test]
	fn parses_back() {
		let envelope = ResultEnvelope::ok(json!({"logs": "hi\n"}));
		let parsed: ResultEnvelope = serde_json::from_str(&envelope.to_json_string()).unwrap();
		assert_eq!(parsed, envelope);
	}
}
