// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Typed descriptions of operations and their parameters.

use std::fmt;

use kpilot_common_core::ToolDefinition;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
	String,
	Integer,
	Object,
	Boolean,
}

impl ParamType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ParamType::String => "string",
			ParamType::Integer => "integer",
			ParamType::Object => "object",
			ParamType::Boolean => "boolean",
		}
	}

	/// Whether `value` has this JSON type. Integers must be whole numbers
	/// that fit in an `i64`.
	pub fn accepts(&self, value: &Value) -> bool {
		match self {
			ParamType::String => value.is_string(),
			ParamType::Integer => value.is_i64(),
			ParamType::Object => value.is_object(),
			ParamType::Boolean => value.is_boolean(),
		}
	}
}

impl fmt::Display for ParamType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterSpec {
	pub name: String,
	#[serde(rename = "type")]
	pub param_type: ParamType,
	pub description: String,
	pub required: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
}

impl ParameterSpec {
	pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
		Self {
			name: name.to_string(),
			param_type,
			description: description.to_string(),
			required: true,
			default: None,
		}
	}

	pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
		Self {
			required: false,
			..Self::required(name, param_type, description)
		}
	}

	pub fn with_default(mut self, default: impl Into<Value>) -> Self {
		self.default = Some(default.into());
		self
	}

	fn schema(&self) -> Value {
		let mut schema = Map::new();
		schema.insert("type".into(), json!(self.param_type.as_str()));
		schema.insert("description".into(), json!(self.description));
		if let Some(default) = &self.default {
			schema.insert("default".into(), default.clone());
		}
		Value::Object(schema)
	}
}

/// Name, description and ordered parameters of one operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationSpec {
	pub name: String,
	pub description: String,
	pub parameters: Vec<ParameterSpec>,
}

impl OperationSpec {
	pub fn new(name: &str, description: &str) -> Self {
		Self {
			name: name.to_string(),
			description: description.to_string(),
			parameters: Vec::new(),
		}
	}

	pub fn param(mut self, parameter: ParameterSpec) -> Self {
		self.parameters.push(parameter);
		self
	}

	/// Shorthand for the optional `namespace` parameter most operations take.
	pub fn namespaced(self, what: &str) -> Self {
		self.param(
			ParameterSpec::optional(
				"namespace",
				ParamType::String,
				&format!("Kubernetes namespace {what}"),
			)
			.with_default("default"),
		)
	}

	pub fn required_names(&self) -> Vec<&str> {
		self
			.parameters
			.iter()
			.filter(|p| p.required)
			.map(|p| p.name.as_str())
			.collect()
	}

	/// JSON Schema for the argument object.
	pub fn input_schema(&self) -> Value {
		let properties: Map<String, Value> = self
			.parameters
			.iter()
			.map(|p| (p.name.clone(), p.schema()))
			.collect();
		json!({
			"type": "object",
			"properties": properties,
			"required": self.required_names(),
		})
	}

	pub fn to_definition(&self) -> ToolDefinition {
		ToolDefinition::new(&self.name, &self.description, self.input_schema())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scale() -> OperationSpec {
		OperationSpec::new("scale_deployment", "Scale a deployment")
			.param(ParameterSpec::required("name", ParamType::String, "Deployment name"))
			.param(ParameterSpec::required("replicas", ParamType::Integer, "Replica count"))
			.namespaced("of the deployment")
	}

	#[test]
	fn schema_lists_required_and_defaults() {
		let schema = scale().input_schema();
		assert_eq!(schema["type"], "object");
		assert_eq!(schema["required"], json!(["name", "replicas"]));
		assert_eq!(schema["properties"]["replicas"]["type"], "integer");
		assert_eq!(schema["properties"]["namespace"]["default"], "default");
		assert!(schema["properties"]["name"].get("default").is_none());
	}

	#[test]
	fn definition_required_matches_spec() {
		let spec = scale();
		let definition = spec.to_definition();
		assert_eq!(definition.name, "scale_deployment");
		assert_eq!(definition.required(), spec.required_names());
	}

	#[test]
	fn integer_type_rejects_floats_and_strings() {
		assert!(ParamType::Integer.accepts(&json!(3)));
		assert!(!ParamType::Integer.accepts(&json!(3.5)));
		assert!(!ParamType::Integer.accepts(&json!("3")));
		assert!(ParamType::Integer.accepts(&json!(i64::MAX)));
		assert!(!ParamType::Integer.accepts(&json!(i64::MAX as u64 + 1)));
		assert!(ParamType::Object.accepts(&json!({})));
		assert!(!ParamType::Object.accepts(&json!([])));
	}
}
