// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Argument binding: defaults, presence and type checks against an
//! [`OperationSpec`], before anything reaches the cluster.

use std::collections::BTreeMap;

use kpilot_common_core::ToolError;
use serde_json::{Map, Value};

use crate::spec::{OperationSpec, ParamType};

/// Arguments that passed validation for one operation.
///
/// Holds only declared parameters. Every required parameter and every
/// optional one with a default is present.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Arguments {
	values: Map<String, Value>,
}

impl Arguments {
	/// Validates `raw` against `spec`.
	///
	/// `null` counts as an empty object, and a `null` parameter counts as
	/// absent. Undeclared keys are dropped.
	pub fn bind(spec: &OperationSpec, raw: &Value) -> Result<Self, ToolError> {
		let empty = Map::new();
		let supplied = match raw {
			Value::Object(map) => map,
			Value::Null => &empty,
			Value::String(text) => {
				return Err(ToolError::InvalidArguments(format!("could not parse {text:?} as a JSON object")))
			}
			other => {
				return Err(ToolError::InvalidArguments(format!(
					"expected a JSON object, got {}",
					json_type(other)
				)))
			}
		};

		let mut values = Map::new();
		for param in &spec.parameters {
			let value = match supplied.get(&param.name).filter(|v| !v.is_null()) {
				Some(value) => value.clone(),
				None => match (&param.default, param.required) {
					(Some(default), _) => default.clone(),
					(None, true) => return Err(ToolError::MissingArgument(param.name.clone())),
					(None, false) => continue,
				},
			};
			if !param.param_type.accepts(&value) {
				return Err(ToolError::InvalidArgument {
					name: param.name.clone(),
					expected: param.param_type.to_string(),
				});
			}
			values.insert(param.name.clone(), value);
		}

		Ok(Self { values })
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	pub fn str(&self, name: &str) -> Result<&str, ToolError> {
		self.opt_str(name).ok_or_else(|| ToolError::MissingArgument(name.to_string()))
	}

	pub fn opt_str(&self, name: &str) -> Option<&str> {
		self.values.get(name).and_then(Value::as_str)
	}

	pub fn int(&self, name: &str) -> Result<i64, ToolError> {
		self.opt_int(name).ok_or_else(|| ToolError::MissingArgument(name.to_string()))
	}

	pub fn opt_int(&self, name: &str) -> Option<i64> {
		self.values.get(name).and_then(Value::as_i64)
	}

	/// An integer that must fit Kubernetes' 32-bit fields.
	pub fn int32(&self, name: &str) -> Result<i32, ToolError> {
		narrow(name, self.int(name)?)
	}

	pub fn opt_int32(&self, name: &str) -> Result<Option<i32>, ToolError> {
		self.opt_int(name).map(|v| narrow(name, v)).transpose()
	}

	/// A string-to-string mapping. Non-string values are rendered as JSON
	/// text, so `{"PORT": 8080}` becomes `PORT=8080`.
	pub fn string_map(&self, name: &str) -> Result<BTreeMap<String, String>, ToolError> {
		self.opt_string_map(name)
			.ok_or_else(|| ToolError::MissingArgument(name.to_string()))
	}

	pub fn opt_string_map(&self, name: &str) -> Option<BTreeMap<String, String>> {
		let object = self.values.get(name)?.as_object()?;
		Some(
			object
				.iter()
				.map(|(k, v)| {
					let text = match v {
						Value::String(s) => s.clone(),
						other => other.to_string(),
					};
					(k.clone(), text)
				})
				.collect(),
		)
	}
}

fn narrow(name: &str, value: i64) -> Result<i32, ToolError> {
	i32::try_from(value).map_err(|_| ToolError::InvalidArgument {
		name: name.to_string(),
		expected: "32-bit integer".to_string(),
	})
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => ParamType::Boolean.as_str(),
		Value::Number(_) => "number",
		Value::String(_) => ParamType::String.as_str(),
		Value::Array(_) => "array",
		Value::Object(_) => ParamType::Object.as_str(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::spec::ParameterSpec;
	use proptest::prelude::*;
	use serde_json::json;

	fn logs_spec() -> OperationSpec {
		OperationSpec::new("get_pod_logs", "Get logs")
			.param(ParameterSpec::required("name", ParamType::String, "Pod"))
			.namespaced("of the pod")
			.param(ParameterSpec::optional("tail_lines", ParamType::Integer, "Lines").with_default(100))
			.param(ParameterSpec::optional("labels", ParamType::Object, "Labels"))
	}

	#[test]
	fn defaults_fill_missing_optionals() {
		let args = Arguments::bind(&logs_spec(), &json!({"name": "web-1"})).unwrap();
		assert_eq!(args.str("name").unwrap(), "web-1");
		assert_eq!(args.str("namespace").unwrap(), "default");
		assert_eq!(args.int("tail_lines").unwrap(), 100);
		assert!(args.get("labels").is_none());
	}

	#[test]
	fn explicit_values_override_defaults() {
		let args = Arguments::bind(
			&logs_spec(),
			&json!({"name": "web-1", "namespace": "prod", "tail_lines": 5}),
		)
		.unwrap();
		assert_eq!(args.str("namespace").unwrap(), "prod");
		assert_eq!(args.int("tail_lines").unwrap(), 5);
	}

	#[test]
	fn missing_required_is_reported_by_name() {
		let err = Arguments::bind(&logs_spec(), &json!({})).unwrap_err();
		assert_eq!(err, ToolError::MissingArgument("name".into()));
		assert_eq!(err.to_string(), "missing required argument: name");
	}

	#[test]
	fn null_parameter_counts_as_absent() {
		let args = Arguments::bind(&logs_spec(), &json!({"name": "a", "namespace": null})).unwrap();
		assert_eq!(args.str("namespace").unwrap(), "default");

		let err = Arguments::bind(&logs_spec(), &json!({"name": null})).unwrap_err();
		assert_eq!(err, ToolError::MissingArgument("name".into()));
	}

	#[test]
	fn wrong_type_is_rejected() {
		let err = Arguments::bind(&logs_spec(), &json!({"name": "a", "tail_lines": "ten"})).unwrap_err();
		assert_eq!(err.to_string(), "invalid argument 'tail_lines': expected integer");
	}

	#[test]
	fn non_object_arguments_are_rejected() {
		let err = Arguments::bind(&logs_spec(), &json!("{broken")).unwrap_err();
		assert!(matches!(err, ToolError::InvalidArguments(_)));

		let err = Arguments::bind(&logs_spec(), &json!([1, 2])).unwrap_err();
		assert!(err.to_string().contains("array"));
	}

	#[test]
	fn null_arguments_mean_empty_object() {
		let spec = OperationSpec::new("list_namespaces", "List namespaces");
		assert!(Arguments::bind(&spec, &Value::Null).is_ok());
	}

	#[test]
	fn undeclared_keys_are_dropped() {
		let args = Arguments::bind(&logs_spec(), &json!({"name": "a", "force": true})).unwrap();
		assert!(args.get("force").is_none());
	}

	#[test]
	fn string_map_renders_non_strings() {
		let args = Arguments::bind(
			&logs_spec(),
			&json!({"name": "a", "labels": {"app": "web", "port": 8080}}),
		)
		.unwrap();
		let labels = args.opt_string_map("labels").unwrap();
		assert_eq!(labels["app"], "web");
		assert_eq!(labels["port"], "8080");
	}

	#[test]
	fn int32_rejects_overflow() {
		let args = Arguments::bind(&logs_spec(), &json!({"name": "a", "tail_lines": 1u64 << 40})).unwrap();
		assert!(args.int32("tail_lines").is_err());
	}

	#[test]
	fn integer_beyond_i64_is_invalid_not_missing() {
		let err = Arguments::bind(
			&logs_spec(),
			&json!({"name": "a", "tail_lines": 9_223_372_036_854_775_808u64}),
		)
		.unwrap_err();
		assert_eq!(err.to_string(), "invalid argument 'tail_lines': expected integer");
	}

	proptest! {
		#[test]
		fn any_string_name_binds(name in ".*", ns in "[a-z0-9-]{1,20}") {
			let args = Arguments::bind(&logs_spec(), &json!({"name": name.clone(), "namespace": ns.clone()})).unwrap();
			prop_assert_eq!(args.str("name").unwrap(), name.as_str());
			prop_assert_eq!(args.str("namespace").unwrap(), ns.as_str());
		}
	}
}
