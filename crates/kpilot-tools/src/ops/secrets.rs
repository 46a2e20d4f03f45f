// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::Utc;
use k8s_openapi::ByteString;
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, Secret};
use serde_json::{json, Value};

use super::{backend, labels_param, metadata, name_param, to_value};
use crate::args::Arguments;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};
use crate::summary::secret_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_secrets", "List secrets in a namespace (names and keys only)")
		.namespaced("to list secrets from")
}

pub(crate) async fn list(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespace = args.str("namespace")?;
	let secrets = cluster.list_secrets(namespace).await.map_err(backend)?;
	let now = Utc::now();
	to_value(secrets.iter().map(|s| secret_summary(s, now)).collect::<Vec<_>>())
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_secret", "Create a secret with sensitive data")
		.param(name_param("secret to create"))
		.param(ParameterSpec::required(
			"data",
			ParamType::Object,
			"Secret data as plaintext key-value pairs",
		))
		.namespaced("for the secret")
		.param(ParameterSpec::optional("secret_type", ParamType::String, "Secret type").with_default("Opaque"))
		.param(labels_param("secret"))
}

/// Plaintext values go into `data` as raw bytes; `ByteString` base64-encodes
/// them on the wire.
pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let secret_type = args.str("secret_type")?;
	let plaintext = args.string_map("data")?;
	let data_keys: Vec<String> = plaintext.keys().cloned().collect();

	let secret = Secret {
		metadata: metadata(name, Some(namespace), args.opt_string_map("labels")),
		type_: Some(secret_type.to_string()),
		data: Some(
			plaintext
				.into_iter()
				.map(|(k, v)| (k, ByteString(v.into_bytes())))
				.collect(),
		),
		..Default::default()
	};
	cluster.create_secret(namespace, &secret).await.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"type": secret_type,
		"data_keys": data_keys,
		"message": format!("Secret {name} created successfully"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new("delete_secret", "Delete a secret")
		.param(name_param("secret to delete"))
		.namespaced("of the secret")
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	cluster.delete_secret(name, namespace).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"namespace": namespace,
		"message": format!("Secret {name} deleted successfully"),
	}))
}
