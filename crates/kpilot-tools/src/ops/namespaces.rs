// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::Utc;
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, Namespace};
use serde_json::{json, Value};
use tracing::warn;

use super::{backend, labels_param, metadata, name_param, to_value};
use crate::args::Arguments;
use crate::spec::OperationSpec;
use crate::summary::namespace_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_namespaces", "List all namespaces in the cluster")
}

pub(crate) async fn list(_args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespaces = cluster.list_namespaces().await.map_err(backend)?;
	let now = Utc::now();
	to_value(namespaces.iter().map(|n| namespace_summary(n, now)).collect::<Vec<_>>())
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_namespace", "Create a new namespace")
		.param(name_param("namespace to create"))
		.param(labels_param("namespace"))
}

pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let labels = args.opt_string_map("labels");
	let namespace = Namespace {
		metadata: metadata(name, None, labels.clone()),
		..Default::default()
	};
	cluster.create_namespace(&namespace).await.map_err(backend)?;

	Ok(json!({
		"name": name,
		"labels": labels.unwrap_or_default(),
		"message": format!("Namespace {name} created successfully"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new(
		"delete_namespace",
		"Delete a namespace and every resource in it",
	)
	.param(name_param("namespace to delete"))
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	warn!(namespace = name, "deleting namespace");
	cluster.delete_namespace(name).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"message": format!("Namespace {name} deleted successfully"),
	}))
}
