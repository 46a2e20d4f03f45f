// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::Utc;
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, ConfigMap};
use serde_json::{json, Value};

use super::{backend, labels_param, metadata, name_param, to_value};
use crate::args::Arguments;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};
use crate::summary::config_map_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_configmaps", "List configmaps in a namespace")
		.namespaced("to list configmaps from")
}

pub(crate) async fn list(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespace = args.str("namespace")?;
	let config_maps = cluster.list_config_maps(namespace).await.map_err(backend)?;
	let now = Utc::now();
	to_value(config_maps.iter().map(|c| config_map_summary(c, now)).collect::<Vec<_>>())
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_configmap", "Create a configmap with key-value data")
		.param(name_param("configmap to create"))
		.param(ParameterSpec::required(
			"data",
			ParamType::Object,
			"Configuration data as key-value pairs",
		))
		.namespaced("for the configmap")
		.param(labels_param("configmap"))
}

pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let data = args.string_map("data")?;
	let data_keys: Vec<String> = data.keys().cloned().collect();

	let config_map = ConfigMap {
		metadata: metadata(name, Some(namespace), args.opt_string_map("labels")),
		data: Some(data),
		..Default::default()
	};
	cluster
		.create_config_map(namespace, &config_map)
		.await
		.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"data_keys": data_keys,
		"message": format!("ConfigMap {name} created successfully"),
	}))
}

pub(crate) fn update_spec() -> OperationSpec {
	OperationSpec::new("update_configmap", "Replace the data of a configmap")
		.param(name_param("configmap to update"))
		.param(ParameterSpec::required(
			"data",
			ParamType::Object,
			"New configuration data as key-value pairs; replaces all existing keys",
		))
		.namespaced("of the configmap")
}

/// Replaces `data` wholesale; keys absent from the new data are dropped.
pub(crate) async fn update(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let data = args.string_map("data")?;
	let data_keys: Vec<String> = data.keys().cloned().collect();

	let mut config_map = cluster.get_config_map(name, namespace).await.map_err(backend)?;
	config_map.data = Some(data);
	cluster
		.replace_config_map(namespace, &config_map)
		.await
		.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"data_keys": data_keys,
		"message": format!("ConfigMap {name} updated successfully"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new("delete_configmap", "Delete a configmap")
		.param(name_param("configmap to delete"))
		.namespaced("of the configmap")
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	cluster.delete_config_map(name, namespace).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"namespace": namespace,
		"message": format!("ConfigMap {name} deleted successfully"),
	}))
}
