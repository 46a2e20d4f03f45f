// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::Utc;
use k8s_openapi::api::core::v1::PodSpec;
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, Pod};
use serde_json::{json, Value};
use tracing::debug;

use super::{
	backend, container_from, labels_param, metadata, name_param, set_container_image, to_value,
	update_image_params,
};
use crate::args::Arguments;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};
use crate::summary::pod_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_pods", "List pods in a namespace with optional label selector")
		.namespaced("to list pods from")
		.param(ParameterSpec::optional(
			"label_selector",
			ParamType::String,
			"Label selector to filter pods (e.g., 'app=nginx')",
		))
}

pub(crate) async fn list(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespace = args.str("namespace")?;
	let selector = args.opt_str("label_selector");
	let pods = cluster.list_pods(namespace, selector).await.map_err(backend)?;
	let now = Utc::now();
	to_value(pods.iter().map(|p| pod_summary(p, now)).collect::<Vec<_>>())
}

pub(crate) fn logs_spec() -> OperationSpec {
	OperationSpec::new("get_pod_logs", "Get logs from a pod")
		.param(name_param("pod to get logs from"))
		.namespaced("of the pod")
		.param(
			ParameterSpec::optional(
				"tail_lines",
				ParamType::Integer,
				"Number of log lines to retrieve from the end",
			)
			.with_default(100),
		)
}

pub(crate) async fn logs(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let tail_lines = args.int("tail_lines")?;
	if tail_lines < 0 {
		return Err(ToolError::InvalidArgument {
			name: "tail_lines".into(),
			expected: "non-negative integer".into(),
		});
	}
	let logs = cluster
		.pod_logs(name, namespace, tail_lines)
		.await
		.map_err(backend)?;
	Ok(json!({ "logs": logs }))
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_pod", "Create a pod with specified image and configuration")
		.param(name_param("pod to create"))
		.param(ParameterSpec::required(
			"image",
			ParamType::String,
			"Container image to use (e.g., 'nginx:alpine', 'httpd:latest')",
		))
		.namespaced("for the pod")
		.param(ParameterSpec::optional(
			"port",
			ParamType::Integer,
			"Container port to expose (optional)",
		))
		.param(ParameterSpec::optional(
			"env_vars",
			ParamType::Object,
			"Environment variables as key-value pairs (optional)",
		))
		.param(labels_param("pod"))
}

pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let container = container_from(args, name)?;
	let image = container.image.clone();

	let pod = Pod {
		metadata: metadata(name, Some(namespace), args.opt_string_map("labels")),
		spec: Some(PodSpec {
			containers: vec![container],
			..Default::default()
		}),
		..Default::default()
	};
	cluster.create_pod(namespace, &pod).await.map_err(backend)?;
	debug!(pod = name, namespace, "pod created");

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"image": image,
		"message": format!("Pod {name} created successfully"),
	}))
}

pub(crate) fn update_image_spec() -> OperationSpec {
	update_image_params(OperationSpec::new("update_pod_image", "Update container image in a pod"), "pod")
}

pub(crate) async fn update_image(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let container = args.str("container_name")?;
	let new_image = args.str("new_image")?;

	let mut pod = cluster.get_pod(name, namespace).await.map_err(backend)?;
	let found = pod
		.spec
		.as_mut()
		.is_some_and(|spec| set_container_image(&mut spec.containers, container, new_image));
	if !found {
		return Err(ToolError::ContainerNotFound {
			kind: "pod".into(),
			name: name.into(),
			container: container.into(),
		});
	}
	cluster.replace_pod(namespace, &pod).await.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"container": container,
		"new_image": new_image,
		"message": format!("Pod {name} container {container} updated to {new_image}"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new("delete_pod", "Delete a specific pod")
		.param(name_param("pod to delete"))
		.namespaced("of the pod")
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	cluster.delete_pod(name, namespace).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"namespace": namespace,
		"message": format!("Pod {name} deleted successfully"),
	}))
}
