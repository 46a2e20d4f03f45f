// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::Utc;
use k8s_openapi::api::apps::v1::DeploymentSpec;
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, Deployment};
use serde_json::{json, Value};
use tracing::info;

use super::{
	backend, container_from, labels_param, metadata, name_param, non_negative, set_container_image,
	to_value, update_image_params,
};
use crate::args::Arguments;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};
use crate::summary::deployment_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_deployments", "List deployments in a namespace")
		.namespaced("to list deployments from")
}

pub(crate) async fn list(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespace = args.str("namespace")?;
	let deployments = cluster.list_deployments(namespace).await.map_err(backend)?;
	let now = Utc::now();
	to_value(deployments.iter().map(|d| deployment_summary(d, now)).collect::<Vec<_>>())
}

pub(crate) fn scale_spec() -> OperationSpec {
	OperationSpec::new("scale_deployment", "Scale a deployment to specified number of replicas")
		.param(name_param("deployment to scale"))
		.param(ParameterSpec::required(
			"replicas",
			ParamType::Integer,
			"Number of replicas to scale to",
		))
		.namespaced("of the deployment")
}

/// Read-modify-write of `spec.replicas`.
pub(crate) async fn scale(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let replicas = non_negative("replicas", args.int32("replicas")?)?;

	let mut deployment = cluster.get_deployment(name, namespace).await.map_err(backend)?;
	let previous = deployment.spec.as_ref().and_then(|s| s.replicas);
	deployment.spec.get_or_insert_with(Default::default).replicas = Some(replicas);
	cluster
		.replace_deployment(namespace, &deployment)
		.await
		.map_err(backend)?;
	info!(deployment = name, namespace, ?previous, replicas, "deployment scaled");

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"replicas": replicas,
		"message": format!("Deployment {name} scaled to {replicas} replicas"),
	}))
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_deployment", "Create a deployment with specified image and replica count")
		.param(name_param("deployment to create"))
		.param(ParameterSpec::required("image", ParamType::String, "Container image to use"))
		.param(ParameterSpec::optional("replicas", ParamType::Integer, "Number of replicas").with_default(1))
		.namespaced("for the deployment")
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
		.param(labels_param("deployment"))
}

/// Labels default to `app=<name>` and double as the pod selector.
pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let replicas = non_negative("replicas", args.int32("replicas")?)?;
	let labels = args
		.opt_string_map("labels")
		.unwrap_or_else(|| BTreeMap::from([("app".to_string(), name.to_string())]));
	let container = container_from(args, name)?;
	let image = container.image.clone();

	let deployment = Deployment {
		metadata: metadata(name, Some(namespace), None),
		spec: Some(DeploymentSpec {
			replicas: Some(replicas),
			selector: LabelSelector {
				match_labels: Some(labels.clone()),
				..Default::default()
			},
			template: PodTemplateSpec {
				metadata: Some(ObjectMeta {
					labels: Some(labels),
					..Default::default()
				}),
				spec: Some(PodSpec {
					containers: vec![container],
					..Default::default()
				}),
			},
			..Default::default()
		}),
		..Default::default()
	};
	cluster
		.create_deployment(namespace, &deployment)
		.await
		.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"replicas": replicas,
		"image": image,
		"message": format!("Deployment {name} created successfully"),
	}))
}

pub(crate) fn update_image_spec() -> OperationSpec {
	update_image_params(
		OperationSpec::new("update_deployment_image", "Update container image in a deployment"),
		"deployment",
	)
}

pub(crate) async fn update_image(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let container = args.str("container_name")?;
	let new_image = args.str("new_image")?;

	let mut deployment = cluster.get_deployment(name, namespace).await.map_err(backend)?;
	let found = deployment
		.spec
		.as_mut()
		.and_then(|spec| spec.template.spec.as_mut())
		.is_some_and(|pod_spec| set_container_image(&mut pod_spec.containers, container, new_image));
	if !found {
		return Err(ToolError::ContainerNotFound {
			kind: "deployment".into(),
			name: name.into(),
			container: container.into(),
		});
	}
	cluster
		.replace_deployment(namespace, &deployment)
		.await
		.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"container": container,
		"new_image": new_image,
		"message": format!("Deployment {name} container {container} updated to {new_image}"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new("delete_deployment", "Delete a deployment")
		.param(name_param("deployment to delete"))
		.namespaced("of the deployment")
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	cluster.delete_deployment(name, namespace).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"namespace": namespace,
		"message": format!("Deployment {name} deleted successfully"),
	}))
}
