// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::Utc;
use k8s_openapi::api::core::v1::{ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kpilot_common_core::ToolError;
use kpilot_k8s::{ClusterBackend, Service};
use serde_json::{json, Value};

use super::{backend, metadata, name_param, to_value};
use crate::args::Arguments;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};
use crate::summary::service_summary;

pub(crate) fn list_spec() -> OperationSpec {
	OperationSpec::new("list_services", "List services in a namespace").namespaced("to list services from")
}

pub(crate) async fn list(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let namespace = args.str("namespace")?;
	let services = cluster.list_services(namespace).await.map_err(backend)?;
	let now = Utc::now();
	to_value(services.iter().map(|s| service_summary(s, now)).collect::<Vec<_>>())
}

pub(crate) fn create_spec() -> OperationSpec {
	OperationSpec::new("create_service", "Create a service to expose pods or deployments")
		.param(name_param("service to create"))
		.param(ParameterSpec::required("port", ParamType::Integer, "Service port"))
		.param(ParameterSpec::required("target_port", ParamType::Integer, "Target port on the pods"))
		.namespaced("for the service")
		.param(
			ParameterSpec::optional(
				"service_type",
				ParamType::String,
				"Service type (ClusterIP, NodePort, LoadBalancer)",
			)
			.with_default("ClusterIP"),
		)
		.param(ParameterSpec::optional(
			"selector",
			ParamType::Object,
			"Label selector to match pods (optional)",
		))
}

/// One TCP port; the selector defaults to `app=<name>`.
pub(crate) async fn create(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	let port = args.int32("port")?;
	let target_port = args.int32("target_port")?;
	let service_type = args.str("service_type")?;
	let selector = args
		.opt_string_map("selector")
		.unwrap_or_else(|| BTreeMap::from([("app".to_string(), name.to_string())]));

	let service = Service {
		metadata: metadata(name, Some(namespace), None),
		spec: Some(ServiceSpec {
			selector: Some(selector),
			ports: Some(vec![ServicePort {
				port,
				target_port: Some(IntOrString::Int(target_port)),
				protocol: Some("TCP".to_string()),
				..Default::default()
			}]),
			type_: Some(service_type.to_string()),
			..Default::default()
		}),
		..Default::default()
	};
	cluster.create_service(namespace, &service).await.map_err(backend)?;

	Ok(json!({
		"name": name,
		"namespace": namespace,
		"port": port,
		"type": service_type,
		"message": format!("Service {name} created successfully"),
	}))
}

pub(crate) fn delete_spec() -> OperationSpec {
	OperationSpec::new("delete_service", "Delete a service")
		.param(name_param("service to delete"))
		.namespaced("of the service")
}

pub(crate) async fn delete(args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let name = args.str("name")?;
	let namespace = args.str("namespace")?;
	cluster.delete_service(name, namespace).await.map_err(backend)?;
	Ok(json!({
		"name": name,
		"namespace": namespace,
		"message": format!("Service {name} deleted successfully"),
	}))
}
