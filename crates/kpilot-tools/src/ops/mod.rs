// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Handlers for each cluster operation, grouped by resource kind.

mod cluster;
mod configmaps;
mod deployments;
mod namespaces;
mod pods;
mod secrets;
mod services;

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kpilot_common_core::ToolError;
use kpilot_k8s::{Container, ContainerPort, EnvVar, K8sError};
use serde::Serialize;
use serde_json::Value;

use crate::args::Arguments;
use crate::registry::Handler;
use crate::spec::{OperationSpec, ParamType, ParameterSpec};

/// All handlers in advertisement order.
pub(crate) fn handlers() -> Vec<Handler> {
	vec![
		Handler::new(pods::list_spec(), |a, c| Box::pin(pods::list(a, c))),
		Handler::new(deployments::list_spec(), |a, c| Box::pin(deployments::list(a, c))),
		Handler::new(services::list_spec(), |a, c| Box::pin(services::list(a, c))),
		Handler::new(namespaces::list_spec(), |a, c| Box::pin(namespaces::list(a, c))),
		Handler::new(configmaps::list_spec(), |a, c| Box::pin(configmaps::list(a, c))),
		Handler::new(secrets::list_spec(), |a, c| Box::pin(secrets::list(a, c))),
		Handler::new(deployments::scale_spec(), |a, c| Box::pin(deployments::scale(a, c))),
		Handler::new(pods::logs_spec(), |a, c| Box::pin(pods::logs(a, c))),
		Handler::new(cluster::info_spec(), |a, c| Box::pin(cluster::info(a, c))),
		Handler::new(namespaces::create_spec(), |a, c| Box::pin(namespaces::create(a, c))),
		Handler::new(pods::create_spec(), |a, c| Box::pin(pods::create(a, c))),
		Handler::new(deployments::create_spec(), |a, c| Box::pin(deployments::create(a, c))),
		Handler::new(services::create_spec(), |a, c| Box::pin(services::create(a, c))),
		Handler::new(configmaps::create_spec(), |a, c| Box::pin(configmaps::create(a, c))),
		Handler::new(secrets::create_spec(), |a, c| Box::pin(secrets::create(a, c))),
		Handler::new(pods::update_image_spec(), |a, c| Box::pin(pods::update_image(a, c))),
		Handler::new(deployments::update_image_spec(), |a, c| {
			Box::pin(deployments::update_image(a, c))
		}),
		Handler::new(configmaps::update_spec(), |a, c| Box::pin(configmaps::update(a, c))),
		Handler::new(pods::delete_spec(), |a, c| Box::pin(pods::delete(a, c))),
		Handler::new(deployments::delete_spec(), |a, c| Box::pin(deployments::delete(a, c))),
		Handler::new(services::delete_spec(), |a, c| Box::pin(services::delete(a, c))),
		Handler::new(configmaps::delete_spec(), |a, c| Box::pin(configmaps::delete(a, c))),
		Handler::new(secrets::delete_spec(), |a, c| Box::pin(secrets::delete(a, c))),
		Handler::new(namespaces::delete_spec(), |a, c| Box::pin(namespaces::delete(a, c))),
	]
}

pub(crate) fn backend(err: K8sError) -> ToolError {
	ToolError::Backend(err.to_string())
}

pub(crate) fn to_value<T: Serialize>(value: T) -> Result<Value, ToolError> {
	serde_json::to_value(value).map_err(|e| ToolError::Internal(format!("failed to encode result: {e}")))
}

pub(crate) fn name_param(what: &str) -> ParameterSpec {
	ParameterSpec::required("name", ParamType::String, &format!("Name of the {what}"))
}

pub(crate) fn labels_param(what: &str) -> ParameterSpec {
	ParameterSpec::optional(
		"labels",
		ParamType::Object,
		&format!("Labels to apply to the {what} (optional)"),
	)
}

pub(crate) fn non_negative(name: &str, value: i32) -> Result<i32, ToolError> {
	if value < 0 {
		return Err(ToolError::InvalidArgument {
			name: name.to_string(),
			expected: "non-negative integer".to_string(),
		});
	}
	Ok(value)
}

pub(crate) fn metadata(name: &str, namespace: Option<&str>, labels: Option<BTreeMap<String, String>>) -> ObjectMeta {
	ObjectMeta {
		name: Some(name.to_string()),
		namespace: namespace.map(str::to_string),
		labels,
		..Default::default()
	}
}

/// The single container used by `create_pod` and `create_deployment`.
pub(crate) fn container_from(args: &Arguments, name: &str) -> Result<Container, ToolError> {
	let ports = args.opt_int32("port")?.map(|port| {
		vec![ContainerPort {
			container_port: port,
			..Default::default()
		}]
	});
	let env = args.opt_string_map("env_vars").map(|vars| {
		vars
			.into_iter()
			.map(|(name, value)| EnvVar {
				name,
				value: Some(value),
				..Default::default()
			})
			.collect()
	});
	Ok(Container {
		name: name.to_string(),
		image: Some(args.str("image")?.to_string()),
		ports,
		env,
		..Default::default()
	})
}

/// Sets `image` on the container called `container`, if there is one.
pub(crate) fn set_container_image(containers: &mut [Container], container: &str, image: &str) -> bool {
	match containers.iter_mut().find(|c| c.name == container) {
		Some(c) => {
			c.image = Some(image.to_string());
			true
		}
		None => false,
	}
}

pub(crate) fn update_image_params(spec: OperationSpec, what: &str) -> OperationSpec {
	spec.param(name_param(&format!("{what} to update")))
		.param(ParameterSpec::required(
			"container_name",
			ParamType::String,
			"Name of the container to update",
		))
		.param(ParameterSpec::required("new_image", ParamType::String, "New container image"))
		.namespaced(&format!("of the {what}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_container_image_targets_by_name() {
		let mut containers = vec![
			Container {
				name: "app".into(),
				image: Some("nginx:1.25".into()),
				..Default::default()
			},
			Container {
				name: "sidecar".into(),
				image: Some("envoy:1".into()),
				..Default::default()
			},
		];
		assert!(set_container_image(&mut containers, "sidecar", "envoy:2"));
		assert_eq!(containers[0].image.as_deref(), Some("nginx:1.25"));
		assert_eq!(containers[1].image.as_deref(), Some("envoy:2"));
		assert!(!set_container_image(&mut containers, "missing", "x"));
	}

	#[test]
	fn non_negative_rejects_negative() {
		assert_eq!(non_negative("replicas", 0).unwrap(), 0);
		assert!(non_negative("replicas", -1).is_err());
	}
}
