// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Compact views of cluster objects, shaped for the model and for tables.
//!
//! Every summary takes `now` explicitly so ages are deterministic in tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kpilot_k8s::{ConfigMap, Deployment, Namespace, Node, Pod, Secret, Service, VersionInfo};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const UNKNOWN: &str = "Unknown";

/// Largest whole unit of elapsed time: `"2d"`, `"1h"`, `"5m"`, `"12s"`.
///
/// A missing timestamp is `"unknown"`; one in the future is `"0s"`.
pub fn format_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
	let Some(created) = created else {
		return "unknown".to_string();
	};
	let secs = (now - created).num_seconds().max(0);
	match secs {
		s if s >= 86_400 => format!("{}d", s / 86_400),
		s if s >= 3_600 => format!("{}h", s / 3_600),
		s if s >= 60 => format!("{}m", s / 60),
		s => format!("{s}s"),
	}
}

fn age_of(meta: &ObjectMeta, now: DateTime<Utc>) -> String {
	format_age(meta.creation_timestamp.as_ref().map(|t| t.0), now)
}

fn name_of(meta: &ObjectMeta) -> String {
	meta.name.clone().unwrap_or_default()
}

fn namespace_of(meta: &ObjectMeta) -> String {
	meta.namespace.clone().unwrap_or_default()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PodSummary {
	pub name: String,
	pub namespace: String,
	pub phase: String,
	/// True when every container reports ready; vacuously true with none.
	pub ready: bool,
	pub restarts: i64,
	pub age: String,
	pub node: Option<String>,
	pub ip: Option<String>,
}

pub fn pod_summary(pod: &Pod, now: DateTime<Utc>) -> PodSummary {
	let status = pod.status.as_ref();
	let containers = status
		.and_then(|s| s.container_statuses.as_deref())
		.unwrap_or_default();

	PodSummary {
		name: name_of(&pod.metadata),
		namespace: namespace_of(&pod.metadata),
		phase: status
			.and_then(|s| s.phase.clone())
			.unwrap_or_else(|| UNKNOWN.to_string()),
		ready: containers.iter().all(|c| c.ready),
		restarts: containers.iter().map(|c| i64::from(c.restart_count)).sum(),
		age: age_of(&pod.metadata, now),
		node: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
		ip: status.and_then(|s| s.pod_ip.clone()),
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeploymentSummary {
	pub name: String,
	pub namespace: String,
	pub replicas: i32,
	pub ready_replicas: i32,
	pub available_replicas: i32,
	pub updated_replicas: i32,
	pub age: String,
}

pub fn deployment_summary(deployment: &Deployment, now: DateTime<Utc>) -> DeploymentSummary {
	let status = deployment.status.as_ref();
	DeploymentSummary {
		name: name_of(&deployment.metadata),
		namespace: namespace_of(&deployment.metadata),
		replicas: deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(0),
		ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
		available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
		updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
		age: age_of(&deployment.metadata, now),
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServicePortSummary {
	pub port: i32,
	/// Number or named port, as declared.
	pub target_port: Option<Value>,
	pub protocol: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceSummary {
	pub name: String,
	pub namespace: String,
	#[serde(rename = "type")]
	pub service_type: String,
	pub cluster_ip: Option<String>,
	pub external_ips: Vec<String>,
	pub ports: Vec<ServicePortSummary>,
	pub age: String,
}

fn int_or_string(value: &IntOrString) -> Value {
	match value {
		IntOrString::Int(i) => json!(i),
		IntOrString::String(s) => json!(s),
	}
}

pub fn service_summary(service: &Service, now: DateTime<Utc>) -> ServiceSummary {
	let spec = service.spec.as_ref();
	let external_ips = service
		.status
		.as_ref()
		.and_then(|s| s.load_balancer.as_ref())
		.and_then(|lb| lb.ingress.as_deref())
		.unwrap_or_default()
		.iter()
		.filter_map(|ingress| ingress.ip.clone().or_else(|| ingress.hostname.clone()))
		.collect();
	let ports = spec
		.and_then(|s| s.ports.as_deref())
		.unwrap_or_default()
		.iter()
		.map(|p| ServicePortSummary {
			port: p.port,
			target_port: p.target_port.as_ref().map(int_or_string),
			protocol: p.protocol.clone().unwrap_or_else(|| "TCP".to_string()),
		})
		.collect();

	ServiceSummary {
		name: name_of(&service.metadata),
		namespace: namespace_of(&service.metadata),
		service_type: spec
			.and_then(|s| s.type_.clone())
			.unwrap_or_else(|| "ClusterIP".to_string()),
		cluster_ip: spec.and_then(|s| s.cluster_ip.clone()),
		external_ips,
		ports,
		age: age_of(&service.metadata, now),
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamespaceSummary {
	pub name: String,
	pub status: String,
	pub age: String,
	pub labels: BTreeMap<String, String>,
}

pub fn namespace_summary(namespace: &Namespace, now: DateTime<Utc>) -> NamespaceSummary {
	NamespaceSummary {
		name: name_of(&namespace.metadata),
		status: namespace
			.status
			.as_ref()
			.and_then(|s| s.phase.clone())
			.unwrap_or_else(|| UNKNOWN.to_string()),
		age: age_of(&namespace.metadata, now),
		labels: namespace.metadata.labels.clone().unwrap_or_default(),
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigMapSummary {
	pub name: String,
	pub namespace: String,
	pub data_count: usize,
	pub data_keys: Vec<String>,
	pub age: String,
}

pub fn config_map_summary(config_map: &ConfigMap, now: DateTime<Utc>) -> ConfigMapSummary {
	let data_keys: Vec<String> = config_map
		.data
		.as_ref()
		.map(|d| d.keys().cloned().collect())
		.unwrap_or_default();
	ConfigMapSummary {
		name: name_of(&config_map.metadata),
		namespace: namespace_of(&config_map.metadata),
		data_count: data_keys.len(),
		data_keys,
		age: age_of(&config_map.metadata, now),
	}
}

/// Key names only. Secret values never leave this function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecretSummary {
	pub name: String,
	pub namespace: String,
	#[serde(rename = "type")]
	pub secret_type: String,
	pub data_count: usize,
	pub data_keys: Vec<String>,
	pub age: String,
}

pub fn secret_summary(secret: &Secret, now: DateTime<Utc>) -> SecretSummary {
	let data_keys: Vec<String> = secret
		.data
		.as_ref()
		.map(|d| d.keys().cloned().collect())
		.unwrap_or_default();
	SecretSummary {
		name: name_of(&secret.metadata),
		namespace: namespace_of(&secret.metadata),
		secret_type: secret.type_.clone().unwrap_or_else(|| "Opaque".to_string()),
		data_count: data_keys.len(),
		data_keys,
		age: age_of(&secret.metadata, now),
	}
}

/// `Ready` / `NotReady` from the node's `Ready` condition, `Unknown` without one.
pub fn node_status(node: &Node) -> &'static str {
	let ready = node
		.status
		.as_ref()
		.and_then(|s| s.conditions.as_deref())
		.unwrap_or_default()
		.iter()
		.find(|c| c.type_ == "Ready");
	match ready {
		Some(condition) if condition.status == "True" => "Ready",
		Some(_) => "NotReady",
		None => UNKNOWN,
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
	pub name: String,
	pub status: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionSummary {
	pub git_version: String,
	pub major: String,
	pub minor: String,
	pub platform: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterInfo {
	pub version: VersionSummary,
	pub node_count: usize,
	pub namespace_count: usize,
	pub nodes: Vec<NodeSummary>,
}

pub fn cluster_info(version: &VersionInfo, nodes: &[Node], namespace_count: usize) -> ClusterInfo {
	ClusterInfo {
		version: VersionSummary {
			git_version: version.git_version.clone(),
			major: version.major.clone(),
			minor: version.minor.clone(),
			platform: version.platform.clone(),
		},
		node_count: nodes.len(),
		namespace_count,
		nodes: nodes
			.iter()
			.map(|n| NodeSummary {
				name: name_of(&n.metadata),
				status: node_status(n).to_string(),
			})
			.collect(),
	}
}
