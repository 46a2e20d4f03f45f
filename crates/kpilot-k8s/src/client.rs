// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use async_trait::async_trait;

use crate::error::K8sError;
use crate::types::{ConfigMap, Deployment, Namespace, Node, Pod, Secret, Service, VersionInfo};

/// Typed operations kpilot performs against a cluster.
///
/// Implementations return raw API objects; shaping them for the model is the
/// caller's concern. Reads that target a single object report a missing
/// object as [`K8sError::NotFound`].
#[async_trait]
pub trait ClusterBackend: Send + Sync {
	/// List pods in a namespace, optionally filtered by a label selector.
	async fn list_pods(&self, namespace: &str, label_selector: Option<&str>) -> Result<Vec<Pod>, K8sError>;

	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError>;

	async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, K8sError>;

	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError>;

	async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, K8sError>;

	async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, K8sError>;

	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError>;

	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod, K8sError>;

	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError>;

	async fn get_config_map(&self, name: &str, namespace: &str) -> Result<ConfigMap, K8sError>;

	/// Replace a pod with `pod`, which must carry its name.
	async fn replace_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError>;

	async fn replace_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError>;

	async fn replace_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError>;

	async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError>;

	async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError>;

	async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, K8sError>;

	async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError>;

	async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, K8sError>;

	async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace, K8sError>;

	async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), K8sError>;

	async fn delete_deployment(&self, name: &str, namespace: &str) -> Result<(), K8sError>;

	async fn delete_service(&self, name: &str, namespace: &str) -> Result<(), K8sError>;

	async fn delete_config_map(&self, name: &str, namespace: &str) -> Result<(), K8sError>;

	async fn delete_secret(&self, name: &str, namespace: &str) -> Result<(), K8sError>;

	async fn delete_namespace(&self, name: &str) -> Result<(), K8sError>;

	/// Fetch the last `tail_lines` lines of a pod's log.
	async fn pod_logs(&self, name: &str, namespace: &str, tail_lines: i64) -> Result<String, K8sError>;

	/// Version of the API server.
	async fn server_version(&self) -> Result<VersionInfo, K8sError>;
}
