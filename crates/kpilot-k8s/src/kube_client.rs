// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, ListParams, LogParams, PostParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::client::ClusterBackend;
use crate::config::{build_config, ConfigSource};
use crate::error::K8sError;
use crate::types::{ConfigMap, Deployment, Namespace, Node, Pod, Secret, Service, VersionInfo};

/// Production cluster backend using the kube crate.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Connect using the first config source that resolves.
	///
	/// With an explicit kubeconfig only that file is tried. Otherwise the
	/// in-cluster service account is tried before `KUBECONFIG` and
	/// `~/.kube/config`.
	pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self, K8sError> {
		let mut last_err = None;
		for source in ConfigSource::candidates(kubeconfig) {
			match build_config(&source).await {
				Ok(config) => {
					let client = Client::try_from(config)?;
					info!(%source, "cluster client initialized");
					return Ok(Self { client });
				}
				Err(e) => {
					debug!(%source, error = %e, "config source unavailable");
					last_err = Some(e);
				}
			}
		}
		Err(last_err.unwrap_or_else(|| K8sError::config("no cluster configuration found")))
	}

	fn namespaced<K>(&self, namespace: &str) -> Api<K>
	where
		K: Resource<Scope = NamespaceResourceScope>,
		<K as Resource>::DynamicType: Default,
	{
		Api::namespaced(self.client.clone(), namespace)
	}

	fn cluster_scoped<K>(&self) -> Api<K>
	where
		K: Resource,
		<K as Resource>::DynamicType: Default,
	{
		Api::all(self.client.clone())
	}
}

async fn list_all<K>(api: Api<K>, params: &ListParams) -> Result<Vec<K>, K8sError>
where
	K: Clone + DeserializeOwned + Debug,
{
	Ok(api.list(params).await?.items)
}

async fn get_named<K>(api: Api<K>, kind: &'static str, name: &str) -> Result<K, K8sError>
where
	K: Clone + DeserializeOwned + Debug,
{
	api.get(name).await.map_err(|e| K8sError::from_kube(kind, name, e))
}

fn object_name<K: Resource>(kind: &'static str, obj: &K) -> Result<String, K8sError> {
	obj.meta().name.clone().ok_or_else(|| K8sError::ApiError {
		message: format!("{kind} has no name"),
	})
}

async fn create_object<K>(api: Api<K>, kind: &'static str, obj: &K) -> Result<K, K8sError>
where
	K: Resource + Clone + Serialize + DeserializeOwned + Debug,
{
	let name = object_name(kind, obj)?;
	api
		.create(&PostParams::default(), obj)
		.await
		.map_err(|e| K8sError::from_kube(kind, &name, e))
}

async fn replace_object<K>(api: Api<K>, kind: &'static str, obj: &K) -> Result<K, K8sError>
where
	K: Resource + Clone + Serialize + DeserializeOwned + Debug,
{
	let name = object_name(kind, obj)?;
	api
		.replace(&name, &PostParams::default(), obj)
		.await
		.map_err(|e| K8sError::from_kube(kind, &name, e))
}

async fn delete_named<K>(api: Api<K>, kind: &'static str, name: &str) -> Result<(), K8sError>
where
	K: Clone + DeserializeOwned + Debug,
{
	api
		.delete(name, &DeleteParams::default())
		.await
		.map(|_| ())
		.map_err(|e| K8sError::from_kube(kind, name, e))
}

#[async_trait]
impl ClusterBackend for KubeClient {
	#[instrument(skip(self))]
	async fn list_pods(&self, namespace: &str, label_selector: Option<&str>) -> Result<Vec<Pod>, K8sError> {
		let params = match label_selector {
			Some(selector) => ListParams::default().labels(selector),
			None => ListParams::default(),
		};
		list_all(self.namespaced(namespace), &params).await
	}

	#[instrument(skip(self))]
	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
		list_all(self.namespaced(namespace), &ListParams::default()).await
	}

	#[instrument(skip(self))]
	async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, K8sError> {
		list_all(self.namespaced(namespace), &ListParams::default()).await
	}

	#[instrument(skip(self))]
	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
		list_all(self.cluster_scoped(), &ListParams::default()).await
	}

	#[instrument(skip(self))]
	async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, K8sError> {
		list_all(self.namespaced(namespace), &ListParams::default()).await
	}

	#[instrument(skip(self))]
	async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, K8sError> {
		list_all(self.namespaced(namespace), &ListParams::default()).await
	}

	#[instrument(skip(self))]
	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
		list_all(self.cluster_scoped(), &ListParams::default()).await
	}

	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod, K8sError> {
		get_named(self.namespaced(namespace), "Pod", name).await
	}

	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError> {
		get_named(self.namespaced(namespace), "Deployment", name).await
	}

	async fn get_config_map(&self, name: &str, namespace: &str) -> Result<ConfigMap, K8sError> {
		get_named(self.namespaced(namespace), "ConfigMap", name).await
	}

	#[instrument(skip(self, pod))]
	async fn replace_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError> {
		replace_object(self.namespaced(namespace), "Pod", pod).await
	}

	#[instrument(skip(self, deployment))]
	async fn replace_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError> {
		replace_object(self.namespaced(namespace), "Deployment", deployment).await
	}

	#[instrument(skip(self, config_map))]
	async fn replace_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError> {
		replace_object(self.namespaced(namespace), "ConfigMap", config_map).await
	}

	#[instrument(skip(self, pod))]
	async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError> {
		create_object(self.namespaced(namespace), "Pod", pod).await
	}

	#[instrument(skip(self, deployment))]
	async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError> {
		create_object(self.namespaced(namespace), "Deployment", deployment).await
	}

	#[instrument(skip(self, service))]
	async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, K8sError> {
		create_object(self.namespaced(namespace), "Service", service).await
	}

	#[instrument(skip(self, config_map))]
	async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError> {
		create_object(self.namespaced(namespace), "ConfigMap", config_map).await
	}

	// Skipped from the span so secret data never reaches the logs.
	#[instrument(skip(self, secret))]
	async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, K8sError> {
		create_object(self.namespaced(namespace), "Secret", secret).await
	}

	#[instrument(skip(self, namespace))]
	async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace, K8sError> {
		create_object(self.cluster_scoped(), "Namespace", namespace).await
	}

	#[instrument(skip(self))]
	async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		delete_named::<Pod>(self.namespaced(namespace), "Pod", name).await
	}

	#[instrument(skip(self))]
	async fn delete_deployment(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		delete_named::<Deployment>(self.namespaced(namespace), "Deployment", name).await
	}

	#[instrument(skip(self))]
	async fn delete_service(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		delete_named::<Service>(self.namespaced(namespace), "Service", name).await
	}

	#[instrument(skip(self))]
	async fn delete_config_map(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		delete_named::<ConfigMap>(self.namespaced(namespace), "ConfigMap", name).await
	}

	#[instrument(skip(self))]
	async fn delete_secret(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		delete_named::<Secret>(self.namespaced(namespace), "Secret", name).await
	}

	#[instrument(skip(self))]
	async fn delete_namespace(&self, name: &str) -> Result<(), K8sError> {
		delete_named::<Namespace>(self.cluster_scoped(), "Namespace", name).await
	}

	#[instrument(skip(self))]
	async fn pod_logs(&self, name: &str, namespace: &str, tail_lines: i64) -> Result<String, K8sError> {
		let pods: Api<Pod> = self.namespaced(namespace);
		let params = LogParams {
			tail_lines: Some(tail_lines),
			..Default::default()
		};
		pods
			.logs(name, &params)
			.await
			.map_err(|e| K8sError::from_kube("Pod", name, e))
	}

	#[instrument(skip(self))]
	async fn server_version(&self) -> Result<VersionInfo, K8sError> {
		Ok(self.client.apiserver_version().await?)
	}
}
