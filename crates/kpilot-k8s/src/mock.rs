// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! In-memory cluster for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use kube::Resource;

use crate::client::ClusterBackend;
use crate::error::K8sError;
use crate::types::{ConfigMap, Deployment, Namespace, Node, Pod, Secret, Service, VersionInfo};

/// `(namespace, name)`; cluster-scoped objects use an empty namespace.
type Key = (String, String);

struct State {
	pods: BTreeMap<Key, Pod>,
	deployments: BTreeMap<Key, Deployment>,
	services: BTreeMap<Key, Service>,
	config_maps: BTreeMap<Key, ConfigMap>,
	secrets: BTreeMap<Key, Secret>,
	namespaces: BTreeMap<Key, Namespace>,
	nodes: Vec<Node>,
	logs: HashMap<Key, String>,
	version: VersionInfo,
	failures: HashMap<String, String>,
	calls: Vec<String>,
}

impl Default for State {
	fn default() -> Self {
		Self {
			pods: BTreeMap::new(),
			deployments: BTreeMap::new(),
			services: BTreeMap::new(),
			config_maps: BTreeMap::new(),
			secrets: BTreeMap::new(),
			namespaces: BTreeMap::new(),
			nodes: Vec::new(),
			logs: HashMap::new(),
			version: VersionInfo {
				git_version: "v1.32.0".into(),
				major: "1".into(),
				minor: "32".into(),
				platform: "linux/amd64".into(),
				..Default::default()
			},
			failures: HashMap::new(),
			calls: Vec::new(),
		}
	}
}

/// A fake [`ClusterBackend`] that keeps objects in memory and records every
/// call by method name.
///
/// Clones share state, so a test can keep one handle while the code under
/// test owns another.
#[derive(Clone, Default)]
pub struct MockCluster {
	state: Arc<Mutex<State>>,
}

impl MockCluster {
	pub fn new() -> Self {
		Self::default()
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	/// Makes every later call to `method` fail with `message`.
	pub fn fail_on(&self, method: &str, message: &str) {
		self.lock().failures.insert(method.to_string(), message.to_string());
	}

	/// Method names called so far, in order.
	pub fn calls(&self) -> Vec<String> {
		self.lock().calls.clone()
	}

	pub fn call_count(&self) -> usize {
		self.lock().calls.len()
	}

	pub fn add_pod(&self, pod: Pod) {
		let mut state = self.lock();
		seed(&mut state.pods, pod);
	}

	pub fn add_deployment(&self, deployment: Deployment) {
		let mut state = self.lock();
		seed(&mut state.deployments, deployment);
	}

	pub fn add_service(&self, service: Service) {
		let mut state = self.lock();
		seed(&mut state.services, service);
	}

	pub fn add_config_map(&self, config_map: ConfigMap) {
		let mut state = self.lock();
		seed(&mut state.config_maps, config_map);
	}

	pub fn add_secret(&self, secret: Secret) {
		let mut state = self.lock();
		seed(&mut state.secrets, secret);
	}

	pub fn add_namespace(&self, namespace: Namespace) {
		let mut state = self.lock();
		seed(&mut state.namespaces, namespace);
	}

	pub fn add_node(&self, node: Node) {
		self.lock().nodes.push(node);
	}

	pub fn set_logs(&self, name: &str, namespace: &str, logs: &str) {
		self
			.lock()
			.logs
			.insert((namespace.to_string(), name.to_string()), logs.to_string());
	}

	pub fn set_version(&self, version: VersionInfo) {
		self.lock().version = version;
	}

	pub fn pod(&self, name: &str, namespace: &str) -> Option<Pod> {
		self.lock().pods.get(&key(namespace, name)).cloned()
	}

	pub fn deployment(&self, name: &str, namespace: &str) -> Option<Deployment> {
		self.lock().deployments.get(&key(namespace, name)).cloned()
	}

	pub fn service(&self, name: &str, namespace: &str) -> Option<Service> {
		self.lock().services.get(&key(namespace, name)).cloned()
	}

	pub fn config_map(&self, name: &str, namespace: &str) -> Option<ConfigMap> {
		self.lock().config_maps.get(&key(namespace, name)).cloned()
	}

	pub fn secret(&self, name: &str, namespace: &str) -> Option<Secret> {
		self.lock().secrets.get(&key(namespace, name)).cloned()
	}

	pub fn namespace(&self, name: &str) -> Option<Namespace> {
		self.lock().namespaces.get(&key("", name)).cloned()
	}

	/// Records the call and returns the configured failure, if any.
	fn enter(&self, method: &str) -> Result<MutexGuard<'_, State>, K8sError> {
		let mut state = self.lock();
		state.calls.push(method.to_string());
		match state.failures.get(method) {
			Some(message) => Err(K8sError::ApiError {
				message: message.clone(),
			}),
			None => Ok(state),
		}
	}
}

fn key(namespace: &str, name: &str) -> Key {
	(namespace.to_string(), name.to_string())
}

fn seed<K: Resource>(store: &mut BTreeMap<Key, K>, obj: K) {
	let meta = obj.meta();
	let k = key(
		meta.namespace.as_deref().unwrap_or_default(),
		meta.name.as_deref().unwrap_or_default(),
	);
	store.insert(k, obj);
}

fn in_namespace<K: Clone>(store: &BTreeMap<Key, K>, namespace: &str) -> Vec<K> {
	store
		.iter()
		.filter(|((ns, _), _)| ns == namespace)
		.map(|(_, obj)| obj.clone())
		.collect()
}

fn lookup<K: Clone>(store: &BTreeMap<Key, K>, kind: &'static str, namespace: &str, name: &str) -> Result<K, K8sError> {
	store
		.get(&key(namespace, name))
		.cloned()
		.ok_or_else(|| K8sError::not_found(kind, name))
}

fn name_of<K: Resource>(kind: &'static str, obj: &K) -> Result<String, K8sError> {
	obj.meta().name.clone().ok_or_else(|| K8sError::ApiError {
		message: format!("{kind} has no name"),
	})
}

fn insert_new<K: Resource + Clone>(
	store: &mut BTreeMap<Key, K>,
	kind: &'static str,
	namespace: &str,
	obj: &K,
) -> Result<K, K8sError> {
	let name = name_of(kind, obj)?;
	let k = key(namespace, &name);
	if store.contains_key(&k) {
		return Err(K8sError::ApiError {
			message: format!("{kind} \"{name}\" already exists"),
		});
	}
	let mut stored = obj.clone();
	if !namespace.is_empty() {
		stored.meta_mut().namespace = Some(namespace.to_string());
	}
	store.insert(k, stored.clone());
	Ok(stored)
}

fn overwrite<K: Resource + Clone>(
	store: &mut BTreeMap<Key, K>,
	kind: &'static str,
	namespace: &str,
	obj: &K,
) -> Result<K, K8sError> {
	let name = name_of(kind, obj)?;
	let slot = store
		.get_mut(&key(namespace, &name))
		.ok_or_else(|| K8sError::not_found(kind, &name))?;
	*slot = obj.clone();
	Ok(obj.clone())
}

fn remove<K>(store: &mut BTreeMap<Key, K>, kind: &'static str, namespace: &str, name: &str) -> Result<(), K8sError> {
	store
		.remove(&key(namespace, name))
		.map(|_| ())
		.ok_or_else(|| K8sError::not_found(kind, name))
}

/// Equality-based selectors only (`app=web,tier=frontend`).
fn matches_selector(pod: &Pod, selector: &str) -> bool {
	let labels = pod.metadata.labels.as_ref();
	selector
		.split(',')
		.map(str::trim)
		.filter(|term| !term.is_empty())
		.all(|term| match term.split_once('=') {
			Some((k, v)) => labels
				.and_then(|l| l.get(k.trim()))
				.is_some_and(|actual| actual == v.trim()),
			None => labels.is_some_and(|l| l.contains_key(term)),
		})
}

#[async_trait]
impl ClusterBackend for MockCluster {
	async fn list_pods(&self, namespace: &str, label_selector: Option<&str>) -> Result<Vec<Pod>, K8sError> {
		let state = self.enter("list_pods")?;
		let pods = in_namespace(&state.pods, namespace);
		Ok(match label_selector {
			Some(selector) => pods.into_iter().filter(|p| matches_selector(p, selector)).collect(),
			None => pods,
		})
	}

	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
		let state = self.enter("list_deployments")?;
		Ok(in_namespace(&state.deployments, namespace))
	}

	async fn list_services(&self, namespace: &str) -> Result<Vec<Service>, K8sError> {
		let state = self.enter("list_services")?;
		Ok(in_namespace(&state.services, namespace))
	}

	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
		let state = self.enter("list_namespaces")?;
		Ok(state.namespaces.values().cloned().collect())
	}

	async fn list_config_maps(&self, namespace: &str) -> Result<Vec<ConfigMap>, K8sError> {
		let state = self.enter("list_config_maps")?;
		Ok(in_namespace(&state.config_maps, namespace))
	}

	async fn list_secrets(&self, namespace: &str) -> Result<Vec<Secret>, K8sError> {
		let state = self.enter("list_secrets")?;
		Ok(in_namespace(&state.secrets, namespace))
	}

	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
		let state = self.enter("list_nodes")?;
		Ok(state.nodes.clone())
	}

	async fn get_pod(&self, name: &str, namespace: &str) -> Result<Pod, K8sError> {
		let state = self.enter("get_pod")?;
		lookup(&state.pods, "Pod", namespace, name)
	}

	async fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, K8sError> {
		let state = self.enter("get_deployment")?;
		lookup(&state.deployments, "Deployment", namespace, name)
	}

	async fn get_config_map(&self, name: &str, namespace: &str) -> Result<ConfigMap, K8sError> {
		let state = self.enter("get_config_map")?;
		lookup(&state.config_maps, "ConfigMap", namespace, name)
	}

	async fn replace_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError> {
		let mut state = self.enter("replace_pod")?;
		overwrite(&mut state.pods, "Pod", namespace, pod)
	}

	async fn replace_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError> {
		let mut state = self.enter("replace_deployment")?;
		overwrite(&mut state.deployments, "Deployment", namespace, deployment)
	}

	async fn replace_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError> {
		let mut state = self.enter("replace_config_map")?;
		overwrite(&mut state.config_maps, "ConfigMap", namespace, config_map)
	}

	async fn create_pod(&self, namespace: &str, pod: &Pod) -> Result<Pod, K8sError> {
		let mut state = self.enter("create_pod")?;
		insert_new(&mut state.pods, "Pod", namespace, pod)
	}

	async fn create_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, K8sError> {
		let mut state = self.enter("create_deployment")?;
		insert_new(&mut state.deployments, "Deployment", namespace, deployment)
	}

	async fn create_service(&self, namespace: &str, service: &Service) -> Result<Service, K8sError> {
		let mut state = self.enter("create_service")?;
		insert_new(&mut state.services, "Service", namespace, service)
	}

	async fn create_config_map(&self, namespace: &str, config_map: &ConfigMap) -> Result<ConfigMap, K8sError> {
		let mut state = self.enter("create_config_map")?;
		insert_new(&mut state.config_maps, "ConfigMap", namespace, config_map)
	}

	async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret, K8sError> {
		let mut state = self.enter("create_secret")?;
		insert_new(&mut state.secrets, "Secret", namespace, secret)
	}

	async fn create_namespace(&self, namespace: &Namespace) -> Result<Namespace, K8sError> {
		let mut state = self.enter("create_namespace")?;
		insert_new(&mut state.namespaces, "Namespace", "", namespace)
	}

	async fn delete_pod(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_pod")?;
		remove(&mut state.pods, "Pod", namespace, name)
	}

	async fn delete_deployment(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_deployment")?;
		remove(&mut state.deployments, "Deployment", namespace, name)
	}

	async fn delete_service(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_service")?;
		remove(&mut state.services, "Service", namespace, name)
	}

	async fn delete_config_map(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_config_map")?;
		remove(&mut state.config_maps, "ConfigMap", namespace, name)
	}

	async fn delete_secret(&self, name: &str, namespace: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_secret")?;
		remove(&mut state.secrets, "Secret", namespace, name)
	}

	async fn delete_namespace(&self, name: &str) -> Result<(), K8sError> {
		let mut state = self.enter("delete_namespace")?;
		remove(&mut state.namespaces, "Namespace", "", name)
	}

	async fn pod_logs(&self, name: &str, namespace: &str, tail_lines: i64) -> Result<String, K8sError> {
		let state = self.enter("pod_logs")?;
		let k = key(namespace, name);
		if !state.pods.contains_key(&k) {
			return Err(K8sError::not_found("Pod", name));
		}
		let logs = state.logs.get(&k).map(String::as_str).unwrap_or_default();
		let lines: Vec<&str> = logs.lines().collect();
		let keep = usize::try_from(tail_lines.max(0)).unwrap_or(usize::MAX).min(lines.len());
		let mut tail = lines[lines.len() - keep..].join("\n");
		if keep > 0 {
			tail.push('\n');
		}
		Ok(tail)
	}

	async fn server_version(&self) -> Result<VersionInfo, K8sError> {
		let state = self.enter("server_version")?;
		Ok(state.version.clone())
	}
}
