// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster backend abstraction for kpilot.
//!
//! This crate provides:
//! - [`ClusterBackend`], a typed RPC surface over the Kubernetes API
//! - [`KubeClient`], the production implementation using the kube crate
//! - [`MockCluster`], an in-memory fake that records every call
//! - [`ConfigSource`], connection planning kept apart from connecting

mod client;
mod config;
mod error;
mod kube_client;
mod mock;
mod types;

pub use client::ClusterBackend;
pub use config::{build_config, ConfigSource};
pub use error::K8sError;
pub use kube_client::KubeClient;
pub use mock::MockCluster;
pub use types::{
	ConfigMap, Container, ContainerPort, Deployment, EnvVar, Namespace, Node, Pod, Secret, Service,
	VersionInfo,
};
