// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Re-exports of the k8s-openapi types that cross the backend boundary.

pub use k8s_openapi::api::apps::v1::Deployment;
pub use k8s_openapi::api::core::v1::{
	ConfigMap, Container, ContainerPort, EnvVar, Namespace, Node, Pod, Secret, Service,
};
pub use k8s_openapi::apimachinery::pkg::version::Info as VersionInfo;
