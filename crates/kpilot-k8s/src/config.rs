// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Where cluster credentials come from.
//!
//! Choosing the sources is pure; [`build_config`] reads local files and the
//! service-account mount but never talks to the network.

use std::fmt;
use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use tracing::debug;

use crate::error::K8sError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
	/// A kubeconfig file named explicitly.
	Kubeconfig(PathBuf),
	/// The pod's service-account mount.
	InCluster,
	/// `KUBECONFIG`, then `~/.kube/config`.
	Inferred,
}

impl ConfigSource {
	/// Sources to try, in order.
	pub fn candidates(explicit: Option<&Path>) -> Vec<ConfigSource> {
		match explicit {
			Some(path) => vec![ConfigSource::Kubeconfig(path.to_path_buf())],
			None => vec![ConfigSource::InCluster, ConfigSource::Inferred],
		}
	}
}

impl fmt::Display for ConfigSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigSource::Kubeconfig(path) => write!(f, "kubeconfig {}", path.display()),
			ConfigSource::InCluster => f.write_str("in-cluster"),
			ConfigSource::Inferred => f.write_str("inferred"),
		}
	}
}

pub async fn build_config(source: &ConfigSource) -> Result<Config, K8sError> {
	debug!(%source, "building cluster config");
	match source {
		ConfigSource::Kubeconfig(path) => {
			let kubeconfig = Kubeconfig::read_from(path).map_err(K8sError::config)?;
			Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
				.await
				.map_err(K8sError::config)
		}
		ConfigSource::InCluster => Config::incluster().map_err(K8sError::config),
		ConfigSource::Inferred => Config::infer().await.map_err(K8sError::config),
	}
}
