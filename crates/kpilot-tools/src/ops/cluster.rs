// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use kpilot_common_core::ToolError;
use kpilot_k8s::ClusterBackend;
use serde_json::Value;

use super::{backend, to_value};
use crate::args::Arguments;
use crate::spec::OperationSpec;
use crate::summary::cluster_info;

pub(crate) fn info_spec() -> OperationSpec {
	OperationSpec::new(
		"get_cluster_info",
		"Get cluster information including version and node count",
	)
}

pub(crate) async fn info(_args: &Arguments, cluster: &dyn ClusterBackend) -> Result<Value, ToolError> {
	let (version, nodes, namespaces) = futures::try_join!(
		cluster.server_version(),
		cluster.list_nodes(),
		cluster.list_namespaces(),
	)
	.map_err(backend)?;
	to_value(cluster_info(&version, &nodes, namespaces.len()))
}
