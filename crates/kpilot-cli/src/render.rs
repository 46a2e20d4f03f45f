// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Plain-text output for `kpilot exec` and `kpilot tools`.

use kpilot_common_core::{Message, Role};
use kpilot_tools::summary::{DeploymentSummary, PodSummary};
use kpilot_tools::{OperationSpec, ResultEnvelope};
use serde_json::Value;

/// Left-aligned columns separated by two spaces, with a dashed rule under
/// the header.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
	let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
	for row in rows {
		for (width, cell) in widths.iter_mut().zip(row) {
			*width = (*width).max(cell.len());
		}
	}

	let line = |cells: Vec<&str>| {
		let padded: Vec<String> = cells
			.iter()
			.zip(&widths)
			.map(|(cell, width)| format!("{cell:<width$}"))
			.collect();
		padded.join("  ").trim_end().to_string()
	};

	let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
	let mut out = vec![
		line(headers.to_vec()),
		line(rule.iter().map(String::as_str).collect()),
	];
	out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
	out.join("\n")
}

pub fn pods_table(pods: &[PodSummary]) -> String {
	let rows: Vec<Vec<String>> = pods
		.iter()
		.map(|p| {
			vec![
				p.name.clone(),
				p.namespace.clone(),
				p.phase.clone(),
				if p.ready { "yes" } else { "no" }.to_string(),
				p.restarts.to_string(),
				p.age.clone(),
				p.node.clone().unwrap_or_else(|| "-".into()),
			]
		})
		.collect();
	table(
		&["NAME", "NAMESPACE", "PHASE", "READY", "RESTARTS", "AGE", "NODE"],
		&rows,
	)
}

pub fn deployments_table(deployments: &[DeploymentSummary]) -> String {
	let rows: Vec<Vec<String>> = deployments
		.iter()
		.map(|d| {
			vec![
				d.name.clone(),
				d.namespace.clone(),
				format!("{}/{}", d.ready_replicas, d.replicas),
				d.updated_replicas.to_string(),
				d.available_replicas.to_string(),
				d.age.clone(),
			]
		})
		.collect();
	table(
		&["NAME", "NAMESPACE", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"],
		&rows,
	)
}

/// Tables for pod and deployment listings, pretty JSON for everything else.
pub fn exec_result(operation: &str, result: &ResultEnvelope) -> String {
	let Some(data) = result.data.as_ref().filter(|_| result.success) else {
		return format!(
			"Error: {}",
			result.error.as_deref().unwrap_or("operation failed")
		);
	};

	let rendered = match operation {
		"list_pods" => serde_json::from_value::<Vec<PodSummary>>(data.clone())
			.ok()
			.map(|pods| pods_table(&pods)),
		"list_deployments" => serde_json::from_value::<Vec<DeploymentSummary>>(data.clone())
			.ok()
			.map(|deployments| deployments_table(&deployments)),
		_ => None,
	};
	rendered.unwrap_or_else(|| pretty(data))
}

fn pretty(value: &Value) -> String {
	serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn operations(specs: &[&OperationSpec]) -> String {
	let rows: Vec<Vec<String>> = specs
		.iter()
		.map(|spec| {
			let params: Vec<String> = spec
				.parameters
				.iter()
				.map(|p| if p.required { p.name.clone() } else { format!("[{}]", p.name) })
				.collect();
			vec![spec.name.clone(), params.join(" "), spec.description.clone()]
		})
		.collect();
	table(&["OPERATION", "PARAMETERS", "DESCRIPTION"], &rows)
}

pub fn history(messages: &[Message]) -> String {
	if messages.is_empty() {
		return "(history is empty)".to_string();
	}
	messages
		.iter()
		.enumerate()
		.map(|(i, m)| {
			let role = match m.role {
				Role::System => "system",
				Role::User => "user",
				Role::Assistant if m.requests_tools() => "assistant (tool calls)",
				Role::Assistant => "assistant",
				Role::Tool => "tool",
			};
			let content = if m.requests_tools() {
				m.tool_calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>().join(", ")
			} else {
				m.content.clone()
			};
			format!("{:>3}. {role}: {content}", i + 1)
		})
		.collect::<Vec<_>>()
		.join("\n")
}
