// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end turns against a scripted model and an in-memory cluster.
//!
//! Tests cover:
//! - Tool results land in history in request order, correlated by call id
//! - A failed invocation does not abort the rest of the batch
//! - Mutations requested by the model reach the cluster
//! - Model failures after a batch still leave history consistent

use std::sync::Arc;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kpilot_agent::{Orchestrator, OrchestratorSettings, ScriptedLlm, ERROR_PREFIX};
use kpilot_common_core::{LlmError, LlmResponse, Role, ToolCall, TurnPhase};
use kpilot_k8s::MockCluster;
use kpilot_tools::{Catalog, Executor, ResultEnvelope};
use serde_json::json;

fn setup(llm: Arc<ScriptedLlm>) -> (Orchestrator, MockCluster) {
	let cluster = MockCluster::new();
	let executor = Executor::new(Arc::new(Catalog::kubernetes().unwrap()), Arc::new(cluster.clone()));
	let orch = Orchestrator::new(
		llm,
		executor,
		OrchestratorSettings::new("openai/gpt-oss-120b", "You manage a cluster."),
	);
	(orch, cluster)
}

fn nginx(replicas: i32) -> Deployment {
	Deployment {
		metadata: ObjectMeta {
			name: Some("nginx".into()),
			namespace: Some("default".into()),
			..Default::default()
		},
		spec: Some(DeploymentSpec {
			replicas: Some(replicas),
			..Default::default()
		}),
		..Default::default()
	}
}

fn envelope(content: &str) -> ResultEnvelope {
	serde_json::from_str(content).unwrap()
}

#[tokio::test]
async fn partial_batch_completes_in_request_order() {
	let calls = vec![
		ToolCall::new("call_a", "scale_deployment", json!({"name": "nginx"})),
		ToolCall::new("call_b", "list_namespaces", json!({})),
	];
	let llm = Arc::new(ScriptedLlm::new([
		Ok(LlmResponse::with_tool_calls("", calls)),
		Ok(LlmResponse::text("I need a replica count to scale nginx.")),
	]));
	let (mut orch, cluster) = setup(llm.clone());

	let reply = orch.process_turn("scale nginx and show namespaces").await;

	assert_eq!(reply, "I need a replica count to scale nginx.");
	let history = orch.history();
	let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
	assert_eq!(
		roles,
		vec![Role::User, Role::Assistant, Role::Tool, Role::Tool, Role::Assistant]
	);
	assert_eq!(history[1].tool_calls.len(), 2);

	assert_eq!(history[2].tool_call_id.as_deref(), Some("call_a"));
	let first = envelope(&history[2].content);
	assert!(!first.success);
	assert!(first.error.unwrap().contains("replicas"));

	assert_eq!(history[3].tool_call_id.as_deref(), Some("call_b"));
	assert!(envelope(&history[3].content).success);

	assert_eq!(cluster.calls(), vec!["list_namespaces"]);
	assert_eq!(orch.phase(), TurnPhase::AwaitingInput);
}

#[tokio::test]
async fn second_query_sees_results_without_tools() {
	let llm = Arc::new(ScriptedLlm::new([
		Ok(LlmResponse::with_tool_calls(
			"",
			vec![ToolCall::new("call_1", "list_pods", json!({"namespace": "default"}))],
		)),
		Ok(LlmResponse::text("There are no pods.")),
	]));
	let (mut orch, _cluster) = setup(llm.clone());

	orch.process_turn("any pods?").await;

	let requests = llm.requests();
	assert_eq!(requests.len(), 2);
	assert!(!requests[0].tools.is_empty());
	assert!(requests[1].tools.is_empty());

	let last = requests[1].messages.last().unwrap();
	assert_eq!(last.role, Role::Tool);
	assert_eq!(envelope(&last.content), ResultEnvelope::ok(json!([])));
}

#[tokio::test]
async fn requested_mutation_reaches_the_cluster() {
	let llm = Arc::new(ScriptedLlm::new([
		Ok(LlmResponse::with_tool_calls(
			"Scaling now.",
			vec![ToolCall::new(
				"call_1",
				"scale_deployment",
				json!({"name": "nginx", "replicas": 3}),
			)],
		)),
		Ok(LlmResponse::text("nginx now runs 3 replicas.")),
	]));
	let (mut orch, cluster) = setup(llm);
	cluster.add_deployment(nginx(1));

	let reply = orch.process_turn("scale nginx to 3").await;

	assert_eq!(reply, "nginx now runs 3 replicas.");
	let stored = cluster.deployment("nginx", "default").unwrap();
	assert_eq!(stored.spec.unwrap().replicas, Some(3));
	assert_eq!(orch.history()[1].content, "Scaling now.");
}

#[tokio::test]
async fn failure_after_batch_keeps_results_in_history() {
	let llm = Arc::new(ScriptedLlm::new([
		Ok(LlmResponse::with_tool_calls(
			"",
			vec![ToolCall::new("call_1", "get_cluster_info", json!({}))],
		)),
		Err(LlmError::Timeout),
	]));
	let (mut orch, _cluster) = setup(llm);

	let reply = orch.process_turn("cluster info please").await;

	assert_eq!(reply, format!("{ERROR_PREFIX}Request timed out"));
	let history = orch.history();
	assert_eq!(history.len(), 4);
	assert_eq!(history[2].role, Role::Tool);
	assert!(envelope(&history[2].content).success);
	assert_eq!(history[3].content, reply);
}

#[tokio::test]
async fn conversation_continues_after_error() {
	let llm = Arc::new(ScriptedLlm::new([Err(LlmError::Http("connection reset".into()))]));
	let (mut orch, _cluster) = setup(llm.clone());

	let first = orch.process_turn("hello").await;
	assert!(first.starts_with(ERROR_PREFIX));
	assert_eq!(llm.remaining(), 0);

	llm.push(Ok(LlmResponse::text("Back online.")));
	let second = orch.process_turn("hello again").await;
	assert_eq!(second, "Back online.");
	assert_eq!(llm.remaining(), 0);

	assert_eq!(orch.history().len(), 4);
	// the retry request includes the earlier error exchange
	assert_eq!(llm.requests()[1].messages.len(), 4);
}

#[tokio::test]
async fn malformed_arguments_are_reported_not_executed() {
	let llm = Arc::new(ScriptedLlm::new([
		Ok(LlmResponse::with_tool_calls(
			"",
			vec![ToolCall::new("call_1", "delete_pod", json!("{name: oops"))],
		)),
		Ok(LlmResponse::text("Those arguments were invalid.")),
	]));
	let (mut orch, cluster) = setup(llm);

	orch.process_turn("delete the pod").await;

	let result = envelope(&orch.history()[2].content);
	assert!(!result.success);
	assert!(result.error.unwrap().starts_with("invalid arguments"));
	assert_eq!(cluster.call_count(), 0);
}
