// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Two-phase turn loop: ask the model with tools, run what it asked for,
//! then ask again without tools for the reply.

use std::sync::Arc;

use kpilot_common_core::{
	ConversationHistory, LlmClient, LlmError, LlmRequest, LlmResponse, Message, ToolDefinition,
	TurnPhase,
};
use kpilot_tools::{Catalog, Executor, Invocation};
use tracing::{debug, info, instrument, warn};

/// Prefix of the assistant message recorded when a model call fails.
pub const ERROR_PREFIX: &str = "Error processing request: ";

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
	pub model: String,
	pub system_prompt: String,
	pub max_tokens: Option<u32>,
	pub temperature: Option<f32>,
}

impl OrchestratorSettings {
	pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
		Self {
			model: model.into(),
			system_prompt: system_prompt.into(),
			max_tokens: None,
			temperature: None,
		}
	}
}

/// Owns one conversation and drives each user turn to completion.
///
/// `process_turn` takes `&mut self`, so turns on one instance never
/// overlap. Use separate instances for concurrent conversations.
pub struct Orchestrator {
	llm: Arc<dyn LlmClient>,
	executor: Executor,
	settings: OrchestratorSettings,
	tools: Vec<ToolDefinition>,
	history: ConversationHistory,
	phase: TurnPhase,
}

impl Orchestrator {
	pub fn new(llm: Arc<dyn LlmClient>, executor: Executor, settings: OrchestratorSettings) -> Self {
		let tools = executor.catalog().definitions();
		let history = ConversationHistory::new();
		info!(
			conversation_id = %history.id(),
			model = %settings.model,
			tool_count = tools.len(),
			"creating orchestrator"
		);
		Self {
			llm,
			executor,
			settings,
			tools,
			history,
			phase: TurnPhase::AwaitingInput,
		}
	}

	/// Runs one user turn and returns the reply.
	///
	/// Model failures are recorded as an assistant message starting with
	/// [`ERROR_PREFIX`] and returned like any other reply.
	#[instrument(skip_all, fields(conversation_id = %self.history.id()))]
	pub async fn process_turn(&mut self, input: &str) -> String {
		self.history.append(Message::user(input));

		let reply = match self.run_turn().await {
			Ok(reply) => reply,
			Err(e) => {
				warn!(error = %e, phase = %self.phase, "turn failed");
				format!("{ERROR_PREFIX}{e}")
			}
		};

		self.history.append(Message::assistant(reply.clone()));
		self.transition(TurnPhase::AwaitingInput);
		reply
	}

	async fn run_turn(&mut self) -> Result<String, LlmError> {
		self.transition(TurnPhase::QueryingModel);
		let response = self.query(true).await?;
		if !response.has_tool_calls() {
			return Ok(response.message.content);
		}

		let LlmResponse {
			message, tool_calls, ..
		} = response;
		self.history.append(Message::assistant_with_tool_calls(
			message.content,
			tool_calls.clone(),
		));

		self.transition(TurnPhase::ExecutingBatch);
		let invocations: Vec<Invocation> = tool_calls.iter().map(Invocation::from).collect();
		let results = self.executor.execute_batch(&invocations).await;
		let failed = results.iter().filter(|r| !r.is_success()).count();
		debug!(count = results.len(), failed, "batch complete");
		self.history.extend(
			tool_calls
				.iter()
				.zip(&results)
				.map(|(call, result)| Message::tool_result(call, result.to_json_string())),
		);

		self.transition(TurnPhase::Finalizing);
		let response = self.query(false).await?;
		if response.has_tool_calls() {
			warn!(
				ignored = response.tool_calls.len(),
				"model requested tools while finalizing; ignoring"
			);
		}
		Ok(response.message.content)
	}

	async fn query(&self, with_tools: bool) -> Result<LlmResponse, LlmError> {
		let request = self.build_request(with_tools);
		debug!(
			messages = request.messages.len(),
			tools = request.tools.len(),
			"querying model"
		);
		let response = self.llm.complete(request).await?;
		if let Some(usage) = &response.usage {
			debug!(
				input_tokens = usage.input_tokens,
				output_tokens = usage.output_tokens,
				finish_reason = ?response.finish_reason,
				"model responded"
			);
		}
		Ok(response)
	}

	/// System prompt, then the full history. Tools only when `with_tools`.
	pub fn build_request(&self, with_tools: bool) -> LlmRequest {
		let mut messages = Vec::with_capacity(self.history.len() + 1);
		messages.push(Message::system(self.settings.system_prompt.clone()));
		messages.extend(self.history.messages().iter().cloned());

		let mut request = LlmRequest::new(self.settings.model.clone()).with_messages(messages);
		if with_tools {
			request = request.with_tools(self.tools.clone());
		}
		if let Some(max_tokens) = self.settings.max_tokens {
			request = request.with_max_tokens(max_tokens);
		}
		if let Some(temperature) = self.settings.temperature {
			request = request.with_temperature(temperature);
		}
		request
	}

	fn transition(&mut self, to: TurnPhase) {
		if self.phase != to {
			info!(from = %self.phase, to = %to, "state transition");
			self.phase = to;
		}
	}

	pub fn reset(&mut self) {
		self.history.clear();
	}

	pub fn history(&self) -> Vec<Message> {
		self.history.snapshot()
	}

	/// Applies to later requests only; history is left as it is.
	pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
		self.settings.system_prompt = prompt.into();
	}

	pub fn system_prompt(&self) -> &str {
		&self.settings.system_prompt
	}

	pub fn catalog(&self) -> &Catalog {
		self.executor.catalog()
	}

	pub fn phase(&self) -> TurnPhase {
		self.phase
	}

	pub fn conversation_id(&self) -> uuid::Uuid {
		self.history.id()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::ScriptedLlm;
	use kpilot_common_core::{Role, ToolCall};
	use kpilot_k8s::MockCluster;
	use proptest::prelude::*;
	use serde_json::json;

	fn orchestrator(llm: Arc<ScriptedLlm>) -> Orchestrator {
		let executor = Executor::new(
			Arc::new(Catalog::kubernetes().unwrap()),
			Arc::new(MockCluster::new()),
		);
		Orchestrator::new(llm, executor, OrchestratorSettings::new("test-model", "be brief"))
	}

	#[tokio::test]
	async fn plain_reply_adds_two_messages() {
		let llm = Arc::new(ScriptedLlm::new([Ok(LlmResponse::text("hello there"))]));
		let mut orch = orchestrator(llm.clone());

		let reply = orch.process_turn("hi").await;

		assert_eq!(reply, "hello there");
		let history = orch.history();
		assert_eq!(history.len(), 2);
		assert_eq!(history[0].role, Role::User);
		assert_eq!(history[1].role, Role::Assistant);
		assert_eq!(orch.phase(), TurnPhase::AwaitingInput);
		assert_eq!(llm.requests().len(), 1);
	}

	#[tokio::test]
	async fn first_request_carries_system_prompt_and_tools() {
		let llm = Arc::new(ScriptedLlm::new([Ok(LlmResponse::text("ok"))]));
		let mut orch = orchestrator(llm.clone());
		orch.process_turn("hi").await;

		let request = &llm.requests()[0];
		assert_eq!(request.model, "test-model");
		assert_eq!(request.messages[0].role, Role::System);
		assert_eq!(request.messages[0].content, "be brief");
		assert_eq!(request.tools.len(), orch.catalog().len());
	}

	#[tokio::test]
	async fn model_failure_is_recorded_as_reply() {
		let llm = Arc::new(ScriptedLlm::new([Err(LlmError::Api("rate limited".into()))]));
		let mut orch = orchestrator(llm);

		let reply = orch.process_turn("list pods").await;

		assert_eq!(reply, "Error processing request: API error: rate limited");
		let history = orch.history();
		assert_eq!(history.len(), 2);
		assert_eq!(history[1].content, reply);
		assert_eq!(orch.phase(), TurnPhase::AwaitingInput);
	}

	#[tokio::test]
	async fn system_prompt_change_applies_to_next_request() {
		let llm = Arc::new(ScriptedLlm::new([
			Ok(LlmResponse::text("one")),
			Ok(LlmResponse::text("two")),
		]));
		let mut orch = orchestrator(llm.clone());
		orch.process_turn("first").await;
		orch.set_system_prompt("be verbose");
		orch.process_turn("second").await;

		let requests = llm.requests();
		assert_eq!(requests[0].messages[0].content, "be brief");
		assert_eq!(requests[1].messages[0].content, "be verbose");
		assert!(orch.history().iter().all(|m| m.role != Role::System));
	}

	#[tokio::test]
	async fn reset_empties_history_and_keeps_conversation_id() {
		let llm = Arc::new(ScriptedLlm::new([Ok(LlmResponse::text("ok"))]));
		let mut orch = orchestrator(llm);
		let id = orch.conversation_id();
		orch.process_turn("hi").await;

		orch.reset();

		assert!(orch.history().is_empty());
		assert_eq!(orch.conversation_id(), id);
	}

	#[tokio::test]
	async fn finalizing_ignores_further_tool_calls() {
		let call = ToolCall::new("call_1", "list_namespaces", json!({}));
		let again = ToolCall::new("call_2", "list_pods", json!({}));
		let llm = Arc::new(ScriptedLlm::new([
			Ok(LlmResponse::with_tool_calls("", vec![call])),
			Ok(LlmResponse::with_tool_calls("No namespaces yet.", vec![again])),
		]));
		let mut orch = orchestrator(llm.clone());

		let reply = orch.process_turn("what namespaces exist?").await;

		assert_eq!(reply, "No namespaces yet.");
		let history = orch.history();
		assert_eq!(history.len(), 4);
		assert_eq!(history[3].role, Role::Assistant);
		assert!(history[3].tool_calls.is_empty());
		assert!(llm.requests()[1].tools.is_empty());
	}

	proptest! {
		#![proptest_config(ProptestConfig::with_cases(16))]

		#[test]
		fn history_only_grows_across_plain_turns(inputs in proptest::collection::vec("[a-z ]{1,20}", 1..6)) {
			let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
			let llm = Arc::new(ScriptedLlm::new(inputs.iter().map(|i| Ok(LlmResponse::text(i.to_uppercase())))));
			let mut orch = orchestrator(llm);

			let mut previous: Vec<Message> = Vec::new();
			for input in &inputs {
				runtime.block_on(orch.process_turn(input));
				let current = orch.history();
				prop_assert_eq!(current.len(), previous.len() + 2);
				prop_assert_eq!(&current[..previous.len()], &previous[..]);
				previous = current;
			}
		}
	}
}
