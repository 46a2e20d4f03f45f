// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! A model client that replays canned responses.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use kpilot_common_core::{LlmClient, LlmError, LlmRequest, LlmResponse};

/// Returns queued responses in order and records every request it sees.
///
/// Once the queue is empty each call fails with
/// [`LlmError::InvalidResponse`].
#[derive(Default)]
pub struct ScriptedLlm {
	responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
	requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
	pub fn new(responses: impl IntoIterator<Item = Result<LlmResponse, LlmError>>) -> Self {
		Self {
			responses: Mutex::new(responses.into_iter().collect()),
			requests: Mutex::new(Vec::new()),
		}
	}

	pub fn push(&self, response: Result<LlmResponse, LlmError>) {
		lock(&self.responses).push_back(response);
	}

	pub fn requests(&self) -> Vec<LlmRequest> {
		lock(&self.requests).clone()
	}

	pub fn remaining(&self) -> usize {
		lock(&self.responses).len()
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmClient for ScriptedLlm {
	async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
		lock(&self.requests).push(request);
		lock(&self.responses)
			.pop_front()
			.unwrap_or_else(|| Err(LlmError::InvalidResponse("no scripted response left".into())))
	}
}
